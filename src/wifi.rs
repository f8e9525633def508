// wifi.rs

use std::net::Ipv4Addr;

use anyhow::anyhow;
use embedded_hal::blocking::delay::DelayMs;
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::*;

use crate::{Indicator, RetryPolicy, Status};

pub const WIFI_RETRY_DELAY_MS: u16 = 5000;

/// Block until the station is associated and the netif is up, then return
/// the assigned address. There is no failure path with the default forever
/// policy: an unattended box has nothing better to do than keep trying.
///
/// Callers decide the no-network mode (empty SSID) and skip this entirely.
pub fn ensure_connected<I, D>(
    wifi: &mut BlockingWifi<EspWifi<'static>>,
    ssid: &str,
    password: &str,
    leds: &mut I,
    delay: &mut D,
    policy: RetryPolicy,
) -> anyhow::Result<Ipv4Addr>
where
    I: Indicator,
    D: DelayMs<u16>,
{
    if wifi.is_connected()? && wifi.is_up()? {
        return Ok(wifi.wifi().sta_netif().get_ip_info()?.ip);
    }

    if !wifi.is_started()? {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        };

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid
                .try_into()
                .map_err(|_| anyhow!("wifi ssid too long"))?,
            password: password
                .try_into()
                .map_err(|_| anyhow!("wifi password too long"))?,
            auth_method,
            ..Default::default()
        }))?;

        wifi.start()?;
    }

    info!("Connecting to Wifi: {ssid}");
    policy.run(delay, || {
        leds.signal(Status::WifiConnecting);
        info!("Connecting...");
        wifi.connect()
            .and_then(|()| wifi.wait_netif_up())
            .map_err(|e| {
                let _ = wifi.disconnect();
                e
            })
    })?;

    leds.signal(Status::WifiUp);
    let ip = wifi.wifi().sta_netif().get_ip_info()?.ip;
    info!("IP: {ip}");
    Ok(ip)
}

// EOF
