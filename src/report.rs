// report.rs

use anyhow::anyhow;
use embedded_hal::blocking::delay::DelayMs;
#[cfg(target_os = "espidf")]
use embedded_svc::http::client::Client as HttpClient;
#[cfg(target_os = "espidf")]
use embedded_svc::http::Status as HttpStatus;
#[cfg(target_os = "espidf")]
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
use log::*;

use crate::{Indicator, Reading, Status};

/// Fixed pause after every report attempt so we do not spam HomeSeer.
pub const REPORT_DELAY_MS: u16 = 3000;

/// Outbound side of the reporter. Only transport-level success matters,
/// whatever HomeSeer answers is ignored.
pub trait Transport {
    fn get(&mut self, url: &str) -> anyhow::Result<()>;
}

#[cfg(target_os = "espidf")]
pub struct EspTransport {
    client: HttpClient<EspHttpConnection>,
}

#[cfg(target_os = "espidf")]
impl EspTransport {
    pub fn new() -> anyhow::Result<Self> {
        let conn = EspHttpConnection::new(&HttpConfiguration::default())?;
        Ok(Self {
            client: HttpClient::wrap(conn),
        })
    }
}

#[cfg(target_os = "espidf")]
impl Transport for EspTransport {
    fn get(&mut self, url: &str) -> anyhow::Result<()> {
        let req = self.client.get(url).map_err(|e| anyhow!("{e:?}"))?;
        let resp = req.submit().map_err(|e| anyhow!("{e:?}"))?;
        debug!("HTTP {status} from {url}", status = resp.status());
        Ok(())
    }
}

/// Pushes averaged readings to the HomeSeer JSON control API.
pub struct HsReporter {
    host: String,
    port: u16,
}

impl HsReporter {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    /// `{:?}` keeps the decimal point on whole values, e.g. `21.0` not `21`.
    pub fn device_url(&self, device_ref: u32, value: f32) -> String {
        format!(
            "http://{host}:{port}/JSON?request=controldevicebyvalue&ref={device_ref}&value={value:?}",
            host = self.host,
            port = self.port,
        )
    }

    /// One GET per reading. A failed report is logged and signaled but must
    /// not stop the remaining devices in the same pass. Returns the number
    /// of successful reports.
    pub fn report_all<T, I, D>(
        &self,
        readings: &[Reading],
        transport: &mut T,
        leds: &mut I,
        delay: &mut D,
    ) -> usize
    where
        T: Transport,
        I: Indicator,
        D: DelayMs<u16>,
    {
        let mut sent = 0;
        for reading in readings {
            let url = self.device_url(reading.device_ref, reading.value);
            match transport.get(&url) {
                Ok(()) => {
                    info!(
                        "Sent {name} = {value} (ref {device_ref})",
                        name = reading.name,
                        value = reading.value,
                        device_ref = reading.device_ref
                    );
                    leds.signal(Status::ReportOk);
                    sent += 1;
                }
                Err(e) => {
                    error!("Report for {name} failed: {e:?}", name = reading.name);
                    leds.signal(Status::ReportFail);
                }
            }
            delay.delay_ms(REPORT_DELAY_MS);
        }
        sent
    }
}


// EOF
