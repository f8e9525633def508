// bin/esp32hstemp.rs

#![cfg_attr(not(target_os = "espidf"), allow(dead_code))]

#[cfg(target_os = "espidf")]
use anyhow::anyhow;
#[cfg(target_os = "espidf")]
use esp32hstemp::*;
#[cfg(target_os = "espidf")]
use esp_idf_hal::delay::FreeRtos;
#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::{IOPin, PinDriver, Pull};
#[cfg(target_os = "espidf")]
use esp_idf_hal::prelude::Peripherals;
#[cfg(target_os = "espidf")]
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs, wifi::{BlockingWifi, EspWifi}};
#[cfg(target_os = "espidf")]
use esp_idf_sys::esp_app_desc;
#[cfg(target_os = "espidf")]
use log::*;

// Wiring. Change these if your board differs.
const ONEWIRE_PIN: u8 = 4;
const RED_PIN: u8 = 16;
const GREEN_PIN: u8 = 17;

/// Backoff after a failed sampling pass.
const PASS_RETRY_DELAY_MS: u16 = 5000;


#[cfg(target_os = "espidf")]
esp_app_desc!();

#[cfg(not(target_os = "espidf"))]
fn main() {}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("STARTING!");
    info!("esp32hstemp v{FW_VERSION}");

    let nvs_default_partition = nvs::EspDefaultNvsPartition::take()?;

    let ns = env!("CARGO_BIN_NAME");
    let mut nvs = match nvs::EspNvs::new(nvs_default_partition.clone(), ns, true) {
        Ok(nvs) => {
            info!("Got namespace {ns:?} from default partition");
            nvs
        }
        Err(e) => panic!("Could not get namespace {ns}: {e:?}"),
    };

    #[cfg(feature = "reset_settings")]
    let config = {
        let c = MyConfig::default();
        c.to_nvs(&mut nvs)?;
        c
    };

    #[cfg(not(feature = "reset_settings"))]
    let config = match MyConfig::from_nvs(&mut nvs) {
        None => {
            error!("Could not read nvs config, using defaults");
            let c = MyConfig::default();
            c.to_nvs(&mut nvs)?;
            info!("Successfully saved default config to nvs.");
            c
        }

        // using settings saved on nvs if we could find them
        Some(c) => c,
    };
    info!("My config:\n{config:#?}");

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    // gpio16 red, gpio17 green
    let mut leds = StatusLeds::new(
        Led::new(PinDriver::output(pins.gpio16)?),
        Led::new(PinDriver::output(pins.gpio17)?),
        FreeRtos,
    );
    info!("LEDs on gpio{RED_PIN} (red) and gpio{GREEN_PIN} (green)");
    leds.signal(Status::Startup);

    info!("initializing sensors on gpio{ONEWIRE_PIN}...");
    let mut ow_pin = PinDriver::input_output_od(pins.gpio4.downgrade())?;
    ow_pin.set_pull(Pull::Up)?;
    let mut bus = Ds18x20Bus::new(ow_pin).map_err(|e| anyhow!("{e:?}"))?;

    let directory = SensorDirectory::new(config.devices.clone());
    let roms = bus.discover().map_err(|e| anyhow!("{e:?}"))?;
    for rom in &roms {
        info!("Found 1-wire device {rom:#018x}");
    }

    // Fail fast and loudly: a mismatch here would corrupt every reading
    // sent downstream, with no way to notice later.
    if let Err(e) = directory.validate(&roms) {
        leds.signal(match e {
            ValidationError::NoSensorsDetected => Status::NoSensorsDetected,
            ValidationError::MissingSensor { .. } => Status::SensorMissing,
            ValidationError::UnknownSensor { .. } => Status::UnknownSensor,
        });
        error!("{e}");
        bail!("{e}");
    }
    info!("Sensors OK.");
    leds.signal(Status::SensorsOk);

    let sysloop = EspSystemEventLoop::take()?;
    let mut wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_default_partition))?,
        sysloop,
    )?;

    let mut transport = EspTransport::new()?;
    let reporter = HsReporter::new(&config.hs_host, config.hs_port);
    let pass_retry = RetryPolicy::forever(PASS_RETRY_DELAY_MS);
    let wifi_retry = RetryPolicy::forever(WIFI_RETRY_DELAY_MS);

    info!("Entering main loop...");
    loop {
        let free = unsafe { esp_idf_sys::esp_get_free_heap_size() };
        info!("memory available: {free}");

        let Ok(readings) = pass_retry.run(&mut FreeRtos, || {
            collect_average(&mut bus, &directory, config.avg_cycles, &mut FreeRtos)
        }) else {
            continue;
        };

        if !config.reporting_enabled() {
            info!("==================");
            info!("NOT SENDING VALUES");
            info!("==================");
            continue;
        }

        if let Err(e) = ensure_connected(
            &mut wifi,
            &config.wifi_ssid,
            &config.wifi_pass,
            &mut leds,
            &mut FreeRtos,
            wifi_retry,
        ) {
            error!("Wifi setup failed: {e:?}");
            FreeRtos::delay_ms(PASS_RETRY_DELAY_MS as u32);
            continue;
        }

        reporter.report_all(&readings, &mut transport, &mut leds, &mut FreeRtos);
    }
}

// EOF
