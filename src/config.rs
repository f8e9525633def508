// config.rs

use anyhow::bail;
use crc::{Crc, CRC_32_ISCSI};
#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs;
use log::*;
use serde::{Deserialize, Serialize};

use crate::DeviceEntry;


pub const NVS_BUF_SIZE: usize = 512;

const DEFAULT_HS_PORT: u16 = 80;
const DEFAULT_AVG_CYCLES: u32 = 5;

const CONFIG_NAME: &str = "cfg";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MyConfig {
    /// Readings collected per device before one averaged value is sent.
    pub avg_cycles: u32,

    /// Empty SSID disables reporting entirely, readings are only logged.
    pub wifi_ssid: String,
    pub wifi_pass: String,

    pub hs_host: String,
    pub hs_port: u16,

    /// Sensors wired to the one-wire bus. Flash once with default settings
    /// to log the discovered ROM addresses, then fill these in.
    pub devices: Vec<DeviceEntry>,
}

impl Default for MyConfig {
    fn default() -> Self {
        Self {
            avg_cycles: DEFAULT_AVG_CYCLES,

            wifi_ssid: option_env!("WIFI_SSID").unwrap_or("").into(),
            wifi_pass: option_env!("WIFI_PASS").unwrap_or("password").into(),

            hs_host: option_env!("HS_HOST").unwrap_or("homeseer.local").into(),
            hs_port: option_env!("HS_PORT")
                .unwrap_or("-")
                .parse()
                .unwrap_or(DEFAULT_HS_PORT),

            devices: vec![
                DeviceEntry::new("Nr 0", 0, 9999),
                DeviceEntry::new("Nr 1", 0, 9999),
                DeviceEntry::new("Nr 2", 0, 9999),
            ],
        }
    }
}

impl MyConfig {
    /// An empty SSID is the deliberate no-report mode: sample and log, never
    /// touch the network.
    pub fn reporting_enabled(&self) -> bool {
        !self.wifi_ssid.is_empty()
    }

    #[cfg(target_os = "espidf")]
    pub fn from_nvs(nvs: &mut nvs::EspNvs<nvs::NvsDefault>) -> Option<Self> {
        let mut nvsbuf = [0u8; NVS_BUF_SIZE];
        info!("Reading up to {sz} bytes from nvs...", sz = NVS_BUF_SIZE);
        let b = match nvs.get_raw(CONFIG_NAME, &mut nvsbuf) {
            Err(e) => {
                error!("Nvs read error {e:?}");
                return None;
            }
            Ok(Some(b)) => b,
            _ => {
                error!("Nvs key not found");
                return None;
            }
        };
        info!("Got {sz} bytes from nvs. Parsing config...", sz = b.len());

        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let digest = crc.digest();
        match postcard::from_bytes_crc32::<MyConfig>(b, digest) {
            Ok(c) => {
                info!("Successfully parsed config from nvs.");
                Some(c)
            }
            Err(e) => {
                error!("Cannot parse config from nvs: {e:?}");
                None
            }
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn to_nvs(&self, nvs: &mut nvs::EspNvs<nvs::NvsDefault>) -> anyhow::Result<()> {
        let mut nvsbuf = [0u8; NVS_BUF_SIZE];
        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let digest = crc.digest();
        let nvsdata = match postcard::to_slice_crc32(self, &mut nvsbuf, digest) {
            Ok(d) => d,
            Err(e) => {
                let estr = format!("Cannot encode config to buffer {e:?}");
                bail!("{estr}");
            }
        };
        info!(
            "Encoded config to {sz} bytes. Saving to nvs...",
            sz = nvsdata.len()
        );

        match nvs.set_raw(CONFIG_NAME, nvsdata) {
            Ok(_) => {
                info!("Config saved.");
                Ok(())
            }
            Err(e) => {
                let estr = format!("Cannot save to nvs: {e:?}");
                bail!("{estr}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_fits_nvs_buffer() {
        let config = MyConfig::default();
        let mut buf = [0u8; NVS_BUF_SIZE];
        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let encoded = postcard::to_slice_crc32(&config, &mut buf, crc.digest()).unwrap();
        assert!(!encoded.is_empty());
    }

    #[test]
    fn config_roundtrips_through_postcard() {
        let config = MyConfig {
            wifi_ssid: "mynet".into(),
            devices: vec![DeviceEntry::new("Boiler", 0x28ff6409b4160322, 117)],
            ..MyConfig::default()
        };
        let mut buf = [0u8; NVS_BUF_SIZE];
        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let encoded = postcard::to_slice_crc32(&config, &mut buf, crc.digest()).unwrap();
        let decoded: MyConfig =
            postcard::from_bytes_crc32(encoded, Crc::<u32>::new(&CRC_32_ISCSI).digest()).unwrap();
        assert_eq!(decoded.wifi_ssid, "mynet");
        assert_eq!(decoded.devices.len(), 1);
        assert_eq!(decoded.devices[0].rom, 0x28ff6409b4160322);
        assert_eq!(decoded.devices[0].device_ref, 117);
    }
}

// EOF
