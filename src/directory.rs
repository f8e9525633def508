// directory.rs

use serde::{Deserialize, Serialize};

/// One sensor on the bus: human-readable name, the 64-bit ROM address
/// burned in by the manufacturer, and the HomeSeer device ref written to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub name: String,
    pub rom: u64,
    pub device_ref: u32,
}

impl DeviceEntry {
    pub fn new(name: &str, rom: u64, device_ref: u32) -> Self {
        Self {
            name: name.to_string(),
            rom,
            device_ref,
        }
    }
}

/// Name -> sensor table, fixed for the lifetime of the process.
/// The ROM address is the identity; names and refs just hang off it.
#[derive(Clone, Debug)]
pub struct SensorDirectory {
    entries: Vec<DeviceEntry>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// The bus scan came back empty.
    NoSensorsDetected,
    /// A directory entry has no matching device on the bus.
    MissingSensor { name: String, rom: u64 },
    /// The bus has a device the directory does not know about.
    UnknownSensor { rom: u64 },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSensorsDetected => write!(f, "No sensors detected!"),
            Self::MissingSensor { name, rom } => {
                write!(f, "Device {name} ({rom:#018x}) not found!")
            }
            Self::UnknownSensor { rom } => write!(f, "Unknown device found: {rom:#018x}"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SensorDirectory {
    pub fn new(entries: Vec<DeviceEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DeviceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&DeviceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn find_by_rom(&self, rom: u64) -> Option<&DeviceEntry> {
        self.entries.iter().find(|e| e.rom == rom)
    }

    /// Fail startup unless the discovered ROM set is exactly the directory
    /// ROM set. Anything else would either silently drop an expected sensor
    /// or report values from a device nobody configured.
    pub fn validate(&self, discovered: &[u64]) -> Result<(), ValidationError> {
        if discovered.is_empty() {
            return Err(ValidationError::NoSensorsDetected);
        }

        for entry in &self.entries {
            if !discovered.contains(&entry.rom) {
                return Err(ValidationError::MissingSensor {
                    name: entry.name.clone(),
                    rom: entry.rom,
                });
            }
        }

        for &rom in discovered {
            if self.find_by_rom(rom).is_none() {
                return Err(ValidationError::UnknownSensor { rom });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> SensorDirectory {
        SensorDirectory::new(vec![
            DeviceEntry::new("A", 0x01, 10),
            DeviceEntry::new("B", 0x02, 20),
        ])
    }

    #[test]
    fn exact_match_passes() {
        assert_eq!(directory().validate(&[0x01, 0x02]), Ok(()));
        // discovery order is up to the bus
        assert_eq!(directory().validate(&[0x02, 0x01]), Ok(()));
    }

    #[test]
    fn empty_scan_is_no_sensors() {
        assert_eq!(
            directory().validate(&[]),
            Err(ValidationError::NoSensorsDetected)
        );
    }

    #[test]
    fn subset_is_missing_sensor() {
        assert_eq!(
            directory().validate(&[0x01]),
            Err(ValidationError::MissingSensor {
                name: "B".into(),
                rom: 0x02
            })
        );
    }

    #[test]
    fn superset_is_unknown_sensor() {
        assert_eq!(
            directory().validate(&[0x01, 0x02, 0x03]),
            Err(ValidationError::UnknownSensor { rom: 0x03 })
        );
    }

    #[test]
    fn lookups() {
        let dir = directory();
        assert_eq!(dir.get("A").unwrap().device_ref, 10);
        assert_eq!(dir.find_by_rom(0x02).unwrap().name, "B");
        assert!(dir.get("C").is_none());
        assert!(dir.find_by_rom(0x03).is_none());
    }
}

// EOF
