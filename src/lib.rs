// lib.rs

pub use anyhow::bail;
pub use log::*;
pub use serde::{Deserialize, Serialize};

mod config;
pub use config::*;

mod directory;
pub use directory::*;

mod status;
pub use status::*;

mod sensor;
pub use sensor::*;

mod retry;
pub use retry::*;

#[cfg(target_os = "espidf")]
mod wifi;
#[cfg(target_os = "espidf")]
pub use wifi::*;

mod report;
pub use report::*;

pub const FW_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One averaged temperature, ready to be sent to HomeSeer.
#[derive(Clone, Debug, Serialize)]
pub struct Reading {
    pub name: String,
    pub device_ref: u32,
    pub value: f32,
}

// EOF
