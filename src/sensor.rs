// sensor.rs

use ds18b20::Ds18b20;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::{InputPin, OutputPin};
#[cfg(target_os = "espidf")]
use esp_idf_hal::delay::Ets;
use log::*;
use one_wire_bus::{Address, OneWire, OneWireError};

use crate::{Reading, SensorDirectory};

/// Wait between the broadcast convert and the per-device reads. The DS18B20
/// needs up to 750 ms for a conversion at the default 12-bit resolution.
pub const CONVERSION_DELAY_MS: u16 = 750;

/// The bus as the control loop sees it: enumerate, trigger one conversion
/// on every sensor at once, read back one converted value. Callers must
/// wait `CONVERSION_DELAY_MS` between `broadcast_convert` and `read`.
pub trait TempBus {
    type Error: std::fmt::Debug;

    fn discover(&mut self) -> Result<Vec<u64>, Self::Error>;
    fn broadcast_convert(&mut self) -> Result<(), Self::Error>;
    fn read(&mut self, rom: u64) -> Result<f32, Self::Error>;
}

/// DS18x20 sensors on a single open-drain pin.
pub struct Ds18x20Bus<P> {
    bus: OneWire<P>,
}

impl<P, E> Ds18x20Bus<P>
where
    P: OutputPin<Error = E> + InputPin<Error = E>,
    E: std::fmt::Debug,
{
    pub fn new(pin: P) -> Result<Self, OneWireError<E>> {
        Ok(Self {
            bus: OneWire::new(pin)?,
        })
    }
}

#[cfg(target_os = "espidf")]
impl<P, E> TempBus for Ds18x20Bus<P>
where
    P: OutputPin<Error = E> + InputPin<Error = E>,
    E: std::fmt::Debug,
{
    type Error = OneWireError<E>;

    fn discover(&mut self) -> Result<Vec<u64>, Self::Error> {
        let mut delay = Ets;
        let mut roms = Vec::new();
        for device in self.bus.devices(false, &mut delay) {
            let address = device?;
            roms.push(address.0);
        }
        Ok(roms)
    }

    fn broadcast_convert(&mut self) -> Result<(), Self::Error> {
        ds18b20::start_simultaneous_temp_measurement(&mut self.bus, &mut Ets)
    }

    fn read(&mut self, rom: u64) -> Result<f32, Self::Error> {
        let sensor = Ds18b20::new::<E>(Address(rom))?;
        let data = sensor.read_data(&mut self.bus, &mut Ets)?;
        Ok(data.temperature)
    }
}

/// One averaging pass: `cycles` rounds of convert + settle + read across the
/// whole directory, then the arithmetic mean per device. Any bus error
/// abandons the pass, a half-sampled pass must never reach the reporter.
pub fn collect_average<B, D>(
    bus: &mut B,
    directory: &SensorDirectory,
    cycles: u32,
    delay: &mut D,
) -> Result<Vec<Reading>, B::Error>
where
    B: TempBus,
    D: DelayMs<u16>,
{
    let mut samples: Vec<Vec<f32>> =
        vec![Vec::with_capacity(cycles as usize); directory.len()];

    for _ in 0..cycles {
        bus.broadcast_convert()?;
        delay.delay_ms(CONVERSION_DELAY_MS);
        for (entry, dev_samples) in directory.entries().iter().zip(samples.iter_mut()) {
            dev_samples.push(bus.read(entry.rom)?);
        }
    }

    let mut readings = Vec::with_capacity(directory.len());
    for (entry, dev_samples) in directory.entries().iter().zip(samples.iter()) {
        let mean = dev_samples.iter().sum::<f32>() / cycles as f32;
        info!("{name}: {dev_samples:?} -> {mean}", name = entry.name);
        readings.push(Reading {
            name: entry.name.clone(),
            device_ref: entry.device_ref,
            value: mean,
        });
    }

    Ok(readings)
}


// EOF
