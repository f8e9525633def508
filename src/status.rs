// status.rs

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

/// Everything the firmware signals through the two LEDs. Each code maps to
/// a fixed (led, toggle count, interval) pattern below.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Startup,
    SensorsOk,
    WifiConnecting,
    WifiUp,
    ReportOk,
    ReportFail,
    NoSensorsDetected,
    SensorMissing,
    UnknownSensor,
}

/// Seam for status signaling so the control logic can be exercised
/// without GPIO hardware.
pub trait Indicator {
    fn signal(&mut self, status: Status);
}

/// A single LED on a GPIO output. Writes are best effort, there is no
/// sensible recovery from a failed pin write.
pub struct Led<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Led<P> {
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, on: false }
    }

    /// Toggle `count` times with `interval_ms` between toggles. Blocks the
    /// calling thread for the whole pattern.
    pub fn blink<D: DelayMs<u16>>(&mut self, count: u32, interval_ms: u16, delay: &mut D) {
        for _ in 0..count {
            self.on = !self.on;
            if self.on {
                let _ = self.pin.set_high();
            } else {
                let _ = self.pin.set_low();
            }
            delay.delay_ms(interval_ms);
        }
    }
}

/// Red/green pair driving the blink codes.
pub struct StatusLeds<R, G, D> {
    red: Led<R>,
    green: Led<G>,
    delay: D,
}

impl<R, G, D> StatusLeds<R, G, D>
where
    R: OutputPin,
    G: OutputPin,
    D: DelayMs<u16>,
{
    pub fn new(red: Led<R>, green: Led<G>, delay: D) -> Self {
        Self { red, green, delay }
    }
}

impl<R, G, D> Indicator for StatusLeds<R, G, D>
where
    R: OutputPin,
    G: OutputPin,
    D: DelayMs<u16>,
{
    fn signal(&mut self, status: Status) {
        match status {
            Status::Startup => self.green.blink(10, 100, &mut self.delay),
            Status::SensorsOk => self.green.blink(2, 500, &mut self.delay),
            Status::WifiConnecting => self.red.blink(1, 200, &mut self.delay),
            Status::WifiUp => self.green.blink(3, 200, &mut self.delay),
            Status::ReportOk => self.green.blink(2, 200, &mut self.delay),
            Status::ReportFail => self.red.blink(5, 200, &mut self.delay),
            // single long blink, distinct from the counted patterns
            Status::NoSensorsDetected => self.red.blink(1, 2000, &mut self.delay),
            Status::SensorMissing => self.red.blink(3, 200, &mut self.delay),
            Status::UnknownSensor => self.red.blink(4, 200, &mut self.delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockPin {
        states: Vec<bool>,
    }

    impl OutputPin for MockPin {
        type Error = core::convert::Infallible;

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.states.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.states.push(true);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDelay {
        slept_ms: Vec<u16>,
    }

    impl DelayMs<u16> for MockDelay {
        fn delay_ms(&mut self, ms: u16) {
            self.slept_ms.push(ms);
        }
    }

    #[test]
    fn blink_toggles_count_times() {
        let mut led = Led::new(MockPin::default());
        let mut delay = MockDelay::default();
        led.blink(4, 200, &mut delay);

        // one write from new(), then alternating toggles
        assert_eq!(led.pin.states, vec![false, true, false, true, false]);
        assert_eq!(delay.slept_ms, vec![200, 200, 200, 200]);
    }

    #[test]
    fn patterns_use_distinct_red_counts() {
        let mut leds = StatusLeds::new(
            Led::new(MockPin::default()),
            Led::new(MockPin::default()),
            MockDelay::default(),
        );

        leds.signal(Status::SensorMissing);
        let after_missing = leds.red.pin.states.len();
        leds.signal(Status::UnknownSensor);
        let after_unknown = leds.red.pin.states.len() - after_missing;

        // 3 vs 4 toggles, plus the initial set_low from new()
        assert_eq!(after_missing, 1 + 3);
        assert_eq!(after_unknown, 4);
    }
}

// EOF
