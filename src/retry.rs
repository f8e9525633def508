// retry.rs

use embedded_hal::blocking::delay::DelayMs;
use log::*;

/// Fixed-delay retry policy. The firmware runs unattended, so the two
/// steady-state loops (sampling, wifi association) retry forever; tests
/// substitute a bounded policy.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub delay_ms: u16,
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub const fn forever(delay_ms: u16) -> Self {
        Self {
            delay_ms,
            max_attempts: None,
        }
    }

    pub const fn limited(delay_ms: u16, max_attempts: u32) -> Self {
        Self {
            delay_ms,
            max_attempts: Some(max_attempts),
        }
    }

    /// Run `op` until it succeeds or the attempt budget is spent, sleeping
    /// the fixed delay between attempts.
    pub fn run<T, E, D, F>(&self, delay: &mut D, mut op: F) -> Result<T, E>
    where
        D: DelayMs<u16>,
        E: std::fmt::Debug,
        F: FnMut() -> Result<T, E>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op() {
                Ok(val) => return Ok(val),
                Err(e) => {
                    attempt += 1;
                    if let Some(max) = self.max_attempts {
                        if attempt >= max {
                            return Err(e);
                        }
                    }
                    warn!("Error: {e:?} - retrying in {} ms", self.delay_ms);
                    delay.delay_ms(self.delay_ms);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn returns_first_success_without_sleeping() {
        let mut delay = MockDelay::default();
        let result: Result<u32, &str> =
            RetryPolicy::forever(5000).run(&mut delay, || Ok(42));
        assert_eq!(result, Ok(42));
        assert!(delay.slept_ms.is_empty());
    }

    #[test]
    fn retries_with_fixed_delay_until_success() {
        let mut delay = MockDelay::default();
        let mut fails_left = 3;
        let result: Result<u32, &str> = RetryPolicy::forever(5000).run(&mut delay, || {
            if fails_left > 0 {
                fails_left -= 1;
                Err("transient")
            } else {
                Ok(7)
            }
        });
        assert_eq!(result, Ok(7));
        assert_eq!(delay.slept_ms, vec![5000, 5000, 5000]);
    }

    #[test]
    fn limited_policy_gives_up() {
        let mut delay = MockDelay::default();
        let mut attempts = 0;
        let result: Result<u32, &str> = RetryPolicy::limited(100, 3).run(&mut delay, || {
            attempts += 1;
            Err("down")
        });
        assert_eq!(result, Err("down"));
        assert_eq!(attempts, 3);
        // no sleep after the final attempt
        assert_eq!(delay.slept_ms, vec![100, 100]);
    }
}

// EOF
