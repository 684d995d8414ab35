use std::time::Duration;

/// Timing and transfer configuration of the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverOption {
    /// Largest number of words moved by one bus call. `0` moves every block in one call.
    pub max_block: usize,
    /// Time allowed for every enabled channel to report a started run.
    pub run_start_timeout: Duration,
    /// Interval between BUSY reads while a run starts.
    pub run_start_poll: Duration,
    /// Interval between BUSY reads while a run stops.
    pub run_stop_poll: Duration,
    /// Number of BUSY reads while a run stops.
    pub run_stop_retries: usize,
    /// Time allowed for the DSP to enter or leave sleep.
    pub sleep_timeout: Duration,
    /// Time allowed for the DSP to boot after a program download.
    pub boot_timeout: Duration,
    /// Time the FiPPI is held in reset before the configuration is sent.
    pub fippi_settle: Duration,
    /// Clock speed assumed when `SYSMICROSEC` cannot be read, in \[MHz\]
    pub default_clock_mhz: f64,
    /// Scale applied to the analog system gain.
    pub gain_scale: f64,
}

impl Default for DriverOption {
    fn default() -> Self {
        Self {
            max_block: 2048,
            run_start_timeout: Duration::from_millis(500),
            run_start_poll: Duration::from_millis(1),
            run_stop_poll: Duration::from_millis(1),
            run_stop_retries: 4000,
            sleep_timeout: Duration::from_secs(5),
            boot_timeout: Duration::from_secs(1),
            fippi_settle: Duration::from_millis(50),
            default_clock_mhz: 40.0,
            gain_scale: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default() {
        let option = DriverOption::default();
        assert_eq!(2048, option.max_block);
        assert_eq!(Duration::from_millis(500), option.run_start_timeout);
        assert_eq!(4000, option.run_stop_retries);
        assert_eq!(40.0, option.default_clock_mhz);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde() -> anyhow::Result<()> {
        let option = DriverOption {
            max_block: 16,
            ..Default::default()
        };
        let json = serde_json::to_string(&option)?;
        assert_eq!(option, serde_json::from_str(&json)?);
        Ok(())
    }
}
