use std::time::Duration;

use crate::{detector::PreampType, error::DXPDriverError, run::ControlTask};

use super::{preset::preset_tick, Acquisition};

const CHECK_MEMORY_POLL: Duration = Duration::from_millis(100);
const CHECK_MEMORY_TIMEOUT: Duration = Duration::from_secs(1);

impl Acquisition<'_> {
    /// Runs the board operation `name` and returns its result.
    ///
    /// Operations without a result return `0`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn board_operation(&mut self, name: &str) -> Result<f64, DXPDriverError> {
        match name {
            "get_clock_speed" => Ok(self.dsp.clock_mhz()),
            "get_preset_tick" => Ok(preset_tick(self.dsp.clock_mhz())),
            "check_memory" => {
                self.dsp.run_control_task(
                    ControlTask::CheckMemory,
                    &[0],
                    CHECK_MEMORY_POLL,
                    CHECK_MEMORY_TIMEOUT,
                )?;
                Ok(0.0)
            }
            "set_polarity" => {
                let polarity = self.detector.polarity as f64;
                self.set_value("detector_polarity", polarity)
            }
            "set_detector_type_value" => self.write_type_value(),
            _ => Err(DXPDriverError::UnknownBoardOperation(name.to_string())),
        }
    }

    fn write_type_value(&mut self) -> Result<f64, DXPDriverError> {
        let value = self.detector.type_value;
        match self.detector.preamp {
            PreampType::Reset => self.dsp.write_value("RESETINT", 4.0 * value)?,
            PreampType::RcFeedback => {
                let clock = self.dsp.clock_mhz();
                self.dsp.write_value("TAURC", clock * value)?
            }
            PreampType::Unknown => return Err(DXPDriverError::UnknownPreampType(self.channel())),
        };
        Ok(value)
    }
}
