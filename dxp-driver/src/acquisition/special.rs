use std::time::Duration;

use dxp_core::defined::{busy, MIN_TRACE_SPACING_NS};

use crate::{error::DXPDriverError, run::ControlTask};

use super::{Acquisition, RunData};

const TASK_POLL: Duration = Duration::from_millis(1);
const TASK_RETRIES: u32 = 10000;

impl Acquisition<'_> {
    fn trace_wait(&mut self, spacing_ns: f64) -> f64 {
        let spacing = if spacing_ns < MIN_TRACE_SPACING_NS {
            tracing::warn!(
                "channel {}: ADC trace spacing {} ns is below {} ns, using the minimum",
                self.channel(),
                spacing_ns,
                MIN_TRACE_SPACING_NS
            );
            MIN_TRACE_SPACING_NS
        } else {
            spacing_ns
        };
        let clock_tick_ns = 1000.0 / self.dsp.clock_mhz();
        ((spacing - MIN_TRACE_SPACING_NS) / clock_tick_ns).floor()
    }

    fn wait_for_task(&mut self, task: ControlTask) -> Result<(), DXPDriverError> {
        let params = self.dsp.control_task_params(task)?;
        let poll = if params.poll.is_zero() { TASK_POLL } else { params.poll };
        self.dsp.sleep(params.initial_wait);
        self.dsp.wait_for_busy(busy::DONE, poll, poll * TASK_RETRIES)
    }

    /// Starts the special run `name`.
    ///
    /// An ADC trace takes `[length, sample spacing in ns]`. A spacing below the hardware minimum
    /// is raised to the minimum.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn start_special_run(&mut self, name: &str, info: &[f64]) -> Result<(), DXPDriverError> {
        match name {
            "adc_trace" => {
                let task = ControlTask::AcquireAdc;
                if info.len() < 2 {
                    return Err(DXPDriverError::InvalidInfoLength {
                        task,
                        len: info.len(),
                        required: 2,
                    });
                }
                let wait = self.trace_wait(info[1]);
                self.dsp.begin_control_task(task, &[info[0] as i32, wait as i32])?;
                self.state.set_special_run(Some(task));
                self.wait_for_task(task)
            }
            "baseline_history" => {
                let task = ControlTask::BaselineHistory;
                self.dsp.begin_control_task(task, &[0])?;
                self.state.set_special_run(Some(task));
                let params = self.dsp.control_task_params(task)?;
                self.dsp.sleep(params.initial_wait);
                Ok(())
            }
            "open_input_relay" | "close_input_relay" => {
                let task = if name == "open_input_relay" {
                    ControlTask::OpenInputRelay
                } else {
                    ControlTask::CloseInputRelay
                };
                self.dsp.begin_control_task(task, &[0])?;
                let result = self.wait_for_task(task);
                self.dsp.end_control_task()?;
                result
            }
            "end_special_run" => self.end_special_run(),
            _ => Err(DXPDriverError::UnknownSpecialRun(name.to_string())),
        }
    }

    /// Ends the active special run.
    pub fn end_special_run(&mut self) -> Result<(), DXPDriverError> {
        self.dsp.end_control_task()?;
        self.state.set_special_run(None);
        Ok(())
    }

    /// Reads the data of a special run.
    ///
    /// Reading an ADC trace or a baseline history ends its control task.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn special_run_data(&mut self, name: &str) -> Result<RunData, DXPDriverError> {
        let (task, length) = match name {
            "adc_trace" => (ControlTask::AcquireAdc, false),
            "adc_trace_length" => (ControlTask::AcquireAdc, true),
            "baseline_history" => (ControlTask::BaselineHistory, false),
            "baseline_history_length" => (ControlTask::BaselineHistory, true),
            _ => return Err(DXPDriverError::UnknownSpecialRun(name.to_string())),
        };
        if length {
            return Ok(RunData::Value(self.dsp.control_task_params(task)?.length as f64));
        }
        let data = self.dsp.control_task_data(task)?;
        self.end_special_run()?;
        Ok(RunData::Trace(data))
    }
}
