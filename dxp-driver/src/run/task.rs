use std::time::Duration;

use dxp_core::defined::{busy, runtasks};

use crate::{engine::Dsp, error::DXPDriverError};

/// Asynchronous diagnostic tasks of the DSP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlTask {
    /// Set the ASC DAC.
    SetAscDac,
    /// Capture an ADC trace into the history buffer.
    AcquireAdc,
    /// Calibrate the tracking DAC.
    TrackingDac,
    /// Calibrate the slope DAC.
    SlopeCalibration,
    /// Put the DSP to sleep.
    SleepDsp,
    /// Reprogram the FiPPI.
    ProgramFippi,
    /// Apply `POLARITY`.
    SetPolarity,
    /// Close the input relay.
    CloseInputRelay,
    /// Open the input relay.
    OpenInputRelay,
    /// Calibrate the RC feedback baseline.
    RcBaseline,
    /// Calibrate RC feedback events.
    RcEvent,
    /// Test external memory.
    CheckMemory,
    /// Copy external memory into the history buffer.
    ReadMemory,
    /// Reset the DSP.
    Reset,
    /// Freeze the baseline history buffer.
    BaselineHistory,
}

/// Recommended buffer length and timing of a control task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskParams {
    /// Number of data words produced.
    pub length: usize,
    /// Wait before the first poll.
    pub initial_wait: Duration,
    /// Interval between polls.
    pub poll: Duration,
}

impl TaskParams {
    fn new(length: usize, initial_wait_ms: f64, poll_ms: f64) -> Self {
        Self {
            length,
            initial_wait: Duration::from_secs_f64(initial_wait_ms / 1000.0),
            poll: Duration::from_secs_f64(poll_ms / 1000.0),
        }
    }
}

impl ControlTask {
    /// `WHICHTEST` code of the task, `None` for tasks that do not start a run.
    #[must_use]
    pub const fn whichtest(self) -> Option<u16> {
        match self {
            ControlTask::SetAscDac => Some(0),
            ControlTask::AcquireAdc => Some(1),
            ControlTask::TrackingDac => Some(2),
            ControlTask::SlopeCalibration => Some(3),
            ControlTask::SleepDsp => Some(6),
            ControlTask::ProgramFippi => Some(11),
            ControlTask::SetPolarity => Some(12),
            ControlTask::CloseInputRelay => Some(13),
            ControlTask::OpenInputRelay => Some(14),
            ControlTask::RcBaseline => Some(15),
            ControlTask::RcEvent => Some(16),
            ControlTask::CheckMemory => Some(20),
            ControlTask::ReadMemory => Some(21),
            ControlTask::Reset => Some(99),
            ControlTask::BaselineHistory => None,
        }
    }

    const fn required_info(self) -> usize {
        match self {
            ControlTask::AcquireAdc => 2,
            ControlTask::ReadMemory => 4,
            _ => 1,
        }
    }

    const fn stops_baseline(self) -> bool {
        matches!(
            self,
            ControlTask::AcquireAdc
                | ControlTask::BaselineHistory
                | ControlTask::ReadMemory
                | ControlTask::CheckMemory
        )
    }
}

/// Rotates a circular buffer so that index 0 holds the oldest sample.
///
/// `offset` is the position the DSP writes next. An offset of zero, or a multiple of the buffer
/// length, leaves the buffer as is.
pub fn rotate_history<T>(buffer: &mut [T], offset: usize) {
    if buffer.is_empty() {
        return;
    }
    let offset = offset % buffer.len();
    buffer.rotate_left(offset);
}

impl Dsp<'_> {
    /// Starts `task` with the task specific `info`.
    pub fn begin_control_task(
        &mut self,
        task: ControlTask,
        info: &[i32],
    ) -> Result<(), DXPDriverError> {
        let required = task.required_info();
        if info.len() < required {
            return Err(DXPDriverError::InvalidInfoLength {
                task,
                len: info.len(),
                required,
            });
        }
        tracing::debug!("channel {}: begin {:?} {:?}", self.channel(), task, info);

        let mut tasks = self.read_param("RUNTASKS")?;
        if task.whichtest().is_some() {
            tasks |= runtasks::CONTROL_TASK;
        }
        if task.stops_baseline() {
            tasks |= runtasks::STOP_BASELINE;
        }
        self.write_param("RUNTASKS", tasks)?;

        match task {
            ControlTask::AcquireAdc => {
                self.write_value("TRACEWAIT", info[1] as f64)?;
            }
            ControlTask::ReadMemory => {
                ["EXTPAGE", "EXTADDRESS", "EXTLENGTH"]
                    .into_iter()
                    .zip(&info[1..4])
                    .filter(|(_, v)| **v != -1)
                    .try_for_each(|(name, &v)| self.write_value(name, v as f64).map(|_| ()))?;
            }
            _ => {}
        }

        if let Some(code) = task.whichtest() {
            self.write_param("WHICHTEST", code)?;
            self.begin_run(false, false)?;
        }
        Ok(())
    }

    /// Ends the active control task.
    pub fn end_control_task(&mut self) -> Result<(), DXPDriverError> {
        tracing::debug!("channel {}: end control task", self.channel());
        self.end_run()?;
        let tasks = self.read_param("RUNTASKS")?;
        self.write_param(
            "RUNTASKS",
            tasks & !(runtasks::CONTROL_TASK | runtasks::STOP_BASELINE),
        )?;
        Ok(())
    }

    /// Recommended data length and timing of `task`.
    pub fn control_task_params(&mut self, task: ControlTask) -> Result<TaskParams, DXPDriverError> {
        Ok(match task {
            ControlTask::AcquireAdc => TaskParams::new(self.read_param("HSTLEN")? as usize, 4.0, 1.0),
            ControlTask::TrackingDac => TaskParams::new(1, 10.0, 1.0),
            ControlTask::BaselineHistory => TaskParams::new(self.read_param("HSTLEN")? as usize, 0.0, 0.0),
            ControlTask::ReadMemory => {
                let len = self.read_param("HSTLEN")? as usize;
                TaskParams::new(len, 0.0005 * len as f64, 1.0)
            }
            _ => TaskParams::new(0, 0.0, 0.0),
        })
    }

    /// Reads the data produced by `task`.
    pub fn control_task_data(&mut self, task: ControlTask) -> Result<Vec<i32>, DXPDriverError> {
        let len = self.read_param("HSTLEN")? as usize;
        match task {
            ControlTask::AcquireAdc => Ok(self
                .read_buffer("HSTSTART", len)?
                .into_iter()
                .map(i32::from)
                .collect()),
            ControlTask::ReadMemory => {
                let n = (self.read_param("EXTLENGTH")? as usize).min(len);
                Ok(self
                    .read_buffer("HSTSTART", n)?
                    .into_iter()
                    .map(i32::from)
                    .collect())
            }
            ControlTask::BaselineHistory => {
                let start = self.read_param("HSTSTART")?;
                let circular = self.read_param("CIRCULAR")?;
                let mut history = self.read_buffer("HSTSTART", len)?;
                rotate_history(&mut history, circular.wrapping_sub(start) as usize);
                Ok(history.into_iter().map(|w| i32::from(w as i16)).collect())
            }
            _ => Err(DXPDriverError::NotSupported(format!("{task:?} data"))),
        }
    }

    /// Runs `task` to completion: begin, wait for `BUSY` to report done, end.
    pub fn run_control_task(
        &mut self,
        task: ControlTask,
        info: &[i32],
        poll: Duration,
        timeout: Duration,
    ) -> Result<(), DXPDriverError> {
        self.begin_control_task(task, info)?;
        let result = self.wait_for_busy(busy::DONE, poll, timeout);
        self.end_control_task()?;
        result
    }
}
