use itertools::Itertools;

use crate::error::DXPDriverError;

use super::Acquisition;

const TICK_CYCLES: f64 = 16.0;
const NO_RATE: f64 = -999.0;

/// Data read back from a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum RunData {
    /// A single number.
    Value(f64),
    /// MCA spectrum, one count per bin.
    Mca(Vec<u32>),
    /// Baseline histogram.
    Baseline(Vec<u16>),
    /// One count per SCA.
    Sca(Vec<u32>),
    /// ADC trace or baseline history samples.
    Trace(Vec<i32>),
}

impl RunData {
    /// The number, for [`RunData::Value`].
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            RunData::Value(v) => Some(*v),
            _ => None,
        }
    }
}

fn combine(words: &[u16]) -> Vec<u32> {
    words
        .iter()
        .tuples()
        .map(|(&lo, &hi)| lo as u32 | (hi as u32) << 16)
        .collect()
}

fn rate(count: f64, time: f64) -> f64 {
    if time > 0.0 {
        count / time
    } else {
        NO_RATE
    }
}

impl Acquisition<'_> {
    fn seconds(&mut self, ticks: &str) -> Result<f64, DXPDriverError> {
        let clock = self.dsp.clock_mhz();
        Ok(self.dsp.read_symbol(ticks)? * TICK_CYCLES * 1e-6 / clock)
    }

    fn mca_length(&mut self) -> Result<usize, DXPDriverError> {
        let lo = self.dsp.read_param("MCALIMLO")?;
        let hi = self.dsp.read_param("MCALIMHI")?;
        Ok(hi.saturating_sub(lo) as usize)
    }

    /// Reads the run data `name`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn run_data(&mut self, name: &str) -> Result<RunData, DXPDriverError> {
        let value = match name {
            "mca" => {
                let len = self.mca_length()?;
                let start = self.dsp.read_param("SPECTSTART")?;
                let mut words = vec![0; 2 * len];
                self.dsp.read_memory(start, &mut words)?;
                return Ok(RunData::Mca(combine(&words)));
            }
            "mca_length" => self.mca_length()? as f64,
            "livetime" => self.seconds("LIVETIME")?,
            "runtime" => self.seconds("REALTIME")?,
            "input_count_rate" => {
                let triggers = self.dsp.read_symbol("FASTPEAKS")?;
                rate(triggers, self.seconds("LIVETIME")?)
            }
            "output_count_rate" => {
                let events = ["EVTSINRUN", "UNDRFLOWS", "OVERFLOWS"].into_iter().try_fold(
                    0.0,
                    |acc, n| Ok::<_, DXPDriverError>(acc + self.dsp.read_symbol(n)?),
                )?;
                rate(events, self.seconds("REALTIME")?)
            }
            "events_in_run" => self.dsp.read_symbol("EVTSINRUN")?,
            "triggers" => self.dsp.read_symbol("FASTPEAKS")?,
            "underflows" => self.dsp.read_symbol("UNDRFLOWS")?,
            "overflows" => self.dsp.read_symbol("OVERFLOWS")?,
            "baseline_events" => self.dsp.read_symbol("BASEEVTS")?,
            "baseline" => {
                let len = self.dsp.read_param("BASELEN")? as usize;
                return Ok(RunData::Baseline(self.dsp.read_buffer("BASESTART", len)?));
            }
            "baseline_length" => self.dsp.read_param("BASELEN")? as f64,
            "run_active" => {
                if self.dsp.run_active()? {
                    1.0
                } else {
                    0.0
                }
            }
            "sca" => {
                let len = self.state.sca().len();
                let words = self.dsp.read_buffer("SCADSTART", 2 * len)?;
                return Ok(RunData::Sca(combine(&words)));
            }
            "sca_length" => self.state.sca().len() as f64,
            _ => return Err(DXPDriverError::UnknownRunData(name.to_string())),
        };
        Ok(RunData::Value(value))
    }
}
