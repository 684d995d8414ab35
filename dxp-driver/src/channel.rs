use dxp_core::{firmware::DspImage, symbol::SymbolTable};
use getset::{CopyGetters, Getters};

use crate::{
    acquisition::{registry::can_remove_name, Acquisition, Context, Defaults},
    detector::Detector,
    engine::{Dsp, RegisterIo},
    error::DXPDriverError,
    run::ControlTask,
};

/// Lower and upper bin of a single channel analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaWindow {
    /// Lower bin.
    pub lo: u16,
    /// Upper bin.
    pub hi: u16,
}

/// Host side bookkeeping of a channel.
#[derive(Debug, Clone, Default, PartialEq, Getters, CopyGetters)]
pub struct ChannelState {
    #[getset(get = "pub")]
    /// Name of the loaded DSP image.
    dsp_file: Option<String>,
    #[getset(get = "pub")]
    /// Name of the loaded FiPPI image.
    fippi_file: Option<String>,
    #[getset(get = "pub")]
    /// SCA windows.
    sca: Vec<ScaWindow>,
    #[getset(get_copy = "pub")]
    /// The spectrum was cleared by the last run start.
    erased: bool,
    #[getset(get_copy = "pub")]
    /// A run is confirmed running.
    acquiring: bool,
    #[getset(get_copy = "pub")]
    /// Control task started as a special run.
    special_run: Option<ControlTask>,
}

impl ChannelState {
    pub(crate) fn set_dsp_file(&mut self, name: Option<String>) {
        self.dsp_file = name;
    }

    pub(crate) fn set_fippi_file(&mut self, name: Option<String>) {
        self.fippi_file = name;
    }

    pub(crate) fn sca_mut(&mut self) -> &mut Vec<ScaWindow> {
        &mut self.sca
    }

    /// Records a run start request. The run is not confirmed until [`Self::confirm_run`].
    pub fn request_run(&mut self, resume: bool) {
        self.erased = !resume;
        self.acquiring = false;
    }

    /// Records that the hardware reported the run as started.
    pub fn confirm_run(&mut self) {
        self.acquiring = true;
    }

    /// Records that the run has stopped.
    pub fn stop_run(&mut self) {
        self.acquiring = false;
    }

    pub(crate) fn set_special_run(&mut self, task: Option<ControlTask>) {
        self.special_run = task;
    }
}

/// A logical channel: its program, acquisition values and detector.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct Channel {
    #[getset(get_copy = "pub")]
    /// Channel index on the module.
    index: u8,
    #[getset(get = "pub")]
    /// Symbol table of the loaded DSP program.
    symbols: Option<SymbolTable>,
    #[getset(get = "pub")]
    /// Current acquisition values.
    defaults: Defaults,
    #[getset(get = "pub")]
    /// The attached detector.
    detector: Detector,
    #[getset(get = "pub")]
    /// Host side bookkeeping.
    state: ChannelState,
}

impl Channel {
    /// Creates a new [`Channel`] without a loaded program.
    #[must_use]
    pub fn new(index: u8, defaults: Defaults, detector: Detector) -> Self {
        Self {
            index,
            symbols: None,
            defaults,
            detector,
            state: ChannelState::default(),
        }
    }

    /// Mutable access to the acquisition values.
    pub fn defaults_mut(&mut self) -> &mut Defaults {
        &mut self.defaults
    }

    /// Mutable access to the detector.
    pub fn detector_mut(&mut self) -> &mut Detector {
        &mut self.detector
    }

    /// Mutable access to the host side bookkeeping.
    pub fn state_mut(&mut self) -> &mut ChannelState {
        &mut self.state
    }

    /// Replaces the symbol table after a program download.
    pub fn load_symbols(&mut self, symbols: SymbolTable) {
        self.symbols = Some(symbols);
    }

    /// Removes `name` from the acquisition values. Values required before a run cannot be removed.
    pub fn remove_value(&mut self, name: &str) -> Result<f64, DXPDriverError> {
        if !can_remove_name(name) {
            return Err(DXPDriverError::RequiredValue(name.to_string()));
        }
        self.defaults
            .remove(name)
            .ok_or_else(|| DXPDriverError::UnknownValue(name.to_string()))
    }

    /// Downloads the program of `image` and replaces the symbol table.
    ///
    /// Nothing is sent if an image with the same name is already loaded. Returns whether the
    /// program was downloaded.
    pub fn download_dsp(
        &mut self,
        mut io: RegisterIo<'_>,
        ctx: Context<'_>,
        image: DspImage,
    ) -> Result<bool, DXPDriverError> {
        if self.state.dsp_file().as_deref() == Some(image.filename().as_str()) {
            tracing::debug!("channel {}: {} is already loaded", self.index, image.filename());
            return Ok(false);
        }
        self.state.set_dsp_file(None);
        Dsp::new(io.reborrow(), image.symbols(), self.index, ctx.option, ctx.sleeper)
            .download_dsp(image.program())?;
        self.state.set_dsp_file(Some(image.filename().clone()));
        self.symbols = Some(image.into_symbols());
        Ok(true)
    }

    /// Downloads firmware of `kind` for the current peaking time, even if it is already loaded.
    ///
    /// `kind` is `"dsp"` or `"fippi"`. After a DSP download the parameter memory is reset and the
    /// acquisition values have to be applied again.
    #[tracing::instrument(level = "debug", skip(self, io, ctx))]
    pub fn download_firmware(
        &mut self,
        mut io: RegisterIo<'_>,
        ctx: Context<'_>,
        kind: &str,
    ) -> Result<(), DXPDriverError> {
        match kind {
            "dsp" => {
                let peaking_time = self.defaults.require("peaking_time")?;
                let selected = ctx.firmware.select(peaking_time)?;
                let image = ctx.source.dsp(&selected.record.dsp)?;
                self.state.set_dsp_file(None);
                self.download_dsp(io.reborrow(), ctx, image).map(|_| ())
            }
            "fippi" => {
                self.state.set_fippi_file(None);
                self.acquisition(io.reborrow(), ctx)?.load_fippi()
            }
            "user_fippi" | "mmu" => Err(DXPDriverError::NotSupported(kind.to_string())),
            _ => Err(DXPDriverError::UnknownFirmware(kind.to_string())),
        }
    }

    /// The symbol table, or [`DXPDriverError::NoSymbolTable`] before the first download.
    pub fn require_symbols(&self) -> Result<&SymbolTable, DXPDriverError> {
        self.symbols
            .as_ref()
            .ok_or(DXPDriverError::NoSymbolTable(self.index))
    }

    /// Named access to the DSP of this channel.
    pub fn dsp<'a>(
        &'a self,
        io: RegisterIo<'a>,
        ctx: Context<'a>,
    ) -> Result<Dsp<'a>, DXPDriverError> {
        Ok(Dsp::new(
            io,
            self.require_symbols()?,
            self.index,
            ctx.option,
            ctx.sleeper,
        ))
    }

    /// Acquisition value access for this channel.
    pub fn acquisition<'a>(
        &'a mut self,
        io: RegisterIo<'a>,
        ctx: Context<'a>,
    ) -> Result<Acquisition<'a>, DXPDriverError> {
        let symbols = self
            .symbols
            .as_ref()
            .ok_or(DXPDriverError::NoSymbolTable(self.index))?;
        Ok(Acquisition::new(
            Dsp::new(io, symbols, self.index, ctx.option, ctx.sleeper),
            &mut self.defaults,
            &mut self.detector,
            &mut self.state,
            ctx,
        ))
    }
}
