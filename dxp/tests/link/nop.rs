use dxp::prelude::*;
use dxp_firmware_emulator::firmware;

use crate::NoSleep;

#[test]
fn nop_test() -> anyhow::Result<()> {
    let mut cnt = ControllerBuilder::new(firmware::firmware_set()?, firmware::source())
        .with_param_defaults(firmware::PARAM_DEFAULTS)
        .with_sleeper(NoSleep)
        .add_channel(Detector::default(), Defaults::with_builtin())
        .open(Nop::new())?;

    assert!(cnt.link().is_open());
    assert_eq!(2.0, cnt.get_value(0, "preamp_gain")?);

    cnt.start_run(false)?;
    assert!(cnt.run_active(0)?);
    cnt.stop_run()?;

    assert!(cnt.link_mut().close().is_ok());
    assert!(!cnt.link().is_open());
    cnt.close()?;
    Ok(())
}
