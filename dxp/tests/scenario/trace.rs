use dxp::prelude::*;

use crate::create_controller;

#[test]
fn adc_trace_at_minimum_spacing() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;

    cnt.do_special_run(0, "adc_trace", &[1024.0, 50.0])?;
    assert_eq!(Some(0), cnt.link()[0].symbol("TRACEWAIT"));
    assert_eq!(
        Some(1024.0),
        cnt.get_special_run_data(0, "adc_trace_length")?.value()
    );

    let RunData::Trace(trace) = cnt.get_special_run_data(0, "adc_trace")? else {
        anyhow::bail!("not a trace");
    };
    assert_eq!(1024, trace.len());
    assert_eq!(0x0800, trace[0]);
    assert_eq!(0x0825, trace[1]);
    assert_eq!(None, cnt[0].state().special_run());
    Ok(())
}

#[test]
fn adc_trace_below_minimum_spacing() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    cnt.do_special_run(0, "adc_trace", &[1024.0, 10.0])?;
    assert_eq!(Some(0), cnt.link()[0].symbol("TRACEWAIT"));
    cnt.do_special_run(0, "end_special_run", &[])?;
    Ok(())
}

#[test]
fn adc_trace_requires_info() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    assert!(matches!(
        cnt.do_special_run(0, "adc_trace", &[1024.0]),
        Err(DXPDriverError::InvalidInfoLength { len: 1, required: 2, .. })
    ));
    Ok(())
}

#[test]
fn unknown_special_run() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    assert_eq!(
        Err(DXPDriverError::UnknownSpecialRun("calibrate".to_string())),
        cnt.do_special_run(0, "calibrate", &[])
    );
    Ok(())
}

#[test]
fn board_operation() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    assert_eq!(40.0, cnt.board_operation(0, "get_clock_speed")?);
    assert_eq!(
        Err(DXPDriverError::UnknownBoardOperation("reboot".to_string())),
        cnt.board_operation(0, "reboot")
    );
    Ok(())
}
