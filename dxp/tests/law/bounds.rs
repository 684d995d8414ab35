use dxp::{core::register::Register, prelude::*};

use crate::create_controller;

const FILTER: [&str; 4] = ["SLOWLEN", "SLOWGAP", "PEAKINT", "PEAKSAM"];

#[rstest::rstest]
#[case(DXPDriverError::SlowGapOutOfRange(38.0), "gap_time", 30.0)]
#[case(DXPDriverError::FilterSumOutOfRange { length: 20.0, gap: 13.0 }, "gap_time", 10.0)]
#[case(DXPDriverError::FastLengthOutOfRange(29.0), "trigger_peaking_time", 0.725)]
#[case(DXPDriverError::BinsOutOfRange(9000.0), "number_mca_channels", 9000.0)]
#[case(DXPDriverError::ScaOutOfRange { index: 17, count: 16 }, "number_of_scas", 17.0)]
#[case(DXPDriverError::InvalidValue { name: "gap_time".to_string(), value: -1.0 }, "gap_time", -1.0)]
fn rejected_without_side_effect(
    #[case] expect: DXPDriverError,
    #[case] name: &str,
    #[case] value: f64,
) -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    let previous = cnt.get_value(0, name).ok();
    let filter = FILTER.map(|n| cnt.link()[0].symbol(n));
    cnt.link_mut().clear_calls();

    assert_eq!(Err(expect), cnt.set_value(0, name, value));

    assert_eq!(previous, cnt.get_value(0, name).ok());
    assert_eq!(filter, FILTER.map(|n| cnt.link()[0].symbol(n)));
    assert!(cnt
        .link()
        .calls()
        .iter()
        .filter(|c| c.reg == Register::Data)
        .all(|c| !c.write));
    Ok(())
}

#[test]
fn peaking_time_without_firmware() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    assert!(matches!(
        cnt.set_value(0, "peaking_time", 30.0),
        Err(DXPDriverError::Parse(_))
    ));
    assert_eq!(16.0, cnt.get_value(0, "peaking_time")?);
    assert_eq!(Some(20), cnt.link()[0].symbol("SLOWLEN"));
    Ok(())
}
