use dxp::{
    driver::acquisition::{GainInputs, GAIN_DB_MIN},
    prelude::*,
};

use crate::create_controller;

fn expected_gaindac(adc_percent_rule: f64, preamp_gain: f64) -> anyhow::Result<u16> {
    Ok(GainInputs {
        adc_percent_rule,
        calibration_energy: 5900.0,
        preamp_gain,
        mca_bin_width: 20.0,
        slowlen: 20.0,
        gain_scale: 1.0,
    }
    .gaindac()?)
}

#[test]
fn initial_gain() -> anyhow::Result<()> {
    let cnt = create_controller(1)?;
    assert_eq!(
        Some(expected_gaindac(5.0, 1.0)?),
        cnt.link()[0].symbol("GAINDAC")
    );
    Ok(())
}

#[test]
fn preamp_gain_out_of_range() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    assert_eq!(2.0, cnt.set_value(0, "preamp_gain", 2.0)?);
    let gaindac = cnt.link()[0].symbol("GAINDAC");
    assert_eq!(Some(expected_gaindac(5.0, 2.0)?), gaindac);

    assert!(matches!(
        cnt.set_value(0, "preamp_gain", 1000.0),
        Err(DXPDriverError::GainOutOfRange(db)) if db < GAIN_DB_MIN
    ));
    assert_eq!(gaindac, cnt.link()[0].symbol("GAINDAC"));
    assert_eq!(2.0, cnt[0].detector().gain);
    assert_eq!(2.0, cnt.get_value(0, "preamp_gain")?);
    Ok(())
}

#[test]
fn gain_change() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;

    cnt.gain_change(0, 2.0)?;
    assert_eq!(10.0, cnt.get_value(0, "adc_percent_rule")?);
    assert_eq!(
        Some(expected_gaindac(10.0, 1.0)?),
        cnt.link()[0].symbol("GAINDAC")
    );

    let gaindac = cnt.link()[0].symbol("GAINDAC");
    assert!(matches!(
        cnt.gain_change(0, 100.0),
        Err(DXPDriverError::GainOutOfRange(_))
    ));
    assert_eq!(10.0, cnt.get_value(0, "adc_percent_rule")?);
    assert_eq!(gaindac, cnt.link()[0].symbol("GAINDAC"));
    Ok(())
}

#[test]
fn gain_calibrate() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;

    cnt.gain_calibrate(0, 2.0)?;
    assert_eq!(0.5, cnt[0].detector().gain);
    assert_eq!(0.5, cnt.get_value(0, "preamp_gain")?);
    assert_eq!(
        Some(expected_gaindac(5.0, 0.5)?),
        cnt.link()[0].symbol("GAINDAC")
    );

    assert!(matches!(
        cnt.gain_calibrate(0, 0.0),
        Err(DXPDriverError::InvalidValue { .. })
    ));
    assert_eq!(0.5, cnt[0].detector().gain);
    Ok(())
}
