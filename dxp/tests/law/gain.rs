use dxp::{
    driver::acquisition::{GainInputs, GAIN_DB_MAX, GAIN_DB_MIN},
    prelude::*,
};

use crate::create_controller;

fn inputs(preamp_gain: f64) -> GainInputs {
    GainInputs {
        adc_percent_rule: 5.0,
        calibration_energy: 5900.0,
        preamp_gain,
        mca_bin_width: 20.0,
        slowlen: 20.0,
        gain_scale: 1.0,
    }
}

#[rstest::rstest]
#[case(0.5)]
#[case(1.0)]
#[case(1.5)]
#[case(3.0)]
#[case(8.0)]
fn gaindac_follows_required_gain(#[case] preamp_gain: f64) -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    let inputs = inputs(preamp_gain);
    let db = inputs.gain_db();
    assert!((GAIN_DB_MIN..=GAIN_DB_MAX).contains(&db));

    cnt.set_value(0, "preamp_gain", preamp_gain)?;

    let gaindac = cnt.link()[0].symbol("GAINDAC").unwrap_or_default();
    assert_eq!(inputs.gaindac()?, gaindac);
    approx::assert_abs_diff_eq!(
        db,
        gaindac as f64 * 40.0 / 65536.0 - 10.0,
        epsilon = 40.0 / 65536.0
    );
    Ok(())
}

#[test]
fn higher_preamp_gain_lowers_gaindac() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    let gaindac = [0.5, 1.0, 2.0, 4.0]
        .into_iter()
        .map(|g| {
            cnt.set_value(0, "preamp_gain", g)?;
            Ok(cnt.link()[0].symbol("GAINDAC").unwrap_or_default())
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    assert!(gaindac.windows(2).all(|w| w[0] > w[1]));
    Ok(())
}

#[test]
fn out_of_range_gain() {
    assert!(inputs(1000.0).gaindac().is_err());
    assert!(inputs(0.001).gaindac().is_err());
}

#[rstest::rstest]
#[case("adc_percent_rule", 0.1)]
#[case("adc_percent_rule", 500.0)]
#[case("calibration_energy", 100.0)]
#[case("calibration_energy", 500000.0)]
fn out_of_range_cascade_keeps_gaindac(
    #[case] name: &str,
    #[case] value: f64,
) -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    let previous = cnt.get_value(0, name)?;
    let gaindac = cnt.link()[0].symbol("GAINDAC");

    assert!(matches!(
        cnt.set_value(0, name, value),
        Err(DXPDriverError::GainOutOfRange(_))
    ));
    assert_eq!(gaindac, cnt.link()[0].symbol("GAINDAC"));
    assert_eq!(previous, cnt.get_value(0, name)?);
    Ok(())
}
