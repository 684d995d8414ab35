use crate::create_controller;

#[rstest::rstest]
#[case(12.0, "peaking_time", 12.3)]
#[case(16.0, "peaking_time", 16.0)]
#[case(2.4, "gap_time", 0.5)]
#[case(4.0, "gap_time", 3.3)]
#[case(0.2, "trigger_peaking_time", 0.21)]
#[case(1000.0, "number_mca_channels", 1000.4)]
#[case(140.0, "mca_low_limit", 130.0)]
#[case(3.0, "number_of_scas", 2.6)]
fn achieved_value_is_stable(
    #[case] expect: f64,
    #[case] name: &str,
    #[case] requested: f64,
) -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;

    let achieved = cnt.set_value(0, name, requested)?;
    approx::assert_abs_diff_eq!(expect, achieved, epsilon = 1e-9);
    approx::assert_abs_diff_eq!(achieved, cnt.get_value(0, name)?, epsilon = 1e-9);

    let again = cnt.set_value(0, name, achieved)?;
    approx::assert_abs_diff_eq!(achieved, again, epsilon = 1e-9);
    Ok(())
}

#[test]
fn user_setup_keeps_values() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    cnt.set_value(0, "peaking_time", 12.3)?;
    cnt.set_value(0, "gap_time", 0.5)?;
    let symbols = ["SLOWLEN", "SLOWGAP", "PEAKINT", "PEAKSAM", "MCALIMHI"]
        .map(|name| cnt.link()[0].symbol(name));

    cnt.user_setup(0)?;

    assert_eq!(
        symbols,
        ["SLOWLEN", "SLOWGAP", "PEAKINT", "PEAKSAM", "MCALIMHI"]
            .map(|name| cnt.link()[0].symbol(name))
    );
    approx::assert_abs_diff_eq!(12.0, cnt.get_value(0, "peaking_time")?, epsilon = 1e-9);
    Ok(())
}
