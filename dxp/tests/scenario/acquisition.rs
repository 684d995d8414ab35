use dxp::prelude::*;

use crate::create_controller;

#[test]
fn number_mca_channels() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;

    assert_eq!(4096.0, cnt.set_value(0, "number_mca_channels", 4096.0)?);
    assert_eq!(Some(4096), cnt.link()[0].symbol("MCALIMHI"));
    assert_eq!(4096.0, cnt.get_value(0, "number_mca_channels")?);
    assert_eq!(Some(4096.0), cnt.get_run_data(0, "mca_length")?.value());

    assert_eq!(2048.0, cnt.set_value(0, "number_mca_channels", 2048.0)?);
    assert_eq!(Some(2048), cnt.link()[0].symbol("MCALIMHI"));
    Ok(())
}

#[test]
fn rejected_value_keeps_stored_value() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;

    assert_eq!(
        Err(DXPDriverError::BinsOutOfRange(100000.0)),
        cnt.set_value(0, "number_mca_channels", 100000.0)
    );
    assert_eq!(4096.0, cnt.get_value(0, "number_mca_channels")?);
    assert_eq!(Some(4096), cnt.link()[0].symbol("MCALIMHI"));
    Ok(())
}

#[test]
fn unknown_value() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;

    assert_eq!(
        Err(DXPDriverError::UnknownValue("shaping_time".to_string())),
        cnt.set_value(0, "shaping_time", 1.0)
    );
    assert_eq!(
        Err(DXPDriverError::UnknownValue("shaping_time".to_string())),
        cnt.get_value(0, "shaping_time")
    );
    Ok(())
}

#[test]
fn remove_value() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;

    assert_eq!(
        Err(DXPDriverError::RequiredValue("peaking_time".to_string())),
        cnt.remove_value(0, "peaking_time")
    );

    cnt.set_value(0, "number_of_scas", 2.0)?;
    assert_eq!(2.0, cnt.remove_value(0, "number_of_scas")?);
    assert_eq!(
        Err(DXPDriverError::UnknownValue("number_of_scas".to_string())),
        cnt.get_value(0, "number_of_scas")
    );
    Ok(())
}
