use dxp::{
    core::{defined::busy, register::ControlStatus},
    prelude::*,
};

use crate::create_controller;

fn spectrum(len: usize) -> Vec<u32> {
    (0..len as u32).map(|i| i * 3 + 0x0001_0000).collect()
}

#[test]
fn timeout_keeps_run_unconfirmed() -> anyhow::Result<()> {
    let mut cnt = create_controller(2)?;
    cnt.link_mut()[1].freeze_busy(Some(busy::IDLE));

    assert_eq!(Err(DXPDriverError::RunStartTimeout(1)), cnt.start_run(false));
    assert!(cnt.iter().all(|c| c.state().erased()));
    assert!(cnt.iter().all(|c| !c.state().acquiring()));

    cnt.link_mut()[1].freeze_busy(None);
    cnt.stop_run()?;
    cnt.start_run(false)?;
    assert!(cnt.iter().all(|c| c.state().acquiring()));
    assert!(cnt.run_active(0)? && cnt.run_active(1)?);
    Ok(())
}

#[test]
fn resume_keeps_spectrum() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    let data = spectrum(4096);

    cnt.start_run(false)?;
    cnt.stop_run()?;
    cnt.link_mut()[0].set_spectrum(&data);

    cnt.start_run(true)?;
    assert!(!cnt[0].state().erased());
    cnt.stop_run()?;
    assert_eq!(RunData::Mca(data), cnt.get_run_data(0, "mca")?);

    cnt.start_run(false)?;
    assert!(cnt[0].state().erased());
    cnt.stop_run()?;
    assert_eq!(RunData::Mca(vec![0; 4096]), cnt.get_run_data(0, "mca")?);
    Ok(())
}

#[test]
fn gate() -> anyhow::Result<()> {
    let mut cnt = create_controller(2)?;

    cnt.start_run(false)?;
    assert!(cnt.link().csr().contains(ControlStatus::IGNOREGATE));
    cnt.stop_run()?;

    cnt.set_value(1, "enable_gate", 1.0)?;
    cnt.start_run(false)?;
    assert!(!cnt.link().csr().contains(ControlStatus::IGNOREGATE));
    cnt.stop_run()?;
    Ok(())
}

#[test]
fn run_active() -> anyhow::Result<()> {
    let mut cnt = create_controller(1)?;
    assert_eq!(Some(0.0), cnt.get_run_data(0, "run_active")?.value());

    cnt.start_run(false)?;
    assert!(cnt.run_active(0)?);
    assert_eq!(Some(1.0), cnt.get_run_data(0, "run_active")?.value());

    cnt.stop_run()?;
    assert!(!cnt.run_active(0)?);
    Ok(())
}
