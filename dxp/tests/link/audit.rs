use dxp::{
    link::{Audit, AuditOption},
    prelude::*,
};

use crate::{builder, create_controller};

#[test]
fn audit_test() -> anyhow::Result<()> {
    let mut cnt = create_controller(2)?;
    let gap_time = cnt.get_value(0, "gap_time")?;

    cnt.link_mut().break_down();
    assert_eq!(
        Err(DXPDriverError::Link(LinkError::new("broken".to_owned()))),
        cnt.set_value(0, "gap_time", 0.3)
    );
    assert_eq!(gap_time, cnt.get_value(0, "gap_time")?);

    cnt.link_mut().repair();
    approx::assert_abs_diff_eq!(2.4, cnt.set_value(0, "gap_time", 0.3)?, epsilon = 1e-9);

    cnt.close()?;
    Ok(())
}

#[test]
fn broken_on_open() -> anyhow::Result<()> {
    assert_eq!(
        Some(DXPDriverError::Link(LinkError::new("broken".to_owned()))),
        builder(1)?
            .open(Audit::new(AuditOption { broken: true }))
            .err()
    );
    Ok(())
}
