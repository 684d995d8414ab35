use dxp::{core::register::Register, link::Audit, prelude::*};
use rand::Rng;

use crate::builder;

fn data_reads(cnt: &Controller<Audit>) -> usize {
    cnt.link()
        .calls()
        .iter()
        .filter(|c| c.reg == Register::Data && !c.write)
        .count()
}

#[rstest::rstest]
#[case(4096, 0)]
#[case(4096, 2048)]
#[case(1000, 64)]
#[case(8192, 1000)]
#[case(7, 3)]
#[case(1, 1)]
fn mca_read_in_blocks(#[case] bins: usize, #[case] max_block: usize) -> anyhow::Result<()> {
    let mut cnt = builder(1)?
        .with_option(DriverOption {
            max_block,
            ..Default::default()
        })
        .open(Audit::new(Default::default()))?;
    cnt.set_value(0, "number_mca_channels", bins as f64)?;

    let mut rng = rand::rng();
    let spectrum = (0..bins)
        .map(|_| rng.random_range(0..=u32::MAX))
        .collect::<Vec<_>>();
    cnt.link_mut()[0].set_spectrum(&spectrum);
    cnt.link_mut().clear_calls();

    assert_eq!(RunData::Mca(spectrum), cnt.get_run_data(0, "mca")?);

    let blocks = if max_block == 0 {
        1
    } else {
        (2 * bins).div_ceil(max_block)
    };
    assert_eq!(3 + blocks, data_reads(&cnt));
    Ok(())
}
