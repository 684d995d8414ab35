use dxp_core::defined::MAX_MCA_CHANNELS;

use crate::error::DXPDriverError;

use super::Acquisition;

pub(super) fn bin_width(acq: &mut Acquisition<'_>, width: f64) -> Result<f64, DXPDriverError> {
    if !(width.is_finite() && width > 0.0) {
        return Err(DXPDriverError::InvalidValue {
            name: "mca_bin_width".to_string(),
            value: width,
        });
    }
    let ev_per_adc = acq.ev_per_adc()?;
    let slowlen = acq.dsp.read_param("SLOWLEN")? as f64;
    acq.dsp
        .write_value("BINFACT1", (width / ev_per_adc) * slowlen * 4.0)?;
    Ok(width)
}

pub(super) fn number_of_bins(acq: &mut Acquisition<'_>, bins: f64) -> Result<f64, DXPDriverError> {
    if !(0.0..=MAX_MCA_CHANNELS).contains(&bins) {
        return Err(DXPDriverError::BinsOutOfRange(bins));
    }
    Ok(acq.dsp.write_value("MCALIMHI", bins)? as f64)
}

pub(super) fn low_limit(acq: &mut Acquisition<'_>, energy: f64) -> Result<f64, DXPDriverError> {
    if !(energy.is_finite() && energy >= 0.0) {
        return Err(DXPDriverError::InvalidValue {
            name: "mca_low_limit".to_string(),
            value: energy,
        });
    }
    let width = acq.defaults.require("mca_bin_width")?;
    let low = (energy / width).round();
    let high = acq.dsp.read_param("MCALIMHI")? as f64;
    if low > high - 1.0 {
        return Err(DXPDriverError::BinsOutOfRange(low));
    }
    Ok(acq.dsp.write_value("MCALIMLO", low)? as f64 * width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::tests::Fixture;

    #[rstest::rstest]
    #[case(4096, 4096.0)]
    #[case(2000, 2000.4)]
    #[case(0, 0.0)]
    #[case(8192, 8192.0)]
    fn mca_bins(#[case] expect: u16, #[case] bins: f64) -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        let achieved = fx.with(|acq| acq.set_value("number_mca_channels", bins))?;
        assert_eq!(expect as f64, achieved);
        assert_eq!(Some(expect), fx.symbol("MCALIMHI"));
        Ok(())
    }

    #[rstest::rstest]
    #[case(-1.0)]
    #[case(8192.5)]
    #[case(f64::NAN)]
    fn bins_out_of_range(#[case] bins: f64) -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        assert!(matches!(
            fx.with(|acq| acq.set_value("number_mca_channels", bins)),
            Err(DXPDriverError::BinsOutOfRange(_))
        ));
        Ok(())
    }

    #[test]
    fn bin_width() -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        assert_eq!(20.0, fx.with(|acq| acq.set_value("mca_bin_width", 20.0))?);
        assert_eq!(Some(14), fx.symbol("BINFACT1"));
        assert_eq!(10.0, fx.with(|acq| acq.set_value("mca_bin_width", 10.0))?);
        assert_eq!(Some(7), fx.symbol("BINFACT1"));
        Ok(())
    }

    #[test]
    fn low_limit() -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        let achieved = fx.with(|acq| acq.set_value("mca_low_limit", 333.0))?;
        assert_eq!(Some(17), fx.symbol("MCALIMLO"));
        assert_eq!(340.0, achieved);

        fx.with(|acq| acq.set_value("number_mca_channels", 100.0))?;
        assert_eq!(
            Err(DXPDriverError::BinsOutOfRange(100.0)),
            fx.with(|acq| acq.set_value("mca_low_limit", 2000.0))
        );
        assert_eq!(Some(340.0), fx.channel.defaults().get("mca_low_limit"));
        Ok(())
    }
}
