use std::{cmp::Ordering, fmt::Debug, sync::Arc};

use itertools::Itertools;

use crate::error::ParseError;

/// Filter constants shipped with a firmware variant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterInfo {
    /// Offset added to `SLOWLEN + SLOWGAP` to get `PEAKINT`.
    pub peakint_offset: f64,
    /// Offset subtracted from `PEAKINT` to get `PEAKSAM`.
    pub peaksam_offset: f64,
}

/// A firmware variant valid over an inclusive peaking time range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FirmwareRecord {
    /// Lower peaking time in \[µs\]
    pub min_peaking_time: f64,
    /// Upper peaking time in \[µs\]
    pub max_peaking_time: f64,
    /// DSP image name.
    pub dsp: String,
    /// FiPPI image name.
    pub fippi: String,
    /// Filter constants.
    pub filter: FilterInfo,
}

impl FirmwareRecord {
    /// Checks if `peaking_time` lies in the range of this record.
    #[must_use]
    pub fn contains(&self, peaking_time: f64) -> bool {
        self.min_peaking_time <= peaking_time && peaking_time <= self.max_peaking_time
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.min_peaking_time <= other.max_peaking_time
            && other.min_peaking_time <= self.max_peaking_time
    }
}

/// An external firmware definition database.
pub trait FirmwareDatabase: Debug + Send + Sync {
    /// Finds the firmware for `peaking_time`.
    fn lookup(&self, peaking_time: f64) -> Option<FirmwareRecord>;
}

/// The firmware selected for a peaking time.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFirmware {
    /// Index of the record in an explicit set, `None` for a database.
    pub ptrr: Option<usize>,
    /// The selected record.
    pub record: FirmwareRecord,
}

#[derive(Debug, Clone)]
enum Kind {
    Records(Vec<FirmwareRecord>),
    Database(Arc<dyn FirmwareDatabase>),
}

/// Firmware variants of a channel.
#[derive(Debug, Clone)]
pub struct FirmwareSet {
    kind: Kind,
}

impl FirmwareSet {
    /// Creates a set from explicit records. Ranges must be valid and must not overlap.
    pub fn new(records: Vec<FirmwareRecord>) -> Result<Self, ParseError> {
        if let Some(r) = records
            .iter()
            .find(|r| {
                !matches!(
                    r.min_peaking_time.partial_cmp(&r.max_peaking_time),
                    Some(Ordering::Less | Ordering::Equal)
                )
            })
        {
            return Err(ParseError::InvalidRange {
                min: r.min_peaking_time,
                max: r.max_peaking_time,
            });
        }
        if let Some((a, b)) = records
            .iter()
            .tuple_combinations()
            .find(|(a, b)| a.overlaps(b))
        {
            return Err(ParseError::OverlappingRanges(
                a.min_peaking_time,
                a.max_peaking_time,
                b.min_peaking_time,
                b.max_peaking_time,
            ));
        }
        Ok(Self {
            kind: Kind::Records(records),
        })
    }

    /// Creates a set backed by a firmware definition database.
    #[must_use]
    pub fn database(db: impl FirmwareDatabase + 'static) -> Self {
        Self {
            kind: Kind::Database(Arc::new(db)),
        }
    }

    /// Checks if the set is backed by a database.
    #[must_use]
    pub fn is_database(&self) -> bool {
        matches!(self.kind, Kind::Database(_))
    }

    /// Explicit records of the set, empty for a database.
    #[must_use]
    pub fn records(&self) -> &[FirmwareRecord] {
        match &self.kind {
            Kind::Records(records) => records,
            Kind::Database(_) => &[],
        }
    }

    /// Selects the first record whose range contains `peaking_time`.
    pub fn select(&self, peaking_time: f64) -> Result<SelectedFirmware, ParseError> {
        match &self.kind {
            Kind::Records(records) => records
                .iter()
                .position(|r| r.contains(peaking_time))
                .map(|i| SelectedFirmware {
                    ptrr: Some(i),
                    record: records[i].clone(),
                }),
            Kind::Database(db) => db.lookup(peaking_time).map(|record| SelectedFirmware {
                ptrr: None,
                record,
            }),
        }
        .ok_or(ParseError::NoFirmware(peaking_time))
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn record(min: f64, max: f64) -> FirmwareRecord {
        FirmwareRecord {
            min_peaking_time: min,
            max_peaking_time: max,
            dsp: "x.dsp".to_owned(),
            fippi: format!("f{min}.fip"),
            filter: FilterInfo::default(),
        }
    }

    #[rstest::rstest]
    #[case(Some(0), 0.25)]
    #[case(Some(0), 2.0)]
    #[case(Some(1), 2.05)]
    #[case(Some(2), 20.0)]
    #[case(None, 2.01)]
    #[case(None, 0.1)]
    #[case(None, 25.)]
    fn select(#[case] expect: Option<usize>, #[case] pt: f64) -> anyhow::Result<()> {
        let set = FirmwareSet::new(vec![record(0.25, 2.0), record(2.05, 8.0), record(8.05, 20.0)])?;
        match expect {
            Some(i) => {
                let selected = set.select(pt)?;
                assert_eq!(Some(i), selected.ptrr);
                assert_eq!(set.records()[i], selected.record);
            }
            None => assert_eq!(Err(ParseError::NoFirmware(pt)), set.select(pt)),
        }
        Ok(())
    }

    #[test]
    fn select_is_total() -> anyhow::Result<()> {
        let set = FirmwareSet::new(vec![record(0.25, 2.0), record(2.05, 8.0), record(8.05, 20.0)])?;
        let mut rng = rand::rng();
        (0..1000).for_each(|_| {
            let pt = rng.random_range(0.0..25.0);
            let n = set.records().iter().filter(|r| r.contains(pt)).count();
            assert!(n <= 1);
            assert_eq!(n == 1, set.select(pt).is_ok());
        });
        Ok(())
    }

    #[rstest::rstest]
    #[case(ParseError::OverlappingRanges(0.25, 2.0, 2.0, 8.0), vec![record(0.25, 2.0), record(2.0, 8.0)])]
    #[case(ParseError::OverlappingRanges(0.25, 10.0, 2.0, 8.0), vec![record(0.25, 10.0), record(2.0, 8.0)])]
    #[case(ParseError::InvalidRange { min: 3.0, max: 2.0 }, vec![record(3.0, 2.0)])]
    fn new_err(#[case] expect: ParseError, #[case] records: Vec<FirmwareRecord>) {
        assert_eq!(Some(expect), FirmwareSet::new(records).err());
    }

    #[derive(Debug)]
    struct Fdd;

    impl FirmwareDatabase for Fdd {
        fn lookup(&self, peaking_time: f64) -> Option<FirmwareRecord> {
            (peaking_time < 10.0).then(|| record(0.0, 10.0))
        }
    }

    #[test]
    fn database() -> anyhow::Result<()> {
        let set = FirmwareSet::database(Fdd);
        assert!(set.is_database());
        assert!(set.records().is_empty());
        assert_eq!(None, set.select(1.0)?.ptrr);
        assert_eq!(Err(ParseError::NoFirmware(12.0)), set.select(12.0));
        Ok(())
    }
}
