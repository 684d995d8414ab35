use dxp_core::defined::MAX_MCA_CHANNELS;

use crate::error::DXPDriverError;

use super::registry::{resolve, ACQUISITION_VALUES};

/// Current acquisition values of a channel, in insertion order.
///
/// Every name in the store resolves to a registry entry or one of the dynamic value families.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Defaults {
    entries: Vec<(String, f64)>,
}

impl Defaults {
    /// A store holding the built-in default of every value that has one.
    #[must_use]
    pub fn with_builtin() -> Self {
        Self {
            entries: ACQUISITION_VALUES
                .iter()
                .filter_map(|v| v.default.map(|d| (v.name.to_owned(), d)))
                .collect(),
        }
    }

    /// The value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }

    /// The value of `name`, or [`DXPDriverError::IncompleteDefaults`] if it is missing.
    pub fn require(&self, name: &str) -> Result<f64, DXPDriverError> {
        self.get(name)
            .ok_or_else(|| DXPDriverError::IncompleteDefaults(name.to_string()))
    }

    /// Inserts or replaces `name`. Names that are not acquisition values are rejected.
    pub fn insert(&mut self, name: &str, value: f64) -> Result<(), DXPDriverError> {
        if resolve(name).is_none() {
            return Err(DXPDriverError::UnknownValue(name.to_string()));
        }
        self.store(name, value);
        Ok(())
    }

    pub(crate) fn store(&mut self, name: &str, value: f64) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.entries.push((name.to_owned(), value)),
        }
    }

    /// Removes `name` and returns its value.
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Checks if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Iterates over the values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that every value with a built-in default is present and in range.
    pub fn validate(&self) -> Result<(), DXPDriverError> {
        ACQUISITION_VALUES
            .iter()
            .filter(|v| v.has_default())
            .try_for_each(|v| self.require(v.name).map(|_| ()))?;
        let bins = self.require("number_mca_channels")?;
        if !(0.0..=MAX_MCA_CHANNELS).contains(&bins) {
            return Err(DXPDriverError::BinsOutOfRange(bins));
        }
        Ok(())
    }
}
