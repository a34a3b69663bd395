//! Cumulative ledger
//!
//! Running totals keyed by entity identity. Merging a round record either
//! creates the entry from a copy of the record or folds the record into the
//! existing entry; the ledger never holds references into round data.

use crate::fixed_point::to_fixed_point;
use num_bigint::BigUint;
use ssv_rewards_core::error::Result;
use ssv_rewards_core::types::Participation;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Lifetime totals per entity
#[derive(Clone, Debug, PartialEq)]
pub struct Ledger<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Default for Ledger<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: Participation> Ledger<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create-or-increment the entry for the record's entity
    pub fn merge(&mut self, record: &T) {
        match self.entries.entry(record.identity().to_string()) {
            Entry::Occupied(mut entry) => entry.get_mut().accumulate(record),
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
            }
        }
    }

    /// Merge every record of a round
    pub fn merge_all<'a>(&mut self, records: impl IntoIterator<Item = &'a T>)
    where
        T: 'a,
    {
        for record in records {
            self.merge(record);
        }
    }

    pub fn get(&self, identity: &str) -> Option<&T> {
        self.entries.get(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in identity order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Totals in identity order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Sum of all accumulated rewards
    pub fn total_reward(&self) -> f64 {
        self.entries.values().map(Participation::reward).sum()
    }

    /// Exact fixed-point reward per entity
    pub fn fixed_point(&self) -> Result<BTreeMap<String, BigUint>> {
        self.entries
            .iter()
            .map(|(identity, total)| Ok((identity.clone(), to_fixed_point(total.reward())?)))
            .collect()
    }

    pub fn into_values(self) -> Vec<T> {
        self.entries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssv_rewards_core::types::{OwnerParticipation, ValidatorParticipation};

    fn validator(key: &str, days: u64, reward: f64) -> ValidatorParticipation {
        let mut record = ValidatorParticipation::new("0xowner", key, days);
        record.set_reward(reward);
        record
    }

    #[test]
    fn test_merge_creates_then_increments() {
        let mut ledger = Ledger::new();
        ledger.merge(&validator("0xa", 30, 1.5));
        ledger.merge(&validator("0xb", 10, 0.5));
        ledger.merge(&validator("0xa", 31, 2.0));

        assert_eq!(ledger.len(), 2);
        let a = ledger.get("0xa").unwrap();
        assert_eq!(a.active_days, 61);
        assert_eq!(a.reward, 3.5);
        assert_eq!(ledger.get("0xb").unwrap().active_days, 10);
        assert_eq!(ledger.total_reward(), 4.0);
    }

    #[test]
    fn test_merge_copies_records() {
        let mut ledger = Ledger::new();
        let mut record = validator("0xa", 30, 1.0);
        ledger.merge(&record);

        record.active_days = 0;
        record.set_reward(99.0);
        assert_eq!(ledger.get("0xa").unwrap().active_days, 30);
        assert_eq!(ledger.get("0xa").unwrap().reward, 1.0);
    }

    #[test]
    fn test_fixed_point_snapshot() {
        let mut ledger = Ledger::new();
        let mut owner = OwnerParticipation::new("0xowner", 1, 30);
        owner.set_reward(1.0);
        ledger.merge(&owner);

        let snapshot = ledger.fixed_point().unwrap();
        assert_eq!(
            snapshot["0xowner"],
            "1000000000000000000".parse::<BigUint>().unwrap()
        );
    }

    #[test]
    fn test_iteration_is_ordered_by_identity() {
        let mut ledger = Ledger::new();
        for key in ["0xc", "0xa", "0xb"] {
            ledger.merge(&validator(key, 1, 0.1));
        }
        let keys: Vec<&str> = ledger.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["0xa", "0xb", "0xc"]);
    }
}
