//! Constrained bet-set selection over the 1..=80 number domain.
//!
//! Everything here is synchronous and works on explicit inputs: callers pass
//! the exclusions, the priority numbers and the random generator, and get new
//! values back.

pub mod consecutive;
pub mod random;
pub mod repair;

use thiserror::Error;

use crate::config::NUMBER_MAX;

pub use consecutive::select_consecutive;
pub use random::{select_many_random, select_random};
pub use repair::{validate_and_repair, RepairParams};

/// One bet: unique numbers in 1..=80, ascending.
pub type BetSet = Vec<u8>;

const SLOTS: usize = NUMBER_MAX as usize + 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// No candidate satisfies the requested length under the active mode.
    #[error("no run of {count} consecutive numbers avoids the exclusions ({available} numbers available)")]
    InfeasibleConstraint { count: usize, available: usize },
}

/// Whether every produced bet must be a contiguous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Free,
    Consecutive,
}

/// Numbers that must not appear in any produced bet. Values outside 1..=80
/// are ignored on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    excluded: [bool; SLOTS],
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self { excluded: [false; SLOTS] }
    }
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, n: u8) {
        if in_domain(n) {
            self.excluded[n as usize] = true;
        }
    }

    pub fn contains(&self, n: u8) -> bool {
        in_domain(n) && self.excluded[n as usize]
    }

    pub fn len(&self) -> usize {
        self.excluded.iter().filter(|&&x| x).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Excluded numbers, ascending.
    pub fn numbers(&self) -> Vec<u8> {
        (1..=NUMBER_MAX).filter(|&n| self.excluded[n as usize]).collect()
    }

    /// The NumberPool: 1..=80 minus the exclusions, ascending.
    pub fn available_pool(&self) -> Vec<u8> {
        (1..=NUMBER_MAX).filter(|&n| !self.excluded[n as usize]).collect()
    }

    pub fn available_len(&self) -> usize {
        NUMBER_MAX as usize - self.len()
    }
}

impl FromIterator<u8> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<u8> for ExclusionSet {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        for n in iter {
            self.insert(n);
        }
    }
}

pub fn in_domain(n: u8) -> bool {
    (1..=NUMBER_MAX).contains(&n)
}

/// Canonical batch signature of a bet, e.g. "5,6,7".
pub fn signature(bet: &[u8]) -> String {
    let mut sorted = bet.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_domain_values_are_ignored() {
        let set: ExclusionSet = [0u8, 1, 80, 81, 200].into_iter().collect();
        assert_eq!(set.numbers(), vec![1, 80]);
        assert!(!set.contains(0));
        assert!(!set.contains(81));
        assert_eq!(set.available_len(), 78);
    }

    #[test]
    fn pool_is_domain_minus_exclusions() {
        let set: ExclusionSet = (1..=60).collect();
        let pool = set.available_pool();
        assert_eq!(pool.first(), Some(&61));
        assert_eq!(pool.len(), 20);
        assert!(ExclusionSet::new().available_pool().len() == 80);
    }

    #[test]
    fn signature_is_order_independent() {
        assert_eq!(signature(&[7, 5, 6]), "5,6,7");
        assert_eq!(signature(&[5, 6, 7]), signature(&[6, 7, 5]));
    }
}
