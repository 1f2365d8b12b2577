use serde::Serialize;

use crate::config::heuristics::BLOCK_SIZE;
use crate::config::NUMBER_MAX;
use crate::selector::{in_domain, ExclusionSet};
use crate::types::DrawResult;

const SLOTS: usize = NUMBER_MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberCount {
    pub number: u8,
    pub count: u32,
}

/// Aggregate over one block of the domain (1-4, 5-8, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStat {
    /// "1-4"
    pub range: String,
    pub numbers: Vec<u8>,
    pub total: u32,
    /// Members drawn at least as often as the block average.
    pub hot_count: usize,
}

/// Occurrence counts of 1..=80 over the newest `periods` draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u32; SLOTS],
    draws: usize,
}

impl FrequencyTable {
    pub fn from_draws(draws: &[DrawResult], periods: usize) -> Self {
        let mut counts = [0u32; SLOTS];
        let window = &draws[..periods.min(draws.len())];
        for draw in window {
            for &n in &draw.numbers {
                if in_domain(n) {
                    counts[n as usize] += 1;
                }
            }
        }
        Self { counts, draws: window.len() }
    }

    pub fn count(&self, n: u8) -> u32 {
        if in_domain(n) {
            self.counts[n as usize]
        } else {
            0
        }
    }

    /// Draws that actually went into the table.
    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn counts(&self) -> Vec<NumberCount> {
        (1..=NUMBER_MAX)
            .map(|number| NumberCount { number, count: self.counts[number as usize] })
            .collect()
    }

    /// Numbers by count descending, ties by number ascending.
    pub fn sorted_desc(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = (1..=NUMBER_MAX).collect();
        numbers.sort_by(|a, b| self.counts[*b as usize].cmp(&self.counts[*a as usize]));
        numbers
    }

    /// Numbers by count ascending, ties by number ascending.
    pub fn sorted_asc(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = (1..=NUMBER_MAX).collect();
        numbers.sort_by_key(|n| self.counts[*n as usize]);
        numbers
    }

    pub fn hottest(&self, limit: usize) -> Vec<NumberCount> {
        self.sorted_desc()
            .into_iter()
            .take(limit)
            .map(|number| NumberCount { number, count: self.count(number) })
            .collect()
    }

    pub fn coldest(&self, limit: usize) -> Vec<NumberCount> {
        self.sorted_asc()
            .into_iter()
            .take(limit)
            .map(|number| NumberCount { number, count: self.count(number) })
            .collect()
    }

    /// The cold exclusion list: every never-drawn number first (ascending,
    /// capped at `limit`), then the least drawn of the rest up to `limit`.
    pub fn coldest_numbers(&self, limit: usize) -> Vec<u8> {
        let mut cold: Vec<u8> = (1..=NUMBER_MAX)
            .filter(|&n| self.counts[n as usize] == 0)
            .take(limit)
            .collect();
        if cold.len() < limit {
            let needed = limit - cold.len();
            cold.extend(
                self.sorted_asc()
                    .into_iter()
                    .filter(|&n| self.counts[n as usize] > 0)
                    .take(needed),
            );
        }
        cold
    }

    pub fn blocks(&self) -> Vec<BlockStat> {
        (1..=NUMBER_MAX)
            .step_by(BLOCK_SIZE as usize)
            .map(|start| {
                let end = start.saturating_add(BLOCK_SIZE - 1).min(NUMBER_MAX);
                let numbers: Vec<u8> = (start..=end).collect();
                let total: u32 = numbers.iter().map(|&n| self.counts[n as usize]).sum();
                let avg = f64::from(total) / numbers.len() as f64;
                let hot_count = numbers
                    .iter()
                    .filter(|&&n| f64::from(self.counts[n as usize]) >= avg)
                    .count();
                BlockStat { range: format!("{start}-{end}"), numbers, total, hot_count }
            })
            .collect()
    }

    /// Members of the `count` least drawn blocks (lowest total first, then
    /// fewest hot members, then lowest range).
    pub fn lowest_block_numbers(&self, count: usize) -> Vec<u8> {
        let mut blocks = self.blocks();
        blocks.sort_by(|a, b| a.total.cmp(&b.total).then(a.hot_count.cmp(&b.hot_count)));
        blocks
            .into_iter()
            .take(count)
            .flat_map(|b| b.numbers)
            .collect()
    }

    /// The hottest `limit` numbers still allowed by `exclusions`.
    pub fn priority_numbers(&self, exclusions: &ExclusionSet, limit: usize) -> Vec<u8> {
        self.sorted_desc()
            .into_iter()
            .filter(|&n| !exclusions.contains(n))
            .take(limit)
            .collect()
    }
}
