use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, info};

use super::consecutive::{is_valid_run, select_consecutive, select_consecutive_avoiding};
use super::random::select_random;
use super::{in_domain, signature, BetSet, ExclusionSet, SelectionMode};

/// Random replacement attempts per pool before the search widens.
const MAX_REPLACEMENT_ATTEMPTS: usize = 512;

/// Shape and constraints the repaired batch must satisfy.
#[derive(Debug, Clone, Copy)]
pub struct RepairParams<'a> {
    pub bets_count: usize,
    pub stars: usize,
    pub exclusions: &'a ExclusionSet,
    pub mode: SelectionMode,
    /// Ranks consecutive runs; never affects feasibility.
    pub priority: &'a [u8],
}

/// Force externally supplied candidate bets into a valid batch.
///
/// The output always holds exactly `bets_count` sets, each sorted ascending
/// and (for `stars <= 80`) exactly `stars` long, with no repeated set. When
/// the constraints cannot be met the batch degrades instead of failing:
/// consecutive mode falls back to random sets, and random sets only reach
/// into excluded numbers once the allowed pool is exhausted.
pub fn validate_and_repair<R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &[Vec<u8>],
    params: &RepairParams<'_>,
) -> Vec<BetSet> {
    let mut seen: HashSet<BetSet> = HashSet::new();
    let mut batch: Vec<BetSet> = Vec::with_capacity(params.bets_count);
    let mut duplicates = 0usize;

    for raw in candidates {
        let bet = repair_one(rng, raw, params);
        if seen.contains(&bet) {
            debug!("[REPAIR] duplicate bet [{}] dropped", signature(&bet));
            duplicates += 1;
            continue;
        }
        seen.insert(bet.clone());
        batch.push(bet);
    }

    if batch.len() > params.bets_count {
        for dropped in batch.drain(params.bets_count..) {
            seen.remove(&dropped);
        }
    }

    let mut synthesized = 0usize;
    while batch.len() < params.bets_count {
        let bet = fresh_bet(rng, params, &seen);
        debug!("[REPAIR] synthesized bet [{}]", signature(&bet));
        seen.insert(bet.clone());
        batch.push(bet);
        synthesized += 1;
    }

    if duplicates > 0 || synthesized > 0 {
        info!(
            candidates = candidates.len(),
            duplicates,
            synthesized,
            "[REPAIR] batch of {} bets: {duplicates} duplicates dropped, {synthesized} synthesized",
            params.bets_count,
        );
    }

    batch
}

/// Steps 1-4 for a single candidate: length, contiguity, exclusions, order.
fn repair_one<R: Rng + ?Sized>(rng: &mut R, raw: &[u8], params: &RepairParams<'_>) -> BetSet {
    let mut cleaned: Vec<u8> = Vec::with_capacity(raw.len());
    for &n in raw {
        if in_domain(n) && !cleaned.contains(&n) {
            cleaned.push(n);
        }
    }

    match params.mode {
        SelectionMode::Consecutive => {
            let mut bet: BetSet = cleaned.into_iter().take(params.stars).collect();
            bet.sort_unstable();
            if is_valid_run(&bet, params.stars, params.exclusions) {
                return bet;
            }
            debug!("[REPAIR] invalid consecutive bet [{}], regenerating", signature(&bet));
            match select_consecutive(rng, params.stars, params.exclusions, params.priority) {
                Ok(run) => run,
                Err(e) => {
                    debug!("[REPAIR] {e}; falling back to random numbers");
                    pad_to_length(rng, Vec::new(), params.stars, params.exclusions)
                }
            }
        }
        SelectionMode::Free => {
            let kept: BetSet = cleaned
                .into_iter()
                .filter(|&n| !params.exclusions.contains(n))
                .take(params.stars)
                .collect();
            pad_to_length(rng, kept, params.stars, params.exclusions)
        }
    }
}

/// Top `bet` up to `stars` numbers from the allowed pool, reaching into the
/// excluded numbers only when the pool is exhausted. Existing members are kept.
fn pad_to_length<R: Rng + ?Sized>(
    rng: &mut R,
    mut bet: BetSet,
    stars: usize,
    exclusions: &ExclusionSet,
) -> BetSet {
    if bet.len() < stars {
        let mut blocked = exclusions.clone();
        blocked.extend(bet.iter().copied());
        let extra = select_random(rng, stars - bet.len(), &blocked);
        bet.extend(extra);
    }
    if bet.len() < stars {
        let held: ExclusionSet = bet.iter().copied().collect();
        let extra = select_random(rng, stars - bet.len(), &held);
        bet.extend(extra);
    }
    bet.sort_unstable();
    bet
}

/// A replacement bet that collides with nothing in `seen`.
///
/// The allowed pool is searched first. Once every set in it is taken the
/// search widens to the whole domain, and a repeat is accepted only when
/// every `stars`-number set of 1..=80 is already in the batch.
fn fresh_bet<R: Rng + ?Sized>(
    rng: &mut R,
    params: &RepairParams<'_>,
    seen: &HashSet<BetSet>,
) -> BetSet {
    if let Some(bet) = unseen_within(rng, params, params.exclusions, seen) {
        return bet;
    }
    debug!("[REPAIR] allowed pool exhausted; replacement reaches into excluded numbers");
    let open = ExclusionSet::new();
    if let Some(bet) = unseen_within(rng, params, &open, seen) {
        return bet;
    }
    debug!("[REPAIR] every {}-number set is taken; accepting a repeat", params.stars);
    pad_to_length(rng, Vec::new(), params.stars, params.exclusions)
}

/// An unseen set drawn only from numbers outside `exclusions`: a run first in
/// consecutive mode, then a random set.
fn unseen_within<R: Rng + ?Sized>(
    rng: &mut R,
    params: &RepairParams<'_>,
    exclusions: &ExclusionSet,
    seen: &HashSet<BetSet>,
) -> Option<BetSet> {
    if params.mode == SelectionMode::Consecutive {
        match select_consecutive_avoiding(rng, params.stars, exclusions, params.priority, seen) {
            Ok(run) => return Some(run),
            Err(e) => debug!("[REPAIR] {e}; replacement tries random numbers"),
        }
    }

    let space = combinations(exclusions.available_len(), params.stars);
    let taken = seen
        .iter()
        .filter(|b| b.len() == params.stars && b.iter().all(|&n| !exclusions.contains(n)))
        .count() as u128;
    if taken >= space {
        return None;
    }
    (0..MAX_REPLACEMENT_ATTEMPTS)
        .map(|_| pad_to_length(rng, Vec::new(), params.stars, exclusions))
        .find(|bet| !seen.contains(bet))
}

/// n choose k, saturating. Zero when k > n.
fn combinations(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc.saturating_mul((n - i) as u128) / (i as u128 + 1);
    }
    acc
}
