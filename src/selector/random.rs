use rand::Rng;

use super::{BetSet, ExclusionSet};

/// Pick `count` distinct numbers uniformly from the pool left after
/// `exclusions`. Returns fewer than `count` when the pool runs dry.
pub fn select_random<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    exclusions: &ExclusionSet,
) -> BetSet {
    let mut pool = exclusions.available_pool();
    let mut picked = Vec::with_capacity(count.min(pool.len()));

    while picked.len() < count && !pool.is_empty() {
        let idx = rng.gen_range(0..pool.len());
        picked.push(pool.swap_remove(idx));
    }

    picked.sort_unstable();
    picked
}

/// `bets_count` independent draws, each against its own copy of the pool.
/// Numbers may repeat across bets; whole sets are not de-duplicated here.
pub fn select_many_random<R: Rng + ?Sized>(
    rng: &mut R,
    bets_count: usize,
    stars: usize,
    exclusions: &ExclusionSet,
) -> Vec<BetSet> {
    (0..bets_count)
        .map(|_| select_random(rng, stars, exclusions))
        .collect()
}
