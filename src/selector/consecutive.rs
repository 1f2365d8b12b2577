use std::collections::HashSet;

use rand::Rng;

use super::{BetSet, ExclusionSet, SelectError};
use crate::config::heuristics::TOP_CANDIDATE_FRACTION;
use crate::config::NUMBER_MAX;

/// A feasible run and how many priority numbers it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredRun {
    pub run: BetSet,
    pub score: usize,
}

/// Every run of `count` consecutive numbers that avoids `exclusions`, in
/// ascending order of their first number.
pub fn candidate_runs(count: usize, exclusions: &ExclusionSet, priority: &[u8]) -> Vec<ScoredRun> {
    if count == 0 || count > NUMBER_MAX as usize {
        return Vec::new();
    }

    let mut runs = Vec::new();
    // Length of the exclusion-free streak ending at `n`.
    let mut streak = 0usize;
    for n in 1..=NUMBER_MAX {
        if exclusions.contains(n) {
            streak = 0;
            continue;
        }
        streak += 1;
        if streak >= count {
            let start = n + 1 - count as u8;
            let run: BetSet = (start..=n).collect();
            let score = run.iter().filter(|x| priority.contains(x)).count();
            runs.push(ScoredRun { run, score });
        }
    }
    runs
}

/// Number of ranked candidates eligible for the random pick.
fn top_share(total: usize) -> usize {
    let share = (total as f64 * TOP_CANDIDATE_FRACTION).ceil() as usize;
    share.clamp(1, total.max(1))
}

/// Rank by score (stable, so ties keep enumeration order) and pick uniformly
/// from the top share.
fn pick_ranked<R: Rng + ?Sized>(rng: &mut R, mut runs: Vec<ScoredRun>) -> Option<BetSet> {
    if runs.is_empty() {
        return None;
    }
    runs.sort_by(|a, b| b.score.cmp(&a.score));
    let top = top_share(runs.len());
    let idx = rng.gen_range(0..top);
    Some(runs.swap_remove(idx).run)
}

/// Pick a run of `count` consecutive numbers outside `exclusions`, favouring
/// runs that hold more `priority` numbers.
pub fn select_consecutive<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    exclusions: &ExclusionSet,
    priority: &[u8],
) -> Result<BetSet, SelectError> {
    select_consecutive_avoiding(rng, count, exclusions, priority, &HashSet::new())
}

/// Same as [`select_consecutive`] but never returns a run already in `taken`.
pub fn select_consecutive_avoiding<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    exclusions: &ExclusionSet,
    priority: &[u8],
    taken: &HashSet<BetSet>,
) -> Result<BetSet, SelectError> {
    let runs: Vec<ScoredRun> = candidate_runs(count, exclusions, priority)
        .into_iter()
        .filter(|r| !taken.contains(&r.run))
        .collect();

    pick_ranked(rng, runs).ok_or(SelectError::InfeasibleConstraint {
        count,
        available: exclusions.available_len(),
    })
}

/// True when `bet` is exactly `len` long, strictly consecutive and clear of
/// `exclusions`.
pub fn is_valid_run(bet: &[u8], len: usize, exclusions: &ExclusionSet) -> bool {
    bet.len() == len
        && bet.windows(2).all(|w| w[1] == w[0].wrapping_add(1))
        && bet.iter().all(|&n| super::in_domain(n) && !exclusions.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn enumerates_sliding_windows_inside_allowed_pool() {
        let excl: ExclusionSet = (1..=60).collect();
        let runs = candidate_runs(3, &excl, &[]);
        assert_eq!(runs.len(), 18);
        assert_eq!(runs.first().map(|r| r.run.clone()), Some(vec![61, 62, 63]));
        assert_eq!(runs.last().map(|r| r.run.clone()), Some(vec![78, 79, 80]));
    }

    #[test]
    fn windows_never_span_an_excluded_number() {
        let excl: ExclusionSet = [10u8, 20].into_iter().collect();
        for r in candidate_runs(4, &excl, &[]) {
            assert!(!r.run.contains(&10) && !r.run.contains(&20), "{:?}", r.run);
        }
    }

    #[test]
    fn high_exclusion_example_lands_in_upper_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let excl: ExclusionSet = (1..=60).collect();
        for _ in 0..100 {
            let run = select_consecutive(&mut rng, 3, &excl, &[]).unwrap();
            assert!(is_valid_run(&run, 3, &excl));
            assert!(run[0] >= 61 && run[2] <= 80);
        }
    }

    #[test]
    fn results_are_consecutive_and_clear_of_exclusions() {
        let mut rng = StdRng::seed_from_u64(17);
        let excl: ExclusionSet = [2u8, 3, 15, 33, 34, 50, 64, 71].into_iter().collect();
        let priority = [12u8, 13, 40, 41, 42, 77];
        for count in 1..=6 {
            for _ in 0..50 {
                let run = select_consecutive(&mut rng, count, &excl, &priority).unwrap();
                assert_eq!(run.len(), count);
                assert!(run.windows(2).all(|w| w[1] == w[0] + 1));
                assert!(run.iter().all(|&n| !excl.contains(n)));
            }
        }
    }

    #[test]
    fn picks_from_top_ranked_share() {
        let mut rng = StdRng::seed_from_u64(23);
        // Only 10..=15 allowed: runs [10-12]=3, [11-13]=2, [12-14]=1, [13-15]=0.
        let excl: ExclusionSet = (1..=80).filter(|n| !(10..=15).contains(n)).collect();
        let priority = [10u8, 11, 12];
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let run = select_consecutive(&mut rng, 3, &excl, &priority).unwrap();
            assert!(run == vec![10, 11, 12] || run == vec![11, 12, 13], "{run:?}");
            seen.insert(run);
        }
        assert_eq!(seen.len(), 2, "both top candidates should come up");
    }

    #[test]
    fn infeasible_when_no_window_fits() {
        let mut rng = StdRng::seed_from_u64(2);
        let evens: ExclusionSet = (1..=80).filter(|n| n % 2 == 0).collect();
        let err = select_consecutive(&mut rng, 2, &evens, &[]).unwrap_err();
        assert_eq!(err, SelectError::InfeasibleConstraint { count: 2, available: 40 });

        assert!(select_consecutive(&mut rng, 81, &ExclusionSet::new(), &[]).is_err());
        assert!(select_consecutive(&mut rng, 0, &ExclusionSet::new(), &[]).is_err());
    }

    #[test]
    fn avoiding_skips_taken_runs() {
        let mut rng = StdRng::seed_from_u64(4);
        let excl: ExclusionSet = (1..=76).collect();
        let taken: HashSet<BetSet> = [vec![77, 78, 79]].into_iter().collect();
        let run = select_consecutive_avoiding(&mut rng, 3, &excl, &[], &taken).unwrap();
        assert_eq!(run, vec![78, 79, 80]);

        let all: HashSet<BetSet> = [vec![77, 78, 79], vec![78, 79, 80]].into_iter().collect();
        assert!(select_consecutive_avoiding(&mut rng, 3, &excl, &[], &all).is_err());
    }

    #[test]
    fn run_validation() {
        let excl: ExclusionSet = [5u8].into_iter().collect();
        assert!(is_valid_run(&[1, 2, 3], 3, &excl));
        assert!(!is_valid_run(&[1, 2, 4], 3, &excl));
        assert!(!is_valid_run(&[3, 4, 5], 3, &excl));
        assert!(!is_valid_run(&[1, 2], 3, &excl));
        assert!(!is_valid_run(&[80, 81, 82], 3, &excl));
    }
}
