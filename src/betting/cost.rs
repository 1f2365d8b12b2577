use serde::Serialize;

use crate::config::prizes::{BASE_BET_AMOUNT, PRIZE_TABLE};
use crate::error::{AppError, Result};

/// Prize of one unit bet with `stars` numbers and `hits` matches.
pub fn prize_for(stars: usize, hits: usize) -> Option<u64> {
    PRIZE_TABLE
        .iter()
        .find(|&&(s, h, _)| s == stars && h == hits)
        .map(|&(_, _, prize)| prize)
}

/// Paying tiers of a star count as (hits, prize), most hits first.
pub fn prize_tiers(stars: usize) -> Vec<(usize, u64)> {
    let mut tiers: Vec<(usize, u64)> = PRIZE_TABLE
        .iter()
        .filter(|&&(s, _, _)| s == stars)
        .map(|&(_, h, p)| (h, p))
        .collect();
    tiers.sort_by(|a, b| b.0.cmp(&a.0));
    tiers
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenRow {
    pub hits: usize,
    pub prize: u64,
    pub single_win_amount: u64,
    /// Wins at this tier needed to cover the total cost.
    pub times_needed: u64,
    pub profit_if_win_once: i64,
    pub is_profit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysis {
    pub stars: usize,
    pub multiple: u64,
    pub periods: u64,
    pub bets: u64,
    pub total_cost: u64,
    /// Hits needed for the top prize; None when the star count pays nothing.
    pub max_hits: Option<usize>,
    pub max_prize: u64,
    /// Profit if every bet hits the top prize in every draw.
    pub max_profit: i64,
    /// max_profit / total_cost in percent, two decimals.
    pub roi_percent: f64,
    pub break_even: Vec<BreakEvenRow>,
}

pub(crate) fn too_large() -> AppError {
    AppError::InvalidRequest("amounts are too large to compute".to_string())
}

pub(crate) fn signed(amount: u64) -> Result<i64> {
    i64::try_from(amount).map_err(|_| too_large())
}

/// Product of `factors`, or `InvalidRequest` when it does not fit in u64.
pub(crate) fn checked_product(factors: &[u64]) -> Result<u64> {
    factors
        .iter()
        .try_fold(1u64, |acc, &f| acc.checked_mul(f))
        .ok_or_else(too_large)
}

pub fn analyze_cost(stars: usize, multiple: u64, periods: u64, bets: u64) -> Result<CostAnalysis> {
    let total_cost = checked_product(&[BASE_BET_AMOUNT, bets, periods, multiple])?;
    let tiers = prize_tiers(stars);
    let (max_hits, max_prize) = tiers
        .first()
        .map(|&(h, p)| (Some(h), p))
        .unwrap_or((None, 0));
    let max_return = checked_product(&[max_prize, multiple, bets, periods])?;
    let max_profit = signed(max_return)? - signed(total_cost)?;

    let break_even = tiers
        .iter()
        .map(|&(hits, prize)| {
            let single_win_amount = checked_product(&[prize, multiple])?;
            let times_needed = if single_win_amount == 0 {
                0
            } else {
                total_cost.div_ceil(single_win_amount)
            };
            let profit_if_win_once = signed(single_win_amount)? - signed(total_cost)?;
            Ok(BreakEvenRow {
                hits,
                prize,
                single_win_amount,
                times_needed,
                profit_if_win_once,
                is_profit: profit_if_win_once > 0,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let roi_percent = if total_cost > 0 {
        (max_profit as f64 / total_cost as f64 * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };

    Ok(CostAnalysis {
        stars,
        multiple,
        periods,
        bets,
        total_cost,
        max_hits,
        max_prize,
        max_profit,
        roi_percent,
        break_even,
    })
}
