use serde::Serialize;

use crate::betting::cost::{checked_product, prize_for, signed, too_large};
use crate::config::prizes::BASE_BET_AMOUNT;
use crate::error::Result;
use crate::selector::in_domain;

/// Parse pasted bets: one bet per line, numbers separated by commas.
/// Tokens that are not integers in 1..=80 are dropped, as are repeats
/// within a line; lines left empty are skipped.
pub fn parse_bets_text(text: &str) -> Vec<Vec<u8>> {
    text.lines()
        .filter_map(|line| {
            let mut bet: Vec<u8> = Vec::new();
            for token in line.split(',') {
                let Ok(n) = token.trim().parse::<u8>() else { continue };
                if in_domain(n) && !bet.contains(&n) {
                    bet.push(n);
                }
            }
            (!bet.is_empty()).then_some(bet)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningBet {
    /// 1-based position in the submitted list.
    pub bet_index: usize,
    pub numbers: Vec<u8>,
    pub match_count: usize,
    pub matched_numbers: Vec<u8>,
    pub prize: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeCheck {
    pub bets_checked: usize,
    pub winning_bets: Vec<WinningBet>,
    pub total_cost: u64,
    pub total_prize: u64,
    pub profit: i64,
}

/// Score each bet against the drawn numbers. Only winning bets are listed;
/// every bet counts towards the cost.
pub fn check_prizes(bets: &[Vec<u8>], drawn: &[u8], multiple: u64) -> Result<PrizeCheck> {
    let mut winning_bets: Vec<WinningBet> = Vec::new();
    for (i, bet) in bets.iter().enumerate() {
        let matched_numbers: Vec<u8> = bet.iter().copied().filter(|n| drawn.contains(n)).collect();
        let match_count = matched_numbers.len();
        let Some(base) = prize_for(bet.len(), match_count) else { continue };
        let prize = checked_product(&[base, multiple])?;
        if prize > 0 {
            winning_bets.push(WinningBet {
                bet_index: i + 1,
                numbers: bet.clone(),
                match_count,
                matched_numbers,
                prize,
            });
        }
    }

    let total_cost = checked_product(&[bets.len() as u64, BASE_BET_AMOUNT, multiple])?;
    let total_prize = winning_bets
        .iter()
        .try_fold(0u64, |acc, w| acc.checked_add(w.prize))
        .ok_or_else(too_large)?;

    Ok(PrizeCheck {
        bets_checked: bets.len(),
        winning_bets,
        total_cost,
        total_prize,
        profit: signed(total_prize)? - signed(total_cost)?,
    })
}
