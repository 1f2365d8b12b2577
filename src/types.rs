use serde::{Deserialize, Serialize};

use crate::selector::BetSet;

// ---------------------------------------------------------------------------
// Draws
// ---------------------------------------------------------------------------

/// One official draw. Lists of draws are always ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    /// Daily sequence number, zero padded to three digits ("001").
    #[serde(default)]
    pub draw_number: String,
    /// YYYY-MM-DD
    #[serde(default)]
    pub draw_date: String,
    /// HH:MM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_time: Option<String>,
    pub numbers: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawSource {
    OfficialApi,
    None,
}

impl std::fmt::Display for DrawSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DrawSource::OfficialApi => "official-api",
            DrawSource::None => "none",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Strategy and betting mode
// ---------------------------------------------------------------------------

/// Recommendation strategy picked on the dashboard.
/// Unknown names fall back to the mixed `Ai` strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Strategy {
    Hot,
    Consecutive,
    Ai,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Ai
    }
}

impl From<String> for Strategy {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Strategy::Hot,
            "consecutive" => Strategy::Consecutive,
            _ => Strategy::Ai,
        }
    }
}

impl From<Strategy> for String {
    fn from(s: Strategy) -> Self {
        s.to_string()
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Strategy::Hot => "hot",
            Strategy::Consecutive => "consecutive",
            Strategy::Ai => "ai",
        };
        write!(f, "{s}")
    }
}

/// How the requested bets will be played, which drives prompts and exclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetMode {
    /// One bet reused over several draws: long-term hot numbers, no exclusions.
    MultiPeriodSingleBet,
    /// Every bet is a run of consecutive numbers.
    Consecutive,
    /// Several bets for the next draw.
    MultiBet,
}

impl BetMode {
    pub fn resolve(strategy: Strategy, periods: usize, bets: usize) -> Self {
        if periods > 1 && bets == 1 {
            BetMode::MultiPeriodSingleBet
        } else if strategy == Strategy::Consecutive {
            BetMode::Consecutive
        } else {
            BetMode::MultiBet
        }
    }
}

impl std::fmt::Display for BetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BetMode::MultiPeriodSingleBet => "multi_period_single_bet",
            BetMode::Consecutive => "consecutive",
            BetMode::MultiBet => "multi_bet",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub bets: Vec<BetSet>,
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_strategy_is_mixed() {
        assert_eq!(Strategy::from("HOT".to_string()), Strategy::Hot);
        assert_eq!(Strategy::from("consecutive".to_string()), Strategy::Consecutive);
        assert_eq!(Strategy::from("whatever".to_string()), Strategy::Ai);
    }

    #[test]
    fn multi_period_single_bet_wins_over_strategy() {
        assert_eq!(
            BetMode::resolve(Strategy::Consecutive, 5, 1),
            BetMode::MultiPeriodSingleBet
        );
        assert_eq!(BetMode::resolve(Strategy::Consecutive, 5, 2), BetMode::Consecutive);
        assert_eq!(BetMode::resolve(Strategy::Hot, 1, 1), BetMode::MultiBet);
    }

    #[test]
    fn draw_result_accepts_sparse_client_payload() {
        let d: DrawResult = serde_json::from_str(r#"{"numbers":[1,2,3]}"#).unwrap();
        assert_eq!(d.numbers, vec![1, 2, 3]);
        assert!(d.draw_time.is_none());
        assert!(d.draw_number.is_empty());
    }
}
