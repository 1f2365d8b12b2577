pub mod cost;
pub mod prize;

pub use cost::{analyze_cost, CostAnalysis};
pub use prize::{check_prizes, parse_bets_text, PrizeCheck};
