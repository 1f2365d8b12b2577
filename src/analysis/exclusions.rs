use crate::analysis::frequency::FrequencyTable;
use crate::config::heuristics::{COLDEST_COUNT, LOWEST_BLOCK_COUNT};
use crate::selector::ExclusionSet;
use crate::types::{BetMode, DrawResult, Strategy};

/// The three exclusion sources of one analysis request, kept apart so the
/// prompt can list them separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPlan {
    /// Numbers of the latest draw.
    pub last_draw: Vec<u8>,
    /// Never or rarely drawn numbers in the window.
    pub coldest: Vec<u8>,
    /// Members of the least drawn blocks.
    pub lowest_blocks: Vec<u8>,
}

impl ExclusionPlan {
    /// Exclusions applied to a normal recommendation.
    ///
    /// Multi-period single bets exclude nothing. Otherwise the coldest numbers
    /// and the lowest blocks are excluded (lists supplied by the client win
    /// when non-empty), plus the latest draw unless the strategy is
    /// consecutive.
    pub fn derive(
        mode: BetMode,
        strategy: Strategy,
        draws: &[DrawResult],
        table: &FrequencyTable,
        client_coldest: &[u8],
        client_blocks: &[u8],
    ) -> Self {
        if mode == BetMode::MultiPeriodSingleBet {
            return Self::default();
        }
        let mut plan = Self::full(draws, table, client_coldest, client_blocks);
        if strategy == Strategy::Consecutive {
            plan.last_draw.clear();
        }
        plan
    }

    /// All three sources, used for error fallbacks.
    pub fn full(
        draws: &[DrawResult],
        table: &FrequencyTable,
        client_coldest: &[u8],
        client_blocks: &[u8],
    ) -> Self {
        let last_draw = draws.first().map(|d| d.numbers.clone()).unwrap_or_default();
        let coldest = if client_coldest.is_empty() {
            table.coldest_numbers(COLDEST_COUNT)
        } else {
            client_coldest.to_vec()
        };
        let lowest_blocks = if client_blocks.is_empty() {
            table.lowest_block_numbers(LOWEST_BLOCK_COUNT)
        } else {
            client_blocks.to_vec()
        };
        Self { last_draw, coldest, lowest_blocks }
    }

    pub fn exclusion_set(&self) -> ExclusionSet {
        self.last_draw
            .iter()
            .chain(&self.coldest)
            .chain(&self.lowest_blocks)
            .copied()
            .collect()
    }
}
