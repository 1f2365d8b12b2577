use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::advisor::prompt::{self, PromptContext};
use crate::advisor::{parse_reply, CompletionClient};
use crate::analysis::{ExclusionPlan, FrequencyTable};
use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::config::heuristics::PRIORITY_COUNT;
use crate::config::{DEFAULT_PERIODS, MAX_BETS, MAX_STARS};
use crate::error::{AppError, Result};
use crate::selector::{
    select_many_random, validate_and_repair, ExclusionSet, RepairParams, SelectionMode,
};
use crate::types::{BetMode, DrawResult, Recommendation, Strategy};

/// Body of `POST /api/ai-analysis`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub strategy: Strategy,
    pub stars: usize,
    #[serde(default = "default_bets")]
    pub bets: usize,
    #[serde(default = "default_periods")]
    pub periods: usize,
    /// Draws the dashboard is looking at, newest first. Empty means today's.
    #[serde(default)]
    pub historical_data: Vec<DrawResult>,
    #[serde(default)]
    pub coldest_numbers: Vec<u8>,
    #[serde(default)]
    pub lowest_block_numbers: Vec<u8>,
}

fn default_bets() -> usize {
    1
}

fn default_periods() -> usize {
    DEFAULT_PERIODS
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Recommended(Recommendation),
    /// The completion call failed; `fallback` is a random batch that still
    /// honours every exclusion.
    Fallback { error: String, fallback: Recommendation },
}

/// Counters and histogram the pipeline reports into.
pub struct Telemetry<'a> {
    pub health: &'a HealthState,
    pub latency: &'a LatencyStats,
}

pub fn validate(req: &AnalysisRequest) -> Result<()> {
    if !(1..=MAX_STARS).contains(&req.stars) {
        return Err(AppError::InvalidRequest(format!(
            "stars must be between 1 and {MAX_STARS}, got {}",
            req.stars
        )));
    }
    if !(1..=MAX_BETS).contains(&req.bets) {
        return Err(AppError::InvalidRequest(format!(
            "bets must be between 1 and {MAX_BETS}, got {}",
            req.bets
        )));
    }
    Ok(())
}

/// Ask the model for bets and force its answer into a valid batch.
///
/// Bad parameters and a missing client are errors; everything after that
/// produces bets of the requested shape.
pub async fn recommend(
    llm: Option<&dyn CompletionClient>,
    req: &AnalysisRequest,
    draws: &[DrawResult],
    telemetry: Telemetry<'_>,
) -> Result<Outcome> {
    validate(req)?;
    let llm = llm.ok_or(AppError::MissingApiKey)?;

    let periods = req.periods.max(1);
    let mode = BetMode::resolve(req.strategy, periods, req.bets);
    let table = FrequencyTable::from_draws(draws, periods);
    let plan = ExclusionPlan::derive(
        mode,
        req.strategy,
        draws,
        &table,
        &req.coldest_numbers,
        &req.lowest_block_numbers,
    );
    let exclusions = plan.exclusion_set();
    let priority = table.priority_numbers(&exclusions, PRIORITY_COUNT);
    let selection = if req.strategy == Strategy::Consecutive {
        SelectionMode::Consecutive
    } else {
        SelectionMode::Free
    };

    info!(
        strategy = %req.strategy,
        mode = %mode,
        stars = req.stars,
        bets = req.bets,
        periods,
        draws = table.draws(),
        excluded = exclusions.len(),
        "[ADVISOR] requesting recommendation",
    );
    if !exclusions.is_empty() {
        debug!(excluded = ?exclusions.numbers(), "[ADVISOR] exclusions");
    }

    let prompt = prompt::build(&PromptContext {
        strategy: req.strategy,
        mode,
        stars: req.stars,
        periods,
        bets: req.bets,
        plan: &plan,
        table: &table,
    });

    let started = Instant::now();
    let reply = llm.complete(&prompt).await;
    telemetry.latency.record(started.elapsed());

    let mut rng = StdRng::from_entropy();

    match reply {
        Ok(content) => {
            let parsed = parse_reply(&content);
            let candidates = if parsed.bets.is_empty() {
                warn!("[ADVISOR] reply held no bets, using random bets");
                telemetry.health.inc_empty_replies();
                select_many_random(&mut rng, req.bets, req.stars, &exclusions)
            } else {
                parsed.bets
            };
            let params = RepairParams {
                bets_count: req.bets,
                stars: req.stars,
                exclusions: &exclusions,
                mode: selection,
                priority: &priority,
            };
            let bets = validate_and_repair(&mut rng, &candidates, &params);
            let reasoning = if parsed.reasoning.trim().is_empty() {
                "Numbers picked from recent frequency; the model gave no explanation.".to_string()
            } else {
                parsed.reasoning
            };
            Ok(Outcome::Recommended(Recommendation { bets, reasoning }))
        }
        Err(e) => {
            warn!("[ADVISOR] completion failed: {e}");
            telemetry.health.inc_llm_failures();

            let full = ExclusionPlan::full(
                draws,
                &table,
                &req.coldest_numbers,
                &req.lowest_block_numbers,
            )
            .exclusion_set();
            let bets = fallback_bets(&mut rng, req, selection, &full, &table);
            Ok(Outcome::Fallback {
                error: e.to_string(),
                fallback: Recommendation {
                    bets,
                    reasoning: "AI analysis is unavailable; these bets are random picks that avoid \
                                the previous draw, the coldest numbers and the weakest blocks."
                        .to_string(),
                },
            })
        }
    }
}

fn fallback_bets(
    rng: &mut StdRng,
    req: &AnalysisRequest,
    selection: SelectionMode,
    exclusions: &ExclusionSet,
    table: &FrequencyTable,
) -> Vec<Vec<u8>> {
    let priority = table.priority_numbers(exclusions, PRIORITY_COUNT);
    let candidates = select_many_random(rng, req.bets, req.stars, exclusions);
    let params = RepairParams {
        bets_count: req.bets,
        stars: req.stars,
        exclusions,
        mode: selection,
        priority: &priority,
    };
    validate_and_repair(rng, &candidates, &params)
}
