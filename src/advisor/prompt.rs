//! Prompt text sent to the completion model, one layout per betting mode.

use crate::analysis::{ExclusionPlan, FrequencyTable};
use crate::config::heuristics::{LONG_TERM_HOT_COUNT, PRIORITY_COUNT};
use crate::types::{BetMode, Strategy};

const REPLY_FORMAT: &str =
    r#"Reply with JSON only: {"bets": [[numbers of bet 1], [numbers of bet 2], ...], "reasoning": "short explanation"}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

pub struct PromptContext<'a> {
    pub strategy: Strategy,
    pub mode: BetMode,
    pub stars: usize,
    pub periods: usize,
    pub bets: usize,
    pub plan: &'a ExclusionPlan,
    pub table: &'a FrequencyTable,
}

/// Minimum hits each bet aims for: 60% of the stars, at least 2.
pub fn hit_goal(stars: usize) -> usize {
    (stars * 6 / 10).max(2)
}

fn join(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build(ctx: &PromptContext<'_>) -> Prompt {
    match ctx.mode {
        BetMode::MultiPeriodSingleBet => multi_period(ctx),
        BetMode::Consecutive => consecutive(ctx),
        BetMode::MultiBet => multi_bet(ctx),
    }
}

fn analyst_intro(ctx: &PromptContext<'_>) -> String {
    format!(
        "You are a Taiwan Bingo Bingo analyst. Based on the draw history, recommend {} bets of {} numbers each (numbers 1-80).",
        ctx.bets, ctx.stars
    )
}

fn multi_period(ctx: &PromptContext<'_>) -> Prompt {
    let hot: Vec<u8> = ctx.table.sorted_desc().into_iter().take(LONG_TERM_HOT_COUNT).collect();
    let goal = hit_goal(ctx.stars);

    let system = format!(
        "{}\n\nThe player reuses one bet for {} draws, so pick numbers that stay frequent over many draws. \
         Build the bet from the top {LONG_TERM_HOT_COUNT} hot numbers. The realistic goal is a partial hit \
         ({goal} of {}) several times across those draws.\n\n{REPLY_FORMAT}",
        analyst_intro(ctx),
        ctx.periods,
        ctx.stars,
    );

    let focus = match ctx.strategy {
        Strategy::Hot => "Long-term hot strategy: choose the most stable combination from the hot list.",
        Strategy::Consecutive => {
            "Hot consecutive strategy: find one or two runs of consecutive numbers inside the hot list and fill the rest from it."
        }
        Strategy::Ai => "Long-term stability strategy: choose numbers that have stayed frequent throughout the history.",
    };

    let user = format!(
        "{focus}\n\n\
         Top {LONG_TERM_HOT_COUNT} hot numbers: {}\n\
         Draws played: {}\n\
         Bets per draw: {}\n\
         Numbers per bet: {}\n\
         Goal: hit at least {goal} numbers repeatedly within {} draws.\n\
         Sort every bet ascending.\n\n{REPLY_FORMAT}",
        join(&hot),
        ctx.periods,
        ctx.bets,
        ctx.stars,
        ctx.periods,
    );

    Prompt { system, user }
}

fn consecutive(ctx: &PromptContext<'_>) -> Prompt {
    let exclusions = ctx.plan.exclusion_set();
    let pool = exclusions.available_pool();
    let anchors = ctx.table.priority_numbers(&exclusions, PRIORITY_COUNT);
    let goal = hit_goal(ctx.stars);
    let example: Vec<u8> = (12..12 + ctx.stars.min(68) as u8).collect();

    let system = format!(
        "{}\n\nConsecutive strategy rules:\n\
         - Do not exclude the previous draw; runs often continue.\n\
         - Never use the coldest numbers: {}\n\
         - Never use the lowest-frequency blocks: {}\n\
         - Every bet must be {} fully consecutive numbers, e.g. [{}].\n\
         - Use different runs for different bets.\n\
         - Goal: hit at least {goal} of the {} numbers.\n\n{REPLY_FORMAT}",
        analyst_intro(ctx),
        join(&ctx.plan.coldest),
        join(&ctx.plan.lowest_blocks),
        ctx.stars,
        join(&example),
        ctx.stars,
    );

    let user = format!(
        "Hot consecutive strategy: take a hot number as the anchor and extend it backwards or forwards \
         into {} consecutive numbers.\n\n\
         Available pool ({} numbers): {}\n\
         Top {PRIORITY_COUNT} hot numbers (preferred anchors): {}\n\
         Excluded coldest numbers: {}\n\
         Excluded lowest-frequency blocks: {}\n\n\
         Rules:\n\
         1. Every bet is exactly {} consecutive numbers from the available pool.\n\
         2. Every run contains at least one hot number; prefer runs holding several.\n\
         3. Use a different anchor for every bet.\n\
         4. Analysis window: last {} draws; {} bets requested.\n\
         5. Goal: hit at least {goal} of {}.\n\n{REPLY_FORMAT}",
        ctx.stars,
        pool.len(),
        join(&pool),
        join(&anchors),
        join(&ctx.plan.coldest),
        join(&ctx.plan.lowest_blocks),
        ctx.stars,
        ctx.periods,
        ctx.bets,
        ctx.stars,
    );

    Prompt { system, user }
}

fn multi_bet(ctx: &PromptContext<'_>) -> Prompt {
    let exclusions = ctx.plan.exclusion_set();
    let pool = exclusions.available_pool();
    let ranked: Vec<u8> = ctx
        .table
        .sorted_desc()
        .into_iter()
        .filter(|&n| !exclusions.contains(n))
        .collect();
    let hot: Vec<u8> = ranked.iter().copied().take(LONG_TERM_HOT_COUNT).collect();
    let goal = hit_goal(ctx.stars);

    let system = format!(
        "{}\n\nMixed strategy rules:\n\
         - Never use the numbers of the previous draw: {}\n\
         - Never use the coldest numbers: {}\n\
         - Never use the lowest-frequency blocks: {}\n\
         - Freely mix hot numbers, moderately cold numbers and short runs such as 12,13 or 25,26,27.\n\
         - Give every bet a different mix; numbers may repeat across bets.\n\
         - Goal: partial hits ({goal} of {}).\n\n{REPLY_FORMAT}",
        analyst_intro(ctx),
        join(&ctx.plan.last_draw),
        join(&ctx.plan.coldest),
        join(&ctx.plan.lowest_blocks),
        ctx.stars,
    );

    let focus = match ctx.strategy {
        Strategy::Hot => format!(
            "Hot strategy: use only high-frequency numbers, no cold numbers or runs. \
             Hot numbers available: {}",
            join(&hot)
        ),
        Strategy::Consecutive => {
            "Consecutive strategy: include one or two short runs per bet and fill the rest with hot or spread numbers."
                .to_string()
        }
        Strategy::Ai => format!(
            "Use your own judgement over the last {} draws: mix hot numbers, moderately cold numbers and short runs.",
            ctx.periods
        ),
    };

    let user = format!(
        "{focus}\n\n\
         Hard constraints:\n\
         - Previous draw numbers (excluded): {}\n\
         - Coldest numbers (excluded): {}\n\
         - Lowest-frequency block numbers (excluded): {}\n\
         - Choose only from this pool: {}\n\n\
         History summary:\n\
         - Analysis window: last {} draws\n\
         - Bets requested: {}\n\
         - Numbers per bet: {}\n\
         - Goal per bet: at least {goal} hits\n\n\
         Sort every bet ascending.\n\n{REPLY_FORMAT}",
        join(&ctx.plan.last_draw),
        join(&ctx.plan.coldest),
        join(&ctx.plan.lowest_blocks),
        join(&pool),
        ctx.periods,
        ctx.bets,
        ctx.stars,
    );

    Prompt { system, user }
}
