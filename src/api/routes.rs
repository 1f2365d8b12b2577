use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::advisor::CompletionClient;
use crate::analysis::{BlockStat, FrequencyTable, NumberCount};
use crate::api::health::HealthState;
use crate::api::latency::{LatencySummary, UpstreamLatency};
use crate::betting::{analyze_cost, check_prizes, parse_bets_text, CostAnalysis, PrizeCheck};
use crate::config::heuristics::{COLDEST_COUNT, LOWEST_BLOCK_COUNT, TOP_LIST_COUNT};
use crate::config::{
    DEFAULT_DATA_PERIODS, DEFAULT_FREQUENCY_RANGE, MAX_BETS, MAX_MULTIPLE, MAX_PLAN_PERIODS, MAX_STARS,
};
use crate::draw_refresh::DrawFeed;
use crate::error::AppError;
use crate::fetcher::today_utc;
use crate::recommend::{recommend, validate, AnalysisRequest, Outcome, Telemetry};
use crate::selector::in_domain;
use crate::types::{DrawResult, DrawSource};

#[derive(Clone)]
pub struct ApiState {
    pub feed: Arc<DrawFeed>,
    /// None when no completion API key is configured.
    pub llm: Option<Arc<dyn CompletionClient>>,
    pub health: Arc<HealthState>,
    pub latency: Arc<UpstreamLatency>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/bingo-data", get(get_bingo_data))
        .route("/api/ai-analysis", post(post_ai_analysis))
        .route("/api/frequency", get(get_frequency))
        .route("/api/cost-analysis", post(post_cost_analysis))
        .route("/api/prize-check", post(post_prize_check))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query and body structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct BingoDataQuery {
    pub periods: Option<usize>,
}

#[derive(Deserialize)]
pub struct FrequencyQuery {
    pub range: Option<usize>,
}

#[derive(Deserialize)]
pub struct CostRequest {
    pub stars: usize,
    #[serde(default = "one")]
    pub multiple: u64,
    #[serde(default = "one")]
    pub periods: u64,
    #[serde(default = "one")]
    pub bets: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeRequest {
    /// Pasted bets, one per line.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub bets: Option<Vec<Vec<i64>>>,
    #[serde(default = "one")]
    pub multiple: u64,
    /// Numbers to check against; the latest draw when absent.
    #[serde(default)]
    pub draw_numbers: Option<Vec<u8>>,
}

fn one() -> u64 {
    1
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDebug {
    pub requested_periods: usize,
    pub returned_periods: usize,
    pub total_available: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BingoDataResponse {
    pub success: bool,
    pub data: Vec<DrawResult>,
    pub source: DrawSource,
    pub total_today: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub debug: DataDebug,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyResponse {
    pub range: usize,
    pub draws: usize,
    pub frequency: Vec<NumberCount>,
    pub hot: Vec<NumberCount>,
    pub cold: Vec<NumberCount>,
    pub blocks: Vec<BlockStat>,
    pub coldest_numbers: Vec<u8>,
    pub lowest_block_numbers: Vec<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeResponse {
    #[serde(flatten)]
    pub check: PrizeCheck,
    pub draw_numbers: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_number: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub last_fetch_ok: bool,
    pub last_fetch_at_ns: u64,
    pub fetch_failures: u64,
    pub cached_draws: usize,
    pub cache_age_secs: Option<u64>,
    pub llm_configured: bool,
    pub llm_failures: u64,
    pub empty_replies: u64,
}

#[derive(Serialize)]
pub struct LatencyResponse {
    pub lottery: LatencySummary,
    pub llm: LatencySummary,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_bingo_data(
    State(state): State<ApiState>,
    Query(params): Query<BingoDataQuery>,
) -> Json<BingoDataResponse> {
    let requested = params.periods.unwrap_or(DEFAULT_DATA_PERIODS);
    let (draws, source) = state.feed.today().await;

    let data: Vec<DrawResult> = draws.iter().take(requested).cloned().collect();
    let message = draws
        .is_empty()
        .then(|| "No draws are available for today yet".to_string());

    Json(BingoDataResponse {
        success: !draws.is_empty(),
        total_today: draws.len(),
        source,
        message,
        debug: DataDebug {
            requested_periods: requested,
            returned_periods: data.len(),
            total_available: draws.len(),
        },
        data,
    })
}

async fn post_ai_analysis(
    State(state): State<ApiState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Response, AppError> {
    validate(&req)?;

    let draws: Arc<Vec<DrawResult>> = if req.historical_data.is_empty() {
        state.feed.today().await.0
    } else {
        Arc::new(req.historical_data.clone())
    };

    let outcome = recommend(
        state.llm.as_deref(),
        &req,
        &draws,
        Telemetry { health: &state.health, latency: &state.latency.llm },
    )
    .await?;

    let response = match outcome {
        Outcome::Recommended(rec) => {
            Json(json!({ "success": true, "data": rec })).into_response()
        }
        Outcome::Fallback { error, fallback } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": error, "fallback": fallback })),
        )
            .into_response(),
    };
    Ok(response)
}

async fn get_frequency(
    State(state): State<ApiState>,
    Query(params): Query<FrequencyQuery>,
) -> Json<FrequencyResponse> {
    let range = params.range.unwrap_or(DEFAULT_FREQUENCY_RANGE);
    let (draws, _) = state.feed.today().await;
    let table = FrequencyTable::from_draws(&draws, range);

    Json(FrequencyResponse {
        range,
        draws: table.draws(),
        frequency: table.counts(),
        hot: table.hottest(TOP_LIST_COUNT),
        cold: table.coldest(TOP_LIST_COUNT),
        blocks: table.blocks(),
        coldest_numbers: table.coldest_numbers(COLDEST_COUNT),
        lowest_block_numbers: table.lowest_block_numbers(LOWEST_BLOCK_COUNT),
    })
}

async fn post_cost_analysis(Json(req): Json<CostRequest>) -> Result<Json<CostAnalysis>, AppError> {
    if !(1..=MAX_STARS).contains(&req.stars) {
        return Err(AppError::InvalidRequest(format!(
            "stars must be between 1 and {MAX_STARS}"
        )));
    }
    check_bound("multiple", req.multiple, MAX_MULTIPLE)?;
    check_bound("periods", req.periods, MAX_PLAN_PERIODS)?;
    check_bound("bets", req.bets, MAX_BETS as u64)?;
    Ok(Json(analyze_cost(req.stars, req.multiple, req.periods, req.bets)?))
}

fn check_bound(name: &str, value: u64, max: u64) -> Result<(), AppError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(format!("{name} must be between 1 and {max}")))
    }
}

async fn post_prize_check(
    State(state): State<ApiState>,
    Json(req): Json<PrizeRequest>,
) -> Result<Json<PrizeResponse>, AppError> {
    let bets = match (&req.bets, &req.text) {
        (Some(bets), _) if !bets.is_empty() => sanitize_bets(bets),
        (_, Some(text)) => parse_bets_text(text),
        _ => Vec::new(),
    };
    if bets.is_empty() {
        return Err(AppError::InvalidRequest("no valid bets to check".to_string()));
    }
    check_bound("multiple", req.multiple, MAX_MULTIPLE)?;

    let (draw_numbers, draw_number) = match req.draw_numbers.filter(|d| !d.is_empty()) {
        Some(numbers) => (numbers, None),
        None => {
            let (draws, _) = state.feed.today().await;
            let latest = draws
                .first()
                .ok_or_else(|| AppError::NotFound("no draw is available to check against".to_string()))?;
            (latest.numbers.clone(), Some(latest.draw_number.clone()))
        }
    };

    let check = check_prizes(&bets, &draw_numbers, req.multiple)?;
    Ok(Json(PrizeResponse { check, draw_numbers, draw_number }))
}

/// Same rules as pasted text: numbers outside 1..=80 and repeats are dropped,
/// bets left empty are skipped.
fn sanitize_bets(raw: &[Vec<i64>]) -> Vec<Vec<u8>> {
    raw.iter()
        .filter_map(|bet| {
            let mut clean: Vec<u8> = Vec::with_capacity(bet.len());
            for &n in bet {
                let Ok(n) = u8::try_from(n) else { continue };
                if in_domain(n) && !clean.contains(&n) {
                    clean.push(n);
                }
            }
            (!clean.is_empty()).then_some(clean)
        })
        .collect()
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let date = today_utc();
    let cache = state.feed.cache();
    Json(HealthResponse {
        status: "ok",
        last_fetch_ok: state.health.last_fetch_ok(),
        last_fetch_at_ns: state.health.last_fetch_at_ns(),
        fetch_failures: state.health.fetch_failures(),
        cached_draws: cache.draw_count(&date),
        cache_age_secs: cache.age_secs(&date),
        llm_configured: state.llm.is_some(),
        llm_failures: state.health.llm_failures(),
        empty_replies: state.health.empty_replies(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    Json(LatencyResponse {
        lottery: state.latency.lottery.summary(),
        llm: state.latency.llm.summary(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::Prompt;
    use crate::config::Config;
    use crate::error::Result;
    use crate::state::DrawCache;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    struct CannedClient(Option<&'static str>);

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn complete(&self, _prompt: &Prompt) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| AppError::Upstream("completion API returned 500".to_string()))
        }
    }

    fn draws() -> Vec<DrawResult> {
        (0..3u8)
            .map(|i| DrawResult {
                draw_number: format!("{:03}", 3 - i),
                draw_date: today_utc(),
                draw_time: None,
                numbers: (1..=20).map(|n| n + i * 20).collect(),
            })
            .collect()
    }

    fn state(llm: Option<Arc<dyn CompletionClient>>, seed: bool) -> ApiState {
        let health = Arc::new(HealthState::new());
        let latency = Arc::new(UpstreamLatency::new());
        let cache = DrawCache::new();
        if seed {
            cache.insert(&today_utc(), draws(), DrawSource::OfficialApi);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        let feed = Arc::new(DrawFeed::new(
            Config::for_tests(),
            http,
            cache,
            Arc::clone(&health),
            Arc::clone(&latency),
        ));
        ApiState { feed, llm, health, latency }
    }

    fn canned(reply: Option<&'static str>) -> Option<Arc<dyn CompletionClient>> {
        Some(Arc::new(CannedClient(reply)))
    }

    async fn call(state: ApiState, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn bingo_data_limits_periods() {
        let (status, body) = call(state(None, true), get("/api/bingo-data?periods=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["source"], "official-api");
        assert_eq!(body["totalToday"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"][0]["drawNumber"], "003");
        assert_eq!(body["debug"]["requestedPeriods"], 2);
        assert_eq!(body["debug"]["returnedPeriods"], 2);
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn bingo_data_without_draws_explains_itself() {
        let (status, body) = call(state(None, false), get("/api/bingo-data")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["source"], "none");
        assert_eq!(body["debug"]["requestedPeriods"], 50);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn analysis_returns_repaired_bets() {
        let st = state(canned(Some(r#"{"bets": [[21, 22, 23]], "reasoning": "ok"}"#)), true);
        let (status, body) = call(
            st,
            post("/api/ai-analysis", json!({ "strategy": "hot", "stars": 3, "bets": 2, "periods": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let bets = body["data"]["bets"].as_array().unwrap();
        assert_eq!(bets.len(), 2);
        for bet in bets {
            let nums: Vec<u64> = bet.as_array().unwrap().iter().map(|n| n.as_u64().unwrap()).collect();
            assert_eq!(nums.len(), 3);
            // 1..=20 is the latest draw, 21..=40 were never drawn.
            assert!(nums.iter().all(|&n| n > 40), "{nums:?}");
        }
        assert_eq!(body["data"]["reasoning"], "ok");
    }

    #[tokio::test]
    async fn analysis_rejects_bad_stars() {
        let st = state(canned(Some("{}")), true);
        let (status, body) = call(st, post("/api/ai-analysis", json!({ "stars": 11 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("stars"));
    }

    #[tokio::test]
    async fn analysis_without_key_is_server_error() {
        let (status, body) = call(state(None, true), post("/api/ai-analysis", json!({ "stars": 3 }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("GROQ_API_KEY"));
        assert!(body.get("fallback").is_none());
    }

    #[tokio::test]
    async fn analysis_failure_carries_fallback() {
        let st = state(canned(None), true);
        let (status, body) =
            call(st.clone(), post("/api/ai-analysis", json!({ "stars": 4, "bets": 3, "periods": 1 }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
        assert_eq!(body["fallback"]["bets"].as_array().unwrap().len(), 3);
        assert_eq!(st.health.llm_failures(), 1);
        assert_eq!(st.latency.llm.summary().samples, 1);
    }

    #[tokio::test]
    async fn frequency_counts_window() {
        let (status, body) = call(state(None, true), get("/api/frequency?range=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["draws"], 2);
        assert_eq!(body["frequency"].as_array().unwrap().len(), 80);
        assert_eq!(body["hot"].as_array().unwrap().len(), 10);
        assert_eq!(body["blocks"].as_array().unwrap().len(), 20);
        assert_eq!(body["coldestNumbers"].as_array().unwrap().len(), 20);
        // 1..=40 were drawn in the two newest draws.
        assert_eq!(body["hot"][0]["number"], 1);
        assert_eq!(body["cold"][0]["number"], 41);
    }

    #[tokio::test]
    async fn cost_analysis_route() {
        let (status, body) = call(
            state(None, false),
            post("/api/cost-analysis", json!({ "stars": 3, "multiple": 2, "periods": 3, "bets": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCost"], 300);
        assert_eq!(body["maxPrize"], 1000);

        let (status, _) =
            call(state(None, false), post("/api/cost-analysis", json!({ "stars": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cost_analysis_bounds() {
        for body in [
            json!({ "stars": 3, "multiple": 11 }),
            json!({ "stars": 3, "periods": 11 }),
            json!({ "stars": 3, "bets": 21 }),
            json!({ "stars": 3, "multiple": 0 }),
            json!({ "stars": 6, "multiple": u64::MAX / 10 }),
            json!({ "stars": 6, "multiple": 10, "periods": u64::MAX, "bets": u64::MAX }),
        ] {
            let (status, resp) = call(state(None, false), post("/api/cost-analysis", body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(resp["error"].is_string());
        }

        let (status, body) = call(
            state(None, false),
            post("/api/cost-analysis", json!({ "stars": 10, "multiple": 10, "periods": 10, "bets": 20 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCost"], 25 * 10 * 10 * 20);
    }

    #[tokio::test]
    async fn prize_check_bounds_multiple() {
        for multiple in [0, 11, u64::MAX / 10] {
            let (status, _) = call(
                state(None, false),
                post(
                    "/api/prize-check",
                    json!({ "bets": [[1, 2, 3, 4, 5, 6]], "drawNumbers": (1..=20).collect::<Vec<u8>>(), "multiple": multiple }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "multiple={multiple}");
        }

        let (status, body) = call(
            state(None, false),
            post(
                "/api/prize-check",
                json!({ "bets": [[1, 2, 3]], "drawNumbers": [1, 2, 3], "multiple": 10 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalPrize"], 10_000);
    }

    #[tokio::test]
    async fn prize_check_uses_latest_draw() {
        let (status, body) = call(
            state(None, true),
            post("/api/prize-check", json!({ "text": "41, 42, 43\n1, 2, 3" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["drawNumber"], "003");
        assert_eq!(body["betsChecked"], 2);
        assert_eq!(body["totalPrize"], 1000);
        assert_eq!(body["winningBets"][0]["betIndex"], 2);
        assert_eq!(body["profit"], 950);
    }

    #[tokio::test]
    async fn prize_check_errors() {
        let (status, _) =
            call(state(None, true), post("/api/prize-check", json!({ "text": "abc\n\n" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            call(state(None, false), post("/api/prize-check", json!({ "bets": [[1, 2, 3]] }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(
            state(None, false),
            post("/api/prize-check", json!({ "bets": [[1, 2, 99]], "drawNumbers": [1, 2, 3] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["winningBets"][0]["prize"], 150);
    }

    #[tokio::test]
    async fn health_and_latency() {
        let (status, body) = call(state(canned(None), true), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cachedDraws"], 3);
        assert_eq!(body["llmConfigured"], true);

        let (status, body) = call(state(None, true), get("/stats/latency")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lottery"]["samples"], 0);
        assert!(body["llm"]["p50_us"].is_null());
    }
}
