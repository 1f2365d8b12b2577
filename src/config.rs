use crate::error::{AppError, Result};

pub const LOTTERY_API_URL: &str = "https://api.taiwanlottery.com/TLCAPIWeB";
pub const LLM_API_URL: &str = "https://api.groq.com/openai/v1";
pub const LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// Sampling temperature and reply budget sent with every completion request.
pub const LLM_TEMPERATURE: f64 = 0.7;
pub const LLM_MAX_TOKENS: u32 = 2048;

/// Browser-like UA; the lottery API rejects bare client identifiers.
pub const LOTTERY_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Page size of the results query. A full day holds 203 draws at most.
pub const DRAW_PAGE_SIZE: usize = 202;

/// Numbers are drawn from 1..=NUMBER_MAX.
pub const NUMBER_MAX: u8 = 80;

/// Numbers per official draw.
pub const DRAW_SIZE: usize = 20;

/// First draw of the day is at 07:05, one draw every 5 minutes after that.
pub const FIRST_DRAW_MINUTES: u32 = 7 * 60 + 5;
pub const DRAW_INTERVAL_MINUTES: u32 = 5;

/// Upper bounds accepted on the analysis endpoint.
pub const MAX_STARS: usize = 10;
pub const MAX_BETS: usize = 20;

/// Bounds on the cost and prize calculators (the dashboard offers 1-10).
pub const MAX_MULTIPLE: u64 = 10;
pub const MAX_PLAN_PERIODS: u64 = 10;

/// Default analysis parameters when the client leaves them out.
pub const DEFAULT_PERIODS: usize = 5;
pub const DEFAULT_DATA_PERIODS: usize = 50;
pub const DEFAULT_FREQUENCY_RANGE: usize = 20;

/// Exclusion and ranking sizes used by the frequency heuristics.
pub mod heuristics {
    /// Size of the "coldest numbers" exclusion list.
    pub const COLDEST_COUNT: usize = 20;
    /// Numbers per frequency block (1-4, 5-8, ...).
    pub const BLOCK_SIZE: u8 = 4;
    /// How many of the least frequent blocks are excluded.
    pub const LOWEST_BLOCK_COUNT: usize = 2;
    /// Hot numbers used as anchors for consecutive runs.
    pub const PRIORITY_COUNT: usize = 20;
    /// Hot numbers offered to the model in multi-period mode.
    pub const LONG_TERM_HOT_COUNT: usize = 15;
    /// Hot/cold numbers shown on the dashboard.
    pub const TOP_LIST_COUNT: usize = 10;
    /// Ranked consecutive runs are drawn from this top share.
    pub const TOP_CANDIDATE_FRACTION: f64 = 0.3;
}

/// Official prize schedule in NT$.
pub mod prizes {
    pub const BASE_BET_AMOUNT: u64 = 25;

    /// (stars, hits, prize) for one unit bet.
    pub const PRIZE_TABLE: &[(usize, usize, u64)] = &[
        (1, 1, 75),
        (2, 2, 150),
        (3, 2, 25),
        (3, 3, 1_000),
        (4, 2, 25),
        (4, 3, 150),
        (4, 4, 2_000),
        (5, 3, 50),
        (5, 4, 600),
        (5, 5, 10_000),
        (6, 3, 25),
        (6, 4, 200),
        (6, 5, 1_200),
        (6, 6, 50_000),
    ];
}

#[derive(Debug, Clone)]
pub struct Config {
    pub lottery_api_url: String,
    pub llm_api_url: String,
    pub llm_model: String,
    /// Completion API key (GROQ_API_KEY). Analysis requests fail without it.
    pub llm_api_key: Option<String>,
    pub log_level: String,
    pub api_port: u16,
    /// Timeout applied to every upstream request (HTTP_TIMEOUT_SECS)
    pub http_timeout_secs: u64,
    /// How long fetched draws are served from memory (DRAW_CACHE_TTL_SECS)
    pub draw_cache_ttl_secs: u64,
    /// Background re-fetch period, 0 disables it (DRAW_REFRESH_INTERVAL_SECS)
    pub draw_refresh_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            lottery_api_url: std::env::var("LOTTERY_API_URL")
                .unwrap_or_else(|_| LOTTERY_API_URL.to_string()),
            llm_api_url: std::env::var("LLM_API_URL").unwrap_or_else(|_| LLM_API_URL.to_string()),
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| LLM_MODEL.to_string()),
            llm_api_key: std::env::var("GROQ_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .unwrap_or(30),
            draw_cache_ttl_secs: std::env::var("DRAW_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse::<u64>()
                .unwrap_or(60),
            draw_refresh_interval_secs: std::env::var("DRAW_REFRESH_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<u64>()
                .unwrap_or(300),
        })
    }

    /// Defaults without touching the environment.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            lottery_api_url: "http://127.0.0.1:9".to_string(),
            llm_api_url: "http://127.0.0.1:9".to_string(),
            llm_model: LLM_MODEL.to_string(),
            llm_api_key: Some("test-key".to_string()),
            log_level: "debug".to_string(),
            api_port: 0,
            http_timeout_secs: 1,
            draw_cache_ttl_secs: 60,
            draw_refresh_interval_secs: 0,
        }
    }
}
