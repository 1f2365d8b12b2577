use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::config::{
    Config, DRAW_INTERVAL_MINUTES, DRAW_PAGE_SIZE, DRAW_SIZE, FIRST_DRAW_MINUTES, LOTTERY_USER_AGENT,
};
use crate::error::{AppError, Result};
use crate::selector::in_domain;
use crate::types::{DrawResult, DrawSource};

/// Fetch all of `date`'s draws (newest first). Upstream trouble is logged and
/// reported as an empty list with `DrawSource::None`, never as an error.
pub async fn fetch_draws(
    client: &reqwest::Client,
    cfg: &Config,
    date: &str,
) -> (Vec<DrawResult>, DrawSource) {
    match fetch_from_official_api(client, cfg, date).await {
        Ok(draws) if !draws.is_empty() => {
            info!(date, draws = draws.len(), "[FETCH] official API returned {} draws", draws.len());
            (draws, DrawSource::OfficialApi)
        }
        Ok(_) => {
            warn!(date, "[FETCH] official API returned no usable draws");
            (Vec::new(), DrawSource::None)
        }
        Err(e) => {
            warn!(date, "[FETCH] official API failed: {e}");
            (Vec::new(), DrawSource::None)
        }
    }
}

async fn fetch_from_official_api(
    client: &reqwest::Client,
    cfg: &Config,
    date: &str,
) -> Result<Vec<DrawResult>> {
    let url = format!(
        "{}/Lottery/BingoResult?openDate={}&pageNum=1&pageSize={}",
        cfg.lottery_api_url.trim_end_matches('/'),
        date,
        DRAW_PAGE_SIZE
    );

    let resp = client
        .get(&url)
        .header(reqwest::header::USER_AGENT, LOTTERY_USER_AGENT)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    let status = resp.status();
    debug!(%status, "[FETCH] official API responded");
    if !status.is_success() {
        return Err(AppError::Upstream(format!("lottery API returned {status}")));
    }

    let body: serde_json::Value = resp.json().await?;
    parse_bingo_response(&body, date).ok_or_else(|| {
        AppError::Upstream("lottery API response did not match the expected shape".to_string())
    })
}

/// Normalize the official `BingoResult` payload:
/// `{ rtCode: 0, content: { bingoQueryResult: [{ drawTerm, bigShowOrder }, ...] } }`.
///
/// The last four digits of `drawTerm` count draws over the year; the
/// smallest term in the page is the day's first draw. Every item with 20
/// valid balls is kept, in upstream order (newest first). Returns None when
/// `rtCode` is not 0 or the result list is missing.
pub fn parse_bingo_response(v: &serde_json::Value, date: &str) -> Option<Vec<DrawResult>> {
    if v.get("rtCode").and_then(|c| c.as_i64()) != Some(0) {
        return None;
    }
    let items = v
        .get("content")
        .and_then(|c| c.get("bingoQueryResult"))
        .and_then(|r| r.as_array())?;

    let Some(first_yearly) = items.iter().filter_map(yearly_sequence).min() else {
        return Some(Vec::new());
    };

    let draws = items
        .iter()
        .filter_map(|item| {
            let daily_no = yearly_sequence(item)? - first_yearly + 1;
            let numbers: Vec<u8> = item
                .get("bigShowOrder")?
                .as_array()?
                .iter()
                .filter_map(parse_ball)
                .collect();
            if numbers.len() != DRAW_SIZE {
                return None;
            }
            Some(DrawResult {
                draw_number: format!("{daily_no:03}"),
                draw_date: date.to_string(),
                draw_time: Some(draw_time(daily_no as u32)),
                numbers,
            })
        })
        .collect();

    Some(draws)
}

/// Last four digits of `drawTerm`, which may be a string or a number.
fn yearly_sequence(item: &serde_json::Value) -> Option<i64> {
    let term = match item.get("drawTerm")? {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if !term.is_ascii() {
        return None;
    }
    let tail = &term[term.len().saturating_sub(4)..];
    tail.parse().ok()
}

fn parse_ball(v: &serde_json::Value) -> Option<u8> {
    let n = match v {
        serde_json::Value::String(s) => s.trim().parse::<u8>().ok()?,
        serde_json::Value::Number(n) => u8::try_from(n.as_u64()?).ok()?,
        _ => return None,
    };
    in_domain(n).then_some(n)
}

/// Scheduled time of the `daily_no`-th draw; late overflow is pinned to 23:55.
pub fn draw_time(daily_no: u32) -> String {
    let minutes = FIRST_DRAW_MINUTES + daily_no.saturating_sub(1) * DRAW_INTERVAL_MINUTES;
    let (hour, minute) = (minutes / 60, minutes % 60);
    if hour <= 23 {
        format!("{hour:02}:{minute:02}")
    } else {
        "23:55".to_string()
    }
}

/// Today's UTC date as YYYY-MM-DD.
pub fn today_utc() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    unix_days_to_iso_date((secs / 86_400) as i64)
}

/// Civil date of a day count since 1970-01-01 (proleptic Gregorian).
pub fn unix_days_to_iso_date(days: i64) -> String {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    format!("{year:04}-{month:02}-{day:02}")
}
