use serde_json::Value;

/// Candidate bets pulled out of a model reply, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReply {
    pub bets: Vec<Vec<u8>>,
    pub reasoning: String,
}

/// Parse the JSON object embedded in a completion.
///
/// The span from the first `{` to the last `}` is parsed; `bets` is
/// preferred, a bare `numbers` array becomes a single bet. A reply without
/// usable JSON yields no bets and keeps the raw text as reasoning.
pub fn parse_reply(content: &str) -> ParsedReply {
    let Some(obj) = extract_json_object(content) else {
        return ParsedReply { bets: Vec::new(), reasoning: content.trim().to_string() };
    };

    let reasoning = obj
        .get("reasoning")
        .and_then(|r| r.as_str())
        .unwrap_or("")
        .to_string();

    let bets = match obj.get("bets").and_then(|b| b.as_array()) {
        Some(list) => list
            .iter()
            .filter_map(|bet| bet.as_array())
            .map(|bet| bet.iter().filter_map(as_number).collect::<Vec<u8>>())
            .collect(),
        None => match obj.get("numbers").and_then(|n| n.as_array()) {
            Some(numbers) => {
                let mut bet: Vec<u8> = numbers.iter().filter_map(as_number).collect();
                bet.sort_unstable();
                vec![bet]
            }
            None => Vec::new(),
        },
    };

    ParsedReply { bets, reasoning }
}

fn extract_json_object(content: &str) -> Option<Value> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: Value = serde_json::from_str(&content[start..=end]).ok()?;
    value.is_object().then_some(value)
}

/// Integer in u8 range, given either as a JSON number or a numeric string.
fn as_number(v: &Value) -> Option<u8> {
    let n = match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    u8::try_from(n).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bets_wrapped_in_prose() {
        let reply = "Here you go:\n```json\n{\"bets\": [[3, 1, 2], [10, 11, 12]], \"reasoning\": \"hot\"}\n```";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.bets, vec![vec![3, 1, 2], vec![10, 11, 12]]);
        assert_eq!(parsed.reasoning, "hot");
    }

    #[test]
    fn legacy_numbers_become_one_sorted_bet() {
        let parsed = parse_reply(r#"{"numbers": [9, 4, 7], "reasoning": "old format"}"#);
        assert_eq!(parsed.bets, vec![vec![4, 7, 9]]);
    }

    #[test]
    fn numeric_strings_are_accepted_and_junk_dropped() {
        let parsed = parse_reply(r#"{"bets": [["5", 6, 7.0, -1, 300, "x", null], "oops"]}"#);
        assert_eq!(parsed.bets, vec![vec![5, 6, 7]]);
        assert_eq!(parsed.reasoning, "");
    }

    #[test]
    fn prose_only_reply_keeps_text_as_reasoning() {
        let parsed = parse_reply("  I think 12 and 13 look good.  ");
        assert!(parsed.bets.is_empty());
        assert_eq!(parsed.reasoning, "I think 12 and 13 look good.");
    }

    #[test]
    fn broken_json_is_not_fatal() {
        let parsed = parse_reply(r#"{"bets": [[1, 2, 3]"#);
        assert!(parsed.bets.is_empty());
        assert!(parse_reply("} backwards {").bets.is_empty());
    }
}
