//! LLM reply parsing.
//!
//! Decision replies are passed through to the engine, which owns action
//! parsing; this module only unwraps the `decision` field when the model
//! answered with the requested JSON object. Trade replies must become a
//! typed [`TradeResponse`] here.
//!
//! JSON is recovered with the same strategies in both cases: direct parse,
//! markdown code block, trailing-comma cleanup, and both combined.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use wayfarer_types::{TradeOffer, TradeResponse};

use crate::error::RunnerError;

/// The JSON object the decision template asks for.
#[derive(Debug, Deserialize)]
struct RawDecision {
    decision: String,
    #[serde(default)]
    reasoning: Option<String>,
}

/// The JSON object the trade template asks for.
#[derive(Debug, Deserialize)]
struct RawTradeReply {
    response: String,
    #[serde(default)]
    food: u32,
    #[serde(default)]
    water: u32,
    #[serde(default)]
    gold: u32,
}

/// The action text to hand back to the engine.
///
/// A JSON reply yields its `decision` field; anything else is returned
/// trimmed and the engine's parser deals with it.
pub fn decision_text(raw: &str) -> String {
    match try_json::<RawDecision>(raw) {
        Some(parsed) => {
            if let Some(reasoning) = parsed.reasoning {
                debug!(reasoning = %reasoning, "model reasoning");
            }
            parsed.decision.trim().to_owned()
        }
        None => raw.trim().to_owned(),
    }
}

/// Parse a negotiation reply.
///
/// Accepts the JSON object `{"response": "accept" | "reject" | "counter",
/// "food": n, "water": n, "gold": n}` where a counter asks for `food` and
/// `water` in exchange for `gold`. A bare `ACCEPT` or `REJECT` line also
/// works.
pub fn trade_response(raw: &str) -> Result<TradeResponse, RunnerError> {
    if let Some(reply) = try_json::<RawTradeReply>(raw) {
        return match reply.response.trim().to_lowercase().as_str() {
            "accept" => Ok(TradeResponse::Accept),
            "reject" => Ok(TradeResponse::Reject),
            "counter" | "counteroffer" | "counter_offer" => {
                Ok(TradeResponse::CounterOffer(TradeOffer {
                    food_to_player: reply.food,
                    water_to_player: reply.water,
                    gold_to_trader: reply.gold,
                    ..TradeOffer::default()
                }))
            }
            other => Err(RunnerError::Parse(format!("unknown trade response: {other}"))),
        };
    }

    let first = raw
        .split(|c: char| !c.is_ascii_alphabetic())
        .find(|word| !word.is_empty())
        .map(str::to_ascii_uppercase);
    match first.as_deref() {
        Some("ACCEPT") => Ok(TradeResponse::Accept),
        Some("REJECT") => Ok(TradeResponse::Reject),
        _ => Err(RunnerError::Parse(format!("no trade response in: {}", raw.trim()))),
    }
}

/// Deserialize `raw` as `T` through every recovery strategy.
fn try_json<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    let block = extract_json_from_codeblock(trimmed);
    [
        Some(trimmed.to_owned()),
        block.map(str::to_owned),
        Some(strip_trailing_commas(trimmed)),
        block.map(strip_trailing_commas),
    ]
    .into_iter()
    .flatten()
    .find_map(|candidate| serde_json::from_str(&candidate).ok())
}

/// Extract the body of the first markdown code block.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = text.get(open.checked_add(3)?..)?;
    let body_start = after_fence.find('\n').and_then(|nl| nl.checked_add(1))?;
    let body = after_fence.get(body_start..)?;
    let end = body.find("```")?;
    body.get(..end).map(str::trim)
}

/// Strip commas that directly precede a closing brace or bracket.
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == ',' && matches!(chars.clone().find(|n| !n.is_whitespace()), Some('}' | ']')) {
            continue;
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_field_is_unwrapped() {
        let raw = "```json\n{\"reasoning\": \"east is cheap\", \"decision\": \"MOVE EAST\",}\n```";
        assert_eq!(decision_text(raw), "MOVE EAST");
    }

    #[test]
    fn plain_decisions_pass_through() {
        assert_eq!(decision_text("  REST\n"), "REST");
        assert_eq!(decision_text("{\"other\": 1}"), "{\"other\": 1}");
    }

    #[test]
    fn trade_json_replies() {
        assert_eq!(
            trade_response(r#"{"response": "Accept"}"#).ok(),
            Some(TradeResponse::Accept)
        );
        let counter = trade_response(r#"{"response": "counter", "food": 2, "gold": 3}"#);
        assert_eq!(
            counter.ok(),
            Some(TradeResponse::CounterOffer(TradeOffer {
                food_to_player: 2,
                gold_to_trader: 3,
                ..TradeOffer::default()
            }))
        );
        assert!(matches!(
            trade_response(r#"{"response": "maybe"}"#),
            Err(RunnerError::Parse(_))
        ));
    }

    #[test]
    fn trade_plain_text_replies() {
        assert_eq!(trade_response("reject.").ok(), Some(TradeResponse::Reject));
        assert_eq!(trade_response("ACCEPT").ok(), Some(TradeResponse::Accept));
        assert!(trade_response("hmm").is_err());
    }
}
