//! Policy answer parsing into typed actions.
//!
//! Policies answer in free text. This module turns that text into an
//! [`Action`] before anything touches world state. Accepted shapes:
//!
//! 1. Plain text: the first line starting with `MOVE`, `REST` or `TRADE`
//!    (case-insensitive) wins.
//! 2. A JSON object, bare or inside a markdown code block, whose `decision`
//!    or `action` field holds such a line. A separate `direction` field is
//!    appended to a bare `MOVE`.
//!
//! Directions accept full names (`NORTHEAST`), separated forms
//! (`NORTH-EAST`, `NORTH_EAST`, `NORTH EAST`) and abbreviations (`NE`).

use serde_json::Value;
use wayfarer_types::{Action, Direction};

/// Why a policy answer could not be turned into an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The answer was blank.
    #[error("empty decision")]
    Empty,

    /// No line names an action.
    #[error("no action found in: {0}")]
    NoAction(String),

    /// `MOVE` without a direction.
    #[error("move without a direction: {0}")]
    MissingDirection(String),

    /// `MOVE` with something that is not a compass direction.
    #[error("unknown direction in: {0}")]
    UnknownDirection(String),
}

/// Parse a policy answer into an [`Action`].
///
/// # Errors
///
/// Returns a [`ParseError`] describing why the text names no complete action.
/// The turn engine treats every error the same way: the agent rests.
pub fn parse_action(raw: &str) -> Result<Action, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(line) = decision_from_json(trimmed) {
        return match parse_line(&line) {
            Some(result) => result,
            None => Err(ParseError::NoAction(line)),
        };
    }

    for line in trimmed.lines() {
        if let Some(result) = parse_line(line) {
            return result;
        }
    }
    Err(ParseError::NoAction(trimmed.to_owned()))
}

/// Parse a direction name, separated name or abbreviation.
pub fn parse_direction(text: &str) -> Option<Direction> {
    let words = words(text);
    let first = words.first()?;
    if let Some(second) = words.get(1) {
        let joined = format!("{first}{second}");
        if let Some(direction) = direction_named(&joined) {
            return Some(direction);
        }
    }
    direction_named(first)
}

/// Parse one line. `None` if the line does not start with an action keyword.
fn parse_line(line: &str) -> Option<Result<Action, ParseError>> {
    let cleaned = line.trim().trim_start_matches(['*', '-', '`', '>', ' ', '#']);
    let words = words(cleaned);
    let keyword = words.first()?;
    match keyword.as_str() {
        "REST" => Some(Ok(Action::Rest)),
        "TRADE" => Some(Ok(Action::Trade)),
        "MOVE" => {
            let remainder = words.get(1..).unwrap_or_default().join(" ");
            if remainder.is_empty() {
                return Some(Err(ParseError::MissingDirection(cleaned.to_owned())));
            }
            Some(
                parse_direction(&remainder)
                    .map(Action::Move)
                    .ok_or_else(|| ParseError::UnknownDirection(cleaned.to_owned())),
            )
        }
        _ => None,
    }
}

/// Upper-cased alphabetic runs of `text`.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_uppercase)
        .collect()
}

fn direction_named(word: &str) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|direction| direction.name() == word || direction.abbreviation() == word)
}

// ---------------------------------------------------------------------------
// JSON answers
// ---------------------------------------------------------------------------

/// The decision line carried by a JSON answer, if the text is one.
fn decision_from_json(text: &str) -> Option<String> {
    let value = json_object(text)?;
    let decision = value
        .get("decision")
        .or_else(|| value.get("action"))
        .and_then(Value::as_str)?
        .trim()
        .to_owned();
    match value.get("direction").and_then(Value::as_str) {
        Some(direction) if words(&decision).len() == 1 => Some(format!("{decision} {direction}")),
        _ => Some(decision),
    }
}

/// Parse `text` as a JSON object, trying a code block and trailing-comma
/// cleanup when the direct parse fails.
fn json_object(text: &str) -> Option<Value> {
    let candidates = [
        Some(text.to_owned()),
        extract_json_from_codeblock(text).map(str::to_owned),
        Some(strip_trailing_commas(text)),
        extract_json_from_codeblock(text).map(strip_trailing_commas),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(|candidate| serde_json::from_str::<Value>(&candidate).ok())
        .find(Value::is_object)
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
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' {
            let next = chars.clone().find(|n| !n.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        result.push(c);
    }
    result
}
