//! Extracts the numeric score from a judge's reply.
//!
//! Tried in order:
//! 1. a JSON object with a `score` field, optionally inside a code fence
//! 2. the number after the last `score:` label
//! 3. the first number on the last non-empty line

use serde_json::Value;

pub fn parse_score(reply: &str) -> Option<f64> {
    from_json(reply)
        .or_else(|| from_label(reply))
        .or_else(|| from_last_line(reply))
        .filter(|score| score.is_finite())
}

fn from_json(reply: &str) -> Option<f64> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: Value = serde_json::from_str(&reply[start..=end]).ok()?;
    match value.get("score")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn from_label(reply: &str) -> Option<f64> {
    let lower = reply.to_lowercase();
    lower
        .match_indices("score")
        .filter_map(|(idx, _)| {
            let rest = lower[idx + "score".len()..].trim_start_matches(['*', ' ']);
            rest.strip_prefix(':').and_then(|after| numbers(after).next())
        })
        .last()
}

fn from_last_line(reply: &str) -> Option<f64> {
    reply
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| numbers(line).next())
}

/// Non-negative decimal numbers in order of appearance.
fn numbers(text: &str) -> impl Iterator<Item = f64> + '_ {
    let mut rest = text;
    std::iter::from_fn(move || {
        let start = rest.find(|c: char| c.is_ascii_digit())?;
        let tail = &rest[start..];
        let mut seen_dot = false;
        let len = tail
            .char_indices()
            .take_while(|&(i, c)| {
                if c.is_ascii_digit() {
                    true
                } else if c == '.' && !seen_dot {
                    // Only a dot followed by a digit belongs to the number.
                    let next_is_digit = tail[i + 1..].starts_with(|n: char| n.is_ascii_digit());
                    seen_dot = next_is_digit;
                    next_is_digit
                } else {
                    false
                }
            })
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        rest = &tail[len.max(1)..];
        tail[..len].parse().ok()
    })
}
