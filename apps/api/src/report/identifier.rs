//! Readable report identifiers.
//!
//! Raw prediction ids look like `img-pred-1700000000000-abc123xyz`. The
//! readable form keeps the type prefix, the tail of the millisecond timestamp
//! and the head of the random suffix: `IMG-00000-ABC123`.
//!
//! The result is a display aid only. Fixed-offset slicing can map distinct
//! raw ids to the same string, so it must never be used as a lookup key.

const DELIMITER: char = '-';
const TIMESTAMP_TAIL: usize = 5;
const RANDOM_HEAD: usize = 6;

const DEFAULT_PREFIX: &str = "IMG";
const DEFAULT_TIMESTAMP: &str = "00000";
const DEFAULT_RANDOM: &str = "XXXXXX";

/// Formats a raw prediction id as `PREFIX-TTTTT-RRRRRR`. Deterministic.
pub fn format_identifier(raw: &str) -> String {
    let parts: Vec<&str> = raw.split(DELIMITER).collect();

    let prefix = non_empty(parts.first().map(|p| p.to_uppercase()))
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    let timestamp = non_empty(parts.get(2).map(|p| {
        let skip = p.chars().count().saturating_sub(TIMESTAMP_TAIL);
        p.chars().skip(skip).collect::<String>()
    }))
    .unwrap_or_else(|| DEFAULT_TIMESTAMP.to_string());

    let random = non_empty(
        parts
            .get(3)
            .map(|p| p.chars().take(RANDOM_HEAD).collect::<String>().to_uppercase()),
    )
    .unwrap_or_else(|| DEFAULT_RANDOM.to_string());

    format!("{prefix}{DELIMITER}{timestamp}{DELIMITER}{random}")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
