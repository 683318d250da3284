use jiff::{SignedDuration, Span, SpanRelativeTo};

/// Accepts `30s`, `1m 30s`, ISO 8601 (`PT1M`) or a plain number of seconds.
/// Negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<SignedDuration, String> {
    let input = input.trim();

    let duration = if let Ok(seconds) = input.parse::<i64>() {
        SignedDuration::from_secs(seconds)
    } else if let Ok(duration) = input.parse::<SignedDuration>() {
        duration
    } else {
        input
            .parse::<Span>()
            .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
            .map_err(|err| format!("Invalid duration {input:?}: {err}"))?
    };

    if duration.is_negative() {
        return Err(format!("Duration must not be negative, got {input:?}"));
    }

    Ok(duration)
}
