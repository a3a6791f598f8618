//! Short humanized durations for elapsed-time directives (`1500` -> `"2s"`)

const SECOND: f64 = 1000.0;
const MINUTE: f64 = SECOND * 60.0;
const HOUR: f64 = MINUTE * 60.0;
const DAY: f64 = HOUR * 24.0;

/// Format a millisecond delta using the largest whole unit, rounded
pub fn humanize_ms(ms: i64) -> String {
    let value = ms as f64;
    let abs = value.abs();

    if abs >= DAY {
        format!("{}d", (value / DAY).round())
    } else if abs >= HOUR {
        format!("{}h", (value / HOUR).round())
    } else if abs >= MINUTE {
        format!("{}m", (value / MINUTE).round())
    } else if abs >= SECOND {
        format!("{}s", (value / SECOND).round())
    } else {
        format!("{}ms", ms)
    }
}
