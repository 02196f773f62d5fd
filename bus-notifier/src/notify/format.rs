//! Plain-text rendering of arrivals summaries.

use std::fmt::Write;

use crate::domain::ArrivalsSummary;

/// Arrivals sooner than this many minutes are flagged as imminent.
pub const IMMINENT_MINUTES: u32 = 5;

/// Render a summary as a short message suitable for a push notification.
///
/// ```text
/// Namir/Pinkas, Tel Aviv
///
/// 🔜 🚌 5: 2 min
/// 🚌 74: 5, 23 min
/// ```
pub fn format_summary(summary: &ArrivalsSummary) -> String {
    if let Some(errors) = &summary.errors {
        return format!("Bus arrivals unavailable: {errors}");
    }

    let mut out = match (&summary.station_name, &summary.station_city) {
        (Some(name), Some(city)) => format!("{name}, {city}"),
        (Some(name), None) => name.clone(),
        (None, Some(city)) => city.clone(),
        (None, None) => "Bus arrivals".to_string(),
    };
    out.push_str("\n\n");

    if summary.is_empty() {
        out.push_str("No buses :(");
        return out;
    }

    let lines: Vec<String> = summary
        .line_to_minutes
        .iter()
        .map(|(line, minutes)| {
            let mut text = String::new();
            if minutes.first().is_some_and(|m| *m < IMMINENT_MINUTES) {
                text.push_str("🔜 ");
            }
            let list = minutes
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            // Writing to a String cannot fail
            let _ = write!(text, "🚌 {line}: {list} min");
            text
        })
        .collect();

    out.push_str(&lines.join("\n"));
    out
}
