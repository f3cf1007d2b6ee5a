// Display formatting rules for status pushes
//
// Every formatter is total: absent or unusable input renders as an empty
// string, never an error. Decimal precision is fixed per field.

use chrono::{DateTime, Duration, Local, Timelike, Utc};

use crate::core::constants::DELTA_WINDOW_MIN;
use crate::models::reading::{DoseRecord, DoseUnit, Reading};
use crate::models::status::{DisplayStatus, StatusSnapshot};

/// Wall-clock `h:mm` with a single-letter meridiem marker, e.g. `9:41a`.
pub fn format_time<T: Timelike>(now: &T) -> String {
    let (is_pm, hour) = now.hour12();
    format!(
        "{}:{:02}{}",
        hour,
        now.minute(),
        if is_pm { 'p' } else { 'a' }
    )
}

/// Insulin on board, one decimal place: `2.3U`.
pub fn format_iob(units: Option<f64>) -> String {
    match units {
        Some(value) => format!("{:.1}U", value),
        None => String::new(),
    }
}

/// Carbs on board, whole grams with a leading space: ` 24g`.
pub fn format_cob(grams: Option<f64>) -> String {
    match grams {
        Some(value) => format!(" {}g", value.round() as i64),
        None => String::new(),
    }
}

/// The trajectory endpoint as a whole number; empty without a trajectory.
pub fn format_predicted(predicted: Option<&[Reading]>) -> String {
    predicted
        .and_then(|trajectory| trajectory.last())
        .map(|r| r.rounded().to_string())
        .unwrap_or_default()
}

/// Two-decimal rate with a trailing space, shown only while a per-hour dose
/// is still running. Boluses and expired rates render nothing.
pub fn format_current_temp(last_dose: Option<&DoseRecord>, now: DateTime<Utc>) -> String {
    match last_dose {
        Some(dose) if dose.unit == DoseUnit::UnitsPerHour && dose.active_at(now) => {
            format!("{:.2} ", dose.value)
        }
        _ => String::new(),
    }
}

/// Battery charge as a whole percent with a leading space: ` 80%`.
pub fn format_battery(fraction: Option<f64>) -> String {
    match fraction {
        Some(level) => format!(" {}%", (level * 100.0) as i64),
        None => String::new(),
    }
}

/// Change between the two most recent readings, signed: `+12`, `-5`.
/// Empty unless both exist and are close enough to be consecutive samples.
pub fn format_delta(readings: &[Reading]) -> String {
    let [.., previous, last] = readings else {
        return String::new();
    };
    if last.recorded_at - previous.recorded_at >= Duration::minutes(DELTA_WINDOW_MIN) {
        return String::new();
    }
    let delta = last.rounded() - previous.rounded();
    if delta < 0 {
        delta.to_string()
    } else {
        format!("+{}", delta)
    }
}

/// Most recent glucose with its delta when one applies: ` 162 +12`.
pub fn format_last_reading(readings: &[Reading]) -> String {
    match readings.last() {
        Some(last) => {
            let delta = format_delta(readings);
            if delta.is_empty() {
                format!(" {}", last.rounded())
            } else {
                format!(" {} {}", last.rounded(), delta)
            }
        }
        None => String::new(),
    }
}

/// Whole minutes since the newest reading, parenthesized: ` (4)`.
pub fn format_recency(readings: &[Reading], now: DateTime<Utc>) -> String {
    match readings.last() {
        Some(last) => {
            let minutes = (now - last.recorded_at).num_seconds() as f64 / 60.0;
            format!(" ({})", minutes.round() as i64)
        }
        None => String::new(),
    }
}

/// Recommended bolus, one decimal place: `1.5U`.
pub fn format_bolus(units: Option<f64>) -> String {
    match units {
        Some(value) => format!("{:.1}U", value),
        None => String::new(),
    }
}

/// Render one snapshot into its display strings. Total by construction.
pub fn format_status(
    snapshot: &StatusSnapshot,
    now: DateTime<Utc>,
    battery: Option<f64>,
) -> DisplayStatus {
    DisplayStatus {
        time: format_time(&now.with_timezone(&Local)),
        iob: format_iob(snapshot.insulin_on_board),
        cob: format_cob(snapshot.carbs_on_board),
        last_reading: format_last_reading(&snapshot.readings),
        recency: format_recency(&snapshot.readings, now),
        predicted: format_predicted(snapshot.predicted.as_deref()),
        current_temp: format_current_temp(snapshot.last_dose.as_ref(), now),
        battery: format_battery(battery),
        recommended_bolus: format_bolus(snapshot.recommended_bolus),
    }
}
