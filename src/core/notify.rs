// One-shot local notification assembly

use serde::Serialize;

use crate::models::status::DisplayStatus;

/// A prepared local notification, ready for the delivery service.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Delivery services de-duplicate on this key. It is the rendered body,
    /// so two cycles producing identical text collapse into one delivery.
    pub identifier: String,
    pub title: String,
    pub body: String,
}

/// Accepts prepared notifications for display. Delivery is fire-and-forget;
/// the outcome is never reported back.
pub trait NotificationSink: Send + Sync {
    fn enqueue(&self, notification: Notification);
}

/// Title packs the dosing facts, body the glucose trend. Field order and the
/// absence of separators are load-bearing: empty fields vanish without
/// leaving gaps.
pub fn build_notification(status: &DisplayStatus) -> Notification {
    let title = format!(
        "{}{}{}{}",
        status.current_temp, status.iob, status.cob, status.battery
    );
    let body = format!(
        "{}{}{} ->{}",
        status.time, status.last_reading, status.recency, status.predicted
    );
    Notification {
        identifier: body.clone(),
        title,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_status() -> DisplayStatus {
        DisplayStatus {
            time: "9:41a".into(),
            iob: "2.3U".into(),
            cob: " 24g".into(),
            last_reading: " 162 +12".into(),
            recency: " (4)".into(),
            predicted: "118".into(),
            current_temp: "0.85 ".into(),
            battery: " 80%".into(),
            recommended_bolus: "1.5U".into(),
        }
    }

    #[test]
    fn title_concatenates_in_fixed_order() {
        let notification = build_notification(&full_status());
        assert_eq!(notification.title, "0.85 2.3U 24g 80%");
    }

    #[test]
    fn body_carries_trend_and_arrow() {
        let notification = build_notification(&full_status());
        assert_eq!(notification.body, "9:41a 162 +12 (4) ->118");
    }

    #[test]
    fn identifier_is_the_body_text() {
        let notification = build_notification(&full_status());
        assert_eq!(notification.identifier, notification.body);
    }

    #[test]
    fn empty_fields_leave_no_gaps() {
        let status = DisplayStatus {
            time: "9:41a".into(),
            battery: " 80%".into(),
            ..DisplayStatus::default()
        };
        let notification = build_notification(&status);
        assert_eq!(notification.title, " 80%");
        assert_eq!(notification.body, "9:41a ->");
    }
}
