//! Subscription billing-cycle arithmetic.
//!
//! All functions are pure over an explicit `now` so cycle boundaries can
//! be tested without touching the clock. A cycle is 30 days; consecutive
//! cycles never overlap (the next cycle starts one second after the
//! previous one ends).

use chrono::{DateTime, Duration, Utc};

/// Length of one billing cycle in days.
pub const CYCLE_DAYS: i64 = 30;

/// End of the currently open cycle.
///
/// The cycle is anchored on the most recent payment when one exists,
/// otherwise on the subscription start. The returned end never precedes
/// `now`: a long-dormant subscription closes immediately rather than in
/// the past.
pub fn close_open_cycle(
    started_at: DateTime<Utc>,
    last_payment_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let base = last_payment_at.unwrap_or(started_at);
    let end = base + Duration::days(CYCLE_DAYS);
    if end < now {
        now
    } else {
        end
    }
}

/// Start of the cycle following one that ended at `prev_end`.
pub fn next_cycle_start(prev_end: DateTime<Utc>) -> DateTime<Utc> {
    prev_end + Duration::seconds(1)
}

/// Expiration date applied when a subscription is cancelled.
///
/// A future-dated subscription (paid ahead, not yet started) runs its
/// full cycle from its start date; otherwise the remaining cycle is
/// anchored on the most recent payment, falling back to the start.
pub fn cancellation_end(
    started_at: DateTime<Utc>,
    last_payment_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    if started_at > now {
        started_at + Duration::days(CYCLE_DAYS)
    } else {
        last_payment_at.unwrap_or(started_at) + Duration::days(CYCLE_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_close_open_cycle_anchors_on_last_payment() {
        let started = at(2025, 5, 1);
        let paid = at(2025, 5, 20);
        let now = at(2025, 5, 25);

        let end = close_open_cycle(started, Some(paid), now);
        assert_eq!(end, paid + Duration::days(CYCLE_DAYS));
    }

    #[test]
    fn test_close_open_cycle_falls_back_to_start() {
        let started = at(2025, 5, 1);
        let now = at(2025, 5, 10);

        let end = close_open_cycle(started, None, now);
        assert_eq!(end, started + Duration::days(CYCLE_DAYS));
    }

    #[test]
    fn test_close_open_cycle_never_ends_in_the_past() {
        // Last payment long ago: the computed end would precede `now`
        let started = at(2025, 1, 1);
        let paid = at(2025, 1, 5);
        let now = at(2025, 6, 1);

        let end = close_open_cycle(started, Some(paid), now);
        assert_eq!(end, now);
    }

    #[test]
    fn test_next_cycle_is_strictly_after_previous() {
        let end = at(2025, 6, 15);
        let next = next_cycle_start(end);
        assert!(next > end);
        assert_eq!(next - end, Duration::seconds(1));
    }

    #[test]
    fn test_cancellation_of_future_dated_subscription() {
        let started = at(2025, 7, 1);
        let now = at(2025, 6, 20);

        let end = cancellation_end(started, None, now);
        assert_eq!(end, started + Duration::days(CYCLE_DAYS));
    }

    #[test]
    fn test_cancellation_anchors_on_last_payment() {
        let started = at(2025, 5, 1);
        let paid = at(2025, 6, 1);
        let now = at(2025, 6, 10);

        let end = cancellation_end(started, Some(paid), now);
        assert_eq!(end, paid + Duration::days(CYCLE_DAYS));
    }
}
