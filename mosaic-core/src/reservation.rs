use chrono::{DateTime, Duration, Utc};

use crate::square::Square;

/// Source of "now" for reservation-window checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// True while an unpurchased claim still protects the cell.
///
/// The reservation is a soft lock: the claim holds for `window` after
/// `reserved_at` and self-expires with no explicit release. Once the
/// full window has elapsed the record is eligible for replacement. A
/// purchased cell is terminal and never counts as an active reservation.
pub fn is_reservation_active(square: &Square, now: DateTime<Utc>, window: Duration) -> bool {
    !square.is_purchased && now - square.reserved_at < window
}
