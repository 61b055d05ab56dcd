//! Priority number used to order competing grants.

use std::time::Duration;

/// Weight of one completed meal. Dominates the wait bonus so that a
/// philosopher with fewer meals is preferred by a wide margin.
pub const MEAL_WEIGHT: i64 = 10_000;

/// Every this many milliseconds of cumulative wait lowers the number by one.
pub const WAIT_BONUS_UNIT_MS: u128 = 100;

/// `eat_count * 10000 - floor(wait_ms / 100)`. Lower is served first.
pub fn priority_number(eat_count: u64, cumulative_wait: Duration) -> i64 {
    let meals = i64::try_from(eat_count).unwrap_or(i64::MAX / MEAL_WEIGHT);
    let bonus =
        i64::try_from(cumulative_wait.as_millis() / WAIT_BONUS_UNIT_MS).unwrap_or(i64::MAX);
    meals.saturating_mul(MEAL_WEIGHT).saturating_sub(bonus)
}
