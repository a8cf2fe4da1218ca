//! Random redistribution of an item's units.
//!
//! The split is produced by "stick breaking": each of the first `N - 1` slots
//! draws uniformly from what is left of the budget, the last slot takes the
//! remainder, and a Fisher-Yates pass shuffles the slots so the big early
//! draws don't always land on the first people. This is not uniform over all
//! possible splits and is not meant to be.

use rand::Rng;

use crate::numbers::round2;

/// Values at or below this are dropped instead of stored.
pub const MIN_SHARE: f64 = 0.01;

/// Splits `total` into `slots` random parts summing to `total`.
///
/// Returns an empty vector when `slots == 0`.
pub fn distribute<R: Rng>(total: f64, slots: usize, rng: &mut R) -> Vec<f64> {
    if slots == 0 {
        return Vec::new();
    }

    let mut values = Vec::with_capacity(slots);
    let mut remaining = total;
    for _ in 1..slots {
        let draw = rng.random::<f64>() * remaining;
        values.push(draw);
        remaining -= draw;
    }
    values.push(remaining);

    for i in (1..values.len()).rev() {
        let j = rng.random_range(0..=i);
        values.swap(i, j);
    }

    values
}

/// Turns a raw part into the value to store: `None` when it is too small,
/// otherwise rounded to 2 decimals.
pub fn storable(value: f64) -> Option<f64> {
    (value > MIN_SHARE).then(|| round2(value))
}
