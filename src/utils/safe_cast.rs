//! Checked and saturating numeric conversions for control values

/// Clamp and convert f64 to i32; non-finite input maps to `min`
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f64_to_i32_clamp(value: f64, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.clamp(f64::from(min), f64::from(max));
    (clamped as i32).clamp(min, max)
}

/// Add `delta` to `current` and clamp into `[min, max]` without overflowing
#[must_use]
pub fn add_clamped(current: i32, delta: i32, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let sum = i64::from(current) + i64::from(delta);
    let clamped = sum.clamp(i64::from(min), i64::from(max));
    i32::try_from(clamped).unwrap_or(max)
}
