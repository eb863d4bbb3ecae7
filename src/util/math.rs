//! Small geometry helpers shared by comparison and stitching.

/// Offset that centers a span of `inner` inside a span of `outer`.
///
/// Rounds down, so any odd leftover pixel ends up on the far side.
pub(crate) fn center_offset(outer: usize, inner: usize) -> usize {
    outer.saturating_sub(inner) / 2
}

/// Returns `round(fraction * len)` for a non-negative fraction.
pub(crate) fn scaled_len(fraction: f32, len: usize) -> usize {
    if !fraction.is_finite() || fraction <= 0.0 {
        return 0;
    }
    (fraction as f64 * len as f64).round() as usize
}

/// Returns `base + delta` when it lands inside `[0, len)`.
pub(crate) fn shifted_index(base: usize, delta: i64, len: usize) -> Option<usize> {
    let idx = i64::try_from(base).ok()?.checked_add(delta)?;
    let idx = usize::try_from(idx).ok()?;
    (idx < len).then_some(idx)
}
