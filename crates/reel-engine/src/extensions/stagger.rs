// extensions/stagger.rs
//
// Split one stage's progress across `n` items revealed in sequence.

/// Number of items fully revealed: `floor(progress * n)`, clamped to [0, n].
#[inline]
pub fn visible_count(progress: f32, n: usize) -> usize {
    let p = progress.clamp(0.0, 1.0);
    ((p * n as f32).floor() as usize).min(n)
}

/// Item `i`'s own progress: `clamp(progress * n - i, 0, 1)`.
#[inline]
pub fn local_progress(progress: f32, i: usize, n: usize) -> f32 {
    (progress * n as f32 - i as f32).clamp(0.0, 1.0)
}

/// Whether item `i` has started: `progress > i / n`.
#[inline]
pub fn is_revealed(progress: f32, i: usize, n: usize) -> bool {
    n > 0 && progress > i as f32 / n as f32
}

/// Start threshold spread over `[0, span]`, e.g. `i / n * 0.7`.
#[inline]
pub fn threshold(i: usize, n: usize, span: f32) -> f32 {
    if n == 0 {
        0.0
    } else {
        i as f32 / n as f32 * span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_items_at_thirty_five_percent() {
        assert_eq!(visible_count(0.35, 10), 3);
        assert!((local_progress(0.35, 3, 10) - 0.5).abs() < 1e-5);
        assert_eq!(local_progress(0.35, 1, 10), 1.0);
        assert_eq!(local_progress(0.35, 5, 10), 0.0);
        assert!(is_revealed(0.35, 3, 10));
        assert!(!is_revealed(0.35, 4, 10));
    }

    #[test]
    fn counts_are_clamped() {
        assert_eq!(visible_count(-0.2, 12), 0);
        assert_eq!(visible_count(1.0, 12), 12);
        assert_eq!(visible_count(1.7, 12), 12);
        assert_eq!(visible_count(0.5, 0), 0);
        assert!(!is_revealed(0.5, 0, 0));
    }

    #[test]
    fn thresholds_span_range() {
        assert_eq!(threshold(0, 10, 0.7), 0.0);
        assert!((threshold(5, 10, 0.7) - 0.35).abs() < 1e-6);
        assert_eq!(threshold(3, 0, 0.7), 0.0);
    }
}
