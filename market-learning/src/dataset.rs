//! Sequence windowing
//!
//! Reshapes the scaled feature table into overlapping fixed-length windows
//! for the sequence model, pairing each window with the discounted return at
//! its final row.

use crate::error::{LearningError, Result};
use ndarray::{Array2, Array3, s};

/// Build overlapping windows of `n_timepoints` consecutive rows.
///
/// Returns `(windows, targets)` where `windows` has shape
/// `[rows - n_timepoints + 1, n_timepoints, n_features]` and `targets[i]` is
/// the value aligned with the last row of window `i`.
pub fn window_sequences(
    features: &Array2<f64>,
    targets: &[f64],
    n_timepoints: usize,
) -> Result<(Array3<f64>, Vec<f64>)> {
    let rows = features.nrows();
    if targets.len() != rows {
        return Err(LearningError::ShapeMismatch {
            expected: format!("{rows} targets"),
            actual: format!("{} targets", targets.len()),
        });
    }
    if n_timepoints == 0 || rows < n_timepoints {
        return Err(LearningError::InsufficientData {
            needed: n_timepoints.max(1),
            available: rows,
        });
    }

    let n_features = features.ncols();
    let n_samples = rows - n_timepoints + 1;

    let mut windows = Array3::zeros((n_samples, n_timepoints, n_features));
    let mut window_targets = Vec::with_capacity(n_samples);

    for i in 0..n_samples {
        let slice = features.slice(s![i..i + n_timepoints, ..]);
        windows.slice_mut(s![i, .., ..]).assign(&slice);
        window_targets.push(targets[i + n_timepoints - 1]);
    }

    Ok((windows, window_targets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn ramp(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(i, j)| (i * cols + j) as f64)
    }

    #[test]
    fn test_window_count_and_alignment() {
        let features = ramp(5, 2);
        let targets = vec![10.0, 11.0, 12.0, 13.0, 14.0];

        let (windows, window_targets) = window_sequences(&features, &targets, 3).unwrap();

        assert_eq!(windows.dim(), (3, 3, 2));
        // Target aligns with the final row of each window
        assert_eq!(window_targets, vec![12.0, 13.0, 14.0]);
        // First window covers rows 0..3
        assert_eq!(windows[[0, 0, 0]], 0.0);
        assert_eq!(windows[[0, 2, 1]], 5.0);
        // Last window covers rows 2..5
        assert_eq!(windows[[2, 0, 0]], 4.0);
    }

    #[test]
    fn test_exact_length_gives_one_window() {
        let features = ramp(4, 3);
        let targets = vec![1.0, 2.0, 3.0, 4.0];

        let (windows, window_targets) = window_sequences(&features, &targets, 4).unwrap();
        assert_eq!(windows.dim(), (1, 4, 3));
        assert_eq!(window_targets, vec![4.0]);
    }

    #[test]
    fn test_too_few_rows_is_insufficient() {
        let features = ramp(3, 2);
        let targets = vec![0.0; 3];

        let err = window_sequences(&features, &targets, 16).unwrap_err();
        assert!(matches!(
            err,
            LearningError::InsufficientData {
                needed: 16,
                available: 3
            }
        ));
    }

    #[test]
    fn test_target_length_mismatch() {
        let features = ramp(4, 2);
        assert!(matches!(
            window_sequences(&features, &[0.0; 3], 2),
            Err(LearningError::ShapeMismatch { .. })
        ));
    }
}
