use super::stable_sum_iter;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegressionError {
    #[error("regression input length mismatch: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("regression requires at least 2 points, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error("regression design matrix is rank deficient (all x values equal)")]
    RankDeficient,
}

/// Ordinary least squares for `y = intercept + slope * x`.
///
/// Solves the two-column (ones, x) design through centered sums, which keeps the
/// normal equations well conditioned when x spans several orders of magnitude.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearFit, RegressionError> {
    if x.len() != y.len() {
        return Err(RegressionError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(RegressionError::InsufficientPoints { actual: x.len() });
    }

    let count = x.len() as f64;
    let mean_x = stable_sum_iter(x.iter().copied()) / count;
    let mean_y = stable_sum_iter(y.iter().copied()) / count;

    let sxx = stable_sum_iter(x.iter().map(|value| (value - mean_x).powi(2)));
    if sxx == 0.0 {
        return Err(RegressionError::RankDeficient);
    }
    let sxy = stable_sum_iter(
        x.iter()
            .zip(y)
            .map(|(xv, yv)| (xv - mean_x) * (yv - mean_y)),
    );

    let slope = sxy / sxx;
    Ok(LinearFit {
        intercept: mean_y - slope * mean_x,
        slope,
    })
}

#[cfg(test)]
mod tests {
    use super::{RegressionError, fit_line};

    #[test]
    fn recovers_exact_line() {
        let x = [0.0, 500.0, 1000.0, 2000.0, 4000.0];
        let y: Vec<f64> = x.iter().map(|value| 3.5 - 2.0e-4 * value).collect();

        let fit = fit_line(&x, &y).expect("fit");
        assert!((fit.slope + 2.0e-4).abs() < 1.0e-12);
        assert!((fit.intercept - 3.5).abs() < 1.0e-12);
        assert!((fit.evaluate(1000.0) - 3.3).abs() < 1.0e-12);
    }

    #[test]
    fn matches_hand_computed_least_squares() {
        // x mean 2, y mean 2; sxy = 7, sxx = 10
        let fit = fit_line(&[0.0, 1.0, 3.0, 4.0], &[1.0, 1.0, 2.0, 4.0]).expect("fit");
        assert!((fit.slope - 0.7).abs() < 1.0e-12, "slope {}", fit.slope);
        assert!((fit.intercept - 0.6).abs() < 1.0e-12);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert_eq!(
            fit_line(&[1.0, 2.0], &[1.0]),
            Err(RegressionError::LengthMismatch { x: 2, y: 1 })
        );
        assert_eq!(
            fit_line(&[1.0], &[1.0]),
            Err(RegressionError::InsufficientPoints { actual: 1 })
        );
        assert_eq!(
            fit_line(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(RegressionError::RankDeficient)
        );
    }
}
