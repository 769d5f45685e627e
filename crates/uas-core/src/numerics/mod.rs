pub mod regression;
pub mod spline;

pub use regression::{LinearFit, RegressionError, fit_line};
pub use spline::{AxisWeights, SPLINE_EDGE_PADDING, SplineError, axis_weights};

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    stable_sum_iter(values.iter().copied())
}

pub fn stable_sum_iter(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

pub fn within_tolerance(lhs: f64, rhs: f64, abs_tol: f64, rel_tol: f64) -> bool {
    let abs_diff = (lhs - rhs).abs();
    let scale = lhs.abs().max(rhs.abs());
    abs_diff <= abs_tol || abs_diff <= rel_tol * scale
}

#[cfg(test)]
mod tests {
    use super::{stable_sum, stable_sum_iter, within_tolerance};

    #[test]
    fn stable_sum_reduces_order_loss_for_large_and_small_values() {
        let input = [1.0e16, 1.0, -1.0e16];
        assert_eq!(stable_sum(&input), 0.0);
        assert_eq!(stable_sum_iter(input.iter().copied()), 0.0);
    }

    #[test]
    fn stable_sum_of_empty_slice_is_zero() {
        assert_eq!(stable_sum(&[]), 0.0);
    }

    #[test]
    fn within_tolerance_accepts_abs_or_relative_match() {
        assert!(within_tolerance(10.0, 10.001, 1.0e-2, 1.0e-6));
        assert!(within_tolerance(1000.0, 1000.2, 1.0e-6, 5.0e-4));
        assert!(!within_tolerance(1.0, 1.1, 1.0e-3, 1.0e-3));
    }
}
