//! One-dimensional spline sampling weights with "nearest" boundary handling.
//!
//! A spline sample along an axis is a linear functional of the axis samples, so it
//! can be written as a weight vector over the original sample indices. The N-D
//! interpolant is then the tensor contraction of the data with one weight vector
//! per axis, which is exactly what sampling each slice separately would produce.
//!
//! The cubic path follows the classic B-spline interpolation recipe: edge-pad the
//! axis, convert samples to B-spline coefficients with the recursive causal /
//! anti-causal filter (mirror boundary initialization), and evaluate the cubic
//! B-spline basis at the padded coordinate.

use crate::domain::SplineOrder;

/// Samples replicated past each edge before cubic prefiltering.
pub const SPLINE_EDGE_PADDING: usize = 12;

/// Pole of the cubic B-spline prefilter, `sqrt(3) - 2`.
const CUBIC_POLE: f64 = -0.267_949_192_431_122_7;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    #[error("spline axis must have at least one sample")]
    EmptyAxis,
    #[error("spline coordinate must not be NaN")]
    NanCoordinate,
}

/// Sparse (index, weight) pairs for one axis, ordered by index.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisWeights {
    entries: Vec<(usize, f64)>,
}

impl AxisWeights {
    fn single(index: usize) -> Self {
        Self {
            entries: vec![(index, 1.0)],
        }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn weight_at(&self, index: usize) -> f64 {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == index)
            .map(|(_, weight)| *weight)
            .unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        super::stable_sum_iter(self.entries.iter().map(|(_, weight)| *weight))
    }
}

/// Weights that sample an axis of `len` points at fractional `coordinate`.
///
/// Coordinates outside `[0, len - 1]` are clamped to the nearest edge sample.
/// The clamp happens before edge padding, so a cubic sample just outside the
/// grid equals the edge sample rather than the value of the padded spline there.
pub fn axis_weights(
    coordinate: f64,
    len: usize,
    order: SplineOrder,
) -> Result<AxisWeights, SplineError> {
    if len == 0 {
        return Err(SplineError::EmptyAxis);
    }
    if coordinate.is_nan() {
        return Err(SplineError::NanCoordinate);
    }

    if len == 1 {
        return Ok(AxisWeights::single(0));
    }

    let clamped = coordinate.clamp(0.0, (len - 1) as f64);
    Ok(match order {
        SplineOrder::Linear => linear_weights(clamped, len),
        SplineOrder::Cubic => cubic_weights(clamped, len),
    })
}

fn linear_weights(coordinate: f64, len: usize) -> AxisWeights {
    let lower = coordinate.floor() as usize;
    let fraction = coordinate - lower as f64;
    if fraction == 0.0 || lower + 1 >= len {
        return AxisWeights::single(lower.min(len - 1));
    }

    AxisWeights {
        entries: vec![(lower, 1.0 - fraction), (lower + 1, fraction)],
    }
}

fn cubic_weights(coordinate: f64, len: usize) -> AxisWeights {
    let padded_len = len + 2 * SPLINE_EDGE_PADDING;
    let padded_coordinate = coordinate + SPLINE_EDGE_PADDING as f64;
    let floor = padded_coordinate.floor();
    let basis = cubic_bspline_basis(padded_coordinate - floor);
    // Starts at least one sample inside the padding, so the four taps stay in range.
    let start = floor as usize - 1;

    let mut entries = Vec::with_capacity(len);
    let mut impulse = vec![0.0; padded_len];
    for sample in 0..len {
        fill_edge_padded_impulse(&mut impulse, sample, len);
        cubic_prefilter(&mut impulse);

        let weight: f64 = basis
            .iter()
            .enumerate()
            .map(|(tap, basis_weight)| basis_weight * impulse[start + tap])
            .sum();
        if weight != 0.0 {
            entries.push((sample, weight));
        }
    }

    AxisWeights { entries }
}

/// Unit impulse at `sample`, replicated into the padding when it sits on an edge.
fn fill_edge_padded_impulse(buffer: &mut [f64], sample: usize, len: usize) {
    buffer.fill(0.0);
    let pad = SPLINE_EDGE_PADDING;
    buffer[pad + sample] = 1.0;
    if sample == 0 {
        buffer[..pad].fill(1.0);
    }
    if sample == len - 1 {
        buffer[pad + len..].fill(1.0);
    }
}

fn cubic_bspline_basis(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    let one_minus = 1.0 - t;
    [
        one_minus * one_minus * one_minus / 6.0,
        (4.0 - 6.0 * t2 + 3.0 * t3) / 6.0,
        (1.0 + 3.0 * t + 3.0 * t2 - 3.0 * t3) / 6.0,
        t3 / 6.0,
    ]
}

/// Converts samples into cubic B-spline coefficients in place.
pub(crate) fn cubic_prefilter(coefficients: &mut [f64]) {
    let n = coefficients.len();
    if n < 2 {
        return;
    }

    let z = CUBIC_POLE;
    let gain = (1.0 - z) * (1.0 - 1.0 / z);
    for value in coefficients.iter_mut() {
        *value *= gain;
    }

    init_causal_mirror(coefficients, z);
    for index in 1..n {
        coefficients[index] += z * coefficients[index - 1];
    }

    init_anticausal_mirror(coefficients, z);
    for index in (0..n - 1).rev() {
        coefficients[index] = z * (coefficients[index + 1] - coefficients[index]);
    }
}

fn init_causal_mirror(c: &mut [f64], z: f64) {
    let n = c.len();
    let z_n_1 = z.powi((n - 1) as i32);
    let mut z_i = z;

    c[0] += z_n_1 * c[n - 1];
    for index in 1..n - 1 {
        c[0] += z_i * (c[index] + z_n_1 * c[n - 1 - index]);
        z_i *= z;
    }
    c[0] /= 1.0 - z_n_1 * z_n_1;
}

fn init_anticausal_mirror(c: &mut [f64], z: f64) {
    let n = c.len();
    c[n - 1] = (z * c[n - 2] + c[n - 1]) * z / (z * z - 1.0);
}
