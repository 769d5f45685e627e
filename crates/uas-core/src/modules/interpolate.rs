use super::axis_index::{GridAxis, LookupIndex, lookup_index};
use super::grid::LookupGrid;
use crate::domain::{SceneParameters, SplineOrder, UasError, UasResult};
use crate::numerics::axis_weights;

/// One contributing grid node and its tensor-product weight.
type NodeWeight = ([usize; 5], f64);

/// Samples the grid at fractional `index`, returning one radiance per native wavelength.
///
/// The wavelength axis is never interpolated; every wavelength slice is sampled
/// with the same five-axis spline, clamping out-of-range coordinates to the
/// nearest grid edge.
pub fn interpolate_spectrum(
    grid: &LookupGrid,
    index: &LookupIndex,
    order: SplineOrder,
) -> UasResult<Vec<f64>> {
    let nodes = node_weights(grid, index, order)?;
    tracing::trace!(
        indices = ?index.as_array(),
        %order,
        nodes = nodes.len(),
        "sampling lookup grid"
    );

    let mut spectrum = vec![0.0; grid.wavelength_count()];
    for (node, weight) in nodes {
        for (radiance, value) in spectrum.iter_mut().zip(grid.spectrum_at(node)) {
            *radiance += weight * value;
        }
    }

    Ok(spectrum)
}

/// Maps `scene` through the axis curves and samples the grid there.
pub fn interpolate_scene(grid: &LookupGrid, scene: &SceneParameters) -> UasResult<Vec<f64>> {
    interpolate_spectrum(grid, &lookup_index(scene), scene.order)
}

fn node_weights(
    grid: &LookupGrid,
    index: &LookupIndex,
    order: SplineOrder,
) -> UasResult<Vec<NodeWeight>> {
    let mut nodes: Vec<NodeWeight> = vec![([0; 5], 1.0)];

    for axis in GridAxis::ALL {
        let coordinate = index.get(axis);
        let weights = axis_weights(coordinate, grid.axis_len(axis), order).map_err(|error| {
            UasError::input_validation(
                "INPUT.LOOKUP_COORDINATE",
                format!("{axis} coordinate {coordinate} cannot be sampled: {error}"),
            )
        })?;

        nodes = nodes
            .into_iter()
            .flat_map(|(node, weight)| {
                weights.entries().iter().map(move |(sample, axis_weight)| {
                    let mut expanded = node;
                    expanded[axis.position()] = *sample;
                    (expanded, weight * axis_weight)
                })
            })
            .filter(|(_, weight)| *weight != 0.0)
            .collect();
    }

    Ok(nodes)
}
