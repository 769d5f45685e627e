use super::grid::LookupGrid;
use super::interpolate::interpolate_scene;
use crate::domain::{SceneParameters, UasError, UasResult};
use faer::Mat;

/// Radiance spectra at native grid wavelengths, one row per ladder concentration.
#[derive(Debug, Clone)]
pub struct RadianceLibrary {
    concentrations: Vec<f64>,
    radiance: Mat<f64>,
}

impl RadianceLibrary {
    pub fn new(concentrations: Vec<f64>, radiance: Mat<f64>) -> UasResult<Self> {
        if radiance.nrows() != concentrations.len() {
            return Err(UasError::internal(
                "INTERNAL.LIBRARY_SHAPE",
                format!(
                    "radiance library has {} rows for {} concentrations",
                    radiance.nrows(),
                    concentrations.len()
                ),
            ));
        }
        Ok(Self {
            concentrations,
            radiance,
        })
    }

    pub fn concentrations(&self) -> &[f64] {
        &self.concentrations
    }

    /// `[concentration, native wavelength]` radiance matrix.
    pub fn radiance(&self) -> &Mat<f64> {
        &self.radiance
    }

    pub fn wavelength_count(&self) -> usize {
        self.radiance.ncols()
    }
}

/// Interpolates the grid once per ladder concentration with the other scene
/// parameters held fixed.
///
/// Rows are independent of each other; output rows follow ladder order.
pub fn generate_library(
    grid: &LookupGrid,
    scene: &SceneParameters,
    ladder: &[f64],
) -> UasResult<RadianceLibrary> {
    validate_ladder(ladder)?;

    let mut rows = Vec::with_capacity(ladder.len());
    for concentration in ladder {
        let spectrum = interpolate_scene(grid, &scene.with_methane(*concentration))?;
        tracing::debug!(
            concentration = *concentration,
            mean_radiance = spectrum.iter().sum::<f64>() / spectrum.len() as f64,
            "interpolated library row"
        );
        rows.push(spectrum);
    }

    let radiance = Mat::from_fn(ladder.len(), grid.wavelength_count(), |row, col| {
        rows[row][col]
    });
    RadianceLibrary::new(ladder.to_vec(), radiance)
}

fn validate_ladder(ladder: &[f64]) -> UasResult<()> {
    if ladder.len() < 2 {
        return Err(UasError::input_validation(
            "INPUT.CONCENTRATION_LADDER",
            format!(
                "concentration ladder needs at least 2 entries, got {}",
                ladder.len()
            ),
        ));
    }
    if let Some(position) = ladder.iter().position(|value| !value.is_finite()) {
        return Err(UasError::input_validation(
            "INPUT.CONCENTRATION_LADDER",
            format!(
                "concentration ladder entry {position} must be finite, got {}",
                ladder[position]
            ),
        ));
    }
    if let Some(position) = ladder.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(UasError::input_validation(
            "INPUT.CONCENTRATION_LADDER",
            format!(
                "concentration ladder must be strictly increasing, entry {} is {} after {}",
                position + 1,
                ladder[position + 1],
                ladder[position]
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::generate_library;
    use crate::domain::{CONCENTRATION_LADDER, SceneParameters, SplineOrder};
    use crate::modules::axis_index::methane_index;
    use crate::modules::grid::LookupGrid;
    use ndarray::{Array, IxDyn};

    /// Single-node grid except along methane, where radiance decays with index.
    fn methane_grid() -> LookupGrid {
        let data = Array::from_shape_fn(IxDyn(&[1, 1, 1, 1, 7, 2]), |index| {
            (10.0 - index[4] as f64) * (1.0 + index[5] as f64)
        });
        LookupGrid::new(data, vec![2300.0, 2310.0]).expect("grid")
    }

    #[test]
    fn rows_follow_ladder_order() {
        let grid = methane_grid();
        let library =
            generate_library(&grid, &SceneParameters::default(), &CONCENTRATION_LADDER)
                .expect("library");

        assert_eq!(library.concentrations(), &CONCENTRATION_LADDER);
        assert_eq!(library.radiance().nrows(), CONCENTRATION_LADDER.len());
        assert_eq!(library.wavelength_count(), 2);

        for (row, concentration) in CONCENTRATION_LADDER.iter().enumerate() {
            let methane = methane_index(*concentration);
            for col in 0..2 {
                let expected = (10.0 - methane) * (1.0 + col as f64);
                let actual = library.radiance()[(row, col)];
                assert!(
                    (actual - expected).abs() < 1.0e-12,
                    "row {row} col {col}: expected {expected}, got {actual}"
                );
            }
        }
    }

    #[test]
    fn other_scene_parameters_stay_fixed() {
        let grid = methane_grid();
        let scene = SceneParameters::new(45.0, 3.0, 2.5, 1.0, SplineOrder::Cubic)
            .with_methane(123_456.0);
        let library = generate_library(&grid, &scene, &[0.0, 1000.0]).expect("library");

        assert!((library.radiance()[(0, 0)] - 10.0).abs() < 1.0e-9);
        assert!((library.radiance()[(1, 1)] - 18.0).abs() < 1.0e-9);
    }

    #[test]
    fn rejects_unordered_or_short_ladders() {
        let grid = methane_grid();
        let scene = SceneParameters::default();

        let error = generate_library(&grid, &scene, &[0.0]).expect_err("short ladder");
        assert_eq!(error.code(), "INPUT.CONCENTRATION_LADDER");

        let error =
            generate_library(&grid, &scene, &[0.0, 500.0, 500.0]).expect_err("repeated entry");
        assert_eq!(error.code(), "INPUT.CONCENTRATION_LADDER");
        assert!(error.message().contains("entry 2"), "{}", error.message());
    }
}
