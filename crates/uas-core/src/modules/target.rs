use super::axis_index::{LookupIndex, lookup_index};
use super::grid::LookupGrid;
use super::library::generate_library;
use super::response::{build_response_matrix, resample_library, validate_bands};
use super::serialization::{RunMetadata, write_run_metadata, write_spectrum_table};
use super::slope::regress_unit_absorption;
use crate::domain::{
    BandSet, CONCENTRATION_LADDER, SceneParameters, TargetRequest, UasResult,
    UnitAbsorptionSpectrum,
};
use crate::parser::read_envi_bands;

#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutcome {
    pub spectrum: UnitAbsorptionSpectrum,
    /// Grid coordinates of the scene, methane taken from the scene itself.
    pub lookup_index: LookupIndex,
    /// Zero-based bands whose response was left unnormalized.
    pub degenerate_bands: Vec<usize>,
}

/// Unit absorption spectrum of `scene` for `bands` over the standard concentration ladder.
pub fn generate_target(
    grid: &LookupGrid,
    scene: &SceneParameters,
    bands: &BandSet,
) -> UasResult<TargetOutcome> {
    generate_target_with_ladder(grid, scene, bands, &CONCENTRATION_LADDER)
}

pub fn generate_target_with_ladder(
    grid: &LookupGrid,
    scene: &SceneParameters,
    bands: &BandSet,
    ladder: &[f64],
) -> UasResult<TargetOutcome> {
    validate_bands(bands)?;

    let index = lookup_index(scene);
    tracing::debug!(
        indices = ?index.as_array(),
        order = %scene.order,
        "mapped scene onto grid axes"
    );

    let library = generate_library(grid, scene, ladder)?;
    let response = build_response_matrix(grid.wavelengths(), bands)?;
    let resampled = resample_library(&library, &response)?;
    let spectrum = regress_unit_absorption(&resampled, library.concentrations(), &bands.centers)?;

    Ok(TargetOutcome {
        spectrum,
        lookup_index: index,
        degenerate_bands: response.degenerate_bands().to_vec(),
    })
}

/// Reads the header and grid named by `request`, generates the spectrum and
/// writes the table plus optional metadata.
///
/// Band descriptors are validated before the grid artifact is opened.
pub fn run_target_request(request: &TargetRequest) -> UasResult<TargetOutcome> {
    let bands = read_envi_bands(&request.header_path)?;
    validate_bands(&bands)?;

    let grid = LookupGrid::load(&request.dataset_path)?;
    let outcome = generate_target(&grid, &request.scene, &bands)?;
    write_spectrum_table(&request.output_path, &outcome.spectrum)?;

    if let Some(metadata_path) = &request.metadata_path {
        let metadata = RunMetadata {
            scene: request.scene,
            lookup_index: outcome.lookup_index,
            dataset: request.dataset_path.display().to_string(),
            header: request.header_path.display().to_string(),
            output: request.output_path.display().to_string(),
            band_count: bands.len(),
            concentration_ladder: &CONCENTRATION_LADDER,
            degenerate_bands: outcome.degenerate_bands.iter().map(|band| band + 1).collect(),
        };
        write_run_metadata(metadata_path, &metadata)?;
    }

    tracing::info!(
        output = %request.output_path.display(),
        bands = outcome.spectrum.len(),
        degenerate = outcome.degenerate_bands.len(),
        "wrote unit absorption spectrum"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::{generate_target, generate_target_with_ladder, run_target_request};
    use crate::domain::{BandSet, SceneParameters, TargetRequest};
    use crate::modules::grid::LookupGrid;
    use ndarray::{Array, IxDyn};
    use std::fs;
    use tempfile::TempDir;

    fn decaying_grid() -> LookupGrid {
        let data = Array::from_shape_fn(IxDyn(&[1, 6, 1, 1, 7, 4]), |index| {
            (100.0 + index[1] as f64) * (-0.1 * (index[5] as f64 + 1.0) * index[4] as f64).exp()
        });
        LookupGrid::new(data, vec![2300.0, 2301.0, 2302.0, 2303.0]).expect("grid")
    }

    #[test]
    fn invalid_bands_fail_before_interpolation() {
        let grid = decaying_grid();
        let error = generate_target(
            &grid,
            &SceneParameters::default(),
            &BandSet::new(vec![2301.0, 2302.0], vec![1.0]),
        )
        .expect_err("length mismatch");
        assert_eq!(error.code(), "INPUT.BAND_LENGTH_MISMATCH");
    }

    #[test]
    fn one_row_per_band_in_band_order() {
        let grid = decaying_grid();
        let bands = BandSet::new(vec![2300.5, 2302.0, 9000.0], vec![1.5, 2.0, 1.0]);
        let outcome =
            generate_target(&grid, &SceneParameters::default(), &bands).expect("target");

        let numbers: Vec<usize> = outcome.spectrum.rows.iter().map(|row| row.band).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(outcome.spectrum.rows[1].center, 2302.0);
        assert!(outcome.spectrum.rows[0].coefficient < 0.0);
        assert_eq!(outcome.degenerate_bands, vec![2]);
        assert_eq!(outcome.spectrum.rows[2].coefficient, 0.0);
        assert_eq!(outcome.lookup_index.sensor_height, 5.0);
    }

    #[test]
    fn zero_fwhm_band_yields_zero_while_neighbours_are_computed() {
        let grid = decaying_grid();
        let bands = BandSet::new(vec![2301.0, 2302.0], vec![1.0, 0.0]);
        let outcome =
            generate_target(&grid, &SceneParameters::default(), &bands).expect("target");

        assert_eq!(outcome.spectrum.len(), 2);
        assert_eq!(outcome.degenerate_bands, vec![1]);
        assert!(outcome.spectrum.rows[0].coefficient < 0.0);
        assert_eq!(outcome.spectrum.rows[1].coefficient, 0.0);
        assert!(outcome.spectrum.coefficients().iter().all(|value| value.is_finite()));
    }

    #[test]
    fn custom_ladder_is_validated() {
        let grid = decaying_grid();
        let error = generate_target_with_ladder(
            &grid,
            &SceneParameters::default(),
            &BandSet::new(vec![2301.0], vec![1.0]),
            &[1000.0, 0.0],
        )
        .expect_err("descending ladder");
        assert_eq!(error.code(), "INPUT.CONCENTRATION_LADDER");
    }

    #[test]
    fn request_validates_bands_before_opening_the_grid() {
        let temp = TempDir::new().expect("tempdir should be created");
        let header = temp.path().join("scene.hdr");
        fs::write(&header, "ENVI\nwavelength = {2300, inf}\nfwhm = {5, 5}\n")
            .expect("header should be written");

        let request = TargetRequest {
            dataset_path: temp.path().join("missing.npz"),
            output_path: temp.path().join("out.txt"),
            ..TargetRequest::new(SceneParameters::default(), &header)
        };
        let error = run_target_request(&request).expect_err("non-finite band");
        assert_eq!(error.code(), "INPUT.BAND_NON_FINITE");
        assert!(!request.output_path.exists());
    }
}
