use crate::domain::{
    ABSORPTION_SCALING, SpectrumRow, UasError, UasResult, UnitAbsorptionSpectrum,
};
use crate::numerics::{RegressionError, fit_line};
use faer::Mat;

/// Natural log with non-positive radiance mapped to zero.
pub fn safe_log(radiance: f64) -> f64 {
    if radiance > 0.0 { radiance.ln() } else { 0.0 }
}

/// Fits `ln(radiance) = a + b * concentration` for every band column of
/// `resampled` and reports `b * 1e5` per band.
pub fn regress_unit_absorption(
    resampled: &Mat<f64>,
    concentrations: &[f64],
    band_centers: &[f64],
) -> UasResult<UnitAbsorptionSpectrum> {
    if resampled.nrows() != concentrations.len() || resampled.ncols() != band_centers.len() {
        return Err(UasError::internal(
            "INTERNAL.REGRESSION_SHAPE",
            format!(
                "resampled library is {}x{} but {} concentrations and {} bands were given",
                resampled.nrows(),
                resampled.ncols(),
                concentrations.len(),
                band_centers.len()
            ),
        ));
    }

    let mut rows = Vec::with_capacity(band_centers.len());
    let mut log_radiance = vec![0.0; concentrations.len()];
    for (band, center) in band_centers.iter().enumerate() {
        for (row, value) in log_radiance.iter_mut().enumerate() {
            *value = safe_log(resampled[(row, band)]);
        }

        let fit = fit_line(concentrations, &log_radiance)
            .map_err(|error| regression_error(band, error))?;
        rows.push(SpectrumRow {
            band: band + 1,
            center: *center,
            coefficient: fit.slope * ABSORPTION_SCALING,
        });
    }

    Ok(UnitAbsorptionSpectrum { rows })
}

fn regression_error(band: usize, error: RegressionError) -> UasError {
    UasError::computation(
        "RUN.SLOPE_REGRESSION",
        format!("slope fit failed for band {}: {error}", band + 1),
    )
}
