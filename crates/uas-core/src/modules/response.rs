use super::library::RadianceLibrary;
use crate::domain::{BandSet, UasError, UasResult};
use crate::numerics::stable_sum_iter;
use faer::Mat;
use std::f64::consts::{LN_2, PI};

/// Gaussian standard deviation for a full width at half maximum.
pub fn fwhm_to_sigma(fwhm: f64) -> f64 {
    fwhm / (2.0 * (2.0 * LN_2).sqrt())
}

/// Normal density written out explicitly.
pub fn gaussian_density(x: f64, center: f64, sigma: f64) -> f64 {
    let variance = sigma * sigma;
    let numerator = (-(x - center).powi(2) / (2.0 * variance)).exp();
    numerator / (2.0 * PI * variance).sqrt()
}

/// Checks the band descriptors before any response weight is computed.
pub fn validate_bands(bands: &BandSet) -> UasResult<()> {
    let non_finite = bands
        .centers
        .iter()
        .position(|value| !value.is_finite())
        .map(|index| ("center", index, bands.centers[index]))
        .or_else(|| {
            bands
                .fwhm
                .iter()
                .position(|value| !value.is_finite())
                .map(|index| ("fwhm", index, bands.fwhm[index]))
        });
    if let Some((field, index, value)) = non_finite {
        return Err(UasError::input_validation(
            "INPUT.BAND_NON_FINITE",
            format!("band {field} values must be finite (NaN or Inf), band {index} has {value}"),
        ));
    }

    if bands.centers.len() != bands.fwhm.len() {
        return Err(UasError::input_validation(
            "INPUT.BAND_LENGTH_MISMATCH",
            format!(
                "band center and fwhm lists must have equal length, got {} centers and {} fwhm values",
                bands.centers.len(),
                bands.fwhm.len()
            ),
        ));
    }

    Ok(())
}

/// Per-band Gaussian weights over native wavelengths, `[native wavelength, band]`.
#[derive(Debug, Clone)]
pub struct ResponseMatrix {
    weights: Mat<f64>,
    degenerate_bands: Vec<usize>,
}

impl ResponseMatrix {
    pub fn weights(&self) -> &Mat<f64> {
        &self.weights
    }

    /// Bands whose weights did not sum to a positive value and were left unnormalized.
    pub fn degenerate_bands(&self) -> &[usize] {
        &self.degenerate_bands
    }

    pub fn band_count(&self) -> usize {
        self.weights.ncols()
    }

    pub fn column_sum(&self, band: usize) -> f64 {
        stable_sum_iter((0..self.weights.nrows()).map(|row| self.weights[(row, band)]))
    }
}

/// Builds the sum-normalized Gaussian response of every band over `wavelengths`.
pub fn build_response_matrix(wavelengths: &[f64], bands: &BandSet) -> UasResult<ResponseMatrix> {
    validate_bands(bands)?;

    let sigmas: Vec<f64> = bands.fwhm.iter().copied().map(fwhm_to_sigma).collect();
    let mut weights = Mat::from_fn(wavelengths.len(), bands.len(), |row, band| {
        gaussian_density(wavelengths[row], bands.centers[band], sigmas[band])
    });

    let mut degenerate_bands = Vec::new();
    for band in 0..bands.len() {
        let total = stable_sum_iter((0..wavelengths.len()).map(|row| weights[(row, band)]));
        if total > 0.0 {
            for row in 0..wavelengths.len() {
                weights[(row, band)] /= total;
            }
        } else {
            // A zero fwhm yields NaN densities; those entries contribute nothing.
            for row in 0..wavelengths.len() {
                if !weights[(row, band)].is_finite() {
                    weights[(row, band)] = 0.0;
                }
            }
            tracing::warn!(
                band = band + 1,
                center = bands.centers[band],
                fwhm = bands.fwhm[band],
                "band response does not sum to a positive value over the grid wavelengths; leaving it unnormalized"
            );
            degenerate_bands.push(band);
        }
    }

    Ok(ResponseMatrix {
        weights,
        degenerate_bands,
    })
}

/// Resamples the library onto sensor bands: `library × response`,
/// giving a `[concentration, band]` matrix.
pub fn resample_library(library: &RadianceLibrary, response: &ResponseMatrix) -> UasResult<Mat<f64>> {
    if library.wavelength_count() != response.weights().nrows() {
        return Err(UasError::internal(
            "INTERNAL.RESAMPLE_SHAPE",
            format!(
                "library has {} native wavelengths but the response matrix has {}",
                library.wavelength_count(),
                response.weights().nrows()
            ),
        ));
    }

    Ok(library.radiance() * response.weights())
}
