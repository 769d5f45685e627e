use super::axis_index::LookupIndex;
use crate::domain::{SceneParameters, SpectrumRow, UasError, UasResult, UnitAbsorptionSpectrum};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Fixed-point float with a blank in the sign position for non-negative values,
/// right-aligned to `width`.
pub fn format_space_signed_f64(value: f64, width: usize, precision: usize) -> String {
    let body = if value.is_sign_negative() {
        format!("{value:.precision$}")
    } else {
        format!(" {value:.precision$}")
    };
    format!("{body:>width$}")
}

/// `BBB CCCCCC.CCC K.KKKKKKKKKKKKKKKKKK`: zero-padded band number, band center
/// with three decimals, coefficient with eighteen.
pub fn format_spectrum_row(row: &SpectrumRow) -> String {
    format!(
        "{:03} {} {:.18}",
        row.band,
        format_space_signed_f64(row.center, 10, 3),
        row.coefficient
    )
}

pub fn render_spectrum_table(spectrum: &UnitAbsorptionSpectrum) -> String {
    let mut table = String::new();
    for row in &spectrum.rows {
        table.push_str(&format_spectrum_row(row));
        table.push('\n');
    }
    table
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

pub fn write_spectrum_table(path: &Path, spectrum: &UnitAbsorptionSpectrum) -> UasResult<()> {
    write_text_artifact(path, &render_spectrum_table(spectrum)).map_err(|source| {
        UasError::io_system(
            "IO.OUTPUT_WRITE",
            format!(
                "failed to write unit absorption spectrum '{}': {source}",
                path.display()
            ),
        )
    })
}

/// JSON run summary written next to the spectrum on request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata<'a> {
    pub scene: SceneParameters,
    pub lookup_index: LookupIndex,
    pub dataset: String,
    pub header: String,
    pub output: String,
    pub band_count: usize,
    pub concentration_ladder: &'a [f64],
    /// 1-based numbers of bands left unnormalized.
    pub degenerate_bands: Vec<usize>,
}

pub fn write_run_metadata(path: &Path, metadata: &RunMetadata<'_>) -> UasResult<()> {
    let content = serde_json::to_string_pretty(metadata).map_err(|error| {
        UasError::internal(
            "INTERNAL.METADATA_ENCODE",
            format!("failed to encode run metadata: {error}"),
        )
    })?;
    write_text_artifact(path, &content).map_err(|source| {
        UasError::io_system(
            "IO.METADATA_WRITE",
            format!("failed to write run metadata '{}': {source}", path.display()),
        )
    })
}
