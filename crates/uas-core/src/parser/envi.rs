//! Reader for ENVI `.hdr` sidecar files.
//!
//! Only the key/value structure is interpreted; the sensor band descriptors
//! are the `wavelength` and `fwhm` lists.

use crate::domain::{BandSet, UasError, UasResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const WAVELENGTH_KEY: &str = "wavelength";
pub const FWHM_KEY: &str = "fwhm";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnviHeaderError {
    #[error("header does not start with 'ENVI'")]
    MissingMagic,
    #[error("value of '{key}' opened at line {line} is missing its closing '}}'")]
    UnterminatedBrace { key: String, line: usize },
    #[error("header has no '{0}' entry")]
    MissingKey(&'static str),
    #[error("invalid float in '{key}': '{value}'")]
    InvalidFloat { key: &'static str, value: String },
}

impl From<EnviHeaderError> for UasError {
    fn from(error: EnviHeaderError) -> Self {
        let code = match error {
            EnviHeaderError::MissingMagic | EnviHeaderError::UnterminatedBrace { .. } => {
                "INPUT.HEADER_FORMAT"
            }
            EnviHeaderError::MissingKey(_) => "INPUT.HEADER_MISSING_KEY",
            EnviHeaderError::InvalidFloat { .. } => "INPUT.HEADER_VALUE",
        };
        UasError::input_validation(code, error.to_string())
    }
}

/// Header entries keyed by lower-cased, trimmed key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnviHeader {
    entries: BTreeMap<String, String>,
}

impl EnviHeader {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.trim().to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Comma-separated list value with surrounding braces removed.
    pub fn float_list(&self, key: &'static str) -> Result<Vec<f64>, EnviHeaderError> {
        let raw = self.get(key).ok_or(EnviHeaderError::MissingKey(key))?;
        raw.trim()
            .trim_start_matches('{')
            .trim_end_matches('}')
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|_| EnviHeaderError::InvalidFloat {
                        key,
                        value: token.to_string(),
                    })
            })
            .collect()
    }
}

pub fn parse_envi_header(source: &str) -> Result<EnviHeader, EnviHeaderError> {
    let mut lines = source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    match lines.next() {
        Some((_, magic)) if magic.starts_with("ENVI") => {}
        _ => return Err(EnviHeaderError::MissingMagic),
    }

    let mut entries = BTreeMap::new();
    while let Some((line_number, line)) = lines.next() {
        if line.starts_with(';') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let mut value = value.trim().to_string();

        if value.starts_with('{') && !value.contains('}') {
            loop {
                let Some((_, continuation)) = lines.next() else {
                    return Err(EnviHeaderError::UnterminatedBrace {
                        key,
                        line: line_number,
                    });
                };
                value.push(' ');
                value.push_str(continuation);
                if continuation.contains('}') {
                    break;
                }
            }
        }

        entries.insert(key, value);
    }

    Ok(EnviHeader { entries })
}

/// Extracts band centers and FWHM from header text.
///
/// Values are returned as written; finiteness and length agreement are
/// checked when the response matrix is built.
pub fn parse_envi_bands(source: &str) -> UasResult<BandSet> {
    let header = parse_envi_header(source)?;
    let centers = header.float_list(WAVELENGTH_KEY)?;
    let fwhm = header.float_list(FWHM_KEY)?;
    Ok(BandSet::new(centers, fwhm))
}

pub fn read_envi_bands(path: impl AsRef<Path>) -> UasResult<BandSet> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| {
        UasError::io_system(
            "IO.HEADER_READ",
            format!("failed to read ENVI header '{}': {source}", path.display()),
        )
    })?;

    let bands = parse_envi_bands(&source)?;
    tracing::debug!(path = %path.display(), bands = bands.len(), "read sensor bands");
    Ok(bands)
}
