use super::axis_index::GridAxis;
use crate::domain::{UasError, UasResult};
use ndarray::{ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

pub use crate::domain::DEFAULT_DATASET_PATH;

pub const GRID_DATA_ENTRY: &str = "grid_5deg_data";
pub const GRID_PARAMETER_ENTRY: &str = "grid_5deg_param";
pub const GRID_WAVELENGTH_ENTRY: &str = "wave";

/// Rank of the radiance array: five physical axes followed by wavelength.
pub const GRID_RANK: usize = 6;

/// Precomputed top-of-atmosphere radiance indexed by
/// `[zenith, sensor height, ground elevation, water vapor, methane, wavelength]`.
///
/// Immutable once built; every pipeline stage only borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupGrid {
    shape: [usize; GRID_RANK],
    values: Vec<f64>,
    wavelengths: Vec<f64>,
    parameters: Option<ArrayD<f64>>,
}

impl LookupGrid {
    pub fn new(data: ArrayD<f64>, wavelengths: Vec<f64>) -> UasResult<Self> {
        let shape: [usize; GRID_RANK] = data.shape().try_into().map_err(|_| {
            UasError::input_validation(
                "INPUT.GRID_SHAPE",
                format!(
                    "lookup grid must have {GRID_RANK} dimensions, got shape {:?}",
                    data.shape()
                ),
            )
        })?;

        if let Some(empty_axis) = shape.iter().position(|len| *len == 0) {
            return Err(UasError::input_validation(
                "INPUT.GRID_SHAPE",
                format!("lookup grid axis {empty_axis} is empty (shape {shape:?})"),
            ));
        }

        let wavelength_count = shape[GRID_RANK - 1];
        if wavelengths.len() != wavelength_count {
            return Err(UasError::input_validation(
                "INPUT.GRID_WAVELENGTH",
                format!(
                    "lookup grid has {wavelength_count} wavelength samples but the wavelength axis has {}",
                    wavelengths.len()
                ),
            ));
        }
        if let Some(index) = wavelengths.iter().position(|value| !value.is_finite()) {
            return Err(UasError::input_validation(
                "INPUT.GRID_WAVELENGTH",
                format!(
                    "wavelength axis entry must be finite at index {index}, got {}",
                    wavelengths[index]
                ),
            ));
        }

        // Row-major storage; only non-standard layouts are copied.
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        let (mut values, offset) = data.into_raw_vec_and_offset();
        let start = offset.unwrap_or(0);
        values.truncate(start + shape.iter().product::<usize>());
        values.drain(..start);
        Ok(Self {
            shape,
            values,
            wavelengths,
            parameters: None,
        })
    }

    pub fn with_parameters(mut self, parameters: ArrayD<f64>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Reads the `.npz` artifact at `path`.
    pub fn load(path: impl AsRef<Path>) -> UasResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| GridLoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut archive = NpzReader::new(file).map_err(|source| GridLoadError::Archive {
            path: path.to_path_buf(),
            source,
        })?;

        let data = read_required_entry(&mut archive, path, GRID_DATA_ENTRY)?;
        let wavelengths = read_required_entry(&mut archive, path, GRID_WAVELENGTH_ENTRY)?
            .iter()
            .copied()
            .collect();
        let grid = Self::new(data, wavelengths)?;

        let grid = match read_optional_entry(&mut archive, GRID_PARAMETER_ENTRY) {
            Ok(Some(parameters)) => grid.with_parameters(parameters),
            Ok(None) => {
                tracing::debug!(path = %path.display(), "lookup grid has no parameter table");
                grid
            }
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "lookup grid parameter table is unreadable and will be ignored"
                );
                grid
            }
        };

        tracing::info!(
            path = %path.display(),
            shape = ?grid.shape,
            wavelengths = grid.wavelength_count(),
            "loaded lookup grid"
        );
        Ok(grid)
    }

    pub fn shape(&self) -> [usize; GRID_RANK] {
        self.shape
    }

    pub fn axis_len(&self, axis: GridAxis) -> usize {
        self.shape[axis.position()]
    }

    pub fn wavelength_count(&self) -> usize {
        self.shape[GRID_RANK - 1]
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Per-axis physical values, when the artifact carried them.
    pub fn parameters(&self) -> Option<&ArrayD<f64>> {
        self.parameters.as_ref()
    }

    /// Radiance spectrum stored at integer node `index` of the five physical axes.
    pub fn spectrum_at(&self, index: [usize; 5]) -> &[f64] {
        let mut offset = 0;
        for (position, node) in index.iter().enumerate() {
            offset = offset * self.shape[position] + node;
        }
        let start = offset * self.wavelength_count();
        &self.values[start..start + self.wavelength_count()]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GridLoadError {
    #[error("failed to open lookup grid '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read lookup grid archive '{}': {source}", path.display())]
    Archive {
        path: PathBuf,
        source: ReadNpzError,
    },
    #[error("lookup grid '{}' has no '{entry}' array", path.display())]
    MissingEntry { path: PathBuf, entry: &'static str },
    #[error("failed to read '{entry}' from lookup grid '{}': {source}", path.display())]
    Entry {
        path: PathBuf,
        entry: &'static str,
        source: ReadNpzError,
    },
}

impl From<GridLoadError> for UasError {
    fn from(error: GridLoadError) -> Self {
        match error {
            GridLoadError::Open { .. } => UasError::io_system("IO.GRID_OPEN", error.to_string()),
            GridLoadError::Archive { .. } => {
                UasError::io_system("IO.GRID_ARCHIVE", error.to_string())
            }
            GridLoadError::MissingEntry { .. } => {
                UasError::input_validation("INPUT.GRID_MISSING_ENTRY", error.to_string())
            }
            GridLoadError::Entry { .. } => UasError::io_system("IO.GRID_ENTRY", error.to_string()),
        }
    }
}

fn read_required_entry<R: Read + Seek>(
    archive: &mut NpzReader<R>,
    path: &Path,
    entry: &'static str,
) -> Result<ArrayD<f64>, GridLoadError> {
    let name = resolve_entry_name(archive, entry)
        .map_err(|source| GridLoadError::Archive {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| GridLoadError::MissingEntry {
            path: path.to_path_buf(),
            entry,
        })?;

    read_float_array(archive, &name).map_err(|source| GridLoadError::Entry {
        path: path.to_path_buf(),
        entry,
        source,
    })
}

fn read_optional_entry<R: Read + Seek>(
    archive: &mut NpzReader<R>,
    entry: &str,
) -> Result<Option<ArrayD<f64>>, ReadNpzError> {
    match resolve_entry_name(archive, entry)? {
        Some(name) => read_float_array(archive, &name).map(Some),
        None => Ok(None),
    }
}

/// `numpy.savez` stores `key.npy`; other writers may omit the suffix.
fn resolve_entry_name<R: Read + Seek>(
    archive: &mut NpzReader<R>,
    entry: &str,
) -> Result<Option<String>, ReadNpzError> {
    let suffixed = format!("{entry}.npy");
    Ok(archive
        .names()?
        .into_iter()
        .find(|name| name == entry || *name == suffixed))
}

/// Reads `float64` directly and widens `float32`.
fn read_float_array<R: Read + Seek>(
    archive: &mut NpzReader<R>,
    name: &str,
) -> Result<ArrayD<f64>, ReadNpzError> {
    match archive.by_name::<OwnedRepr<f64>, IxDyn>(name) {
        Ok(array) => Ok(array),
        Err(wide_error) => archive
            .by_name::<OwnedRepr<f32>, IxDyn>(name)
            .map(|array| array.mapv(f64::from))
            .map_err(|_| wide_error),
    }
}
