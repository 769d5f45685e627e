pub mod errors;

pub use errors::{UasError, UasErrorCategory, UasResult};

use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Methane enhancements (ppm·m) the regression library is built from.
/// Strictly increasing and anchored at a zero baseline.
pub const CONCENTRATION_LADDER: [f64; 8] = [
    0.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0, 32000.0,
];

/// Multiplier applied to the fitted log-radiance slope.
pub const ABSORPTION_SCALING: f64 = 1.0e5;

pub const DEFAULT_DATASET_PATH: &str = "dataset_noms.npz";
pub const DEFAULT_OUTPUT_PATH: &str = "generated_uas.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "u8")]
pub enum SplineOrder {
    #[default]
    Linear,
    Cubic,
}

impl SplineOrder {
    pub const fn degree(self) -> u8 {
        match self {
            Self::Linear => 1,
            Self::Cubic => 3,
        }
    }
}

impl From<SplineOrder> for u8 {
    fn from(order: SplineOrder) -> Self {
        order.degree()
    }
}

impl TryFrom<u8> for SplineOrder {
    type Error = UasError;

    fn try_from(degree: u8) -> Result<Self, Self::Error> {
        match degree {
            1 => Ok(Self::Linear),
            3 => Ok(Self::Cubic),
            other => Err(UasError::input_validation(
                "INPUT.SPLINE_ORDER",
                format!("spline order must be 1 or 3, got {other}"),
            )),
        }
    }
}

impl Display for SplineOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.degree())
    }
}

/// Observation geometry and atmosphere for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneParameters {
    /// Solar/viewing zenith angle in degrees.
    pub zenith_deg: f64,
    /// Sensor altitude in km.
    pub sensor_height_km: f64,
    /// Ground elevation in km.
    pub ground_elevation_km: f64,
    /// Column water vapor in cm.
    pub water_vapor_cm: f64,
    /// Methane enhancement in ppm·m.
    pub methane_ppmm: f64,
    pub order: SplineOrder,
}

impl Default for SceneParameters {
    fn default() -> Self {
        Self {
            zenith_deg: 0.0,
            sensor_height_km: 200.0,
            ground_elevation_km: 0.0,
            water_vapor_cm: 0.0,
            methane_ppmm: 0.0,
            order: SplineOrder::Linear,
        }
    }
}

impl SceneParameters {
    pub fn new(
        zenith_deg: f64,
        sensor_height_km: f64,
        ground_elevation_km: f64,
        water_vapor_cm: f64,
        order: SplineOrder,
    ) -> Self {
        Self {
            zenith_deg,
            sensor_height_km,
            ground_elevation_km,
            water_vapor_cm,
            methane_ppmm: 0.0,
            order,
        }
    }

    pub fn with_methane(self, methane_ppmm: f64) -> Self {
        Self {
            methane_ppmm,
            ..self
        }
    }
}

/// Sensor band centers and full-width-half-max values, in grid wavelength units.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BandSet {
    pub centers: Vec<f64>,
    pub fwhm: Vec<f64>,
}

impl BandSet {
    pub fn new(centers: Vec<f64>, fwhm: Vec<f64>) -> Self {
        Self { centers, fwhm }
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectrumRow {
    /// 1-based band number.
    pub band: usize,
    pub center: f64,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UnitAbsorptionSpectrum {
    pub rows: Vec<SpectrumRow>,
}

impl UnitAbsorptionSpectrum {
    pub fn coefficients(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.coefficient).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One fully resolved generation run: scene, inputs and output locations.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRequest {
    pub scene: SceneParameters,
    pub header_path: PathBuf,
    pub dataset_path: PathBuf,
    pub output_path: PathBuf,
    pub metadata_path: Option<PathBuf>,
}

impl TargetRequest {
    pub fn new(scene: SceneParameters, header_path: impl Into<PathBuf>) -> Self {
        Self {
            scene,
            header_path: header_path.into(),
            ..Self::default()
        }
    }
}

impl Default for TargetRequest {
    fn default() -> Self {
        Self {
            scene: SceneParameters::default(),
            header_path: PathBuf::new(),
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            metadata_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CONCENTRATION_LADDER, SceneParameters, SplineOrder, TargetRequest};
    use std::path::Path;

    #[test]
    fn target_request_defaults_follow_command_defaults() {
        let request = TargetRequest::new(SceneParameters::default(), "scene.hdr");
        assert_eq!(request.header_path, Path::new("scene.hdr"));
        assert_eq!(request.dataset_path, Path::new("dataset_noms.npz"));
        assert_eq!(request.output_path, Path::new("generated_uas.txt"));
        assert_eq!(request.metadata_path, None);
        assert_eq!(request.scene.sensor_height_km, 200.0);
        assert_eq!(request.scene.order, SplineOrder::Linear);
    }

    #[test]
    fn ladder_is_strictly_increasing_from_zero() {
        assert_eq!(CONCENTRATION_LADDER[0], 0.0);
        assert!(
            CONCENTRATION_LADDER
                .windows(2)
                .all(|pair| pair[0] < pair[1])
        );
    }

    #[test]
    fn spline_order_accepts_only_linear_and_cubic() {
        assert_eq!(SplineOrder::try_from(1).expect("linear"), SplineOrder::Linear);
        assert_eq!(SplineOrder::try_from(3).expect("cubic"), SplineOrder::Cubic);

        let error = SplineOrder::try_from(2).expect_err("quadratic is rejected");
        assert_eq!(error.code(), "INPUT.SPLINE_ORDER");
    }

    #[test]
    fn with_methane_keeps_other_parameters() {
        let scene = SceneParameters::new(30.0, 4.0, 0.5, 1.5, SplineOrder::Cubic);
        let substituted = scene.with_methane(2000.0);

        assert_eq!(substituted.methane_ppmm, 2000.0);
        assert_eq!(substituted.zenith_deg, 30.0);
        assert_eq!(substituted.sensor_height_km, 4.0);
        assert_eq!(substituted.ground_elevation_km, 0.5);
        assert_eq!(substituted.water_vapor_cm, 1.5);
        assert_eq!(substituted.order, SplineOrder::Cubic);
    }
}
