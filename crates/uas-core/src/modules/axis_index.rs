//! Calibration curves from physical scene values to fractional grid indices.
//!
//! Each curve encodes the sampling of its lookup-grid axis:
//! zenith every 5 degrees, sensor height at {1, 2, 4, 10, 20, 200} km,
//! ground elevation at {0, 0.5, 1, 2, 3} km, water vapor in index units, and
//! methane on the {0, 500, 1000, 2000, ...} ppm·m doubling ladder.

use crate::domain::SceneParameters;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridAxis {
    Zenith,
    SensorHeight,
    GroundElevation,
    WaterVapor,
    Methane,
}

impl GridAxis {
    pub const ALL: [GridAxis; 5] = [
        Self::Zenith,
        Self::SensorHeight,
        Self::GroundElevation,
        Self::WaterVapor,
        Self::Methane,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zenith => "zenith",
            Self::SensorHeight => "sensor_height",
            Self::GroundElevation => "ground_elevation",
            Self::WaterVapor => "water_vapor",
            Self::Methane => "methane",
        }
    }

    /// Position of the axis in the grid's dimension order.
    pub const fn position(self) -> usize {
        match self {
            Self::Zenith => 0,
            Self::SensorHeight => 1,
            Self::GroundElevation => 2,
            Self::WaterVapor => 3,
            Self::Methane => 4,
        }
    }

    pub fn index_for(self, value: f64) -> f64 {
        match self {
            Self::Zenith => zenith_index(value),
            Self::SensorHeight => sensor_height_index(value),
            Self::GroundElevation => ground_elevation_index(value),
            Self::WaterVapor => water_vapor_index(value),
            Self::Methane => methane_index(value),
        }
    }

    /// Applies the axis curve elementwise.
    pub fn indices_for(self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|value| self.index_for(*value)).collect()
    }
}

impl Display for GridAxis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

pub fn zenith_index(zenith_deg: f64) -> f64 {
    zenith_deg / 5.0
}

pub fn sensor_height_index(height_km: f64) -> f64 {
    if height_km < 1.0 {
        0.0
    } else if height_km < 2.0 {
        height_km - 1.0
    } else if height_km < 4.0 {
        height_km / 2.0
    } else if height_km < 10.0 {
        height_km / 6.0 + 4.0 / 3.0
    } else if height_km < 20.0 {
        height_km / 10.0 + 2.0
    } else if height_km < 200.0 {
        height_km / 180.0 + 35.0 / 9.0
    } else {
        5.0
    }
}

pub fn ground_elevation_index(elevation_km: f64) -> f64 {
    if elevation_km < 1.0 {
        2.0 * elevation_km
    } else {
        1.0 + elevation_km
    }
}

pub fn water_vapor_index(water_cm: f64) -> f64 {
    water_cm
}

// The two non-zero branches only meet at exactly 1000 ppm·m; the curve is kept as-is.
pub fn methane_index(methane_ppmm: f64) -> f64 {
    if methane_ppmm <= 0.0 {
        0.0
    } else if methane_ppmm < 1000.0 {
        methane_ppmm / 1000.0
    } else {
        (methane_ppmm / 500.0).log2()
    }
}

/// Fractional coordinates into the first five grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LookupIndex {
    pub zenith: f64,
    pub sensor_height: f64,
    pub ground_elevation: f64,
    pub water_vapor: f64,
    pub methane: f64,
}

impl LookupIndex {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.zenith,
            self.sensor_height,
            self.ground_elevation,
            self.water_vapor,
            self.methane,
        ]
    }

    pub fn get(&self, axis: GridAxis) -> f64 {
        self.as_array()[axis.position()]
    }
}

pub fn lookup_index(scene: &SceneParameters) -> LookupIndex {
    LookupIndex {
        zenith: zenith_index(scene.zenith_deg),
        sensor_height: sensor_height_index(scene.sensor_height_km),
        ground_elevation: ground_elevation_index(scene.ground_elevation_km),
        water_vapor: water_vapor_index(scene.water_vapor_cm),
        methane: methane_index(scene.methane_ppmm),
    }
}
