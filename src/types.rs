use ndarray::{ArrayBase, Data, Ix2};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Real-valued raster (reflectance, radiance, index or temperature)
pub type Raster = ndarray::Array2<f64>;

/// Invalid-pixel mask, `true` = exclude the pixel and force its output to NaN
pub type Mask = ndarray::Array2<bool>;

/// Offset between the kelvin and celsius scales
pub const KELVIN_OFFSET: f64 = 273.15;

/// Hottest plausible land surface temperature in kelvin (Death Valley, 56.7 °C)
pub const MAX_EARTH_TEMP_KELVIN: f64 = KELVIN_OFFSET + 56.7;

/// Thermal infrared bands of the Landsat 8 TIRS instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThermalBand {
    /// Band 10 (10.6 - 11.19 µm)
    Band10,
    /// Band 11 (11.5 - 12.51 µm)
    Band11,
}

impl std::fmt::Display for ThermalBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThermalBand::Band10 => write!(f, "band 10"),
            ThermalBand::Band11 => write!(f, "band 11"),
        }
    }
}

/// Output temperature unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    Kelvin,
    Celsius,
}

impl TemperatureUnit {
    /// Convert a kelvin value into this unit
    pub fn from_kelvin(self, kelvin: f64) -> f64 {
        match self {
            TemperatureUnit::Kelvin => kelvin,
            TemperatureUnit::Celsius => kelvin - KELVIN_OFFSET,
        }
    }

    /// Plausibility ceiling expressed in this unit
    pub fn max_earth_temp(self) -> f64 {
        self.from_kelvin(MAX_EARTH_TEMP_KELVIN)
    }
}

impl FromStr for TemperatureUnit {
    type Err = LstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kelvin" => Ok(TemperatureUnit::Kelvin),
            // "celcius" is accepted for compatibility with older callers
            "celsius" | "celcius" => Ok(TemperatureUnit::Celsius),
            _ => Err(LstError::InvalidUnit(s.to_string())),
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemperatureUnit::Kelvin => write!(f, "kelvin"),
            TemperatureUnit::Celsius => write!(f, "celsius"),
        }
    }
}

/// Error types for LST retrieval
#[derive(Debug, thiserror::Error)]
pub enum LstError {
    #[error("Shape mismatch: {left} has shape {left_shape:?} but {right} has shape {right_shape:?}")]
    ShapeMismatch {
        left: String,
        left_shape: (usize, usize),
        right: String,
        right_shape: (usize, usize),
    },

    #[error("Input '{input}' must be provided for the {algorithm} algorithm")]
    MissingInput {
        algorithm: String,
        input: &'static str,
    },

    #[error("Requested {family} method '{name}' is not implemented. Choose among available methods: {}", .available.join(", "))]
    UnknownAlgorithm {
        family: &'static str,
        name: String,
        available: Vec<String>,
    },

    #[error("Invalid temperature unit '{0}': expected 'kelvin' or 'celsius'")]
    InvalidUnit(String),

    #[error("Method '{method}' is a {actual} algorithm and cannot be used for {requested} retrieval")]
    MethodMismatch {
        method: String,
        actual: String,
        requested: String,
    },

    #[error("Metadata error: {0}")]
    Metadata(String),
}

/// Result type for LST operations
pub type LstResult<T> = Result<T, LstError>;

/// Fail with `ShapeMismatch` unless both 2-D arrays have identical dimensions
pub fn ensure_same_shape<S1, S2>(
    left_name: &str,
    left: &ArrayBase<S1, Ix2>,
    right_name: &str,
    right: &ArrayBase<S2, Ix2>,
) -> LstResult<()>
where
    S1: Data,
    S2: Data,
{
    if left.dim() != right.dim() {
        return Err(LstError::ShapeMismatch {
            left: left_name.to_string(),
            left_shape: left.dim(),
            right: right_name.to_string(),
            right_shape: right.dim(),
        });
    }
    Ok(())
}

/// Count pixels that carry a finite value
pub fn count_valid(raster: &Raster) -> usize {
    raster.iter().filter(|v| v.is_finite()).count()
}
