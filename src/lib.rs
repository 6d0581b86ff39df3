//! landtemp: Land Surface Temperature retrieval from Landsat 8 imagery
//!
//! This library turns raw thermal, red and near-infrared bands into land
//! surface temperature rasters using published single-window and
//! split-window algorithms, with selectable emissivity models.

pub mod types;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{LstError, LstResult, Mask, Raster, TemperatureUnit, ThermalBand};

pub use crate::core::pipeline::{single_window, split_window, RetrievalConfig};
pub use crate::core::{
    emissivity_methods, lst_methods, single_window_methods, split_window_methods,
    ColumnWaterVapour, EmissivityPair, LandSurfaceTemperature, LstInputs, ThermalCalibration,
    WindowKind,
};

/// NDVI of raw Landsat 8 bands 5 (NIR) and 4 (red), NaN where `mask` is set
pub fn ndvi(nir: &Raster, red: &Raster, mask: Option<&Mask>) -> LstResult<Raster> {
    crate::core::compute_ndvi(nir, red, crate::core::NDVI_EPSILON, mask)
}

/// Brightness temperature in kelvin of band 10 and optionally band 11,
/// using the Landsat 8 calibration constants
pub fn brightness_temperature(
    band_10: &Raster,
    band_11: Option<&Raster>,
    mask: Option<&Mask>,
) -> LstResult<(Raster, Option<Raster>)> {
    crate::core::BrightnessTemperatureProcessor::new().process(band_10, band_11, mask, TemperatureUnit::Kelvin)
}

/// Emissivity of both thermal bands with the method registered as `method`.
///
/// `red_band` is required by methods that mix NDVI with red reflectance
/// ("xiaolei"); its absence is reported as `MissingInput`.
pub fn emissivity(ndvi: &Raster, red_band: Option<&Raster>, method: &str) -> LstResult<EmissivityPair> {
    crate::core::compute_emissivity(method, ndvi, red_band)
}
