use crate::core::brightness_temperature::{BrightnessTemperatureProcessor, ThermalCalibration};
use crate::core::emissivity::{emissivity_methods, EmissivityInputs};
use crate::core::mask::build_mask;
use crate::core::ndvi::{compute_ndvi, NDVI_EPSILON};
use crate::core::temperature::{ColumnWaterVapour, LandSurfaceTemperature, LstInputs, WindowKind};
use crate::types::{ensure_same_shape, LstError, LstResult, Raster, TemperatureUnit};
use serde::{Deserialize, Serialize};

/// Parameters of an end-to-end retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Thermal band constants
    pub calibration: ThermalCalibration,
    /// NDVI denominator guard
    pub ndvi_epsilon: f64,
    /// Band 10 value marking pixels without data
    pub nodata_value: f64,
    /// Scalar column water vapour for methods that use it
    pub column_water_vapour: Option<f64>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            calibration: ThermalCalibration::default(),
            ndvi_epsilon: NDVI_EPSILON,
            nodata_value: 0.0,
            column_water_vapour: None,
        }
    }
}

/// Resolve an LST method and check it belongs to the requested window kind
fn select_method(lst_method: &str, requested: WindowKind) -> LstResult<LandSurfaceTemperature> {
    let lst = LandSurfaceTemperature::new(lst_method)?;
    if lst.window() != requested {
        return Err(LstError::MethodMismatch {
            method: lst_method.to_string(),
            actual: lst.window().to_string(),
            requested: requested.to_string(),
        });
    }
    Ok(lst)
}

/// Single-window LST from raw Landsat 8 bands 10, 4 (red) and 5 (NIR)
pub fn single_window(
    band_10: &Raster,
    red: &Raster,
    nir: &Raster,
    lst_method: &str,
    emissivity_method: &str,
    unit: TemperatureUnit,
) -> LstResult<Raster> {
    single_window_with_config(
        band_10,
        red,
        nir,
        lst_method,
        emissivity_method,
        unit,
        &RetrievalConfig::default(),
    )
}

/// [`single_window`] with explicit calibration and thresholds
pub fn single_window_with_config(
    band_10: &Raster,
    red: &Raster,
    nir: &Raster,
    lst_method: &str,
    emissivity_method: &str,
    unit: TemperatureUnit,
    config: &RetrievalConfig,
) -> LstResult<Raster> {
    retrieve(
        band_10,
        None,
        red,
        nir,
        lst_method,
        emissivity_method,
        unit,
        config,
    )
}

/// Split-window LST from raw Landsat 8 bands 10, 11, 4 (red) and 5 (NIR)
pub fn split_window(
    band_10: &Raster,
    band_11: &Raster,
    red: &Raster,
    nir: &Raster,
    lst_method: &str,
    emissivity_method: &str,
    unit: TemperatureUnit,
) -> LstResult<Raster> {
    split_window_with_config(
        band_10,
        band_11,
        red,
        nir,
        lst_method,
        emissivity_method,
        unit,
        &RetrievalConfig::default(),
    )
}

/// [`split_window`] with explicit calibration and thresholds
#[allow(clippy::too_many_arguments)]
pub fn split_window_with_config(
    band_10: &Raster,
    band_11: &Raster,
    red: &Raster,
    nir: &Raster,
    lst_method: &str,
    emissivity_method: &str,
    unit: TemperatureUnit,
    config: &RetrievalConfig,
) -> LstResult<Raster> {
    retrieve(
        band_10,
        Some(band_11),
        red,
        nir,
        lst_method,
        emissivity_method,
        unit,
        config,
    )
}

#[allow(clippy::too_many_arguments)]
fn retrieve(
    band_10: &Raster,
    band_11: Option<&Raster>,
    red: &Raster,
    nir: &Raster,
    lst_method: &str,
    emissivity_method: &str,
    unit: TemperatureUnit,
    config: &RetrievalConfig,
) -> LstResult<Raster> {
    let window = if band_11.is_some() {
        WindowKind::Split
    } else {
        WindowKind::Single
    };
    let (rows, cols) = band_10.dim();
    log::info!(
        "Starting {} retrieval ({} / {}) for {}x{} image",
        window,
        lst_method,
        emissivity_method,
        rows,
        cols
    );

    // Fail on bad names and shapes before any raster work
    let lst = select_method(lst_method, window)?;
    let emissivity_runner = emissivity_methods();
    emissivity_runner.resolve(emissivity_method)?;

    ensure_same_shape("band_10", band_10, "red", red)?;
    ensure_same_shape("band_10", band_10, "nir", nir)?;
    if let Some(band_11) = band_11 {
        ensure_same_shape("band_10", band_10, "band_11", band_11)?;
    }

    let mask = build_mask(band_10, config.nodata_value);
    let ndvi = compute_ndvi(nir, red, config.ndvi_epsilon, Some(&mask))?;

    let processor = BrightnessTemperatureProcessor::with_calibration(config.calibration);
    let (tb_10, tb_11) = processor.process(band_10, band_11, Some(&mask), TemperatureUnit::Kelvin)?;

    let emissivity = emissivity_runner.invoke(
        emissivity_method,
        &EmissivityInputs {
            ndvi: &ndvi,
            red_band: Some(red),
        },
    )?;

    let emissivity_11 = match window {
        WindowKind::Split => emissivity.band_11.as_ref(),
        WindowKind::Single => None,
    };
    let inputs = LstInputs {
        brightness_temperature_11: tb_11.as_ref(),
        emissivity_10: Some(&emissivity.band_10),
        emissivity_11,
        ndvi: Some(&ndvi),
        mask: Some(&mask),
        column_water_vapour: config.column_water_vapour.map(ColumnWaterVapour::Scalar),
        ..LstInputs::new(&tb_10)
    };

    lst.compute(&inputs, unit)
}
