//! Core retrieval stages

pub mod mask;
pub mod ndvi;
pub mod vegetation;
pub mod brightness_temperature;
pub mod registry;
pub mod emissivity;
pub mod temperature;
pub mod pipeline;

// Re-export main types
pub use mask::{build_mask, apply_mask, apply_optional_mask};
pub use ndvi::{compute_ndvi, NDVI_EPSILON};
pub use vegetation::{LandCover, fractional_vegetation_cover, cavity_effect, rescale_band};
pub use brightness_temperature::{BandCalibration, ThermalCalibration, BrightnessTemperatureProcessor, compute_brightness_temperature};
pub use registry::{Algorithm, Runner};
pub use emissivity::{EmissivityAlgorithm, EmissivityInputs, EmissivityPair, emissivity_methods, compute_emissivity};
pub use temperature::{LstAlgorithm, LstInputs, LstInput, ColumnWaterVapour, LandSurfaceTemperature, WindowKind, lst_methods, single_window_methods, split_window_methods};
pub use pipeline::{RetrievalConfig, single_window_with_config, split_window_with_config};
