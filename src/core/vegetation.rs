//! Vegetation helpers shared by the emissivity and temperature algorithms

use crate::types::Raster;
use serde::{Deserialize, Serialize};

/// Lowest valid NDVI
pub const NDVI_MIN: f64 = -1.0;
/// Highest valid NDVI
pub const NDVI_MAX: f64 = 1.0;
/// NDVI below which a pixel is bare soil
pub const BARESOIL_NDVI_MAX: f64 = 0.2;
/// NDVI above which a pixel is fully vegetated
pub const VEGETATION_NDVI_MIN: f64 = 0.5;

/// Default geometrical factor of the cavity effect
pub const DEFAULT_GEOMETRICAL_FACTOR: f64 = 0.55;

/// NDVI-derived land cover class of a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandCover {
    /// ndvi in [-1, 0.2)
    BareSoil,
    /// ndvi in [0.2, 0.5]
    Mixed,
    /// ndvi in (0.5, 1]
    Vegetation,
}

impl LandCover {
    /// Classify a single NDVI value; NaN and out-of-range values have no class
    pub fn classify(ndvi: f64) -> Option<LandCover> {
        if (NDVI_MIN..BARESOIL_NDVI_MAX).contains(&ndvi) {
            Some(LandCover::BareSoil)
        } else if (BARESOIL_NDVI_MAX..=VEGETATION_NDVI_MIN).contains(&ndvi) {
            Some(LandCover::Mixed)
        } else if ndvi > VEGETATION_NDVI_MIN && ndvi <= NDVI_MAX {
            Some(LandCover::Vegetation)
        } else {
            None
        }
    }
}

/// Land cover partition of an NDVI raster
pub fn classify_land_cover(ndvi: &Raster) -> ndarray::Array2<Option<LandCover>> {
    ndvi.mapv(LandCover::classify)
}

/// Fractional vegetation cover of one NDVI value
#[inline]
pub fn fvc(ndvi: f64) -> f64 {
    ((ndvi - BARESOIL_NDVI_MAX) / (VEGETATION_NDVI_MIN - BARESOIL_NDVI_MAX)).powi(2)
}

/// Fractional vegetation cover, `((ndvi - 0.2) / (0.5 - 0.2))^2`
pub fn fractional_vegetation_cover(ndvi: &Raster) -> Raster {
    ndvi.mapv(fvc)
}

/// Cavity effect of one pixel, `(1 - e_soil) * e_veg * G * (1 - p)`
#[inline]
pub fn cavity(emissivity_veg: f64, emissivity_soil: f64, fvc: f64, geometrical_factor: f64) -> f64 {
    (1.0 - emissivity_soil) * emissivity_veg * geometrical_factor * (1.0 - fvc)
}

/// Cavity effect raster from a fractional vegetation cover raster
pub fn cavity_effect(
    emissivity_veg: f64,
    emissivity_soil: f64,
    fractional_vegetation_cover: &Raster,
    geometrical_factor: f64,
) -> Raster {
    fractional_vegetation_cover
        .mapv(|p| cavity(emissivity_veg, emissivity_soil, p, geometrical_factor))
}

/// Default multiplicative rescaling factor of the optical bands
pub const REFLECTANCE_MULT: f64 = 2e-5;
/// Default additive rescaling factor of the optical bands
pub const REFLECTANCE_ADD: f64 = 0.1;

/// Rescale an optical band (bands 1-9) from digital numbers, `mult * dn + add`
pub fn rescale_band(image: &Raster, mult: f64, add: f64) -> Raster {
    image.mapv(|v| mult * v + add)
}
