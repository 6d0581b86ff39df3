use crate::core::mask::apply_optional_mask;
use crate::types::{
    count_valid, ensure_same_shape, LstError, LstResult, Mask, Raster, TemperatureUnit, ThermalBand,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Radiometric and thermal conversion constants of one thermal band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandCalibration {
    /// RADIANCE_MULT_BAND_x
    pub radiance_mult: f64,
    /// RADIANCE_ADD_BAND_x
    pub radiance_add: f64,
    /// K1_CONSTANT_BAND_x
    pub k1: f64,
    /// K2_CONSTANT_BAND_x
    pub k2: f64,
}

impl BandCalibration {
    /// Top-of-atmosphere spectral radiance of a digital number
    #[inline]
    pub fn radiance(&self, dn: f64) -> f64 {
        self.radiance_mult * dn + self.radiance_add
    }

    /// Invert the Planck law for a digital number, in kelvin
    #[inline]
    pub fn brightness_temperature(&self, dn: f64) -> f64 {
        self.k2 / (self.k1 / self.radiance(dn) + 1.0).ln()
    }
}

/// Calibration constants for both TIRS bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalCalibration {
    pub band_10: BandCalibration,
    pub band_11: BandCalibration,
}

impl Default for ThermalCalibration {
    fn default() -> Self {
        // Landsat 8 TIRS
        Self {
            band_10: BandCalibration {
                radiance_mult: 0.0003342,
                radiance_add: 0.1,
                k1: 774.89,
                k2: 1321.08,
            },
            band_11: BandCalibration {
                radiance_mult: 0.0003342,
                radiance_add: 0.1,
                k1: 480.89,
                k2: 1201.14,
            },
        }
    }
}

impl ThermalCalibration {
    /// Constants of the requested band
    pub fn band(&self, band: ThermalBand) -> &BandCalibration {
        match band {
            ThermalBand::Band10 => &self.band_10,
            ThermalBand::Band11 => &self.band_11,
        }
    }

    /// Read the thermal constants from the text of a Landsat `*_MTL.txt` file
    pub fn from_mtl_str(mtl: &str) -> LstResult<Self> {
        log::debug!("Parsing thermal calibration from MTL (length: {})", mtl.len());

        let band = |n: u8| -> LstResult<BandCalibration> {
            Ok(BandCalibration {
                radiance_mult: extract_mtl_value(mtl, &format!("RADIANCE_MULT_BAND_{}", n))?,
                radiance_add: extract_mtl_value(mtl, &format!("RADIANCE_ADD_BAND_{}", n))?,
                k1: extract_mtl_value(mtl, &format!("K1_CONSTANT_BAND_{}", n))?,
                k2: extract_mtl_value(mtl, &format!("K2_CONSTANT_BAND_{}", n))?,
            })
        };

        let calibration = Self {
            band_10: band(10)?,
            band_11: band(11)?,
        };
        log::info!("Parsed thermal calibration: {:?}", calibration);
        Ok(calibration)
    }
}

/// Extract a numeric `KEY = value` entry from MTL text
fn extract_mtl_value(mtl: &str, key: &str) -> LstResult<f64> {
    let pattern = Regex::new(&format!(r#"(?m)^\s*{}\s*=\s*"?([-+0-9.eE]+)"?\s*$"#, key))
        .map_err(|e| LstError::Metadata(format!("Regex error: {}", e)))?;

    let captures = pattern
        .captures(mtl)
        .ok_or_else(|| LstError::Metadata(format!("Missing {}", key)))?;

    captures[1]
        .parse::<f64>()
        .map_err(|e| LstError::Metadata(format!("Invalid value for {}: {}", key, e)))
}

/// Convert raw thermal digital numbers to brightness temperature
///
/// `radiance = mult * image + add`, `T = k2 / ln(k1 / radiance + 1)`.
/// The formula is evaluated for every pixel; masked pixels are set to NaN
/// afterwards. Celsius output subtracts 273.15 from the kelvin result.
pub fn compute_brightness_temperature(
    image: &Raster,
    calibration: &BandCalibration,
    mask: Option<&Mask>,
    unit: TemperatureUnit,
) -> LstResult<Raster> {
    if let Some(mask) = mask {
        ensure_same_shape("thermal band", image, "mask", mask)?;
    }

    let mut temperature = image.mapv(|dn| unit.from_kelvin(calibration.brightness_temperature(dn)));
    apply_optional_mask(&mut temperature, mask)?;
    Ok(temperature)
}

/// Brightness temperature processor for one- or two-band thermal sensors
#[derive(Debug, Clone, Default)]
pub struct BrightnessTemperatureProcessor {
    calibration: ThermalCalibration,
}

impl BrightnessTemperatureProcessor {
    /// Create a processor with Landsat 8 constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor with custom constants
    pub fn with_calibration(calibration: ThermalCalibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &ThermalCalibration {
        &self.calibration
    }

    /// Brightness temperature of band 10 and, when given, band 11.
    ///
    /// Both bands share `mask` but use their own constants.
    pub fn process(
        &self,
        band_10: &Raster,
        band_11: Option<&Raster>,
        mask: Option<&Mask>,
        unit: TemperatureUnit,
    ) -> LstResult<(Raster, Option<Raster>)> {
        let (rows, cols) = band_10.dim();
        log::info!("Computing brightness temperature for {}x{} image ({})", rows, cols, unit);
        log::debug!("Thermal calibration: {:?}", self.calibration);

        if let Some(band_11) = band_11 {
            ensure_same_shape("band 10", band_10, "band 11", band_11)?;
        }

        let tb_10 = compute_brightness_temperature(band_10, &self.calibration.band_10, mask, unit)?;
        let tb_11 = band_11
            .map(|band| compute_brightness_temperature(band, &self.calibration.band_11, mask, unit))
            .transpose()?;

        log::info!(
            "Brightness temperature completed: {} valid pixels in band 10",
            count_valid(&tb_10)
        );
        Ok((tb_10, tb_11))
    }
}
