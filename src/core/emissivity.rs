use crate::core::registry::{Algorithm, Runner};
use crate::core::vegetation::{
    cavity, classify_land_cover, fvc, LandCover, DEFAULT_GEOMETRICAL_FACTOR, REFLECTANCE_ADD,
    REFLECTANCE_MULT,
};
use crate::types::{count_valid, ensure_same_shape, LstError, LstResult, Raster};
use ndarray::Zip;
use serde::{Deserialize, Serialize};

/// Inputs of an emissivity computation
#[derive(Debug, Clone, Copy)]
pub struct EmissivityInputs<'a> {
    /// NDVI image
    pub ndvi: &'a Raster,
    /// Red band (Landsat 8 band 4) digital numbers
    pub red_band: Option<&'a Raster>,
}

/// Land surface emissivity for the two thermal bands
#[derive(Debug, Clone)]
pub struct EmissivityPair {
    pub band_10: Raster,
    /// `None` when the method has no band-11 estimate
    pub band_11: Option<Raster>,
}

impl EmissivityPair {
    /// Pixels left at zero were never assigned a class; mark them NaN in both bands
    fn invalidate_unset(mut self) -> Self {
        let unset = self.band_10.mapv(|e| e == 0.0);
        let count = unset.iter().filter(|&&u| u).count();
        if count > 0 {
            log::debug!("{} emissivity pixels unset, marking NaN", count);
        }

        Zip::from(&mut self.band_10).and(&unset).for_each(|e, &u| {
            if u {
                *e = f64::NAN;
            }
        });
        if let Some(band_11) = self.band_11.as_mut() {
            Zip::from(band_11).and(&unset).for_each(|e, &u| {
                if u {
                    *e = f64::NAN;
                }
            });
        }
        self
    }
}

/// A land surface emissivity method
pub trait EmissivityAlgorithm {
    /// Registry key of the method
    fn name(&self) -> &'static str;

    /// Whether the method needs the red band
    fn requires_red_band(&self) -> bool {
        false
    }

    /// Compute the raw emissivity pair. Inputs are already shape-checked.
    fn estimate(&self, ndvi: &Raster, red_band: Option<&Raster>) -> LstResult<EmissivityPair>;
}

impl<'a> Algorithm<EmissivityInputs<'a>> for dyn EmissivityAlgorithm {
    type Output = EmissivityPair;

    fn run(&self, input: &EmissivityInputs<'a>) -> LstResult<EmissivityPair> {
        if let Some(red_band) = input.red_band {
            ensure_same_shape("ndvi", input.ndvi, "red band", red_band)?;
        }
        if self.requires_red_band() && input.red_band.is_none() {
            return Err(LstError::MissingInput {
                algorithm: self.name().to_string(),
                input: "red_band",
            });
        }

        let (rows, cols) = input.ndvi.dim();
        log::info!("Computing {} emissivity for {}x{} image", self.name(), rows, cols);

        let pair = self.estimate(input.ndvi, input.red_band)?.invalidate_unset();

        log::info!(
            "Emissivity completed: {} valid pixels in band 10",
            count_valid(&pair.band_10)
        );
        Ok(pair)
    }
}

/// NDVI threshold method.
///
/// Avdan, U. and Jovanovska, G. "Algorithm for automated mapping of land
/// surface temperature using LANDSAT 8 satellite data." Journal of Sensors (2016).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvdanEmissivity {
    pub emissivity_soil: f64,
    pub emissivity_veg: f64,
}

impl Default for AvdanEmissivity {
    fn default() -> Self {
        Self {
            emissivity_soil: 0.97,
            emissivity_veg: 0.99,
        }
    }
}

impl EmissivityAlgorithm for AvdanEmissivity {
    fn name(&self) -> &'static str {
        "avdan"
    }

    fn estimate(&self, ndvi: &Raster, _red_band: Option<&Raster>) -> LstResult<EmissivityPair> {
        let classes = classify_land_cover(ndvi);
        let emissivity = Zip::from(ndvi).and(&classes).map_collect(|&n, class| match class {
            Some(LandCover::BareSoil) => self.emissivity_soil,
            Some(LandCover::Vegetation) => self.emissivity_veg,
            Some(LandCover::Mixed) => 0.004 * fvc(n) + 0.986,
            None => 0.0,
        });

        // Single band method: band 11 reuses the band 10 estimate
        Ok(EmissivityPair {
            band_11: Some(emissivity.clone()),
            band_10: emissivity,
        })
    }
}

/// Per-band coefficients of the NDVI-based mixture model
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NbemBandCoefficients {
    pub emissivity_soil: f64,
    pub emissivity_veg: f64,
    /// Intercept of the bare soil red band regression
    pub red_a: f64,
    /// Slope of the bare soil red band regression
    pub red_b: f64,
}

/// NDVI-based emissivity mixture model (NBEM).
///
/// Yu, X., Guo, X. and Wu, Z. "Land surface temperature retrieval from Landsat 8
/// TIRS." Remote Sensing 6.10 (2014); Li, T. and Meng, Q. Landscape and Urban
/// Planning 179 (2018).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XiaoleiEmissivity {
    pub band_10: NbemBandCoefficients,
    pub band_11: NbemBandCoefficients,
    pub geometrical_factor: f64,
    /// Rescaling applied to the red band before the bare soil regression
    pub red_mult: f64,
    pub red_add: f64,
}

impl Default for XiaoleiEmissivity {
    fn default() -> Self {
        Self {
            band_10: NbemBandCoefficients {
                emissivity_soil: 0.9668,
                emissivity_veg: 0.9863,
                red_a: 0.973,
                red_b: 0.047,
            },
            band_11: NbemBandCoefficients {
                emissivity_soil: 0.9747,
                emissivity_veg: 0.9896,
                red_a: 0.984,
                red_b: 0.026,
            },
            geometrical_factor: DEFAULT_GEOMETRICAL_FACTOR,
            red_mult: REFLECTANCE_MULT,
            red_add: REFLECTANCE_ADD,
        }
    }
}

impl XiaoleiEmissivity {
    fn band_emissivity(
        &self,
        ndvi: &Raster,
        classes: &ndarray::Array2<Option<LandCover>>,
        red: &Raster,
        c: &NbemBandCoefficients,
    ) -> Raster {
        let g = self.geometrical_factor;
        Zip::from(ndvi).and(classes).and(red).map_collect(|&n, class, &r| match class {
            Some(LandCover::BareSoil) => c.red_a - c.red_b * (self.red_mult * r + self.red_add),
            Some(LandCover::Mixed) => {
                let p = fvc(n);
                c.emissivity_veg * p
                    + c.emissivity_soil * (1.0 - p)
                    + cavity(c.emissivity_veg, c.emissivity_soil, p, g)
            }
            Some(LandCover::Vegetation) => {
                let p = fvc(n);
                c.emissivity_veg + cavity(c.emissivity_veg, c.emissivity_soil, p, g)
            }
            None => 0.0,
        })
    }
}

impl EmissivityAlgorithm for XiaoleiEmissivity {
    fn name(&self) -> &'static str {
        "xiaolei"
    }

    fn requires_red_band(&self) -> bool {
        true
    }

    fn estimate(&self, ndvi: &Raster, red_band: Option<&Raster>) -> LstResult<EmissivityPair> {
        let red = red_band.ok_or_else(|| LstError::MissingInput {
            algorithm: self.name().to_string(),
            input: "red_band",
        })?;
        log::debug!("NBEM coefficients: {:?}", self);

        let classes = classify_land_cover(ndvi);
        Ok(EmissivityPair {
            band_10: self.band_emissivity(ndvi, &classes, red, &self.band_10),
            band_11: Some(self.band_emissivity(ndvi, &classes, red, &self.band_11)),
        })
    }
}

/// Fractional vegetation cover blend.
///
/// Rongali, G. et al. "Split-window algorithm for retrieval of land surface
/// temperature using Landsat 8 thermal infrared data." Journal of
/// Geovisualization and Spatial Analysis 2.2 (2018).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GopinadhEmissivity {
    pub emissivity_soil_10: f64,
    pub emissivity_veg_10: f64,
    pub emissivity_soil_11: f64,
    pub emissivity_veg_11: f64,
}

impl Default for GopinadhEmissivity {
    fn default() -> Self {
        Self {
            emissivity_soil_10: 0.971,
            emissivity_veg_10: 0.987,
            emissivity_soil_11: 0.977,
            emissivity_veg_11: 0.989,
        }
    }
}

impl EmissivityAlgorithm for GopinadhEmissivity {
    fn name(&self) -> &'static str {
        "gopinadh"
    }

    fn estimate(&self, ndvi: &Raster, _red_band: Option<&Raster>) -> LstResult<EmissivityPair> {
        // No land cover branching: the blend applies to every pixel
        let blend = |soil: f64, veg: f64| {
            ndvi.mapv(|n| {
                let p = fvc(n);
                soil * (1.0 - p) + veg * p
            })
        };

        Ok(EmissivityPair {
            band_10: blend(self.emissivity_soil_10, self.emissivity_veg_10),
            band_11: Some(blend(self.emissivity_soil_11, self.emissivity_veg_11)),
        })
    }
}

/// Registry of the built-in emissivity methods
pub fn emissivity_methods() -> Runner<dyn EmissivityAlgorithm> {
    Runner::<dyn EmissivityAlgorithm>::new("emissivity")
        .with("avdan", || Box::new(AvdanEmissivity::default()))
        .with("xiaolei", || Box::new(XiaoleiEmissivity::default()))
        .with("gopinadh", || Box::new(GopinadhEmissivity::default()))
}

/// Compute emissivity with a built-in method selected by name
pub fn compute_emissivity(
    method: &str,
    ndvi: &Raster,
    red_band: Option<&Raster>,
) -> LstResult<EmissivityPair> {
    emissivity_methods().invoke(method, &EmissivityInputs { ndvi, red_band })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_avdan_classes() {
        let ndvi = array![[0.1, 0.35, 0.8]];
        let pair = compute_emissivity("avdan", &ndvi, None).unwrap();

        assert_eq!(pair.band_10[[0, 0]], 0.97);
        assert_abs_diff_eq!(pair.band_10[[0, 1]], 0.987, epsilon = 1e-12);
        assert_eq!(pair.band_10[[0, 2]], 0.99);
        assert_eq!(pair.band_11.unwrap(), pair.band_10);
    }

    #[test]
    fn test_unclassified_pixels_are_nan() {
        let ndvi = array![[f64::NAN, 0.3]];
        for method in ["avdan", "gopinadh"] {
            let pair = compute_emissivity(method, &ndvi, None).unwrap();
            assert!(pair.band_10[[0, 0]].is_nan(), "{method}");
            assert!(pair.band_11.as_ref().unwrap()[[0, 0]].is_nan(), "{method}");
            assert!(pair.band_10[[0, 1]].is_finite(), "{method}");
        }
    }

    #[test]
    fn test_xiaolei_requires_red_band() {
        let ndvi = array![[0.3]];
        let err = compute_emissivity("xiaolei", &ndvi, None).unwrap_err();
        assert!(matches!(err, LstError::MissingInput { input: "red_band", .. }));
    }

    #[test]
    fn test_xiaolei_values() {
        let ndvi = array![[0.1, 0.35, 0.8]];
        let red = array![[10000.0, 10000.0, 10000.0]];
        let pair = compute_emissivity("xiaolei", &ndvi, Some(&red)).unwrap();
        let e11 = pair.band_11.unwrap();

        // Bare soil: a - b * (2e-5 * dn + 0.1)
        assert_abs_diff_eq!(pair.band_10[[0, 0]], 0.973 - 0.047 * 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(e11[[0, 0]], 0.984 - 0.026 * 0.3, epsilon = 1e-12);

        // Mixed, p = 0.25
        let p: f64 = 0.25;
        let expected = 0.9863 * p + 0.9668 * (1.0 - p) + (1.0 - 0.9668) * 0.9863 * 0.55 * (1.0 - p);
        assert_abs_diff_eq!(pair.band_10[[0, 1]], expected, epsilon = 1e-12);

        // Vegetation, p = 4
        let p: f64 = 4.0;
        let expected = 0.9896 + (1.0 - 0.9747) * 0.9896 * 0.55 * (1.0 - p);
        assert_abs_diff_eq!(e11[[0, 2]], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_xiaolei_shape_mismatch() {
        let ndvi = Array2::<f64>::zeros((2, 2));
        let red = Array2::<f64>::zeros((2, 1));
        let err = compute_emissivity("xiaolei", &ndvi, Some(&red)).unwrap_err();
        assert!(matches!(err, LstError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_gopinadh_blend() {
        let ndvi = array![[0.2, 0.5, -0.4]];
        let pair = compute_emissivity("gopinadh", &ndvi, None).unwrap();
        let e11 = pair.band_11.unwrap();

        assert_abs_diff_eq!(pair.band_10[[0, 0]], 0.971, epsilon = 1e-12);
        assert_abs_diff_eq!(pair.band_10[[0, 1]], 0.987, epsilon = 1e-12);
        assert_abs_diff_eq!(e11[[0, 1]], 0.989, epsilon = 1e-12);

        // No class branching: bare soil pixels are blended too (p = 4)
        assert_abs_diff_eq!(pair.band_10[[0, 2]], 0.971 * -3.0 + 0.987 * 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_method() {
        let ndvi = array![[0.3]];
        let err = compute_emissivity("advan", &ndvi, None).unwrap_err();
        assert!(err.to_string().contains("avdan, gopinadh, xiaolei"));
    }
}
