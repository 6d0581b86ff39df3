use crate::core::mask::apply_optional_mask;
use crate::core::registry::{Algorithm, Runner};
use crate::core::vegetation::fvc;
use crate::types::{
    count_valid, ensure_same_shape, LstError, LstResult, Mask, Raster, TemperatureUnit,
};
use ndarray::Zip;
use serde::{Deserialize, Serialize};

/// Column water vapour assumed when none is supplied (g/cm²)
pub const DEFAULT_COLUMN_WATER_VAPOUR: f64 = 0.013;

/// Number of thermal bands an LST algorithm consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowKind {
    /// Band 10 only
    Single,
    /// Bands 10 and 11
    Split,
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowKind::Single => write!(f, "single-window"),
            WindowKind::Split => write!(f, "split-window"),
        }
    }
}

/// Optional inputs an LST algorithm may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LstInput {
    BrightnessTemperature11,
    Emissivity10,
    Emissivity11,
    Ndvi,
}

impl LstInput {
    pub fn name(self) -> &'static str {
        match self {
            LstInput::BrightnessTemperature11 => "brightness_temperature_11",
            LstInput::Emissivity10 => "emissivity_10",
            LstInput::Emissivity11 => "emissivity_11",
            LstInput::Ndvi => "ndvi",
        }
    }
}

/// Precomputed column water vapour, uniform or per pixel
#[derive(Debug, Clone, Copy)]
pub enum ColumnWaterVapour<'a> {
    Scalar(f64),
    Raster(&'a Raster),
}

/// Inputs of an LST computation. All rasters are in kelvin and share one shape.
#[derive(Debug, Clone, Copy)]
pub struct LstInputs<'a> {
    pub brightness_temperature_10: &'a Raster,
    pub brightness_temperature_11: Option<&'a Raster>,
    pub emissivity_10: Option<&'a Raster>,
    pub emissivity_11: Option<&'a Raster>,
    pub ndvi: Option<&'a Raster>,
    pub mask: Option<&'a Mask>,
    pub column_water_vapour: Option<ColumnWaterVapour<'a>>,
}

impl<'a> LstInputs<'a> {
    /// Inputs holding only the band 10 brightness temperature
    pub fn new(brightness_temperature_10: &'a Raster) -> Self {
        Self {
            brightness_temperature_10,
            brightness_temperature_11: None,
            emissivity_10: None,
            emissivity_11: None,
            ndvi: None,
            mask: None,
            column_water_vapour: None,
        }
    }

    pub fn get(&self, input: LstInput) -> Option<&'a Raster> {
        match input {
            LstInput::BrightnessTemperature11 => self.brightness_temperature_11,
            LstInput::Emissivity10 => self.emissivity_10,
            LstInput::Emissivity11 => self.emissivity_11,
            LstInput::Ndvi => self.ndvi,
        }
    }

    /// Fetch a required input or fail with `MissingInput`
    pub fn require(&self, input: LstInput, algorithm: &str) -> LstResult<&'a Raster> {
        self.get(input).ok_or_else(|| LstError::MissingInput {
            algorithm: algorithm.to_string(),
            input: input.name(),
        })
    }

    /// Every supplied raster must match the band 10 brightness temperature
    fn check_shapes(&self) -> LstResult<()> {
        let reference = self.brightness_temperature_10;
        for input in [
            LstInput::BrightnessTemperature11,
            LstInput::Emissivity10,
            LstInput::Emissivity11,
            LstInput::Ndvi,
        ] {
            if let Some(raster) = self.get(input) {
                ensure_same_shape("brightness_temperature_10", reference, input.name(), raster)?;
            }
        }
        if let Some(mask) = self.mask {
            ensure_same_shape("brightness_temperature_10", reference, "mask", mask)?;
        }
        if let Some(ColumnWaterVapour::Raster(cwv)) = self.column_water_vapour {
            ensure_same_shape("brightness_temperature_10", reference, "column_water_vapour", cwv)?;
        }
        Ok(())
    }
}

/// A land surface temperature retrieval method
pub trait LstAlgorithm {
    /// Registry key of the method
    fn name(&self) -> &'static str;

    fn window(&self) -> WindowKind;

    /// Inputs beyond the band 10 brightness temperature
    fn required_inputs(&self) -> &'static [LstInput];

    /// Raw LST in kelvin. Inputs are already validated.
    fn compute_kelvin(&self, inputs: &LstInputs<'_>) -> LstResult<Raster>;
}

impl<'a> Algorithm<LstInputs<'a>> for dyn LstAlgorithm {
    type Output = Raster;

    /// Validate, compute, mask and clamp. The result is in kelvin.
    fn run(&self, inputs: &LstInputs<'a>) -> LstResult<Raster> {
        for &input in self.required_inputs() {
            inputs.require(input, self.name())?;
        }
        inputs.check_shapes()?;

        let (rows, cols) = inputs.brightness_temperature_10.dim();
        log::info!("Computing {} LST for {}x{} image", self.name(), rows, cols);

        let mut lst = self.compute_kelvin(inputs)?;
        apply_optional_mask(&mut lst, inputs.mask)?;
        clamp_implausible(&mut lst, TemperatureUnit::Kelvin);
        Ok(lst)
    }
}

/// Set temperatures above the hottest plausible surface temperature to NaN.
///
/// Returns the number of pixels invalidated.
pub fn clamp_implausible(lst: &mut Raster, unit: TemperatureUnit) -> usize {
    let max_temp = unit.max_earth_temp();
    let implausible = lst.iter().filter(|&&t| t > max_temp).count();
    if implausible > 0 {
        log::warn!(
            "{} pixels above {:.2} {} set to NaN",
            implausible,
            max_temp,
            unit
        );
        clamp_above(lst, max_temp);
    }
    implausible
}

#[cfg(feature = "parallel")]
fn clamp_above(lst: &mut Raster, max_temp: f64) {
    lst.par_mapv_inplace(|t| if t > max_temp { f64::NAN } else { t });
}

#[cfg(not(feature = "parallel"))]
fn clamp_above(lst: &mut Raster, max_temp: f64) {
    lst.mapv_inplace(|t| if t > max_temp { f64::NAN } else { t });
}

/// Mono-window method.
///
/// Avdan, U. and Jovanovska, G. "Algorithm for automated mapping of land
/// surface temperature using LANDSAT 8 satellite data." Journal of Sensors (2016).
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoWindowLst;

impl MonoWindowLst {
    /// Wavelength term of the emitted radiance
    pub const WAVELENGTH: f64 = 0.0000115;
    /// h * c / s (µm K)
    pub const RHO: f64 = 14380.0;
}

impl LstAlgorithm for MonoWindowLst {
    fn name(&self) -> &'static str {
        "mono-window"
    }

    fn window(&self) -> WindowKind {
        WindowKind::Single
    }

    fn required_inputs(&self) -> &'static [LstInput] {
        &[LstInput::Emissivity10]
    }

    fn compute_kelvin(&self, inputs: &LstInputs<'_>) -> LstResult<Raster> {
        let e10 = inputs.require(LstInput::Emissivity10, self.name())?;
        Ok(Zip::from(inputs.brightness_temperature_10)
            .and(e10)
            .map_collect(|&t, &e| t / (1.0 + (Self::WAVELENGTH * t / Self::RHO) * e.ln())))
    }
}

/// Jiménez-Muñoz, J.C. and Sobrino, J.A. "Split-window coefficients for land
/// surface temperature retrieval from low-resolution thermal infrared
/// sensors." IEEE GRSL 5.4 (2008).
#[derive(Debug, Clone, Copy)]
pub struct JiminezMunozLst {
    /// Used when the inputs carry no column water vapour
    pub column_water_vapour: f64,
}

impl Default for JiminezMunozLst {
    fn default() -> Self {
        Self {
            column_water_vapour: DEFAULT_COLUMN_WATER_VAPOUR,
        }
    }
}

impl LstAlgorithm for JiminezMunozLst {
    fn name(&self) -> &'static str {
        "jiminez-munoz"
    }

    fn window(&self) -> WindowKind {
        WindowKind::Split
    }

    fn required_inputs(&self) -> &'static [LstInput] {
        &[
            LstInput::BrightnessTemperature11,
            LstInput::Emissivity10,
            LstInput::Emissivity11,
        ]
    }

    fn compute_kelvin(&self, inputs: &LstInputs<'_>) -> LstResult<Raster> {
        let tb_10 = inputs.brightness_temperature_10;
        let tb_11 = inputs.require(LstInput::BrightnessTemperature11, self.name())?;
        let e10 = inputs.require(LstInput::Emissivity10, self.name())?;
        let e11 = inputs.require(LstInput::Emissivity11, self.name())?;

        let base = Zip::from(tb_10).and(tb_11).and(e10).and(e11);
        Ok(match inputs.column_water_vapour {
            Some(ColumnWaterVapour::Raster(cwv)) => base
                .and(cwv)
                .map_collect(|&t10, &t11, &e10, &e11, &w| jiminez_munoz(t10, t11, e10, e11, w)),
            Some(ColumnWaterVapour::Scalar(w)) => {
                base.map_collect(|&t10, &t11, &e10, &e11| jiminez_munoz(t10, t11, e10, e11, w))
            }
            None => {
                let w = self.column_water_vapour;
                base.map_collect(|&t10, &t11, &e10, &e11| jiminez_munoz(t10, t11, e10, e11, w))
            }
        })
    }
}

#[inline]
fn jiminez_munoz(t10: f64, t11: f64, e10: f64, e11: f64, w: f64) -> f64 {
    let mean_e = (e10 + e11) / 2.0;
    let diff_e = e10 - e11;
    let diff_tb = t10 - t11;
    t10 + 1.387 * diff_tb + 0.183 * diff_tb.powi(2) - 0.268
        + (54.3 - 2.238 * w) * (1.0 - mean_e)
        + (-129.2 + 16.4 * w) * diff_e
}

/// Kerr, Y. et al. (2004) "Land surface temperature retrieval techniques and
/// applications: case of the AVHRR."
#[derive(Debug, Clone, Copy, Default)]
pub struct KerrLst;

impl LstAlgorithm for KerrLst {
    fn name(&self) -> &'static str {
        "kerr"
    }

    fn window(&self) -> WindowKind {
        WindowKind::Split
    }

    fn required_inputs(&self) -> &'static [LstInput] {
        &[LstInput::BrightnessTemperature11, LstInput::Ndvi]
    }

    fn compute_kelvin(&self, inputs: &LstInputs<'_>) -> LstResult<Raster> {
        let tb_11 = inputs.require(LstInput::BrightnessTemperature11, self.name())?;
        let ndvi = inputs.require(LstInput::Ndvi, self.name())?;

        Ok(Zip::from(inputs.brightness_temperature_10)
            .and(tb_11)
            .and(ndvi)
            .map_collect(|&t10, &t11, &n| {
                let pv = fvc(n);
                t10 * (0.5 * pv + 3.1) + t11 * (-0.5 * pv - 2.1) - (5.5 * pv + 3.1)
            }))
    }
}

/// McMillin, L.M. (1975) "Estimation of sea surface temperatures from two
/// infrared window measurements with different absorption." JGR 80(36).
#[derive(Debug, Clone, Copy, Default)]
pub struct McMillinLst;

impl LstAlgorithm for McMillinLst {
    fn name(&self) -> &'static str {
        "mc-millin"
    }

    fn window(&self) -> WindowKind {
        WindowKind::Split
    }

    fn required_inputs(&self) -> &'static [LstInput] {
        &[LstInput::BrightnessTemperature11]
    }

    fn compute_kelvin(&self, inputs: &LstInputs<'_>) -> LstResult<Raster> {
        let tb_11 = inputs.require(LstInput::BrightnessTemperature11, self.name())?;
        Ok(Zip::from(inputs.brightness_temperature_10)
            .and(tb_11)
            .map_collect(|&t10, &t11| 1.035 * t10 + 3.046 * (t10 - t11) - 10.93))
    }
}

/// Price, J.C. (1984) "Land surface temperature measurements from the split
/// window channels of the NOAA AVHRR." JGR 89.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceLst;

impl LstAlgorithm for PriceLst {
    fn name(&self) -> &'static str {
        "price"
    }

    fn window(&self) -> WindowKind {
        WindowKind::Split
    }

    fn required_inputs(&self) -> &'static [LstInput] {
        &[
            LstInput::BrightnessTemperature11,
            LstInput::Emissivity10,
            LstInput::Emissivity11,
        ]
    }

    fn compute_kelvin(&self, inputs: &LstInputs<'_>) -> LstResult<Raster> {
        let tb_11 = inputs.require(LstInput::BrightnessTemperature11, self.name())?;
        let e10 = inputs.require(LstInput::Emissivity10, self.name())?;
        let e11 = inputs.require(LstInput::Emissivity11, self.name())?;

        Ok(Zip::from(inputs.brightness_temperature_10)
            .and(tb_11)
            .and(e10)
            .and(e11)
            .map_collect(|&t10, &t11, &e10, &e11| {
                (t10 + 3.33 * (t10 - t11)) * ((5.5 - e10) / 4.5) + 0.75 * t11 * (e10 - e11)
            }))
    }
}

/// Sobrino, J.A., Caselles, V. and Coll, C. (1993) "Theoretical split window
/// algorithms for determining the actual surface temperature." Il Nuovo Cimento 16.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sobrino1993Lst;

impl LstAlgorithm for Sobrino1993Lst {
    fn name(&self) -> &'static str {
        "sobrino-1993"
    }

    fn window(&self) -> WindowKind {
        WindowKind::Split
    }

    fn required_inputs(&self) -> &'static [LstInput] {
        &[
            LstInput::BrightnessTemperature11,
            LstInput::Emissivity10,
            LstInput::Emissivity11,
        ]
    }

    fn compute_kelvin(&self, inputs: &LstInputs<'_>) -> LstResult<Raster> {
        let tb_11 = inputs.require(LstInput::BrightnessTemperature11, self.name())?;
        let e10 = inputs.require(LstInput::Emissivity10, self.name())?;
        let e11 = inputs.require(LstInput::Emissivity11, self.name())?;

        Ok(Zip::from(inputs.brightness_temperature_10)
            .and(tb_11)
            .and(e10)
            .and(e11)
            .map_collect(|&t10, &t11, &e10, &e11| {
                let diff_tb = t10 - t11;
                t10 + 1.06 * diff_tb + 0.46 * diff_tb.powi(2) + 53.0 * (1.0 - e10)
                    - 53.0 * (e10 - e11)
            }))
    }
}

/// Coll, C. and Caselles, V. (1997) "A split-window algorithm for land surface
/// temperature from AVHRR data: validation and algorithm comparison." JGR 102.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollCasellesLst;

impl LstAlgorithm for CollCasellesLst {
    fn name(&self) -> &'static str {
        "coll-caselles"
    }

    fn window(&self) -> WindowKind {
        WindowKind::Split
    }

    fn required_inputs(&self) -> &'static [LstInput] {
        &[LstInput::BrightnessTemperature11]
    }

    fn compute_kelvin(&self, inputs: &LstInputs<'_>) -> LstResult<Raster> {
        let tb_11 = inputs.require(LstInput::BrightnessTemperature11, self.name())?;
        Ok(Zip::from(inputs.brightness_temperature_10)
            .and(tb_11)
            .map_collect(|&t10, &t11| {
                0.39 * t10.powi(2) + 2.3 * t10 - 0.78 * t10 * t11 - 2.68 * t11
                    + 0.39 * t11.powi(2)
                    + 1.56
            }))
    }
}

/// Registry of the built-in LST methods, both window kinds
pub fn lst_methods() -> Runner<dyn LstAlgorithm> {
    Runner::<dyn LstAlgorithm>::new("LST")
        .with("mono-window", || Box::new(MonoWindowLst))
        .with("jiminez-munoz", || Box::new(JiminezMunozLst::default()))
        .with("kerr", || Box::new(KerrLst))
        .with("mc-millin", || Box::new(McMillinLst))
        .with("price", || Box::new(PriceLst))
        .with("sobrino-1993", || Box::new(Sobrino1993Lst))
        .with("coll-caselles", || Box::new(CollCasellesLst))
}

fn methods_of_kind(kind: WindowKind) -> Vec<&'static str> {
    let runner = lst_methods();
    runner
        .names()
        .into_iter()
        .filter(|name| matches!(runner.resolve(name), Ok(algorithm) if algorithm.window() == kind))
        .collect()
}

/// Names of the built-in single-window methods
pub fn single_window_methods() -> Vec<&'static str> {
    methods_of_kind(WindowKind::Single)
}

/// Names of the built-in split-window methods
pub fn split_window_methods() -> Vec<&'static str> {
    methods_of_kind(WindowKind::Split)
}

/// LST computation for one named method, with unit conversion
pub struct LandSurfaceTemperature {
    method: String,
    window: WindowKind,
    runner: Runner<dyn LstAlgorithm>,
}

impl LandSurfaceTemperature {
    /// Select a built-in method; unknown names fail immediately
    pub fn new(method: &str) -> LstResult<Self> {
        Self::with_runner(method, lst_methods())
    }

    /// Select a method from a custom registry
    pub fn with_runner(method: &str, runner: Runner<dyn LstAlgorithm>) -> LstResult<Self> {
        let window = runner.resolve(method)?.window();
        Ok(Self {
            method: method.to_string(),
            window,
            runner,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn window(&self) -> WindowKind {
        self.window
    }

    /// Compute the LST in `unit`. Implausible and masked pixels are NaN.
    pub fn compute(&self, inputs: &LstInputs<'_>, unit: TemperatureUnit) -> LstResult<Raster> {
        let mut lst = self.runner.invoke(&self.method, inputs)?;
        if unit == TemperatureUnit::Celsius {
            lst.mapv_inplace(|t| unit.from_kelvin(t));
        }
        clamp_implausible(&mut lst, unit);

        log::info!(
            "{} LST completed: {} valid pixels ({})",
            self.method,
            count_valid(&lst),
            unit
        );
        Ok(lst)
    }
}

impl std::fmt::Debug for LandSurfaceTemperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandSurfaceTemperature")
            .field("method", &self.method)
            .field("window", &self.window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAX_EARTH_TEMP_KELVIN;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn split_inputs<'a>(
        tb_10: &'a Raster,
        tb_11: &'a Raster,
        e10: &'a Raster,
        e11: &'a Raster,
    ) -> LstInputs<'a> {
        LstInputs {
            brightness_temperature_11: Some(tb_11),
            emissivity_10: Some(e10),
            emissivity_11: Some(e11),
            ..LstInputs::new(tb_10)
        }
    }

    #[test]
    fn test_mono_window_unit_emissivity_is_identity() {
        let tb = array![[250.0, 290.0, 310.0]];
        let e = Array2::from_elem((1, 3), 1.0);
        let inputs = LstInputs {
            emissivity_10: Some(&e),
            ..LstInputs::new(&tb)
        };
        let lst = LandSurfaceTemperature::new("mono-window")
            .unwrap()
            .compute(&inputs, TemperatureUnit::Kelvin)
            .unwrap();
        assert_eq!(lst, tb);
    }

    #[test]
    fn test_mono_window_value() {
        let tb = array![[300.0]];
        let e = array![[0.98]];
        let inputs = LstInputs {
            emissivity_10: Some(&e),
            ..LstInputs::new(&tb)
        };
        let lst = lst_methods().invoke("mono-window", &inputs).unwrap();
        assert_abs_diff_eq!(lst[[0, 0]], 300.00000145408916, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_input_names_keyword() {
        let tb = array![[300.0]];
        let inputs = LstInputs::new(&tb);

        let err = lst_methods().invoke("mono-window", &inputs).unwrap_err();
        assert!(matches!(err, LstError::MissingInput { input: "emissivity_10", .. }));

        let err = lst_methods().invoke("kerr", &inputs).unwrap_err();
        assert!(matches!(err, LstError::MissingInput { input: "brightness_temperature_11", .. }));

        let tb_11 = array![[299.0]];
        let inputs = LstInputs {
            brightness_temperature_11: Some(&tb_11),
            ..LstInputs::new(&tb)
        };
        let err = lst_methods().invoke("kerr", &inputs).unwrap_err();
        assert!(err.to_string().contains("'ndvi'"));
    }

    #[test]
    fn test_split_window_formulas() {
        let tb_10 = array![[300.0]];
        let tb_11 = array![[298.0]];
        let e10 = array![[0.97]];
        let e11 = array![[0.98]];
        let ndvi = array![[0.35]];
        let mut inputs = split_inputs(&tb_10, &tb_11, &e10, &e11);
        inputs.ndvi = Some(&ndvi);
        let runner = lst_methods();

        let (t10, t11, e10v, e11v): (f64, f64, f64, f64) = (300.0, 298.0, 0.97, 0.98);
        let dt = t10 - t11;
        let de = e10v - e11v;

        let jm = t10 + 1.387 * dt + 0.183 * dt * dt - 0.268
            + (54.3 - 2.238 * 0.013) * (1.0 - (e10v + e11v) / 2.0)
            + (-129.2 + 16.4 * 0.013) * de;
        let pv = 0.25;
        let kerr = t10 * (0.5 * pv + 3.1) + t11 * (-0.5 * pv - 2.1) - (5.5 * pv + 3.1);
        let mcm = 1.035 * t10 + 3.046 * dt - 10.93;
        let price = (t10 + 3.33 * dt) * ((5.5 - e10v) / 4.5) + 0.75 * t11 * de;
        let sobrino = t10 + 1.06 * dt + 0.46 * dt * dt + 53.0 * (1.0 - e10v) - 53.0 * de;

        for (method, expected) in [
            ("jiminez-munoz", jm),
            ("kerr", kerr),
            ("mc-millin", mcm),
            ("price", price),
            ("sobrino-1993", sobrino),
        ] {
            let lst = runner.invoke(method, &inputs).unwrap();
            assert!(lst[[0, 0]].is_finite(), "{method}");
            assert_abs_diff_eq!(lst[[0, 0]], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_coll_caselles_formula() {
        // Low temperatures keep the quadratic below the plausibility ceiling
        let tb_10 = array![[2.0]];
        let tb_11 = array![[1.0]];
        let inputs = LstInputs {
            brightness_temperature_11: Some(&tb_11),
            ..LstInputs::new(&tb_10)
        };
        let lst = lst_methods().invoke("coll-caselles", &inputs).unwrap();
        let expected = 0.39 * 4.0 + 2.3 * 2.0 - 0.78 * 2.0 - 2.68 + 0.39 + 1.56;
        assert_abs_diff_eq!(lst[[0, 0]], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_jiminez_munoz_cwv_raster() {
        let tb_10 = array![[300.0, 300.0]];
        let tb_11 = array![[299.0, 299.0]];
        let e10 = array![[0.97, 0.97]];
        let e11 = array![[0.98, 0.98]];
        let cwv = array![[0.013, 2.0]];
        let mut inputs = split_inputs(&tb_10, &tb_11, &e10, &e11);
        let runner = lst_methods();

        let default = runner.invoke("jiminez-munoz", &inputs).unwrap();
        inputs.column_water_vapour = Some(ColumnWaterVapour::Raster(&cwv));
        let per_pixel = runner.invoke("jiminez-munoz", &inputs).unwrap();

        assert_abs_diff_eq!(per_pixel[[0, 0]], default[[0, 0]], epsilon = 1e-12);
        assert!((per_pixel[[0, 1]] - default[[0, 1]]).abs() > 1e-3);

        inputs.column_water_vapour = Some(ColumnWaterVapour::Scalar(2.0));
        let uniform = runner.invoke("jiminez-munoz", &inputs).unwrap();
        assert_abs_diff_eq!(uniform[[0, 0]], per_pixel[[0, 1]], epsilon = 1e-12);
        assert_abs_diff_eq!(uniform[[0, 1]], per_pixel[[0, 1]], epsilon = 1e-12);

        let bad_cwv = Array2::from_elem((2, 2), 1.0);
        inputs.column_water_vapour = Some(ColumnWaterVapour::Raster(&bad_cwv));
        assert!(matches!(
            runner.invoke("jiminez-munoz", &inputs),
            Err(LstError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_mask_and_clamp() {
        let tb_10 = array![[300.0, 300.0, 400.0]];
        let tb_11 = array![[299.0, 299.0, 399.0]];
        let mask = array![[false, true, false]];
        let inputs = LstInputs {
            brightness_temperature_11: Some(&tb_11),
            mask: Some(&mask),
            ..LstInputs::new(&tb_10)
        };

        let lst = LandSurfaceTemperature::new("mc-millin")
            .unwrap()
            .compute(&inputs, TemperatureUnit::Kelvin)
            .unwrap();
        assert!(lst[[0, 0]].is_finite());
        assert!(lst[[0, 1]].is_nan(), "masked pixel");
        assert!(lst[[0, 2]].is_nan(), "implausible pixel");
        assert!(lst.iter().all(|t| t.is_nan() || *t <= MAX_EARTH_TEMP_KELVIN));
    }

    #[test]
    fn test_celsius_output_and_ceiling() {
        let tb = array![[300.0, 329.0, 331.0]];
        let e = Array2::from_elem((1, 3), 1.0);
        let inputs = LstInputs {
            emissivity_10: Some(&e),
            ..LstInputs::new(&tb)
        };
        let lst = LandSurfaceTemperature::new("mono-window")
            .unwrap()
            .compute(&inputs, TemperatureUnit::Celsius)
            .unwrap();

        assert_abs_diff_eq!(lst[[0, 0]], 300.0 - 273.15, epsilon = 1e-9);
        assert_abs_diff_eq!(lst[[0, 1]], 329.0 - 273.15, epsilon = 1e-9);
        assert!(lst[[0, 2]].is_nan());
    }

    #[test]
    fn test_shape_mismatch() {
        let tb_10 = Array2::from_elem((2, 2), 300.0);
        let tb_11 = Array2::from_elem((2, 3), 300.0);
        let inputs = LstInputs {
            brightness_temperature_11: Some(&tb_11),
            ..LstInputs::new(&tb_10)
        };
        let err = lst_methods().invoke("mc-millin", &inputs).unwrap_err();
        assert!(matches!(err, LstError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_window_listing() {
        assert_eq!(single_window_methods(), vec!["mono-window"]);
        assert_eq!(
            split_window_methods(),
            vec!["coll-caselles", "jiminez-munoz", "kerr", "mc-millin", "price", "sobrino-1993"]
        );
    }

    #[test]
    fn test_unknown_method() {
        let err = LandSurfaceTemperature::new("split").unwrap_err();
        assert!(matches!(err, LstError::UnknownAlgorithm { family: "LST", .. }));
    }
}
