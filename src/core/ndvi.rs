use crate::core::mask::apply_optional_mask;
use crate::types::{count_valid, ensure_same_shape, LstResult, Mask, Raster};
use ndarray::Zip;

/// Default guard added to the NDVI denominator
pub const NDVI_EPSILON: f64 = 1e-15;

/// Compute the Normalized Difference Vegetation Index
///
/// `ndvi = (nir - red) / (nir + red + epsilon)`
///
/// Values with `|ndvi| > 1` are physically impossible and become NaN, as do
/// pixels flagged by `mask`.
///
/// # Arguments
/// * `nir` - Near-infrared band (Landsat 8 band 5)
/// * `red` - Red band (Landsat 8 band 4)
/// * `epsilon` - Denominator guard against division by zero
/// * `mask` - Optional invalid-pixel mask, same shape as the bands
pub fn compute_ndvi(
    nir: &Raster,
    red: &Raster,
    epsilon: f64,
    mask: Option<&Mask>,
) -> LstResult<Raster> {
    ensure_same_shape("nir", nir, "red", red)?;
    if let Some(mask) = mask {
        ensure_same_shape("nir", nir, "mask", mask)?;
    }

    let (rows, cols) = nir.dim();
    log::info!("Computing NDVI for {}x{} image", rows, cols);

    let mut ndvi = Zip::from(nir)
        .and(red)
        .map_collect(|&n, &r| (n - r) / (n + r + epsilon));

    let mut out_of_range = 0usize;
    ndvi.mapv_inplace(|v| {
        if v.abs() > 1.0 {
            out_of_range += 1;
            f64::NAN
        } else {
            v
        }
    });
    if out_of_range > 0 {
        log::warn!("{} NDVI pixels outside [-1, 1] set to NaN", out_of_range);
    }

    apply_optional_mask(&mut ndvi, mask)?;

    log::info!("NDVI completed: {} valid pixels", count_valid(&ndvi));
    Ok(ndvi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_ndvi_formula() {
        let nir = array![[0.5, 0.3]];
        let red = array![[0.1, 0.3]];
        let ndvi = compute_ndvi(&nir, &red, NDVI_EPSILON, None).unwrap();

        assert_abs_diff_eq!(ndvi[[0, 0]], 0.4 / 0.6, epsilon = 1e-12);
        assert_eq!(ndvi[[0, 1]], 0.0);
    }

    #[test]
    fn test_equal_bands_give_zero() {
        let band = Array2::from_shape_fn((4, 4), |(i, j)| 100.0 + (i * 4 + j) as f64);
        let ndvi = compute_ndvi(&band, &band, NDVI_EPSILON, None).unwrap();
        assert!(ndvi.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_out_of_range_becomes_nan() {
        // Negative reflectance pushes the ratio beyond 1
        let nir = array![[1.0, 0.6]];
        let red = array![[-0.5, 0.2]];
        let ndvi = compute_ndvi(&nir, &red, NDVI_EPSILON, None).unwrap();

        assert!(ndvi[[0, 0]].is_nan());
        assert_abs_diff_eq!(ndvi[[0, 1]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_mask_forces_nan() {
        let nir = array![[0.5, 0.5]];
        let red = array![[0.1, 0.1]];
        let mask = array![[true, false]];
        let ndvi = compute_ndvi(&nir, &red, NDVI_EPSILON, Some(&mask)).unwrap();

        assert!(ndvi[[0, 0]].is_nan());
        assert!(ndvi[[0, 1]].is_finite());
    }

    #[test]
    fn test_shape_mismatch() {
        let nir = Array2::<f64>::ones((2, 2));
        let red = Array2::<f64>::ones((2, 3));
        assert!(compute_ndvi(&nir, &red, NDVI_EPSILON, None).is_err());

        let mask = Array2::from_elem((3, 3), false);
        assert!(compute_ndvi(&nir, &nir, NDVI_EPSILON, Some(&mask)).is_err());
    }
}
