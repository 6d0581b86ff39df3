use crate::types::{ensure_same_shape, LstResult, Mask};
use ndarray::{ArrayBase, Data, DataMut, Ix2, Zip};
use num_traits::Float;

/// Build the invalid-pixel mask of a raster.
///
/// A pixel is invalid when it equals `nodata` (Landsat level-1 fill is 0) or is NaN.
pub fn build_mask<T, S>(raster: &ArrayBase<S, Ix2>, nodata: T) -> Mask
where
    T: Float,
    S: Data<Elem = T>,
{
    let mask = raster.mapv(|v| v.is_nan() || v == nodata);
    log::debug!(
        "Built mask: {} of {} pixels invalid",
        mask.iter().filter(|&&m| m).count(),
        mask.len()
    );
    mask
}

/// Set every masked pixel of `raster` to NaN, in place.
///
/// The raster is mutated; callers that still need the unmasked values must
/// clone before calling.
pub fn apply_mask<T, S>(raster: &mut ArrayBase<S, Ix2>, mask: &Mask) -> LstResult<()>
where
    T: Float + Send + Sync,
    S: DataMut<Elem = T>,
{
    ensure_same_shape("raster", raster, "mask", mask)?;
    set_nan_where(raster, mask);
    Ok(())
}

/// Apply `mask` when one is supplied
pub fn apply_optional_mask<T, S>(raster: &mut ArrayBase<S, Ix2>, mask: Option<&Mask>) -> LstResult<()>
where
    T: Float + Send + Sync,
    S: DataMut<Elem = T>,
{
    match mask {
        Some(mask) => apply_mask(raster, mask),
        None => Ok(()),
    }
}

#[cfg(feature = "parallel")]
fn set_nan_where<T, S>(raster: &mut ArrayBase<S, Ix2>, mask: &Mask)
where
    T: Float + Send + Sync,
    S: DataMut<Elem = T>,
{
    Zip::from(raster).and(mask).par_for_each(|v, &m| {
        if m {
            *v = T::nan();
        }
    });
}

#[cfg(not(feature = "parallel"))]
fn set_nan_where<T, S>(raster: &mut ArrayBase<S, Ix2>, mask: &Mask)
where
    T: Float + Send + Sync,
    S: DataMut<Elem = T>,
{
    Zip::from(raster).and(mask).for_each(|v, &m| {
        if m {
            *v = T::nan();
        }
    });
}
