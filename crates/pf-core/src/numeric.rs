use crate::PfError;
use rayon::prelude::*;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PfError::NonFinite { what, value: v })
    }
}

pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, PfError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(PfError::InvalidArg { what })
    }
}

pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, PfError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(PfError::InvalidArg { what })
    }
}

pub fn ensure_in_range(v: Real, min: Real, max: Real, what: &'static str) -> Result<Real, PfError> {
    let v = ensure_finite(v, what)?;
    if (min..=max).contains(&v) {
        Ok(v)
    } else {
        Err(PfError::OutOfRange {
            what,
            value: v,
            min,
            max,
        })
    }
}

/// Chunk length for parallel reductions.
///
/// Partial sums are always formed over these fixed chunks and then combined in
/// chunk order, so the rounding pattern does not depend on how many worker
/// threads rayon happens to use.
pub const REDUCTION_CHUNK: usize = 1024;

/// Sum of `values`, bit-identical for any thread count.
pub fn deterministic_sum(values: &[Real]) -> Real {
    let partials: Vec<Real> = values
        .par_chunks(REDUCTION_CHUNK)
        .map(|chunk| chunk.iter().sum::<Real>())
        .collect();
    partials.iter().sum()
}

/// Dot product of two equally long slices, bit-identical for any thread count.
pub fn deterministic_dot(a: &[Real], b: &[Real]) -> Real {
    debug_assert_eq!(a.len(), b.len());
    let partials: Vec<Real> = a
        .par_chunks(REDUCTION_CHUNK)
        .zip(b.par_chunks(REDUCTION_CHUNK))
        .map(|(ca, cb)| ca.iter().zip(cb).map(|(x, y)| x * y).sum::<Real>())
        .collect();
    partials.iter().sum()
}

/// Minimum and maximum of a slice, or `None` if it is empty or holds a non-finite value.
///
/// min/max are exact operations, so the parallel reduction order is irrelevant.
pub fn finite_min_max(values: &[Real]) -> Option<(Real, Real)> {
    if values.is_empty() || values.par_iter().any(|v| !v.is_finite()) {
        return None;
    }
    let (lo, hi) = values
        .par_iter()
        .fold(
            || (Real::INFINITY, Real::NEG_INFINITY),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
        )
        .reduce(
            || (Real::INFINITY, Real::NEG_INFINITY),
            |(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)),
        );
    Some((lo, hi))
}

/// Largest absolute value; NaN propagates as NaN.
pub fn max_abs(values: &[Real]) -> Real {
    values
        .par_iter()
        .map(|v| if v.is_nan() { Real::NAN } else { v.abs() })
        .reduce(|| 0.0, nan_max)
}

#[inline]
fn nan_max(a: Real, b: Real) -> Real {
    if a.is_nan() || b.is_nan() {
        Real::NAN
    } else {
        a.max(b)
    }
}
