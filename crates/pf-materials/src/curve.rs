//! Temperature-dependent property curves.

use crate::error::{MaterialError, MaterialResult};
use serde::{Deserialize, Serialize};

/// A non-negative property as a function of temperature [K].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyCurve {
    /// Temperature independent.
    Constant { value: f64 },
    /// `value_at_ref + slope·(T - t_ref)`.
    Linear {
        value_at_ref: f64,
        slope: f64,
        t_ref: f64,
    },
    /// Piecewise-linear through `(T, value)` points, flat outside the first/last point.
    Table { points: Vec<(f64, f64)> },
}

impl PropertyCurve {
    pub fn constant(value: f64) -> Self {
        Self::Constant { value }
    }

    pub fn linear(value_at_ref: f64, slope: f64, t_ref: f64) -> Self {
        Self::Linear {
            value_at_ref,
            slope,
            t_ref,
        }
    }

    pub fn table(points: Vec<(f64, f64)>) -> Self {
        Self::Table { points }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant { .. })
    }

    /// Property value at temperature `t`.
    pub fn value(&self, t: f64) -> f64 {
        match self {
            Self::Constant { value } => *value,
            Self::Linear {
                value_at_ref,
                slope,
                t_ref,
            } => value_at_ref + slope * (t - t_ref),
            Self::Table { points } => table_value(points, t),
        }
    }

    /// Exact `∫₀ᵗ value(τ) dτ`.
    pub fn integral_from_zero(&self, t: f64) -> f64 {
        match self {
            Self::Constant { value } => value * t,
            Self::Linear { .. } => {
                let (c0, s) = self.linear_coefficients();
                c0 * t + 0.5 * s * t * t
            }
            Self::Table { points } => table_integral(points, t),
        }
    }

    /// Exact `∫ₐᵇ value(τ) dτ`.
    pub fn integral(&self, a: f64, b: f64) -> f64 {
        self.integral_from_zero(b) - self.integral_from_zero(a)
    }

    /// Temperature `t ≥ 0` with `integral_from_zero(t) == target`.
    ///
    /// Closed form for constant and linear curves, bisection for tables. The
    /// curve must be strictly positive (checked by [`PropertyCurve::validate_positive`]),
    /// which makes the integral strictly increasing.
    pub fn inverse_integral(&self, target: f64) -> f64 {
        match self {
            Self::Constant { value } => target / value,
            Self::Linear { .. } => {
                let (c0, s) = self.linear_coefficients();
                // Root of s/2·t² + c0·t - target = 0 in cancellation-free form.
                let disc = (c0 * c0 + 2.0 * s * target).max(0.0);
                2.0 * target / (c0 + disc.sqrt())
            }
            Self::Table { .. } => self.bisect_integral(target),
        }
    }

    fn linear_coefficients(&self) -> (f64, f64) {
        match self {
            Self::Linear {
                value_at_ref,
                slope,
                t_ref,
            } => (value_at_ref - slope * t_ref, *slope),
            Self::Constant { value } => (*value, 0.0),
            Self::Table { .. } => (self.value(0.0), 0.0),
        }
    }

    fn bisect_integral(&self, target: f64) -> f64 {
        if target <= 0.0 {
            return target / self.value(0.0);
        }
        let mut lo = 0.0_f64;
        let mut hi = 1000.0_f64;
        let mut expansions = 0;
        while self.integral_from_zero(hi) < target && expansions < 64 {
            lo = hi;
            hi *= 2.0;
            expansions += 1;
        }
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if self.integral_from_zero(mid) < target {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= 1e-12 * hi.max(1.0) {
                break;
            }
        }
        0.5 * (lo + hi)
    }

    /// Check the curve is well formed, finite and `> 0` on `[0, t_max]`.
    pub fn validate_positive(&self, what: &'static str, t_max: f64) -> MaterialResult<()> {
        if let Self::Table { points } = self {
            if points.is_empty() {
                return Err(MaterialError::InvalidCurve {
                    what,
                    reason: "table has no points",
                });
            }
            if points.windows(2).any(|w| w[1].0 <= w[0].0) {
                return Err(MaterialError::InvalidCurve {
                    what,
                    reason: "table temperatures must be strictly increasing",
                });
            }
            if points
                .iter()
                .any(|(t, v)| !t.is_finite() || !v.is_finite() || *v <= 0.0)
            {
                return Err(MaterialError::InvalidCurve {
                    what,
                    reason: "table values must be finite and positive",
                });
            }
            return Ok(());
        }
        // Constant and linear curves are extremal at the interval ends.
        for t in [0.0, t_max] {
            let v = self.value(t);
            if !v.is_finite() || v <= 0.0 {
                return Err(MaterialError::InvalidCurve {
                    what,
                    reason: "value must be finite and positive over the valid temperature range",
                });
            }
        }
        Ok(())
    }
}

fn table_value(points: &[(f64, f64)], t: f64) -> f64 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.0,
    };
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    let seg = points.partition_point(|(pt, _)| *pt <= t);
    let (t0, v0) = points[seg - 1];
    let (t1, v1) = points[seg];
    v0 + (v1 - v0) * (t - t0) / (t1 - t0)
}

fn table_integral(points: &[(f64, f64)], t: f64) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    if t <= first.0 {
        return first.1 * t;
    }
    // Flat section below the first point.
    let mut acc = first.1 * first.0;
    for w in points.windows(2) {
        let (t0, v0) = w[0];
        let (t1, v1) = w[1];
        if t <= t0 {
            return acc;
        }
        let end = t.min(t1);
        let v_end = v0 + (v1 - v0) * (end - t0) / (t1 - t0);
        acc += 0.5 * (v0 + v_end) * (end - t0);
        if t <= t1 {
            return acc;
        }
    }
    // Flat section above the last point.
    if let Some(last) = points.last() {
        acc += last.1 * (t - last.0);
    }
    acc
}
