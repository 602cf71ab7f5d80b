//! Distance and measurement functions over basin vectors
//!
//! All functions are pure and total: degenerate inputs (zero vectors, empty
//! text, non-finite sums) resolve to defined fallback values rather than
//! errors. The only hard failure is a dimensionality mismatch in the
//! Fisher-Rao distance.

use crate::core::encoding::l2_norm;
use crate::error::{BasinError, Result};

/// Coupling constant for kappa measurements
pub const KAPPA_STAR: f64 = 64.0;

/// Epsilon floor used by simplex projection and entropy
pub const DEFAULT_EPS: f64 = 1e-8;

/// Angular distance between two basin vectors.
///
/// Arccosine of the clipped cosine similarity. Returns +infinity when either
/// vector has zero norm. Symmetric and non-negative.
pub fn basin_distance(a: &[f32], b: &[f32]) -> f64 {
    let na = l2_norm(a);
    let nb = l2_norm(b);
    if na == 0.0 || nb == 0.0 {
        return f64::INFINITY;
    }
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    (dot / (na * nb)).clamp(-1.0, 1.0).acos()
}

/// Project a (possibly signed) basin vector onto the probability simplex.
///
/// Components are squared and normalized; each entry is floored at `eps` to
/// keep logs and square roots out of the degenerate range. A non-finite or
/// non-positive total falls back to the uniform distribution.
fn basin_to_simplex(basin: &[f32], eps: f64) -> Vec<f64> {
    if basin.is_empty() {
        return Vec::new();
    }

    let p: Vec<f64> = basin.iter().map(|x| f64::from(*x) * f64::from(*x)).collect();
    let total: f64 = p.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return vec![1.0 / basin.len() as f64; basin.len()];
    }

    p.into_iter().map(|v| (v / (total + eps)).clamp(eps, 1.0)).collect()
}

/// Fisher-Rao distance between two basin vectors.
///
/// Computed on the probability simplex with the standard metric:
///
/// ```text
/// d_FR(p, q) = 2 arccos( sum_i sqrt(p_i q_i) )
/// ```
///
/// Empty input on either side yields +infinity. Inputs of different length
/// are a caller error and fail fast.
pub fn fisher_rao_distance(a: &[f32], b: &[f32], eps: f64) -> Result<f64> {
    if a.is_empty() || b.is_empty() {
        return Ok(f64::INFINITY);
    }
    if a.len() != b.len() {
        return Err(BasinError::ShapeMismatch(format!(
            "basin vectors must have the same length ({} vs {})",
            a.len(),
            b.len()
        )));
    }

    let p = basin_to_simplex(a, eps);
    let q = basin_to_simplex(b, eps);

    let inner: f64 = p
        .iter()
        .zip(q.iter())
        .map(|(x, y)| (x * y + eps).sqrt())
        .sum();
    // Floating rounding can push the sum just past 1; clip back into the
    // arccos domain.
    let inner = inner.clamp(-1.0 + 1e-6, 1.0 - 1e-6);
    Ok(2.0 * inner.acos())
}

/// Phi (integration) measurement of a single basin vector.
///
/// Normalized entropy of the simplex projection mapped into `[0, 1]`:
/// near 0 when energy spreads uniformly across dimensions, near 1 when it
/// concentrates in few.
pub fn measure_phi(basin: &[f32], eps: f64) -> f64 {
    let p = basin_to_simplex(basin, eps);
    if p.is_empty() {
        return 0.0;
    }

    let h: f64 = -p.iter().map(|v| v * (v + eps).ln()).sum::<f64>();
    let h_max = (p.len() as f64).ln();
    if h_max <= 0.0 {
        return 0.0;
    }

    (1.0 - h / h_max).clamp(0.0, 1.0)
}

/// Kappa (coupling) measurement of a single basin vector.
///
/// Proportional to the basin magnitude: `kappa = KAPPA_STAR * ||b||`.
/// Returns 0 when the norm is not finite.
pub fn measure_kappa(basin: &[f32]) -> f64 {
    let n = l2_norm(basin);
    if !n.is_finite() {
        return 0.0;
    }
    (KAPPA_STAR * n).max(0.0)
}
