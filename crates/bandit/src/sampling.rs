//! Gamma and Beta variates from a uniform [`RandomSource`].
//!
//! Normals come from Box–Muller, Gamma from Marsaglia–Tsang (with the
//! `U^(1/k)` boost for shape below 1), and Beta from the Gamma ratio
//! `X / (X + Y)`.

use std::f64::consts::PI;

use crate::rng::RandomSource;

/// Rejection attempts before Marsaglia–Tsang gives up and returns its mode-ish
/// value `d`. Only reachable with adversarial sources.
const MAX_REJECTIONS: usize = 256;

/// Uniform in `(0, 1]`, safe for `ln`.
fn open_uniform(rng: &mut dyn RandomSource) -> f64 {
    let u = 1.0 - rng.next_f64();
    if u > 0.0 && u <= 1.0 {
        u
    } else {
        f64::MIN_POSITIVE
    }
}

/// Standard normal draw via Box–Muller.
pub fn standard_normal(rng: &mut dyn RandomSource) -> f64 {
    let u1 = open_uniform(rng);
    let u2 = rng.next_f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Gamma(shape, 1) draw. Invalid shapes return 0.
pub fn gamma(shape: f64, rng: &mut dyn RandomSource) -> f64 {
    if !(shape.is_finite() && shape > 0.0) {
        return 0.0;
    }
    if shape < 1.0 {
        let boost = open_uniform(rng).powf(1.0 / shape);
        return gamma(shape + 1.0, rng) * boost;
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    for _ in 0..MAX_REJECTIONS {
        let x = standard_normal(rng);
        let t = 1.0 + c * x;
        if t <= 0.0 {
            continue;
        }
        let v = t * t * t;
        let u = open_uniform(rng);
        if u < 1.0 - 0.0331 * x.powi(4) || u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
    d
}

/// Beta(alpha, beta) draw. Invalid parameters return 0.5; a degenerate ratio
/// falls back to the mean.
pub fn beta(alpha: f64, beta: f64, rng: &mut dyn RandomSource) -> f64 {
    if !(alpha.is_finite() && beta.is_finite()) || alpha <= 0.0 || beta <= 0.0 {
        return 0.5;
    }
    let x = gamma(alpha, rng);
    let y = gamma(beta, rng);
    let total = x + y;
    if total > 0.0 && total.is_finite() {
        (x / total).clamp(0.0, 1.0)
    } else {
        alpha / (alpha + beta)
    }
}
