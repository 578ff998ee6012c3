//! Deterministic machine-probability forecasts.
//!
//! The goal is to correct crowd bias in the present price, not to predict
//! the future. Two estimators exist:
//!
//! - [`machine_from_pm`] mostly rides the market price with a slight shrink
//!   toward 0.5. Used when no trading volume is known.
//! - [`compute_machine_p`] blends the crowd price toward 0.5 in proportion
//!   to how thinly the market trades, with extra regression on extremes.

/// Extra pull toward 0.5 applied to extreme crowd prices.
pub const REGRESSION_FACTOR: f64 = 0.20;

/// 24h volume (USD) above which the crowd price is trusted fully.
pub const VOL_ANCHOR_USD: f64 = 500_000.0;

/// Crowd prices further than this from 0.5 count as extreme (>0.90 or <0.10).
const EXTREME_DEVIATION: f64 = 0.40;

/// Clamp a probability to `[0, 1]`. `NaN` maps to the neutral 0.5.
pub fn clamp01(p: f64) -> f64 {
    if p.is_nan() {
        return 0.5;
    }
    p.clamp(0.0, 1.0)
}

/// Minimal machine estimate derived from the market price alone.
///
/// 90% market price, 10% neutral, with a cap of 0.995 above 0.94 and a
/// floor of 0.005 below 0.06.
pub fn machine_from_pm(p_pm: f64) -> f64 {
    let mut p = 0.90 * p_pm + 0.10 * 0.5;
    if p_pm >= 0.94 {
        p = p.min(0.995);
    }
    if p_pm <= 0.06 {
        p = p.max(0.005);
    }
    clamp01(p)
}

/// Volume-weighted machine estimate.
///
/// `volume_24h` below [`VOL_ANCHOR_USD`] pulls the estimate toward 0.5
/// linearly; negative volume is treated as zero. The result is always in
/// `[0.01, 0.99]`.
pub fn compute_machine_p(crowd_p: f64, volume_24h: f64) -> f64 {
    let crowd_p = if crowd_p.is_nan() {
        0.5
    } else {
        crowd_p.clamp(0.001, 0.999)
    };
    let volume = if volume_24h.is_nan() {
        0.0
    } else {
        volume_24h.max(0.0)
    };

    let vol_weight = (volume / VOL_ANCHOR_USD).min(1.0);
    let mut p = vol_weight * crowd_p + (1.0 - vol_weight) * 0.5;

    if (crowd_p - 0.5).abs() > EXTREME_DEVIATION {
        p += REGRESSION_FACTOR * (0.5 - p);
    }

    p.clamp(0.01, 0.99)
}
