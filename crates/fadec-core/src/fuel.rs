//! Dual fuel-quantity estimation: ground-truth totalizer, fault-dependent
//! sensor model, and the scalar Kalman filter fusing the two.

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::constants::*;
use crate::fault::FaultKind;
use crate::types::{KalmanState, SloshIntensity};

/// Integrate fuel burn over one tick. Ground truth; never negative.
pub fn totalize(prev_fuel: f64, fuel_flow: f64, tick_ms: u64) -> f64 {
    let consumed = fuel_flow * (tick_ms as f64 / 3_600_000.0);
    (prev_fuel - consumed).max(0.0)
}

/// Probe reading derived from ground truth, plus the measurement-noise
/// covariance the filter should assume for it this tick.
///
/// A failed probe pins the reading to a constant regardless of truth; a
/// sloshing tank adds uniform noise whose amplitude and variance are set by
/// the commanded intensity. Otherwise the sensor tracks truth exactly.
pub fn sensor_reading<R: Rng>(
    truth: f64,
    fault: FaultKind,
    slosh: SloshIntensity,
    rng: &mut R,
) -> (f64, f64) {
    match fault {
        FaultKind::FailFuelProbe => (FAILED_PROBE_READING, KALMAN_R_DEFAULT),
        FaultKind::SloshingFuelTank if slosh != SloshIntensity::None => {
            let half = slosh.amplitude() / 2.0;
            let noise = Uniform::new(-half, half).sample(rng);
            ((truth + noise).max(0.0), slosh.measurement_noise())
        }
        _ => (truth, KALMAN_R_DEFAULT),
    }
}

/// One predict/update cycle of the scalar filter (A = H = 1).
///
/// Runs every tick regardless of fault state so the estimate stays smooth;
/// only the measurement noise `r` changes with conditions.
pub fn kalman_update(prev: KalmanState, z: f64, r: f64) -> KalmanState {
    // Predict.
    let xp = prev.x;
    let pp = prev.p + KALMAN_Q;
    // Update.
    let k = pp / (pp + r);
    let x = xp + k * (z - xp);
    let p = (1.0 - k) * pp;
    KalmanState { x, p, k }
}

/// Filter state on entering the sloshing fault: re-anchor on truth with a
/// wide-open covariance so the filter re-converges under the new noise.
pub fn kalman_slosh_reset(truth: f64) -> KalmanState {
    KalmanState {
        x: truth,
        p: 50.0,
        k: 0.0,
    }
}
