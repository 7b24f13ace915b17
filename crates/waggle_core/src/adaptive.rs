use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::trajectory::Trajectory;
use crate::traits::OdeSystem;

/// Counters collected over one adaptive solve.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SolveStats {
    /// Derivative evaluations.
    pub nfev: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Result of an adaptive solve: the sampled trajectory plus diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub trajectory: Trajectory,
    pub stats: SolveStats,
}

/// Dormand-Prince 5(4) embedded Runge-Kutta pair with automatic step-size
/// control (the scheme behind most off-the-shelf `RK45` routines).
///
/// The 5th-order solution propagates; the embedded 4th-order solution
/// supplies the error estimate. The last stage equals the first stage of
/// the next step (FSAL), so an accepted step costs six fresh derivative
/// evaluations. Output is either the accepted step times or, when an
/// explicit grid is requested, cubic Hermite interpolation onto it.
#[derive(Debug, Clone)]
pub struct DormandPrince {
    /// Relative error tolerance.
    pub rtol: f64,
    /// Absolute error tolerance.
    pub atol: f64,
    /// Safety factor applied to the proposed step factor.
    pub safety: f64,
    /// Smallest allowed shrink factor per step.
    pub min_factor: f64,
    /// Largest allowed growth factor per step.
    pub max_factor: f64,
    /// Attempted-step budget before giving up on the span.
    pub max_steps: usize,
}

impl Default for DormandPrince {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 5.0,
            max_steps: 100_000,
        }
    }
}

// Dormand-Prince tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also row 7 of the tableau; a72 = 0).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// b - bhat: weights of the embedded error estimate.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// 1/(order + 1) for the I-controller.
const CONTROL_EXPONENT: f64 = 1.0 / 5.0;

impl DormandPrince {
    /// Integrates `system` over `t_span` from `y0`.
    ///
    /// With `t_eval = None` the trajectory is sampled at the accepted step
    /// times; otherwise it is resampled onto the requested grid, which must
    /// be strictly increasing and lie inside the span.
    pub fn solve(
        &self,
        system: &impl OdeSystem<f64>,
        t_span: (f64, f64),
        y0: &[f64],
        t_eval: Option<&[f64]>,
    ) -> Result<Solution> {
        let (t0, t1) = t_span;
        if !(t0 < t1) {
            return Err(Error::EmptyTimeSpan(t0, t1));
        }
        let dim = system.dim();
        if y0.len() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                actual: y0.len(),
            });
        }
        if let Some(grid) = t_eval {
            for (i, &tau) in grid.iter().enumerate() {
                if !(t0..=t1).contains(&tau) {
                    return Err(Error::OutputTimeOutOfSpan(tau, t0, t1));
                }
                if i > 0 && !(tau > grid[i - 1]) {
                    return Err(Error::NonMonotonicTimes {
                        index: i,
                        value: tau,
                        previous: grid[i - 1],
                    });
                }
            }
        }

        let span = t1 - t0;
        let mut stats = SolveStats::default();
        let mut out_times: Vec<f64> = Vec::new();
        let mut out_states: Vec<f64> = Vec::new();
        let mut eval_idx = 0usize;

        let mut t = t0;
        let mut y = y0.to_vec();
        let mut k1 = vec![0.0; dim];
        let mut k2 = vec![0.0; dim];
        let mut k3 = vec![0.0; dim];
        let mut k4 = vec![0.0; dim];
        let mut k5 = vec![0.0; dim];
        let mut k6 = vec![0.0; dim];
        let mut k7 = vec![0.0; dim];
        let mut tmp = vec![0.0; dim];
        let mut y_new = vec![0.0; dim];

        system.rhs(t, &y, &mut k1);
        stats.nfev += 1;

        match t_eval {
            None => {
                out_times.push(t0);
                out_states.extend_from_slice(&y);
            }
            Some(grid) => {
                while eval_idx < grid.len() && grid[eval_idx] <= t0 {
                    out_times.push(grid[eval_idx]);
                    out_states.extend_from_slice(&y);
                    eval_idx += 1;
                }
            }
        }

        let mut h = span / 100.0;
        let mut steps = 0usize;

        while t < t1 {
            if steps >= self.max_steps {
                return Err(Error::StepBudgetExhausted(self.max_steps));
            }
            steps += 1;

            let last = h >= t1 - t;
            let h_try = if last { t1 - t } else { h };
            if !(h_try > 0.0) || t + h_try == t {
                // Step size underflowed; the state is effectively stuck.
                return Err(Error::NonFiniteState(t));
            }

            for i in 0..dim {
                tmp[i] = y[i] + h_try * A21 * k1[i];
            }
            system.rhs(t + C2 * h_try, &tmp, &mut k2);

            for i in 0..dim {
                tmp[i] = y[i] + h_try * (A31 * k1[i] + A32 * k2[i]);
            }
            system.rhs(t + C3 * h_try, &tmp, &mut k3);

            for i in 0..dim {
                tmp[i] = y[i] + h_try * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
            }
            system.rhs(t + C4 * h_try, &tmp, &mut k4);

            for i in 0..dim {
                tmp[i] =
                    y[i] + h_try * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
            }
            system.rhs(t + C5 * h_try, &tmp, &mut k5);

            for i in 0..dim {
                tmp[i] = y[i]
                    + h_try
                        * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
            }
            system.rhs(t + h_try, &tmp, &mut k6);

            for i in 0..dim {
                y_new[i] = y[i]
                    + h_try * (B1 * k1[i] + B3 * k3[i] + B4 * k4[i] + B5 * k5[i] + B6 * k6[i]);
            }
            system.rhs(t + h_try, &y_new, &mut k7);
            stats.nfev += 6;

            let mut err_sq = 0.0;
            for i in 0..dim {
                let e = h_try
                    * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i]
                        + E7 * k7[i]);
                let scale = self.atol + self.rtol * y[i].abs().max(y_new[i].abs());
                err_sq += (e / scale) * (e / scale);
            }
            let err_norm = (err_sq / dim as f64).sqrt();

            if !err_norm.is_finite() {
                stats.rejected += 1;
                h = (h_try * self.min_factor).max(f64::MIN_POSITIVE);
                if h < 1e-14 * span {
                    return Err(Error::NonFiniteState(t));
                }
                debug!(t, h, "non-finite error estimate, shrinking step");
                continue;
            }

            if err_norm <= 1.0 {
                let t_new = if last { t1 } else { t + h_try };
                if let Some(grid) = t_eval {
                    // Cubic Hermite over [t, t_new] using the endpoint
                    // derivatives k1 and k7 (free via FSAL).
                    while eval_idx < grid.len() && grid[eval_idx] <= t_new {
                        let tau = grid[eval_idx];
                        let theta = ((tau - t) / h_try).clamp(0.0, 1.0);
                        let t2 = theta * theta;
                        let t3 = t2 * theta;
                        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
                        let h10 = t3 - 2.0 * t2 + theta;
                        let h01 = -2.0 * t3 + 3.0 * t2;
                        let h11 = t3 - t2;
                        out_times.push(tau);
                        for i in 0..dim {
                            out_states.push(
                                h00 * y[i]
                                    + h10 * h_try * k1[i]
                                    + h01 * y_new[i]
                                    + h11 * h_try * k7[i],
                            );
                        }
                        eval_idx += 1;
                    }
                } else {
                    out_times.push(t_new);
                    out_states.extend_from_slice(&y_new);
                }

                t = t_new;
                y.copy_from_slice(&y_new);
                k1.copy_from_slice(&k7);
                stats.accepted += 1;
                trace!(t, h = h_try, err = err_norm, "step accepted");
            } else {
                stats.rejected += 1;
                debug!(t, h = h_try, err = err_norm, "step rejected");
            }

            let factor = if err_norm == 0.0 {
                self.max_factor
            } else {
                (self.safety * err_norm.powf(-CONTROL_EXPONENT))
                    .clamp(self.min_factor, self.max_factor)
            };
            // Never grow a step that was just rejected.
            let factor = if err_norm > 1.0 { factor.min(1.0) } else { factor };
            h = h_try * factor;
        }

        debug!(
            accepted = stats.accepted,
            rejected = stats.rejected,
            nfev = stats.nfev,
            samples = out_times.len(),
            "adaptive solve finished"
        );

        Ok(Solution {
            trajectory: Trajectory::new(dim, out_times, out_states)?,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::DormandPrince;
    use crate::error::Error;
    use crate::traits::SystemFn;

    fn decay() -> SystemFn<impl Fn(f64, &[f64], &mut [f64])> {
        SystemFn::new(1, |_t: f64, x: &[f64], out: &mut [f64]| out[0] = -x[0])
    }

    #[test]
    fn matches_closed_form_decay() {
        let solver = DormandPrince::default();
        let solution = solver.solve(&decay(), (0.0, 2.0), &[1.0], None).unwrap();
        let expected = (-2.0f64).exp();
        let got = solution.trajectory.last_state()[0];
        assert!(
            (got - expected).abs() < 1e-5,
            "expected {expected}, got {got}"
        );
        assert!(solution.stats.accepted > 0);
        assert!(solution.stats.nfev > solution.stats.accepted);
    }

    #[test]
    fn dense_output_hits_requested_times_exactly() {
        let solver = DormandPrince::default();
        let t_eval: Vec<f64> = (0..=20).map(|i| i as f64 * 0.1).collect();
        let solution = solver
            .solve(&decay(), (0.0, 2.0), &[1.0], Some(&t_eval))
            .unwrap();
        assert_eq!(solution.trajectory.times(), t_eval.as_slice());
        for (tau, x) in t_eval.iter().zip(solution.trajectory.component(0)) {
            assert!(
                (x - (-tau).exp()).abs() < 1e-5,
                "interpolant off at t = {tau}: {x}"
            );
        }
    }

    #[test]
    fn rejects_output_times_outside_span() {
        let solver = DormandPrince::default();
        let result = solver.solve(&decay(), (0.0, 1.0), &[1.0], Some(&[0.5, 2.0]));
        assert!(matches!(result, Err(Error::OutputTimeOutOfSpan(..))));
    }

    #[test]
    fn finite_time_blowup_is_an_explicit_error() {
        // dx/dt = x^2 from x(0) = 1 blows up at t = 1.
        let system = SystemFn::new(1, |_t: f64, x: &[f64], out: &mut [f64]| {
            out[0] = x[0] * x[0];
        });
        let solver = DormandPrince::default();
        let result = solver.solve(&system, (0.0, 2.0), &[1.0], None);
        assert!(matches!(
            result,
            Err(Error::NonFiniteState(_)) | Err(Error::StepBudgetExhausted(_))
        ));
    }
}
