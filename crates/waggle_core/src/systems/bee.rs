//! Bee scent-navigation model.
//!
//! A bee at distance D from its hive follows a scent gradient whose
//! perceived intensity is S:
//!
//!   dS/dt = sin(D)
//!   dD/dt = S - D
//!
//! Flowers sit at distances n*pi. Every point S = D = n*pi is an
//! equilibrium; the linearization there has Jacobian [[0, cos(n*pi)],
//! [1, -1]], so odd multiples of pi (cos = -1) are stable spirals the bee
//! settles into, while even multiples (cos = 1) are saddles it must be
//! pushed past.

use std::f64::consts::PI;

use crate::traits::OdeSystem;

/// The (S, D) scent/distance system. State layout: `[S, D]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeeScent;

impl OdeSystem<f64> for BeeScent {
    fn dim(&self) -> usize {
        2
    }

    fn rhs(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        let (s, d) = (x[0], x[1]);
        out[0] = d.sin();
        out[1] = s - d;
    }
}

/// The equilibrium associated with the n-th flower: S = D = n*pi.
pub fn flower_equilibrium(n: u32) -> [f64; 2] {
    let v = n as f64 * PI;
    [v, v]
}

#[cfg(test)]
mod tests {
    use super::{flower_equilibrium, BeeScent};
    use crate::solvers::{Euler, Rk4};
    use crate::trajectory::{simulate, TimeGrid};
    use std::f64::consts::PI;

    #[test]
    fn flower_points_are_stationary() {
        let grid = TimeGrid::linspace(0.0, 10.0, 251).unwrap();
        for n in 0..4 {
            let start = flower_equilibrium(n);
            let traj = simulate(&BeeScent, &mut Rk4::new(2), &grid, &start).unwrap();
            let final_state = traj.last_state();
            // sin(n*pi) is ~1e-16 rather than exactly zero, so allow a
            // matching slack after 250 steps.
            assert!(
                (final_state[0] - start[0]).abs() < 1e-12
                    && (final_state[1] - start[1]).abs() < 1e-12,
                "drifted from equilibrium {n}: {final_state:?}"
            );
        }
    }

    #[test]
    fn euler_and_rk4_agree_on_the_reference_run() {
        // (S, D) = (0, 5) over t in [0, 20] with 500 samples (dt = 0.04).
        // Documented cross-validation tolerance: |D_euler - D_rk4| < 0.05.
        let grid = TimeGrid::linspace(0.0, 20.0, 500).unwrap();
        let euler = simulate(&BeeScent, &mut Euler::new(2), &grid, &[0.0, 5.0]).unwrap();
        let rk4 = simulate(&BeeScent, &mut Rk4::new(2), &grid, &[0.0, 5.0]).unwrap();
        let d_gap = (euler.last_state()[1] - rk4.last_state()[1]).abs();
        assert!(d_gap < 0.05, "integrators disagree on final D by {d_gap}");
    }

    #[test]
    fn trajectory_from_near_first_flower_stays_bounded() {
        let grid = TimeGrid::linspace(0.0, 50.0, 1001).unwrap();
        let traj = simulate(&BeeScent, &mut Rk4::new(2), &grid, &[0.0, PI - 0.1]).unwrap();
        assert!(traj
            .component(1)
            .all(|d| d.is_finite() && d.abs() < 4.0 * PI));
    }
}
