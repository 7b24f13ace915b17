//! Planar affine systems.
//!
//! x' = a x + b y + e
//! y' = c x + d y + f
//!
//! Covers the coursework drift path (x' = 2x + 2y, y' = -y) as well as the
//! affine approximants used to study a nonlinear system near a fixed point.

use crate::traits::OdeSystem;

/// A planar affine vector field. State layout: `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearPlanar {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl LinearPlanar {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Purely linear system (no constant drift).
    pub fn homogeneous(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self::new(a, b, c, d, 0.0, 0.0)
    }
}

impl OdeSystem<f64> for LinearPlanar {
    fn dim(&self) -> usize {
        2
    }

    fn rhs(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        out[0] = self.a * x[0] + self.b * x[1] + self.e;
        out[1] = self.c * x[0] + self.d * x[1] + self.f;
    }
}

#[cfg(test)]
mod tests {
    use super::LinearPlanar;
    use crate::solvers::Euler;
    use crate::trajectory::{simulate, TimeGrid};
    use crate::traits::OdeSystem;

    #[test]
    fn decoupled_component_decays_exponentially() {
        // x' = 2x + 2y, y' = -y: y is decoupled with closed form y0 e^{-t}.
        let system = LinearPlanar::homogeneous(2.0, 2.0, 0.0, -1.0);
        let grid = TimeGrid::linspace(0.0, 1.0, 101).unwrap();
        let traj = simulate(&system, &mut Euler::new(2), &grid, &[0.0, 20.0]).unwrap();
        let y_final = traj.last_state()[1];
        let expected = 20.0 * (-1.0f64).exp();
        // Euler at dt = 0.01 over a unit horizon: first-order error budget.
        assert!(
            (y_final - expected).abs() < 0.05,
            "expected y(1) ~ {expected}, got {y_final}"
        );
    }

    #[test]
    fn affine_approximant_vanishes_at_the_studied_fixed_point() {
        // x' = -x - y + 2, y' = x - y has its equilibrium at (1, 1).
        let system = LinearPlanar::new(-1.0, -1.0, 1.0, -1.0, 2.0, 0.0);
        let mut out = [0.0; 2];
        system.rhs(0.0, &[1.0, 1.0], &mut out);
        assert_eq!(out, [0.0, 0.0]);
    }
}
