use anyhow::{anyhow, bail, Context, Result};
use nalgebra::{DMatrix, DVector};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::traits::OdeSystem;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NewtonSettings {
    pub max_steps: usize,
    pub damping: f64,
    pub tolerance: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            max_steps: 25,
            damping: 1.0,
            tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComplexNumber {
    pub re: f64,
    pub im: f64,
}

impl From<Complex<f64>> for ComplexNumber {
    fn from(value: Complex<f64>) -> Self {
        Self {
            re: value.re,
            im: value.im,
        }
    }
}

/// Linear stability type of a planar fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanarStability {
    StableNode,
    UnstableNode,
    Saddle,
    StableSpiral,
    UnstableSpiral,
    Center,
    /// An eigenvalue sits on (or numerically at) zero; the linearization
    /// does not decide stability.
    Degenerate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquilibriumReport {
    pub state: Vec<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
    pub eigenvalues: Vec<ComplexNumber>,
    /// Present only for two-dimensional systems.
    pub stability: Option<PlanarStability>,
}

/// Refines `initial_guess` to a fixed point of the flow by damped Newton
/// iteration, then reports the Jacobian spectrum there. The Jacobian is
/// estimated by central finite differences of the rhs.
pub fn find_equilibrium(
    system: &impl OdeSystem<f64>,
    initial_guess: &[f64],
    settings: NewtonSettings,
) -> Result<EquilibriumReport> {
    let dim = system.dim();
    if dim == 0 {
        bail!("System has zero dimension.");
    }
    if initial_guess.len() != dim {
        bail!(
            "Initial guess dimension mismatch. Expected {}, got {}.",
            dim,
            initial_guess.len()
        );
    }
    if settings.max_steps == 0 {
        bail!("max_steps must be greater than zero.");
    }
    if settings.damping <= 0.0 {
        bail!("damping must be positive.");
    }
    if settings.tolerance <= 0.0 {
        bail!("tolerance must be positive.");
    }

    let mut state = initial_guess.to_vec();
    let mut residual = vec![0.0; dim];
    system.rhs(0.0, &state, &mut residual);
    let mut residual_norm = l2_norm(&residual);
    let mut iterations = 0usize;

    loop {
        if residual_norm <= settings.tolerance {
            break;
        }

        if iterations >= settings.max_steps {
            bail!(
                "Newton refinement failed to converge in {} steps (residual norm = {}).",
                settings.max_steps,
                residual_norm
            );
        }

        let jacobian = fd_jacobian(system, &state);
        let delta = solve_linear_system(dim, &jacobian, &residual)
            .context("Failed to solve linear system during Newton iteration.")?;

        for i in 0..dim {
            state[i] -= settings.damping * delta[i];
        }

        iterations += 1;
        system.rhs(0.0, &state, &mut residual);
        residual_norm = l2_norm(&residual);
    }

    let jacobian = fd_jacobian(system, &state);
    let eigenvalues = compute_eigenvalues(dim, &jacobian);
    let stability = if dim == 2 {
        Some(classify_planar(&eigenvalues))
    } else {
        None
    };

    Ok(EquilibriumReport {
        state,
        residual_norm,
        iterations,
        eigenvalues: eigenvalues.into_iter().map(ComplexNumber::from).collect(),
        stability,
    })
}

/// Central-difference Jacobian of the rhs at `state` (row-major).
fn fd_jacobian(system: &impl OdeSystem<f64>, state: &[f64]) -> Vec<f64> {
    let dim = state.len();
    let step_scale = f64::EPSILON.cbrt();
    let mut jacobian = vec![0.0; dim * dim];
    let mut probe = state.to_vec();
    let mut forward = vec![0.0; dim];
    let mut backward = vec![0.0; dim];

    for j in 0..dim {
        let h = step_scale * (1.0 + state[j].abs());
        probe[j] = state[j] + h;
        system.rhs(0.0, &probe, &mut forward);
        probe[j] = state[j] - h;
        system.rhs(0.0, &probe, &mut backward);
        probe[j] = state[j];

        for i in 0..dim {
            jacobian[i * dim + j] = (forward[i] - backward[i]) / (2.0 * h);
        }
    }

    jacobian
}

fn solve_linear_system(dim: usize, jacobian: &[f64], residual: &[f64]) -> Result<Vec<f64>> {
    let j_matrix = DMatrix::from_row_slice(dim, dim, jacobian);
    let rhs = DVector::from_column_slice(residual);
    j_matrix
        .lu()
        .solve(&rhs)
        .map(|v| v.iter().cloned().collect())
        .ok_or_else(|| anyhow!("Jacobian is singular."))
}

fn compute_eigenvalues(dim: usize, jacobian: &[f64]) -> Vec<Complex<f64>> {
    let matrix = DMatrix::from_row_slice(dim, dim, jacobian);
    matrix.complex_eigenvalues().iter().copied().collect()
}

fn classify_planar(eigenvalues: &[Complex<f64>]) -> PlanarStability {
    const EPS: f64 = 1e-9;
    let rotating = eigenvalues.iter().any(|l| l.im.abs() > EPS);

    if rotating {
        let re = eigenvalues[0].re;
        if re.abs() <= EPS {
            PlanarStability::Center
        } else if re < 0.0 {
            PlanarStability::StableSpiral
        } else {
            PlanarStability::UnstableSpiral
        }
    } else {
        let (l1, l2) = (eigenvalues[0].re, eigenvalues[1].re);
        if l1.abs() <= EPS || l2.abs() <= EPS {
            PlanarStability::Degenerate
        } else if l1 * l2 < 0.0 {
            PlanarStability::Saddle
        } else if l1 < 0.0 {
            PlanarStability::StableNode
        } else {
            PlanarStability::UnstableNode
        }
    }
}

fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}
