//! The `waggle_core` crate is the numerical engine behind the waggle
//! planar-dynamics studies. It integrates two-variable ODE systems and
//! hands the resulting trajectories, field grids, and reports to an
//! external plotting collaborator.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction), `OdeSystem` (the
//!   injected derivative function), `Stepper` (fixed-step integrators).
//! - **Solvers**: `Euler` and classic `Rk4` fixed-step integrators, plus
//!   the adaptive `DormandPrince` 5(4) pair with dense output.
//! - **Trajectory**: time grids, the recorded trajectory type, and the
//!   fixed-grid simulation driver.
//! - **Sweep**: threshold search over a scalar initial-condition parameter.
//! - **Equilibrium / Field**: fixed-point refinement with stability
//!   classification, and vector-field grid sampling for phase portraits.

pub mod adaptive;
pub mod equilibrium;
pub mod error;
pub mod field;
pub mod solvers;
pub mod sweep;
pub mod systems;
pub mod traits;
pub mod trajectory;
