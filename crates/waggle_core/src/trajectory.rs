use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::traits::{OdeSystem, Stepper};

/// A validated, monotonically increasing sequence of sample times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// `n` evenly spaced samples covering [t0, t1] inclusive.
    pub fn linspace(t0: f64, t1: f64, n: usize) -> Result<Self> {
        if n < 2 {
            return Err(Error::GridTooShort(n));
        }
        if !(t0 < t1) {
            return Err(Error::EmptyTimeSpan(t0, t1));
        }
        let dt = (t1 - t0) / (n - 1) as f64;
        let mut times = Vec::with_capacity(n);
        for i in 0..n {
            times.push(t0 + i as f64 * dt);
        }
        // Land the last sample exactly on t1.
        times[n - 1] = t1;
        Ok(Self { times })
    }

    /// Samples t0, t0 + dt, t0 + 2 dt, ... strictly below t_max.
    pub fn with_step(t0: f64, t_max: f64, dt: f64) -> Result<Self> {
        if !(dt > 0.0) {
            return Err(Error::NonPositiveStep(dt));
        }
        if !(t0 < t_max) {
            return Err(Error::EmptyTimeSpan(t0, t_max));
        }
        let mut times = Vec::new();
        let mut i = 0usize;
        loop {
            let t = t0 + i as f64 * dt;
            if t >= t_max {
                break;
            }
            times.push(t);
            i += 1;
        }
        if times.len() < 2 {
            return Err(Error::GridTooShort(times.len()));
        }
        Ok(Self { times })
    }

    /// Wraps an explicit list of sample times, checking monotonicity.
    pub fn from_times(times: Vec<f64>) -> Result<Self> {
        if times.len() < 2 {
            return Err(Error::GridTooShort(times.len()));
        }
        validate_increasing(&times)?;
        Ok(Self { times })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.times[0]
    }

    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }
}

fn validate_increasing(times: &[f64]) -> Result<()> {
    for i in 1..times.len() {
        if !(times[i] > times[i - 1]) {
            return Err(Error::NonMonotonicTimes {
                index: i,
                value: times[i],
                previous: times[i - 1],
            });
        }
    }
    Ok(())
}

/// The recorded result of integrating a system from one initial condition.
///
/// States are stored row-major (`dim` values per sample). Construction
/// enforces the invariants once; afterwards the trajectory is read-only and
/// is handed to the plotting collaborator as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    dim: usize,
    times: Vec<f64>,
    states: Vec<f64>,
}

impl Trajectory {
    pub fn new(dim: usize, times: Vec<f64>, states: Vec<f64>) -> Result<Self> {
        if dim == 0 {
            return Err(Error::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        if states.len() != dim * times.len() {
            return Err(Error::LengthMismatch {
                times: times.len(),
                states: states.len() / dim,
            });
        }
        if times.len() < 2 {
            return Err(Error::GridTooShort(times.len()));
        }
        validate_increasing(&times)?;
        Ok(Self { dim, times, states })
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// State vector at sample `i`.
    pub fn state(&self, i: usize) -> &[f64] {
        &self.states[i * self.dim..(i + 1) * self.dim]
    }

    pub fn last_state(&self) -> &[f64] {
        self.state(self.times.len() - 1)
    }

    pub fn last_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Iterates over one state component across all samples, e.g. every
    /// recorded distance value of the bee model.
    pub fn component(&self, j: usize) -> impl Iterator<Item = f64> + '_ {
        self.states.iter().skip(j).step_by(self.dim).copied()
    }
}

/// Integrates `system` over the full grid with a fixed-step integrator.
///
/// Storage is pre-allocated to the grid length; sample 0 is the initial
/// state and each following sample depends only on its predecessor. The
/// recurrence is sequential by nature. Non-finite states produced by an
/// unstable system are recorded as-is.
pub fn simulate(
    system: &impl OdeSystem<f64>,
    stepper: &mut impl Stepper<f64>,
    grid: &TimeGrid,
    initial: &[f64],
) -> Result<Trajectory> {
    let dim = system.dim();
    if initial.len() != dim {
        return Err(Error::DimensionMismatch {
            expected: dim,
            actual: initial.len(),
        });
    }

    let times = grid.times();
    let mut states = Vec::with_capacity(dim * times.len());
    states.extend_from_slice(initial);

    let mut state = initial.to_vec();
    let mut t = times[0];
    for w in times.windows(2) {
        stepper.step(system, &mut t, &mut state, w[1] - w[0]);
        states.extend_from_slice(&state);
    }

    Trajectory::new(dim, times.to_vec(), states)
}
