use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types usable as scalars in the integrators.
/// Must support float arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A first-order ODE system dx/dt = f(t, x).
///
/// Implementations must be pure: `rhs` may not mutate hidden state, so the
/// same (t, x) always yields the same rate. Concrete study systems live in
/// [`crate::systems`]; ad-hoc systems can be wrapped with [`SystemFn`].
pub trait OdeSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dim(&self) -> usize;

    /// Evaluates the vector field at (t, x).
    /// out: buffer to write dx/dt into; length equals `dim()`.
    fn rhs(&self, t: T, x: &[T], out: &mut [T]);
}

/// A trait for integrators that advance a system by one step.
pub trait Stepper<T: Scalar> {
    /// Performs one step of size dt.
    /// t: current time (updated after step)
    /// state: current state (updated after step)
    fn step(&mut self, system: &impl OdeSystem<T>, t: &mut T, state: &mut [T], dt: T);
}

/// Adapts a closure `(t, x, out)` into an [`OdeSystem`], so a derivative
/// function can be injected without defining a named type.
pub struct SystemFn<F> {
    dim: usize,
    f: F,
}

impl<F> SystemFn<F> {
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<T: Scalar, F: Fn(T, &[T], &mut [T])> OdeSystem<T> for SystemFn<F> {
    fn dim(&self) -> usize {
        self.dim
    }

    fn rhs(&self, t: T, x: &[T], out: &mut [T]) {
        (self.f)(t, x, out)
    }
}
