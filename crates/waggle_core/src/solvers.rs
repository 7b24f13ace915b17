use crate::traits::{OdeSystem, Scalar, Stepper};

/// Forward Euler. One derivative evaluation per step, first-order accurate,
/// no error estimate; every step is accepted.
pub struct Euler<T: Scalar> {
    dxdt: Vec<T>,
}

impl<T: Scalar> Euler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            dxdt: vec![T::from_f64(0.0).unwrap(); dim],
        }
    }
}

impl<T: Scalar> Stepper<T> for Euler<T> {
    fn step(&mut self, system: &impl OdeSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;

        // y_next = y + dt * f(t, y)
        system.rhs(t0, state, &mut self.dxdt);
        for i in 0..state.len() {
            state[i] = state[i] + dt * self.dxdt[i];
        }

        *t = t0 + dt;
    }
}

/// Classic Runge-Kutta 4th order.
pub struct Rk4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> Rk4<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::from_f64(0.0).unwrap();
        Self {
            k1: vec![z; dim],
            k2: vec![z; dim],
            k3: vec![z; dim],
            k4: vec![z; dim],
            tmp: vec![z; dim],
        }
    }
}

impl<T: Scalar> Stepper<T> for Rk4<T> {
    fn step(&mut self, system: &impl OdeSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let half = T::from_f64(0.5).unwrap();
        let sixth = T::from_f64(1.0 / 6.0).unwrap();
        let two = T::from_f64(2.0).unwrap();

        let t0 = *t;

        // k1 = f(t, y)
        system.rhs(t0, state, &mut self.k1);

        // k2 = f(t + dt/2, y + dt*k1/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k1[i] * half;
        }
        system.rhs(t0 + dt * half, &self.tmp, &mut self.k2);

        // k3 = f(t + dt/2, y + dt*k2/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k2[i] * half;
        }
        system.rhs(t0 + dt * half, &self.tmp, &mut self.k3);

        // k4 = f(t + dt, y + dt*k3)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k3[i];
        }
        system.rhs(t0 + dt, &self.tmp, &mut self.k4);

        // y_next = y + dt/6 * (k1 + 2k2 + 2k3 + k4)
        for i in 0..state.len() {
            state[i] = state[i]
                + dt * sixth * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }

        *t = t0 + dt;
    }
}
