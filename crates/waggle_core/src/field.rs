use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::traits::OdeSystem;

/// One axis of a rectangular sampling grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl AxisSpec {
    pub fn new(min: f64, max: f64, samples: usize) -> Self {
        Self { min, max, samples }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            bail!("{} axis bounds must be finite.", name);
        }
        if !(self.min < self.max) {
            bail!(
                "{} axis must satisfy min < max, got [{}, {}].",
                name,
                self.min,
                self.max
            );
        }
        if self.samples < 2 {
            bail!("{} axis needs at least 2 samples, got {}.", name, self.samples);
        }
        Ok(())
    }

    fn value(&self, i: usize) -> f64 {
        self.min + (self.max - self.min) * i as f64 / (self.samples - 1) as f64
    }
}

/// The vector field of a planar system sampled over a rectangular grid,
/// ready for a quiver/streamline renderer. Row-major over y then x, so
/// entry (row, col) sits at index `row * shape.1 + col`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub dx: Vec<f64>,
    pub dy: Vec<f64>,
    /// (rows along y, columns along x).
    pub shape: (usize, usize),
}

/// Evaluates a planar system's rhs at time `t` over the grid spanned by the
/// two axes.
pub fn sample_field(
    system: &impl OdeSystem<f64>,
    x_axis: AxisSpec,
    y_axis: AxisSpec,
    t: f64,
) -> Result<FieldGrid> {
    if system.dim() != 2 {
        bail!(
            "Field sampling requires a planar system, got dimension {}.",
            system.dim()
        );
    }
    x_axis.validate("x")?;
    y_axis.validate("y")?;

    let n = x_axis.samples * y_axis.samples;
    let mut grid = FieldGrid {
        x: Vec::with_capacity(n),
        y: Vec::with_capacity(n),
        dx: Vec::with_capacity(n),
        dy: Vec::with_capacity(n),
        shape: (y_axis.samples, x_axis.samples),
    };

    let mut rate = [0.0; 2];
    for row in 0..y_axis.samples {
        let y = y_axis.value(row);
        for col in 0..x_axis.samples {
            let x = x_axis.value(col);
            system.rhs(t, &[x, y], &mut rate);
            grid.x.push(x);
            grid.y.push(y);
            grid.dx.push(rate[0]);
            grid.dy.push(rate[1]);
        }
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::{sample_field, AxisSpec};
    use crate::systems::linear::LinearPlanar;
    use crate::traits::SystemFn;

    #[test]
    fn samples_every_grid_point_in_row_major_order() {
        let system = LinearPlanar::homogeneous(1.0, 0.0, 0.0, 1.0);
        let grid = sample_field(
            &system,
            AxisSpec::new(0.0, 1.0, 3),
            AxisSpec::new(0.0, 2.0, 5),
            0.0,
        )
        .unwrap();
        assert_eq!(grid.shape, (5, 3));
        assert_eq!(grid.x.len(), 15);
        // Identity field: rates equal positions.
        assert_eq!(grid.dx, grid.x);
        assert_eq!(grid.dy, grid.y);
        // Corners land exactly on the axis bounds.
        assert_eq!(grid.x[0], 0.0);
        assert_eq!(grid.x[14], 1.0);
        assert_eq!(grid.y[14], 2.0);
    }

    #[test]
    fn rejects_non_planar_systems_and_bad_axes() {
        let scalar = SystemFn::new(1, |_t: f64, x: &[f64], out: &mut [f64]| out[0] = -x[0]);
        assert!(sample_field(
            &scalar,
            AxisSpec::new(0.0, 1.0, 3),
            AxisSpec::new(0.0, 1.0, 3),
            0.0
        )
        .is_err());

        let planar = LinearPlanar::homogeneous(0.0, 1.0, -1.0, 0.0);
        assert!(sample_field(
            &planar,
            AxisSpec::new(1.0, 0.0, 3),
            AxisSpec::new(0.0, 1.0, 3),
            0.0
        )
        .is_err());
        assert!(sample_field(
            &planar,
            AxisSpec::new(0.0, 1.0, 1),
            AxisSpec::new(0.0, 1.0, 3),
            0.0
        )
        .is_err());
    }
}
