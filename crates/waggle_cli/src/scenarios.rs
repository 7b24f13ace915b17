//! The study scenarios, one per original analysis script. All initial
//! conditions, parameter values, and time spans are literal constants
//! chosen per scenario; the computed trajectories and field grids are what
//! gets handed to the plotting collaborator.

use std::f64::consts::PI;

use anyhow::Result;
use tracing::{info, warn};

use waggle_core::adaptive::DormandPrince;
use waggle_core::equilibrium::{find_equilibrium, NewtonSettings};
use waggle_core::error::Error;
use waggle_core::field::{sample_field, AxisSpec};
use waggle_core::solvers::{Euler, Rk4};
use waggle_core::sweep::threshold_search;
use waggle_core::systems::bee::{flower_equilibrium, BeeScent};
use waggle_core::systems::{HousingMarket, LinearPlanar};
use waggle_core::trajectory::{simulate, TimeGrid};
use waggle_core::traits::SystemFn;

/// Bee smell intensity and hive distance over time, Euler's method.
pub fn bee_time_series() -> Result<()> {
    let grid = TimeGrid::linspace(0.0, 20.0, 500)?;
    let traj = simulate(&BeeScent, &mut Euler::new(2), &grid, &[0.0, 5.0])?;

    let end = traj.last_state();
    info!(samples = traj.len(), "bee time series integrated");
    println!(
        "bee time series: S(20) = {:.4}, D(20) = {:.4}",
        end[0], end[1]
    );
    Ok(())
}

/// Phase-plane trajectories started near each of the first four flowers,
/// plus the stability of the flower equilibria themselves.
pub fn bee_phase_portraits() -> Result<()> {
    let solver = DormandPrince::default();
    let output = TimeGrid::linspace(0.0, 50.0, 1000)?;

    for n in 1..=4u32 {
        let d0 = n as f64 * PI - 0.1;
        let solution = solver.solve(&BeeScent, (0.0, 50.0), &[0.0, d0], Some(output.times()))?;
        let end = solution.trajectory.last_state();
        println!(
            "bee phase portrait, D(0) = {:.2}: settles at S = {:.4}, D = {:.4}",
            d0, end[0], end[1]
        );
    }

    for n in 0..=4u32 {
        let report = find_equilibrium(&BeeScent, &flower_equilibrium(n), NewtonSettings::default())?;
        println!(
            "equilibrium at D = {}π: {:?}",
            n,
            report.stability.expect("bee system is planar")
        );
    }
    Ok(())
}

/// Smallest initial smell intensity that carries the bee past the saddle at
/// D = 2π out to the third flower at D = 3π.
pub fn bee_threshold_search() -> Result<()> {
    let grid = TimeGrid::with_step(0.0, 50.0, 0.01)?;
    let target = 3.0 * PI;
    let candidates: Vec<f64> = (0..100).map(|i| 5.5 + i as f64 * (1.0 / 99.0)).collect();

    let hit = threshold_search(
        &candidates,
        |s0| simulate(&BeeScent, &mut Rk4::new(2), &grid, &[s0, 0.0]),
        |traj| traj.component(1).any(|d| d >= target),
    )?;

    match hit {
        Some(hit) => {
            info!(index = hit.index, samples = hit.trajectory.len(), "sweep hit");
            println!("Minimum initial smell intensity S0: {:.4}", hit.value);
        }
        None => println!("Third flower not reached within S0 range."),
    }
    Ok(())
}

/// Population and rent over ten decades, without and with rent legislation.
pub fn housing_evolution() -> Result<()> {
    let solver = DormandPrince::default();
    let output = TimeGrid::linspace(0.0, 10.0, 300)?;

    match solver.solve(
        &HousingMarket::unchecked(),
        (0.0, 10.0),
        &[5.0, 2.5],
        Some(output.times()),
    ) {
        Ok(solution) => {
            let end = solution.trajectory.last_state();
            println!(
                "housing (unchecked rent): P(10) = {:.4}, R(10) = {:.4}",
                end[0], end[1]
            );
        }
        // Unchecked rent outgrows what the population can pay and the
        // population crashes in finite time; report it instead of printing
        // overflowed values.
        Err(err @ (Error::NonFiniteState(_) | Error::StepBudgetExhausted(_))) => {
            warn!(%err, "unchecked housing model diverged");
            println!("housing (unchecked rent): population collapses before t = 10 ({err})");
        }
        Err(err) => return Err(err.into()),
    }

    let solution = solver.solve(
        &HousingMarket::legislated(2.5, 0.5),
        (0.0, 10.0),
        &[5.0, 2.5],
        Some(output.times()),
    )?;
    let end = solution.trajectory.last_state();
    println!(
        "housing (rent legislation): P(10) = {:.4}, R(10) = {:.4}",
        end[0], end[1]
    );
    Ok(())
}

/// Vector field of the legislated model plus trajectories from a spread of
/// initial conditions, for the phase-portrait figure.
pub fn housing_phase_portrait() -> Result<()> {
    let market = HousingMarket::legislated(2.5, 0.5);
    let grid = sample_field(
        &market,
        AxisSpec::new(0.5, 10.0, 20),
        AxisSpec::new(0.0, 6.0, 20),
        0.0,
    )?;
    info!(points = grid.x.len(), "housing vector field sampled");

    let solver = DormandPrince::default();
    for ic in [
        [5.0, 2.5],
        [3.0, 1.0],
        [8.0, 4.0],
        [9.0, 0.5],
        [2.0, 5.0],
    ] {
        let solution = solver.solve(&market, (0.0, 10.0), &ic, None)?;
        let end = solution.trajectory.last_state();
        println!(
            "housing portrait from (P, R) = ({:.1}, {:.1}): ends at ({:.4}, {:.4})",
            ic[0], ic[1], end[0], end[1]
        );
    }
    Ok(())
}

/// The linear homework paths: an Euler-integrated drift path and direction
/// fields for a quadratic system and its two affine approximants near
/// their shared fixed point at (1, 1).
pub fn planar_paths() -> Result<()> {
    let drift = LinearPlanar::homogeneous(2.0, 2.0, 0.0, -1.0);
    let grid = TimeGrid::linspace(0.0, 1.0, 101)?;
    let traj = simulate(&drift, &mut Euler::new(2), &grid, &[0.0, 20.0])?;
    let end = traj.last_state();
    println!("drift path: x(1) = {:.4}, y(1) = {:.4}", end[0], end[1]);

    let quadratic = SystemFn::new(2, |_t: f64, x: &[f64], out: &mut [f64]| {
        out[0] = -x[0] * x[0] - x[1] + 2.0;
        out[1] = x[0] - x[1];
    });
    let approx_18 = LinearPlanar::new(-1.8, -1.0, 1.0, -1.0, 2.8, 0.0);
    let approx_1 = LinearPlanar::new(-1.0, -1.0, 1.0, -1.0, 2.0, 0.0);

    let window_x = AxisSpec::new(0.5, 1.5, 20);
    let window_y = AxisSpec::new(0.5, 1.5, 20);
    let field_q = sample_field(&quadratic, window_x, window_y, 0.0)?;
    let field_18 = sample_field(&approx_18, window_x, window_y, 0.0)?;
    let field_1 = sample_field(&approx_1, window_x, window_y, 0.0)?;
    info!(
        quadratic = field_q.x.len(),
        a_18 = field_18.x.len(),
        a_1 = field_1.x.len(),
        "direction fields sampled"
    );

    let settings = NewtonSettings::default();
    let quadratic_report = find_equilibrium(&quadratic, &[1.0, 1.0], settings)?;
    let approx_18_report = find_equilibrium(&approx_18, &[1.0, 1.0], settings)?;
    let approx_1_report = find_equilibrium(&approx_1, &[1.0, 1.0], settings)?;
    for (label, report) in [
        ("quadratic", &quadratic_report),
        ("A_1.8", &approx_18_report),
        ("A_1", &approx_1_report),
    ] {
        println!(
            "{label} fixed point near (1, 1): ({:.4}, {:.4}), {:?}",
            report.state[0],
            report.state[1],
            report.stability.expect("planar system")
        );
    }
    Ok(())
}
