//! Deterministic reference trajectories and their comparison with SSA runs.
//!
//! The integrator is a strategy: anything that can integrate
//! `dy/dt = f(t, y)` onto a fixed output grid satisfies [`OdeIntegrator`].
//! [`DormandPrince`] adapts the `ode_solvers` crate.

use ode_solvers::dopri5::Dopri5;
use ode_solvers::{DVector, System};

use crate::clock::{Scenario, Species};
use crate::error::{Result, SimError};
use crate::trajectory::Trajectory;

pub type Rhs<'a> = dyn Fn(f64, &[f64], &mut [f64]) + 'a;

pub trait OdeIntegrator {
    /// Integrates from `span.0` to `span.1` and returns the solution at every
    /// `grid` point, in the same component order as `initial`.
    fn integrate(
        &self,
        rhs: &Rhs<'_>,
        initial: &[f64],
        span: (f64, f64),
        grid: &[f64],
    ) -> Result<Trajectory>;
}

/// `n` evenly spaced points covering `[start, end]`, both ends included.
pub fn uniform_grid(start: f64, end: f64, n: usize) -> Result<Vec<f64>> {
    if n < 2 || !(start.is_finite() && end.is_finite()) || end <= start {
        return Err(SimError::InvalidArgument(format!(
            "grid needs at least 2 points over a non-empty interval, got {n} over [{start}, {end}]"
        )));
    }
    let step = (end - start) / (n - 1) as f64;
    Ok((0..n)
        .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
        .collect())
}

/// Adapter over `ode_solvers`' Dormand–Prince 5(4) stepper.
///
/// Each grid interval is integrated as its own solve, so the grid may be
/// irregular and every output lands exactly on a grid point.
#[derive(Clone, Debug)]
pub struct DormandPrince {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for DormandPrince {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
        }
    }
}

struct RhsSystem<'r, 'a> {
    rhs: &'r Rhs<'a>,
}

impl System<f64, DVector<f64>> for RhsSystem<'_, '_> {
    fn system(&self, x: f64, y: &DVector<f64>, dy: &mut DVector<f64>) {
        (self.rhs)(x, y.as_slice(), dy.as_mut_slice());
    }
}

impl DormandPrince {
    fn advance(&self, rhs: &Rhs<'_>, from: f64, to: f64, y: DVector<f64>) -> Result<DVector<f64>> {
        let mut stepper = Dopri5::new(RhsSystem { rhs }, from, to, to - from, y, self.rtol, self.atol);
        stepper
            .integrate()
            .map_err(|e| SimError::Integration(format!("on [{from}, {to}]: {e}")))?;
        let y_end = stepper
            .y_out()
            .last()
            .cloned()
            .ok_or_else(|| SimError::Integration(format!("no output on [{from}, {to}]")))?;
        if y_end.iter().all(|v| v.is_finite()) {
            Ok(y_end)
        } else {
            Err(SimError::Integration(format!(
                "solution is not finite at t = {to}"
            )))
        }
    }
}

impl OdeIntegrator for DormandPrince {
    fn integrate(
        &self,
        rhs: &Rhs<'_>,
        initial: &[f64],
        span: (f64, f64),
        grid: &[f64],
    ) -> Result<Trajectory> {
        let (start, end) = span;
        if grid.is_empty() || grid[0] < start || grid[grid.len() - 1] > end {
            return Err(SimError::InvalidArgument(
                "output grid must be non-empty and lie inside the time span".into(),
            ));
        }
        if grid.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SimError::InvalidArgument(
                "output grid must be strictly increasing".into(),
            ));
        }
        if !(self.rtol > 0.0 && self.atol > 0.0) {
            return Err(SimError::InvalidArgument(
                "integrator tolerances must be positive".into(),
            ));
        }

        let n = initial.len();
        let mut t = start;
        let mut y = DVector::from_column_slice(initial);
        let mut states = Vec::with_capacity(grid.len() * n);
        for &target in grid {
            if target > t {
                y = self.advance(rhs, t, target, y)?;
                t = target;
            }
            states.extend_from_slice(y.as_slice());
        }

        Trajectory::from_points(n, grid.to_vec(), states)
    }
}

/// The scenario's rate equations on its uniform grid, in deterministic order.
pub fn deterministic_baseline(
    scenario: &Scenario,
    integrator: &dyn OdeIntegrator,
) -> Result<Trajectory> {
    let network = scenario.network()?;
    let clock = *network.law();
    let grid = uniform_grid(0.0, scenario.final_time, scenario.grid_points)?;
    let rhs = move |_t: f64, y: &[f64], dy: &mut [f64]| clock.derivatives(y, dy);
    integrator.integrate(
        &rhs,
        &scenario.deterministic_initial(),
        (0.0, scenario.final_time),
        &grid,
    )
}

/// One species of a stochastic run held on the deterministic grid.
#[derive(Clone, Debug)]
pub struct Comparison {
    pub species: Species,
    pub grid: Vec<f64>,
    pub stochastic: Vec<f64>,
    pub deterministic: Vec<f64>,
}

impl Comparison {
    /// `stochastic` is in canonical order, `baseline` in deterministic order.
    pub fn between(stochastic: &Trajectory, species: Species, baseline: &Trajectory) -> Result<Self> {
        let grid = baseline.times().to_vec();
        let (_, deterministic) = baseline.as_series(species.deterministic_index())?;
        let stochastic = stochastic.resample(species.stochastic_index(), &grid)?;
        Ok(Self {
            species,
            grid,
            stochastic,
            deterministic,
        })
    }

    pub fn mean_abs_difference(&self) -> f64 {
        let total: f64 = self
            .stochastic
            .iter()
            .zip(&self.deterministic)
            .map(|(s, d)| (s - d).abs())
            .sum();
        total / self.grid.len() as f64
    }

    /// `|s - d| / |d|` at the last grid point.
    pub fn final_relative_difference(&self) -> f64 {
        let s = self.stochastic[self.stochastic.len() - 1];
        let d = self.deterministic[self.deterministic.len() - 1];
        if d == 0.0 {
            if s == 0.0 {
                0.0
            } else {
                f64::INFINITY
            }
        } else {
            (s - d).abs() / d.abs()
        }
    }
}
