use crate::error::{Result, SimError};

/// Index 0 holds the initial condition; times increase strictly after it.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    n_species: usize,
    times: Vec<f64>,
    states: Vec<f64>,
}

impl Trajectory {
    pub fn new(start_time: f64, initial: &[f64]) -> Self {
        Self {
            n_species: initial.len(),
            times: vec![start_time],
            states: initial.to_vec(),
        }
    }

    pub fn from_points(n_species: usize, times: Vec<f64>, states: Vec<f64>) -> Result<Self> {
        if n_species == 0 || times.is_empty() {
            return Err(SimError::InvalidArgument(
                "trajectory needs at least one point and one species".into(),
            ));
        }
        if states.len() != times.len() * n_species {
            return Err(SimError::Shape(format!(
                "{} state values do not match {} points x {} species",
                states.len(),
                times.len(),
                n_species
            )));
        }
        if times.iter().any(|t| !t.is_finite()) || times.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SimError::InvalidArgument(
                "trajectory times must be finite and strictly increasing".into(),
            ));
        }
        Ok(Self {
            n_species,
            times,
            states,
        })
    }

    pub(crate) fn push(&mut self, time: f64, state: &[f64]) {
        debug_assert_eq!(state.len(), self.n_species);
        debug_assert!(time > self.final_time());
        self.times.push(time);
        self.states.extend_from_slice(state);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn n_species(&self) -> usize {
        self.n_species
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn state(&self, idx: usize) -> &[f64] {
        let start = idx * self.n_species;
        &self.states[start..start + self.n_species]
    }

    pub fn states(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.states.chunks_exact(self.n_species)
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, &[f64])> + '_ {
        self.times.iter().copied().zip(self.states())
    }

    pub fn final_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    pub fn final_state(&self) -> &[f64] {
        self.state(self.times.len() - 1)
    }

    pub fn n_events(&self) -> usize {
        self.times.len() - 1
    }

    pub fn as_series(&self, component: usize) -> Result<(&[f64], Vec<f64>)> {
        self.check_component(component)?;
        let values = self.states().map(|state| state[component]).collect();
        Ok((&self.times, values))
    }

    /// State in force at `time` under a zero-order hold: the last recorded
    /// point at or before `time`. Times before the start map to the initial
    /// point.
    pub fn sample_at(&self, time: f64) -> &[f64] {
        let idx = self.times.partition_point(|&t| t <= time);
        self.state(idx.saturating_sub(1))
    }

    pub fn resample(&self, component: usize, grid: &[f64]) -> Result<Vec<f64>> {
        self.check_component(component)?;
        Ok(grid
            .iter()
            .map(|&t| self.sample_at(t)[component])
            .collect())
    }

    fn check_component(&self, component: usize) -> Result<()> {
        if component >= self.n_species {
            return Err(SimError::Shape(format!(
                "component {} out of range for {} species",
                component, self.n_species
            )));
        }
        Ok(())
    }
}
