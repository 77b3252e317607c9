//! Gillespie direct method.

use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::error::{Result, SimError};
use crate::network::{check_state, PropensityLaw, ReactionNetwork};
use crate::random::RandomVariateSource;
use crate::trajectory::Trajectory;

const DEFAULT_MAX_EVENTS: u64 = 100_000_000;
// Deadline is polled once per this many events.
const DEADLINE_POLL_INTERVAL: u64 = 1024;

#[derive(Clone, Debug)]
pub struct SsaConfig {
    pub final_time: f64,
    /// Event ceiling; `None` lets the run go until the horizon or absorption.
    pub max_events: Option<u64>,
    pub deadline: Option<Duration>,
    pub record_reactions: bool,
}

impl SsaConfig {
    pub fn new(final_time: f64) -> Self {
        Self {
            final_time,
            max_events: Some(DEFAULT_MAX_EVENTS),
            deadline: None,
            record_reactions: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.final_time.is_finite() || self.final_time <= 0.0 {
            return Err(SimError::InvalidArgument(format!(
                "final time must be finite and positive, got {}",
                self.final_time
            )));
        }
        Ok(())
    }
}

impl Default for SsaConfig {
    fn default() -> Self {
        Self::new(400.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    HorizonReached,
    // Total propensity is zero.
    Absorbed,
    EventLimit,
    Deadline,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    Fired { reaction: usize, time: f64 },
    Terminated(Termination),
}

#[derive(Clone, Debug)]
pub struct SsaOutcome {
    pub trajectory: Trajectory,
    pub termination: Termination,
    // Reaction fired between point `i` and `i + 1`.
    pub fired: Option<Vec<usize>>,
}

/// A single run in progress. Once terminated, every further `step` reports
/// the same reason.
pub struct Simulation<'a, L> {
    network: &'a ReactionNetwork<L>,
    config: &'a SsaConfig,
    time: f64,
    state: Vec<f64>,
    next_state: Vec<f64>,
    propensities: Vec<f64>,
    trajectory: Trajectory,
    fired: Option<Vec<usize>>,
    events: u64,
    started: Instant,
    status: Option<Termination>,
}

impl<'a, L: PropensityLaw> Simulation<'a, L> {
    pub fn new(
        network: &'a ReactionNetwork<L>,
        config: &'a SsaConfig,
        initial: &[f64],
    ) -> Result<Self> {
        config.validate()?;
        if initial.len() != network.n_species() {
            return Err(SimError::Shape(format!(
                "initial state length {} does not match number of species {}",
                initial.len(),
                network.n_species()
            )));
        }
        if !initial.iter().all(|&x| x.is_finite() && x >= 0.0) {
            return Err(SimError::InvalidArgument(format!(
                "initial state must hold finite non-negative counts, got {:?}",
                initial
            )));
        }
        Ok(Self {
            network,
            config,
            time: 0.0,
            state: initial.to_vec(),
            next_state: initial.to_vec(),
            propensities: vec![0.0; network.n_reactions()],
            trajectory: Trajectory::new(0.0, initial),
            fired: config.record_reactions.then(Vec::new),
            events: 0,
            started: Instant::now(),
            status: None,
        })
    }

    pub fn is_running(&self) -> bool {
        self.status.is_none()
    }

    pub fn termination(&self) -> Option<Termination> {
        self.status
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn state(&self) -> &[f64] {
        &self.state
    }

    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    // No-op once terminated.
    pub fn stop(&mut self) -> Termination {
        self.terminate(Termination::Stopped)
    }

    pub fn step(&mut self, rng: &mut RandomVariateSource) -> Result<Step> {
        if let Some(reason) = self.status {
            return Ok(Step::Terminated(reason));
        }
        if self.config.max_events.is_some_and(|limit| self.events >= limit) {
            return Ok(Step::Terminated(self.terminate(Termination::EventLimit)));
        }
        if let Some(deadline) = self.config.deadline {
            if self.events % DEADLINE_POLL_INTERVAL == 0 && self.started.elapsed() >= deadline {
                return Ok(Step::Terminated(self.terminate(Termination::Deadline)));
            }
        }

        let total = self
            .network
            .recompute_propensities(&self.state, &mut self.propensities);
        if let Some((reaction, &value)) = self
            .propensities
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
        {
            return Err(SimError::InvalidRate {
                name: format!("propensity of reaction {reaction} at state {:?}", self.state),
                value,
            });
        }
        if total <= 0.0 {
            return Ok(Step::Terminated(self.terminate(Termination::Absorbed)));
        }

        // A zero waiting time would repeat the current timestamp.
        let mut candidate = self.time + rng.exponential(total)?;
        while candidate <= self.time {
            candidate = self.time + rng.exponential(total)?;
        }
        if candidate > self.config.final_time {
            return Ok(Step::Terminated(self.terminate(Termination::HorizonReached)));
        }

        let reaction = rng.categorical(&self.propensities)?;
        // The update is checked on a copy; a failed step leaves the run
        // at its last valid state.
        self.next_state.copy_from_slice(&self.state);
        self.network.apply_in_place(&mut self.next_state, reaction);
        check_state(&self.next_state, reaction, candidate)?;
        std::mem::swap(&mut self.state, &mut self.next_state);

        self.time = candidate;
        self.events += 1;
        self.trajectory.push(self.time, &self.state);
        if let Some(fired) = self.fired.as_mut() {
            fired.push(reaction);
        }
        Ok(Step::Fired {
            reaction,
            time: self.time,
        })
    }

    fn terminate(&mut self, reason: Termination) -> Termination {
        *self.status.get_or_insert(reason)
    }

    pub fn finish(self) -> SsaOutcome {
        let termination = self.status.unwrap_or(Termination::Stopped);
        match termination {
            Termination::HorizonReached | Termination::Absorbed => debug!(
                "ssa run ended ({:?}) after {} events, last event at t = {}",
                termination, self.events, self.time
            ),
            _ => warn!(
                "ssa run cut short ({:?}) after {} events at t = {} of {}",
                termination, self.events, self.time, self.config.final_time
            ),
        }
        SsaOutcome {
            trajectory: self.trajectory,
            termination,
            fired: self.fired,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SsaEngine<L> {
    network: ReactionNetwork<L>,
    config: SsaConfig,
}

impl<L: PropensityLaw> SsaEngine<L> {
    pub fn new(network: ReactionNetwork<L>, config: SsaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { network, config })
    }

    pub fn network(&self) -> &ReactionNetwork<L> {
        &self.network
    }

    pub fn config(&self) -> &SsaConfig {
        &self.config
    }

    pub fn simulation(&self, initial: &[f64]) -> Result<Simulation<'_, L>> {
        Simulation::new(&self.network, &self.config, initial)
    }

    pub fn run(&self, initial: &[f64], rng: &mut RandomVariateSource) -> Result<SsaOutcome> {
        self.run_with_stop(initial, rng, |_, _| false)
    }

    /// `should_stop(time, events)` is consulted before every step.
    pub fn run_with_stop<F>(
        &self,
        initial: &[f64],
        rng: &mut RandomVariateSource,
        mut should_stop: F,
    ) -> Result<SsaOutcome>
    where
        F: FnMut(f64, u64) -> bool,
    {
        let mut sim = self.simulation(initial)?;
        loop {
            if should_stop(sim.time(), sim.events()) {
                sim.stop();
                break;
            }
            if let Step::Terminated(_) = sim.step(rng)? {
                break;
            }
        }
        Ok(sim.finish())
    }
}
