//! Exact stochastic simulation of the Vilar circadian clock.
//!
//! A [`ReactionNetwork`] pairs a fixed state-change matrix with a
//! [`PropensityLaw`]; [`SsaEngine`] advances it event by event with the
//! Gillespie direct method and records a [`Trajectory`]. Deterministic
//! reference solutions come from any [`OdeIntegrator`].

pub mod baseline;
pub mod clock;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod network;
pub mod random;
pub mod trajectory;

pub use baseline::{deterministic_baseline, uniform_grid, Comparison, DormandPrince, OdeIntegrator};
pub use clock::{circadian_network, RateConstants, Scenario, Species, StateOrdering, VilarClock};
pub use engine::{Simulation, SsaConfig, SsaEngine, SsaOutcome, Step, Termination};
pub use ensemble::run_ensemble;
pub use error::{Result, SimError};
pub use network::{PropensityLaw, ReactionNetwork, StateChangeMatrix};
pub use random::{derive_seed, RandomVariateSource};
pub use trajectory::Trajectory;
