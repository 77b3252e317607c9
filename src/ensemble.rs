use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::engine::{SsaEngine, SsaOutcome};
use crate::error::{Result, SimError};
use crate::network::PropensityLaw;
use crate::random::{derive_seed, RandomVariateSource};

/// Trajectory `i` is seeded with `derive_seed(seed, i)`, so results do not
/// depend on the thread count.
pub fn run_ensemble<L>(
    engine: &SsaEngine<L>,
    initial: &[f64],
    n_trajectories: usize,
    n_threads: Option<usize>,
    seed: Option<u64>,
) -> Result<Vec<SsaOutcome>>
where
    L: PropensityLaw + Sync,
{
    if n_trajectories == 0 {
        return Err(SimError::InvalidArgument(
            "number of trajectories must be greater than zero".into(),
        ));
    }
    info!(
        "running {} trajectories to t = {}",
        n_trajectories,
        engine.config().final_time
    );

    let simulate = || -> Result<Vec<SsaOutcome>> {
        (0..n_trajectories)
            .into_par_iter()
            .map(|traj_idx| {
                let mut rng = RandomVariateSource::from_seed(derive_seed(seed, traj_idx as u64));
                engine.run(initial, &mut rng)
            })
            .collect()
    };

    let outcomes = match n_threads {
        Some(n) => ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?
            .install(simulate)?,
        None => simulate()?,
    };

    let events: usize = outcomes.iter().map(|o| o.trajectory.n_events()).sum();
    info!("ensemble finished: {} events in total", events);
    Ok(outcomes)
}
