use crate::error::{Result, SimError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeciesDelta {
    pub species: usize,
    pub delta: i32,
}

/// Fixed `m x n` integer matrix; row `i` is the change applied when reaction
/// `i` fires.
#[derive(Clone, Debug)]
pub struct StateChangeMatrix {
    n_species: usize,
    n_reactions: usize,
    entries: Vec<i32>,
    reaction_deltas: Vec<Vec<SpeciesDelta>>,
}

impl StateChangeMatrix {
    pub fn new(n_species: usize, entries: Vec<i32>) -> Result<Self> {
        if n_species == 0 || entries.is_empty() {
            return Err(SimError::InvalidArgument(
                "state-change matrix must contain at least one reaction and one species".into(),
            ));
        }
        if entries.len() % n_species != 0 {
            return Err(SimError::Shape(format!(
                "state-change matrix has {} entries, not a multiple of {} species",
                entries.len(),
                n_species
            )));
        }
        let n_reactions = entries.len() / n_species;
        let reaction_deltas = build_reaction_deltas(n_species, &entries);
        Ok(Self {
            n_species,
            n_reactions,
            entries,
            reaction_deltas,
        })
    }

    pub fn from_rows<const N: usize>(rows: &[[i32; N]]) -> Result<Self> {
        Self::new(N, rows.iter().flatten().copied().collect())
    }

    pub fn n_species(&self) -> usize {
        self.n_species
    }

    pub fn n_reactions(&self) -> usize {
        self.n_reactions
    }

    pub fn row(&self, reaction: usize) -> Result<&[i32]> {
        self.check_reaction(reaction)?;
        let start = reaction * self.n_species;
        Ok(&self.entries[start..start + self.n_species])
    }

    /// Non-zero entries of a row.
    pub fn deltas(&self, reaction: usize) -> Result<&[SpeciesDelta]> {
        self.check_reaction(reaction)?;
        Ok(&self.reaction_deltas[reaction])
    }

    fn check_reaction(&self, reaction: usize) -> Result<()> {
        if reaction >= self.n_reactions {
            return Err(SimError::Shape(format!(
                "reaction {} out of range for {} reactions",
                reaction, self.n_reactions
            )));
        }
        Ok(())
    }
}

fn build_reaction_deltas(n_species: usize, stoich: &[i32]) -> Vec<Vec<SpeciesDelta>> {
    stoich
        .chunks_exact(n_species)
        .map(|row| {
            row.iter()
                .enumerate()
                .filter_map(|(species, &delta)| {
                    (delta != 0).then_some(SpeciesDelta { species, delta })
                })
                .collect()
        })
        .collect()
}

/// Per-reaction firing rates as a function of the current state.
///
/// Implementations must return exactly zero for a reaction whose reactants
/// are exhausted; the engine relies on that to keep counts non-negative.
pub trait PropensityLaw {
    fn n_species(&self) -> usize;

    fn n_reactions(&self) -> usize;

    fn evaluate(&self, state: &[f64], out: &mut [f64]);
}

#[derive(Clone, Debug)]
pub struct ReactionNetwork<L> {
    matrix: StateChangeMatrix,
    law: L,
}

impl<L: PropensityLaw> ReactionNetwork<L> {
    pub fn new(matrix: StateChangeMatrix, law: L) -> Result<Self> {
        if matrix.n_species() != law.n_species() || matrix.n_reactions() != law.n_reactions() {
            return Err(SimError::Shape(format!(
                "state-change matrix is {}x{} but propensity law covers {} reactions over {} species",
                matrix.n_reactions(),
                matrix.n_species(),
                law.n_reactions(),
                law.n_species()
            )));
        }
        Ok(Self { matrix, law })
    }

    pub fn n_species(&self) -> usize {
        self.matrix.n_species()
    }

    pub fn n_reactions(&self) -> usize {
        self.matrix.n_reactions()
    }

    pub fn matrix(&self) -> &StateChangeMatrix {
        &self.matrix
    }

    pub fn law(&self) -> &L {
        &self.law
    }

    pub fn propensities(&self, state: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.n_reactions()];
        self.recompute_propensities(state, &mut out);
        out
    }

    #[inline]
    pub fn recompute_propensities(&self, state: &[f64], propensities: &mut [f64]) -> f64 {
        debug_assert_eq!(state.len(), self.n_species());
        debug_assert_eq!(propensities.len(), self.n_reactions());
        self.law.evaluate(state, propensities);
        propensities.iter().sum()
    }

    /// `state + S[reaction]`, leaving `state` untouched.
    pub fn apply(&self, state: &[f64], reaction: usize) -> Result<Vec<f64>> {
        if state.len() != self.n_species() {
            return Err(SimError::Shape(format!(
                "state length {} does not match number of species {}",
                state.len(),
                self.n_species()
            )));
        }
        let mut next = state.to_vec();
        for delta in self.matrix.deltas(reaction)? {
            next[delta.species] += f64::from(delta.delta);
        }
        Ok(next)
    }

    // `reaction` comes from a draw over this network's propensities.
    #[inline]
    pub(crate) fn apply_in_place(&self, state: &mut [f64], reaction: usize) {
        for delta in &self.matrix.reaction_deltas[reaction] {
            state[delta.species] += f64::from(delta.delta);
        }
    }

    /// Right-hand side of the mass-action rate equations, `S^T w(y)`.
    pub fn drift(&self, state: &[f64], propensities: &mut [f64], dy: &mut [f64]) {
        self.law.evaluate(state, propensities);
        dy.fill(0.0);
        for (rate, deltas) in propensities.iter().zip(&self.matrix.reaction_deltas) {
            for delta in deltas {
                dy[delta.species] += f64::from(delta.delta) * *rate;
            }
        }
    }
}

pub(crate) fn check_state(state: &[f64], reaction: usize, time: f64) -> Result<()> {
    if state.iter().all(|&x| x.is_finite() && x >= 0.0) {
        Ok(())
    } else {
        Err(SimError::NonFiniteState {
            reaction,
            time,
            state: state.to_vec(),
        })
    }
}
