//! The Vilar et al. (2002) activator/repressor circadian oscillator.
//!
//! The stochastic model works in the canonical order
//! `A, R, C, D_A, D_Ap, D_R, D_Rp, M_A, M_R`; the deterministic rate
//! equations keep their own order `DA, DR, DAp, DRp, MA, MR, A, R, C`.
//! Cross-model lookups always go through [`Species`].

use crate::error::{require_positive, Result};
use crate::network::{PropensityLaw, ReactionNetwork, StateChangeMatrix};

pub const N_SPECIES: usize = 9;
pub const N_REACTIONS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    A,
    R,
    C,
    DA,
    DAp,
    DR,
    DRp,
    MA,
    MR,
}

impl Species {
    // Canonical (stochastic) order.
    pub const ALL: [Species; N_SPECIES] = [
        Species::A,
        Species::R,
        Species::C,
        Species::DA,
        Species::DAp,
        Species::DR,
        Species::DRp,
        Species::MA,
        Species::MR,
    ];

    pub const DETERMINISTIC: [Species; N_SPECIES] = [
        Species::DA,
        Species::DR,
        Species::DAp,
        Species::DRp,
        Species::MA,
        Species::MR,
        Species::A,
        Species::R,
        Species::C,
    ];

    pub fn stochastic_index(self) -> usize {
        self as usize
    }

    pub fn deterministic_index(self) -> usize {
        match self {
            Species::DA => 0,
            Species::DR => 1,
            Species::DAp => 2,
            Species::DRp => 3,
            Species::MA => 4,
            Species::MR => 5,
            Species::A => 6,
            Species::R => 7,
            Species::C => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::A => "A",
            Species::R => "R",
            Species::C => "C",
            Species::DA => "D_A",
            Species::DAp => "D_A'",
            Species::DR => "D_R",
            Species::DRp => "D_R'",
            Species::MA => "M_A",
            Species::MR => "M_R",
        }
    }

    pub fn index_in(self, ordering: StateOrdering) -> usize {
        match ordering {
            StateOrdering::Stochastic => self.stochastic_index(),
            StateOrdering::Deterministic => self.deterministic_index(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateOrdering {
    Stochastic,
    Deterministic,
}

pub fn to_deterministic_order(stochastic: &[f64]) -> [f64; N_SPECIES] {
    let mut out = [0.0; N_SPECIES];
    for species in Species::ALL {
        out[species.deterministic_index()] = stochastic[species.stochastic_index()];
    }
    out
}

pub fn to_stochastic_order(deterministic: &[f64]) -> [f64; N_SPECIES] {
    let mut out = [0.0; N_SPECIES];
    for species in Species::ALL {
        out[species.stochastic_index()] = deterministic[species.deterministic_index()];
    }
    out
}

/// Rate constants in hours^-1 (Fig. 1 caption of the paper).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateConstants {
    pub alpha_a: f64,
    pub alpha_ap: f64,
    pub alpha_r: f64,
    pub alpha_rp: f64,
    pub beta_a: f64,
    pub beta_r: f64,
    pub gamma_a: f64,
    pub gamma_r: f64,
    pub gamma_c: f64,
    pub delta_a: f64,
    pub delta_r: f64,
    pub delta_ma: f64,
    pub delta_mr: f64,
    pub theta_a: f64,
    pub theta_r: f64,
}

impl RateConstants {
    pub fn vilar() -> Self {
        Self {
            alpha_a: 50.0,
            alpha_ap: 500.0,
            alpha_r: 0.01,
            alpha_rp: 50.0,
            beta_a: 50.0,
            beta_r: 5.0,
            gamma_a: 1.0,
            gamma_r: 1.0,
            gamma_c: 2.0,
            delta_a: 1.0,
            delta_r: 0.2,
            delta_ma: 10.0,
            delta_mr: 0.5,
            theta_a: 50.0,
            theta_r: 100.0,
        }
    }

    /// Repressor degradation lowered to 0.05: the rate equations settle on a
    /// fixed point while the stochastic model keeps oscillating.
    pub fn reduced_repressor_degradation() -> Self {
        Self {
            delta_r: 0.05,
            ..Self::vilar()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.named() {
            require_positive(name, value)?;
        }
        Ok(())
    }

    fn named(&self) -> [(&'static str, f64); 15] {
        [
            ("alpha_a", self.alpha_a),
            ("alpha_ap", self.alpha_ap),
            ("alpha_r", self.alpha_r),
            ("alpha_rp", self.alpha_rp),
            ("beta_a", self.beta_a),
            ("beta_r", self.beta_r),
            ("gamma_a", self.gamma_a),
            ("gamma_r", self.gamma_r),
            ("gamma_c", self.gamma_c),
            ("delta_a", self.delta_a),
            ("delta_r", self.delta_r),
            ("delta_ma", self.delta_ma),
            ("delta_mr", self.delta_mr),
            ("theta_a", self.theta_a),
            ("theta_r", self.theta_r),
        ]
    }
}

impl Default for RateConstants {
    fn default() -> Self {
        Self::vilar()
    }
}

/// Rows follow the reaction catalog below; columns the canonical order.
#[rustfmt::skip]
pub const STATE_CHANGE: [[i32; N_SPECIES]; N_REACTIONS] = [
    // A   R   C  DA DAp  DR DRp  MA  MR
    [-1, -1,  1,  0,  0,  0,  0,  0,  0], // A + R -> C
    [-1,  0,  0,  0,  0,  0,  0,  0,  0], // A -> 0
    [ 0,  1, -1,  0,  0,  0,  0,  0,  0], // C -> R
    [ 0, -1,  0,  0,  0,  0,  0,  0,  0], // R -> 0
    [-1,  0,  0, -1,  1,  0,  0,  0,  0], // D_A + A -> D_A'
    [-1,  0,  0,  0,  0, -1,  1,  0,  0], // D_R + A -> D_R'
    [ 1,  0,  0,  1, -1,  0,  0,  0,  0], // D_A' -> D_A + A
    [ 0,  0,  0,  0,  0,  0,  0,  1,  0], // D_A -> D_A + M_A
    [ 0,  0,  0,  0,  0,  0,  0,  1,  0], // D_A' -> D_A' + M_A
    [ 0,  0,  0,  0,  0,  0,  0, -1,  0], // M_A -> 0
    [ 1,  0,  0,  0,  0,  0,  0,  0,  0], // M_A -> M_A + A
    [ 1,  0,  0,  0,  0,  1, -1,  0,  0], // D_R' -> D_R + A
    [ 0,  0,  0,  0,  0,  0,  0,  0,  1], // D_R -> D_R + M_R
    [ 0,  0,  0,  0,  0,  0,  0,  0,  1], // D_R' -> D_R' + M_R
    [ 0,  0,  0,  0,  0,  0,  0,  0, -1], // M_R -> 0
    [ 0,  1,  0,  0,  0,  0,  0,  0,  0], // M_R -> M_R + R
];

#[derive(Clone, Copy, Debug)]
pub struct VilarClock {
    rates: RateConstants,
}

impl VilarClock {
    pub fn new(rates: RateConstants) -> Result<Self> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &RateConstants {
        &self.rates
    }

    // Deterministic order.
    pub fn derivatives(&self, y: &[f64], dy: &mut [f64]) {
        let k = &self.rates;
        let (da, dr, dap, drp, ma, mr, a, r, c) =
            (y[0], y[1], y[2], y[3], y[4], y[5], y[6], y[7], y[8]);

        dy[0] = k.theta_a * dap - k.gamma_a * da * a;
        dy[1] = k.theta_r * drp - k.gamma_r * dr * a;
        dy[2] = k.gamma_a * da * a - k.theta_a * dap;
        dy[3] = k.gamma_r * dr * a - k.theta_r * drp;
        dy[4] = k.alpha_ap * dap + k.alpha_a * da - k.delta_ma * ma;
        dy[5] = k.alpha_rp * drp + k.alpha_r * dr - k.delta_mr * mr;
        dy[6] = k.beta_a * ma + k.theta_a * dap + k.theta_r * drp
            - a * (k.gamma_a * da + k.gamma_r * dr + k.gamma_c * r + k.delta_a);
        dy[7] = k.beta_r * mr - k.gamma_c * a * r + k.delta_a * c - k.delta_r * r;
        dy[8] = k.gamma_c * a * r - k.delta_a * c;
    }
}

impl PropensityLaw for VilarClock {
    fn n_species(&self) -> usize {
        N_SPECIES
    }

    fn n_reactions(&self) -> usize {
        N_REACTIONS
    }

    fn evaluate(&self, state: &[f64], w: &mut [f64]) {
        let k = &self.rates;
        let (a, r, c, d_a, d_ap, d_r, d_rp, m_a, m_r) = (
            state[0], state[1], state[2], state[3], state[4], state[5], state[6], state[7],
            state[8],
        );

        w[0] = k.gamma_c * a * r;
        w[1] = k.delta_a * a;
        w[2] = k.delta_a * c;
        w[3] = k.delta_r * r;
        w[4] = k.gamma_a * d_a * a;
        w[5] = k.gamma_r * d_r * a;
        // theta_a, not theta_r: D_A' releases at the activator's unbinding rate.
        w[6] = k.theta_a * d_ap;
        w[7] = k.alpha_a * d_a;
        w[8] = k.alpha_ap * d_ap;
        w[9] = k.delta_ma * m_a;
        w[10] = k.beta_a * m_a;
        w[11] = k.theta_r * d_rp;
        w[12] = k.alpha_r * d_r;
        w[13] = k.alpha_rp * d_rp;
        w[14] = k.delta_mr * m_r;
        w[15] = k.beta_r * m_r;
    }
}

pub fn circadian_network(rates: RateConstants) -> Result<ReactionNetwork<VilarClock>> {
    ReactionNetwork::new(
        StateChangeMatrix::from_rows(&STATE_CHANGE)?,
        VilarClock::new(rates)?,
    )
}

#[derive(Clone, Debug)]
pub struct Scenario {
    pub name: &'static str,
    pub rates: RateConstants,
    pub initial: [f64; N_SPECIES],
    // hours
    pub final_time: f64,
    pub grid_points: usize,
}

impl Scenario {
    pub const INITIAL: [f64; N_SPECIES] = [0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0];

    pub fn baseline() -> Self {
        Self {
            name: "baseline",
            rates: RateConstants::vilar(),
            initial: Self::INITIAL,
            final_time: 400.0,
            grid_points: 1000,
        }
    }

    pub fn reduced_repressor_degradation() -> Self {
        Self {
            name: "reduced-repressor-degradation",
            rates: RateConstants::reduced_repressor_degradation(),
            ..Self::baseline()
        }
    }

    pub fn network(&self) -> Result<ReactionNetwork<VilarClock>> {
        circadian_network(self.rates)
    }

    pub fn deterministic_initial(&self) -> [f64; N_SPECIES] {
        to_deterministic_order(&self.initial)
    }
}
