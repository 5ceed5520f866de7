//! Linear feedback shift register with Fibonacci or Galois feedback.

use core::fmt;
use core::str::FromStr;

use log::debug;

use crate::bits::{rotate_right, write_bit, Bit};
use crate::error::{FsrError, Result};
use crate::expr::Expression;
use crate::register::{warm_up, Bookkeeping, RegisterInfo, ShiftRegister};
use crate::seed::InitialState;

/// Where the feedback is inserted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Fibonacci style: XOR of all tapped bits enters at the head.
    #[default]
    External,
    /// Galois style: the outgoing tail bit is XORed into every secondary tap.
    Internal,
}

impl FromStr for Topology {
    type Err = FsrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "external" | "ext" | "fibonacci" => Ok(Topology::External),
            "internal" | "int" | "galois" => Ok(Topology::Internal),
            other => Err(FsrError::InvalidSeedSpecification(format!(
                "unknown feedback topology {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::External => f.write_str("ext"),
            Topology::Internal => f.write_str("int"),
        }
    }
}

/// Construction options for [`Lfsr`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LfsrConfig {
    /// 1-based tap positions; the largest is the register length.
    pub taps: Vec<usize>,
    /// Seed for the state.
    pub initial_state: InitialState,
    /// Cycles to run and discard right after seeding.
    pub warmup_cycles: u64,
    /// Feedback insertion style.
    pub topology: Topology,
    /// Output function; defaults to the tail bit.
    pub output: Option<Expression>,
}

impl LfsrConfig {
    /// Configuration with external feedback, no warm-up and the default output.
    pub fn new(taps: &[usize], initial_state: impl Into<InitialState>) -> Self {
        Self {
            taps: taps.to_vec(),
            initial_state: initial_state.into(),
            warmup_cycles: 0,
            topology: Topology::External,
            output: None,
        }
    }

    /// Sets the number of warm-up cycles.
    pub fn warmup_cycles(mut self, cycles: u64) -> Self {
        self.warmup_cycles = cycles;
        self
    }

    /// Sets the feedback topology.
    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Sets a custom output function.
    pub fn output(mut self, output: Expression) -> Self {
        self.output = Some(output);
        self
    }

    /// Builds the register.
    pub fn build(self) -> Result<Lfsr> {
        Lfsr::new(self)
    }
}

/// Linear feedback shift register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lfsr {
    taps: Vec<usize>,
    topology: Topology,
    output: Expression,
    state: Vec<Bit>,
    initial_state: Vec<Bit>,
    clock: Bookkeeping,
}

impl Lfsr {
    /// Validates the configuration, seeds the state and applies warm-up.
    pub fn new(config: LfsrConfig) -> Result<Self> {
        let taps = canonical_taps(&config.taps)?;
        let degree = taps[0];
        let state = config.initial_state.resolve(degree)?;
        if state.len() != degree {
            return Err(FsrError::InvalidPolynomial(format!(
                "degree {degree} does not match initial state length {}",
                state.len()
            )));
        }
        let output = config
            .output
            .unwrap_or_else(|| Expression::single(degree - 1));

        let mut lfsr = Self {
            taps,
            topology: config.topology,
            output,
            initial_state: state.clone(),
            state,
            clock: Bookkeeping::default(),
        };

        if config.warmup_cycles > 0 {
            warm_up(&mut lfsr, config.warmup_cycles)?;
            lfsr.clock = Bookkeeping::default();
            lfsr.initial_state = lfsr.state.clone();
        }

        debug!("built {lfsr}");
        Ok(lfsr)
    }

    /// Fresh register with the same taps, topology and output, seeded with the recorded initial state.
    pub fn reset(&self) -> Self {
        debug!("resetting {self}");
        Self {
            taps: self.taps.clone(),
            topology: self.topology,
            output: self.output.clone(),
            state: self.initial_state.clone(),
            initial_state: self.initial_state.clone(),
            clock: Bookkeeping::default(),
        }
    }

    /// Replaces the tap set, keeping the state and output function.
    ///
    /// The register length is fixed, so the new degree must equal it. On
    /// failure the previous taps stay in place.
    pub fn change_polynomial(&mut self, taps: &[usize]) -> Result<()> {
        let found = taps
            .iter()
            .copied()
            .max()
            .ok_or_else(|| FsrError::InvalidPolynomial("empty tap set".to_string()))?;
        if found != self.state.len() {
            return Err(FsrError::DegreeMismatch {
                expected: self.state.len(),
                found,
            });
        }
        self.taps = canonical_taps(taps)?;
        debug!("feedback polynomial changed to {}", join_taps(&self.taps));
        Ok(())
    }

    /// Tap positions in descending order.
    pub fn taps(&self) -> &[usize] {
        &self.taps
    }

    /// Feedback topology.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Output function.
    pub fn output(&self) -> &Expression {
        &self.output
    }

    /// Period of a maximal-length sequence for this degree, `2^N - 1`.
    ///
    /// Only reached when the tap polynomial is primitive.
    pub fn maximal_period(&self) -> Option<u128> {
        match self.state.len() {
            0 => None,
            len @ 1..=127 => Some((1u128 << len) - 1),
            128 => Some(u128::MAX),
            _ => None,
        }
    }

    /// Multi-line description of configuration and current bookkeeping.
    pub fn info(&self) -> RegisterInfo {
        let topology = match self.topology {
            Topology::External => "External",
            Topology::Internal => "Internal",
        };
        let period = self
            .maximal_period()
            .map_or_else(|| "too large".to_string(), |p| p.to_string());
        RegisterInfo {
            title: format!("{} bit LFSR", self.state.len()),
            details: vec![
                ("Feedback polynomial", join_taps(&self.taps)),
                ("Feedback type", topology.to_string()),
                ("Expected period (if primitive)", period),
                ("Output function", self.output.to_string()),
            ],
            state: self.state.clone(),
            cycles: self.clock.cycles,
            output_bit: self.clock.output_bit,
            feedback_bit: self.clock.feedback_bit,
        }
    }

    fn external_feedback(&mut self) -> Bit {
        let feedback = self
            .taps
            .iter()
            .fold(0, |acc, &tap| acc ^ self.state[tap - 1]);
        rotate_right(&mut self.state);
        self.state[0] = feedback;
        feedback
    }

    fn internal_feedback(&mut self) -> Bit {
        let feedback = self.state[self.state.len() - 1];
        rotate_right(&mut self.state);
        // Secondary taps are all below the degree, so they index the rotated state directly.
        for &tap in &self.taps[1..] {
            self.state[tap] ^= feedback;
        }
        feedback
    }
}

impl ShiftRegister for Lfsr {
    fn shift(&mut self) -> Result<Bit> {
        let output = self.output.evaluate(&self.state)?;
        let feedback = match self.topology {
            Topology::External => self.external_feedback(),
            Topology::Internal => self.internal_feedback(),
        };
        self.clock.record(output, feedback);
        Ok(output)
    }

    fn state(&self) -> &[Bit] {
        &self.state
    }

    fn initial_state(&self) -> &[Bit] {
        &self.initial_state
    }

    fn cycles(&self) -> u64 {
        self.clock.cycles
    }

    fn output_bit(&self) -> Option<Bit> {
        self.clock.output_bit
    }

    fn feedback_bit(&self) -> Option<Bit> {
        self.clock.feedback_bit
    }

    fn set_bit(&mut self, index: usize, value: Bit) -> Result<()> {
        write_bit(&mut self.state, index, value)
    }
}

impl fmt::Display for Lfsr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lfsr_({})_{}", join_taps(&self.taps), self.topology)?;
        if !self.output.is_single() {
            write!(f, "_out({})", self.output)?;
        }
        Ok(())
    }
}

/// Validates a tap set and sorts it in descending order.
fn canonical_taps(taps: &[usize]) -> Result<Vec<usize>> {
    if taps.len() < 2 {
        return Err(FsrError::InvalidPolynomial(format!(
            "need at least two taps, got {}",
            taps.len()
        )));
    }
    if taps.contains(&0) {
        return Err(FsrError::InvalidPolynomial(
            "tap positions start at 1".to_string(),
        ));
    }
    let mut sorted = taps.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(FsrError::InvalidPolynomial(format!(
            "duplicate taps in {}",
            join_taps(&sorted)
        )));
    }
    Ok(sorted)
}

fn join_taps(taps: &[usize]) -> String {
    taps.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("-")
}
