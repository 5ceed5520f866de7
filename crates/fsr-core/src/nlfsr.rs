//! Nonlinear feedback shift register driven by an arbitrary boolean function.

use core::fmt;

use log::{debug, warn};

use crate::bits::{rotate_right, write_bit, Bit};
use crate::error::{FsrError, Result};
use crate::expr::Expression;
use crate::register::{warm_up, Bookkeeping, RegisterInfo, ShiftRegister};
use crate::seed::InitialState;

/// Construction options for [`Nlfsr`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NlfsrConfig {
    /// Seed for the state.
    pub initial_state: InitialState,
    /// Register length; required unless the seed is explicit bits.
    pub size: Option<usize>,
    /// Feedback function (required).
    pub feedback: Option<Expression>,
    /// Output function; defaults to the tail bit.
    pub output: Option<Expression>,
    /// Cycles to run and discard right after seeding.
    pub warmup_cycles: u64,
}

impl NlfsrConfig {
    /// Configuration with no feedback function yet.
    pub fn new(initial_state: impl Into<InitialState>) -> Self {
        Self {
            initial_state: initial_state.into(),
            size: None,
            feedback: None,
            output: None,
            warmup_cycles: 0,
        }
    }

    /// Sets the register length for `AllOnes`/`Random` seeds.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the feedback function.
    pub fn feedback(mut self, feedback: Expression) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Sets a custom output function.
    pub fn output(mut self, output: Expression) -> Self {
        self.output = Some(output);
        self
    }

    /// Sets the number of warm-up cycles.
    pub fn warmup_cycles(mut self, cycles: u64) -> Self {
        self.warmup_cycles = cycles;
        self
    }

    /// Builds the register.
    pub fn build(self) -> Result<Nlfsr> {
        Nlfsr::new(self)
    }
}

/// Nonlinear feedback shift register.
///
/// Each cycle computes the output and feedback from the current state,
/// rotates towards the tail and writes the feedback into the head.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nlfsr {
    feedback: Expression,
    output: Expression,
    state: Vec<Bit>,
    initial_state: Vec<Bit>,
    clock: Bookkeeping,
}

impl Nlfsr {
    /// Validates the configuration, seeds the state and applies warm-up.
    pub fn new(config: NlfsrConfig) -> Result<Self> {
        let len = resolve_len(&config.initial_state, config.size)?;
        let state = config.initial_state.resolve(len)?;
        let feedback = config.feedback.ok_or(FsrError::MissingFeedbackFunction)?;
        let output = config
            .output
            .unwrap_or_else(|| Expression::single(len - 1));

        let mut nlfsr = Self {
            feedback,
            output,
            initial_state: state.clone(),
            state,
            clock: Bookkeeping::default(),
        };

        if config.warmup_cycles > 0 {
            warm_up(&mut nlfsr, config.warmup_cycles)?;
            nlfsr.clock = Bookkeeping::default();
            nlfsr.initial_state = nlfsr.state.clone();
        }

        debug!("built {nlfsr}");
        Ok(nlfsr)
    }

    /// Fresh register with the same functions, seeded with the recorded initial state.
    pub fn reset(&self) -> Self {
        debug!("resetting {self}");
        Self {
            feedback: self.feedback.clone(),
            output: self.output.clone(),
            state: self.initial_state.clone(),
            initial_state: self.initial_state.clone(),
            clock: Bookkeeping::default(),
        }
    }

    /// Feedback function.
    pub fn feedback(&self) -> &Expression {
        &self.feedback
    }

    /// Output function.
    pub fn output(&self) -> &Expression {
        &self.output
    }

    /// Multi-line description of configuration and current bookkeeping.
    pub fn info(&self) -> RegisterInfo {
        RegisterInfo {
            title: format!("{} bit NLFSR", self.state.len()),
            details: vec![
                ("Feedback function", self.feedback.to_string()),
                ("Output function", self.output.to_string()),
            ],
            state: self.state.clone(),
            cycles: self.clock.cycles,
            output_bit: self.clock.output_bit,
            feedback_bit: self.clock.feedback_bit,
        }
    }
}

impl ShiftRegister for Nlfsr {
    fn shift(&mut self) -> Result<Bit> {
        let output = self.output.evaluate(&self.state)?;
        let feedback = self.feedback.evaluate(&self.state)?;
        rotate_right(&mut self.state);
        self.state[0] = feedback;
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

impl fmt::Display for Nlfsr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nlfsr_{}_in({})_out({})",
            self.state.len(),
            self.feedback,
            self.output
        )
    }
}

fn resolve_len(initial_state: &InitialState, size: Option<usize>) -> Result<usize> {
    match (initial_state.explicit_len(), size) {
        (Some(0), _) => Err(FsrError::InvalidSeedSpecification(
            "initial state is empty".to_string(),
        )),
        (Some(len), Some(size)) if size != len => {
            warn!("size {size} ignored, register length {len} is taken from the initial state");
            Ok(len)
        }
        (Some(len), _) => Ok(len),
        (None, Some(size)) if size > 0 => Ok(size),
        (None, _) => Err(FsrError::InvalidSeedSpecification(
            "a positive size is required unless the initial state is explicit".to_string(),
        )),
    }
}
