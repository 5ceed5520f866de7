//! Behaviour shared by linear and nonlinear registers.

use core::fmt;

use log::{debug, trace};

use crate::bits::{bits_to_string, read_bit, Bit};
use crate::error::Result;

/// A clocked bit register producing one output bit per cycle.
pub trait ShiftRegister {
    /// Performs one cycle and returns the output bit computed from the pre-shift state.
    fn shift(&mut self) -> Result<Bit>;

    /// Current state.
    fn state(&self) -> &[Bit];

    /// State recorded after seeding and warm-up; the target of `reset` and `period`.
    fn initial_state(&self) -> &[Bit];

    /// Cycles performed since construction (warm-up excluded).
    fn cycles(&self) -> u64;

    /// Output bit of the most recent cycle, `None` before the first one.
    fn output_bit(&self) -> Option<Bit>;

    /// Feedback bit of the most recent cycle, `None` before the first one.
    fn feedback_bit(&self) -> Option<Bit>;

    /// Overwrites a single state bit, bypassing the feedback function.
    fn set_bit(&mut self, index: usize, value: Bit) -> Result<()>;

    /// Register length in bits.
    fn len(&self) -> usize {
        self.state().len()
    }

    /// True if the register holds no bits.
    fn is_empty(&self) -> bool {
        self.state().is_empty()
    }

    /// Reads a single state bit.
    fn bit(&self, index: usize) -> Result<Bit> {
        read_bit(self.state(), index)
    }

    /// Clocks the register `n` times and collects the output bits in order.
    fn sequence(&mut self, n: usize) -> Result<Vec<Bit>> {
        self.sequence_with_progress(n, &mut |_, _| {})
    }

    /// Like [`ShiftRegister::sequence`], calling `progress(done, total)` after every cycle.
    fn sequence_with_progress(
        &mut self,
        n: usize,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<Vec<Bit>> {
        let mut out = Vec::with_capacity(n);
        for done in 1..=n {
            out.push(self.shift()?);
            progress(done, n);
        }
        Ok(out)
    }

    /// Clocks until the state returns to the recorded initial state.
    ///
    /// Returns the number of cycles taken, or `None` when `limit` cycles pass
    /// without a return. Nonlinear registers may never return.
    fn period(&mut self, limit: u64) -> Result<Option<u64>> {
        for cycle in 1..=limit {
            self.shift()?;
            if self.state() == self.initial_state() {
                debug!("state returned to initial state after {cycle} cycles");
                return Ok(Some(cycle));
            }
        }
        Ok(None)
    }
}

/// Per-cycle bookkeeping common to both register kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Bookkeeping {
    pub(crate) cycles: u64,
    pub(crate) output_bit: Option<Bit>,
    pub(crate) feedback_bit: Option<Bit>,
}

impl Bookkeeping {
    pub(crate) fn record(&mut self, output: Bit, feedback: Bit) {
        self.cycles += 1;
        self.output_bit = Some(output);
        self.feedback_bit = Some(feedback);
        trace!(
            "cycle {}: out={} feedback={}",
            self.cycles,
            output,
            feedback
        );
    }
}

/// Shifts `register` `cycles` times, discarding the output.
pub(crate) fn warm_up<R: ShiftRegister + ?Sized>(register: &mut R, cycles: u64) -> Result<()> {
    debug!("running {cycles} warm-up cycles");
    for _ in 0..cycles {
        register.shift()?;
    }
    Ok(())
}

/// Human-readable snapshot of a register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterInfo {
    pub(crate) title: String,
    pub(crate) details: Vec<(&'static str, String)>,
    pub(crate) state: Vec<Bit>,
    pub(crate) cycles: u64,
    pub(crate) output_bit: Option<Bit>,
    pub(crate) feedback_bit: Option<Bit>,
}

impl fmt::Display for RegisterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------{}------", self.title)?;
        for (label, value) in &self.details {
            writeln!(f, "{label}: {value}")?;
        }
        writeln!(f, "Current:")?;
        writeln!(f, "     State: {}", bits_to_string(&self.state))?;
        writeln!(f, "     Cycles: {}", self.cycles)?;
        writeln!(f, "     Output bit: {}", optional_bit(self.output_bit))?;
        writeln!(f, "     Feedback bit: {}", optional_bit(self.feedback_bit))?;
        write!(f, "----------------------------")
    }
}

fn optional_bit(bit: Option<Bit>) -> String {
    bit.map_or_else(|| "-".to_string(), |b| b.to_string())
}
