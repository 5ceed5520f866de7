//! A5/1-style majority clocking over three LFSRs.

use fsr_core::{bits_from_bytes, Bit, Lfsr, LfsrConfig, Result, ShiftRegister};
use log::debug;

const TAPS: [&[usize]; 3] = [&[19, 18, 17, 14], &[23, 22, 21, 8], &[22, 21]];
const CLOCK_BITS: [usize; 3] = [8, 10, 10];
const WARMUP_CYCLES: u64 = 128;

/// Three-register keystream generator with majority-vote clock control.
#[derive(Clone, Debug)]
pub struct A51 {
    registers: [Lfsr; 3],
}

impl A51 {
    /// Keys the registers with the 64 key bits split 19/23/22, most significant first.
    pub fn new(key: &[u8; 8]) -> Result<Self> {
        let bits = bits_from_bytes(key);
        let mut offset = 0;
        let mut build = |taps: &[usize]| {
            let len = taps[0];
            let seed = bits[offset..offset + len].to_vec();
            offset += len;
            LfsrConfig::new(taps, seed)
                .warmup_cycles(WARMUP_CYCLES)
                .build()
        };
        let registers = [build(TAPS[0])?, build(TAPS[1])?, build(TAPS[2])?];
        debug!(
            "a5/1 keyed: {}, {}, {}",
            registers[0], registers[1], registers[2]
        );
        Ok(Self { registers })
    }

    /// Clocks the majority registers and returns one keystream bit.
    ///
    /// Every register whose clocking bit agrees with the majority is shifted,
    /// so at least two registers move per step.
    pub fn step(&mut self) -> Result<Bit> {
        let mut clocks = [0; 3];
        for (clock, (register, &index)) in clocks
            .iter_mut()
            .zip(self.registers.iter().zip(CLOCK_BITS.iter()))
        {
            *clock = register.bit(index)?;
        }
        let majority = u8::from(clocks.iter().filter(|&&b| b == 1).count() >= 2);

        let mut out = 0;
        for (register, clock) in self.registers.iter_mut().zip(clocks) {
            if clock == majority {
                register.shift()?;
            }
            out ^= register.bit(register.len() - 1)?;
        }
        Ok(out)
    }

    /// Produces `n` keystream bits.
    pub fn keystream(&mut self, n: usize) -> Result<Vec<Bit>> {
        (0..n).map(|_| self.step()).collect()
    }

    /// The three registers, in keying order.
    pub fn registers(&self) -> &[Lfsr; 3] {
        &self.registers
    }
}
