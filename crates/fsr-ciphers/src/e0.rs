//! E0-style summation combiner: four LFSRs mixed through a two-bit carry.

use fsr_core::{bits_from_bytes, Bit, Lfsr, LfsrConfig, Result, ShiftRegister};
use log::debug;

const TAPS: [&[usize]; 4] = [
    &[25, 20, 12, 8],
    &[31, 24, 16, 12],
    &[33, 28, 24, 4],
    &[39, 36, 28, 4],
];

/// Keystream generator combining four LFSR outputs with a carry state machine.
///
/// Each step sums the four output bits with the current carry `c_t`, emits
/// `x1 ⊕ x2 ⊕ x3 ⊕ x4 ⊕ lsb(c_t)` and updates the carry as
/// `c_{t+1} = ⌊(Σx + c_t) / 2⌋ ⊕ c_t ⊕ T2(c_{t-1})`.
#[derive(Clone, Debug)]
pub struct E0 {
    registers: [Lfsr; 4],
    carry: u8,
    previous_carry: u8,
}

impl E0 {
    /// Keys the registers with the 128 key bits split 25/31/33/39, most significant first.
    ///
    /// The carry starts at zero; there is no second keying level.
    pub fn new(key: &[u8; 16]) -> Result<Self> {
        let bits = bits_from_bytes(key);
        let mut offset = 0;
        let mut build = |taps: &[usize]| {
            let len = taps[0];
            let seed = bits[offset..offset + len].to_vec();
            offset += len;
            LfsrConfig::new(taps, seed).build()
        };
        let registers = [
            build(TAPS[0])?,
            build(TAPS[1])?,
            build(TAPS[2])?,
            build(TAPS[3])?,
        ];
        debug!(
            "e0 keyed: {}, {}, {}, {}",
            registers[0], registers[1], registers[2], registers[3]
        );
        Ok(Self {
            registers,
            carry: 0,
            previous_carry: 0,
        })
    }

    /// Clocks all four registers and returns one keystream bit.
    pub fn step(&mut self) -> Result<Bit> {
        let mut sum = 0;
        let mut out = self.carry & 1;
        for register in &mut self.registers {
            let bit = register.shift()?;
            sum += bit;
            out ^= bit;
        }

        let next = ((sum + self.carry) / 2) ^ self.carry ^ t2(self.previous_carry);
        self.previous_carry = self.carry;
        self.carry = next;
        Ok(out)
    }

    /// Produces `n` keystream bits.
    pub fn keystream(&mut self, n: usize) -> Result<Vec<Bit>> {
        (0..n).map(|_| self.step()).collect()
    }

    /// The four registers, in keying order.
    pub fn registers(&self) -> &[Lfsr; 4] {
        &self.registers
    }

    /// Current two-bit carry.
    pub fn carry(&self) -> u8 {
        self.carry
    }
}

/// Linear map `(c1, c0) -> (c0, c1 ⊕ c0)` on the two carry bits.
fn t2(carry: u8) -> u8 {
    let high = (carry >> 1) & 1;
    let low = carry & 1;
    (low << 1) | (high ^ low)
}
