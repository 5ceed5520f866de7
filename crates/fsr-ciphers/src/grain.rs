//! Grain v0-style generator: an 80-bit LFSR and an 80-bit NLFSR combined by a filter.

use fsr_core::{
    bits_from_bytes, Bit, Expression, Lfsr, LfsrConfig, Nlfsr, NlfsrConfig, Result, ShiftRegister,
};
use log::debug;

use crate::xor_head;

const LFSR_TAPS: [usize; 6] = [80, 67, 57, 42, 29, 18];
const INIT_ROUNDS: usize = 160;
const REGISTER_BITS: usize = 80;

/// NLFSR feedback g(x).
const FEEDBACK: &str = "16 19 27 34 42 46 51 58 64 70 79 + + + + + + + + + + \
    16 19 * + 42 46 * + 64 70 * + 19 27 34 * * + 46 51 58 * * + \
    16 34 51 70 * * * + 19 27 42 46 * * * + 16 19 58 64 * * * + \
    16 19 27 34 42 * * * * + 46 51 58 64 70 * * * * + \
    27 34 42 46 51 58 * * * * * +";

/// Filter h(x) over five gathered state bits.
const FILTER: &str = "1 4 + 0 3 * + 2 3 * + 3 4 * + 0 1 2 * * + 0 2 3 * * + \
    0 2 4 * * + 1 2 4 * * + 2 3 4 * * +";

/// Bit of the NLFSR that masks the filter output.
const MASK_BIT: usize = 63;

/// Keystream generator pairing an LFSR with an NLFSR.
#[derive(Clone, Debug)]
pub struct Grain {
    lfsr: Lfsr,
    nfsr: Nlfsr,
    filter: Expression,
}

impl Grain {
    /// Loads the key into the NLFSR and the IV (padded with ones) into the LFSR,
    /// then runs the initialisation rounds.
    pub fn new(key: &[u8; 10], iv: &[u8; 8]) -> Result<Self> {
        let mut iv_bits = bits_from_bytes(iv);
        iv_bits.resize(REGISTER_BITS, 1);

        let nfsr = NlfsrConfig::new(bits_from_bytes(key))
            .feedback(FEEDBACK.parse()?)
            .build()?;
        let lfsr = LfsrConfig::new(&LFSR_TAPS, iv_bits).build()?;
        let mut grain = Self {
            lfsr,
            nfsr,
            filter: FILTER.parse()?,
        };

        for _ in 0..INIT_ROUNDS {
            let lfsr_out = grain.lfsr.shift()?;
            grain.nfsr.shift()?;
            let out = grain.filtered()?;
            xor_head(&mut grain.lfsr, out)?;
            xor_head(&mut grain.nfsr, out ^ lfsr_out)?;
        }
        debug!("grain initialised after {INIT_ROUNDS} rounds");
        Ok(grain)
    }

    /// Clocks both registers once and returns one keystream bit.
    pub fn step(&mut self) -> Result<Bit> {
        let lfsr_out = self.lfsr.shift()?;
        self.nfsr.shift()?;
        xor_head(&mut self.nfsr, lfsr_out)?;
        self.filtered()
    }

    /// Produces `n` keystream bits.
    pub fn keystream(&mut self, n: usize) -> Result<Vec<Bit>> {
        (0..n).map(|_| self.step()).collect()
    }

    /// The linear register.
    pub fn lfsr(&self) -> &Lfsr {
        &self.lfsr
    }

    /// The nonlinear register.
    pub fn nfsr(&self) -> &Nlfsr {
        &self.nfsr
    }

    fn filtered(&self) -> Result<Bit> {
        let taps = [
            self.lfsr.bit(3)?,
            self.lfsr.bit(25)?,
            self.lfsr.bit(46)?,
            self.lfsr.bit(64)?,
            self.nfsr.bit(46)?,
        ];
        Ok(self.filter.evaluate(&taps)? ^ self.nfsr.bit(MASK_BIT)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsr_core::bits_to_string;

    fn key_iv(key_hex: &str, iv_hex: &str) -> ([u8; 10], [u8; 8]) {
        let mut key = [0u8; 10];
        let mut iv = [0u8; 8];
        key.copy_from_slice(&hex::decode(key_hex).expect("key hex"));
        iv.copy_from_slice(&hex::decode(iv_hex).expect("iv hex"));
        (key, iv)
    }

    #[test]
    fn keystream_regression() {
        let (key, iv) = key_iv("b5ec3b0fc1a0f8b17a5b", "faecfb0fafa0faba");
        let mut grain = Grain::new(&key, &iv).expect("valid grain");
        assert_eq!(
            bits_to_string(&grain.keystream(64).expect("keystream")),
            "0101001010111000000010110011000111011110010111110001110001010010"
        );
    }

    #[test]
    fn zero_key_and_iv() {
        let mut grain = Grain::new(&[0u8; 10], &[0u8; 8]).expect("valid grain");
        assert_eq!(
            bits_to_string(&grain.keystream(32).expect("keystream")),
            "11011010001111011101100101111000"
        );
    }

    #[test]
    fn initialisation_leaves_registers_clocked() {
        let (key, iv) = key_iv("b5ec3b0fc1a0f8b17a5b", "faecfb0fafa0faba");
        let grain = Grain::new(&key, &iv).expect("valid grain");
        assert_eq!(grain.lfsr().cycles(), INIT_ROUNDS as u64);
        assert_eq!(grain.nfsr().cycles(), INIT_ROUNDS as u64);
        assert_eq!(grain.lfsr().len(), REGISTER_BITS);
        assert_eq!(grain.nfsr().len(), REGISTER_BITS);
    }

    #[test]
    fn functions_are_well_formed() {
        let feedback: Expression = FEEDBACK.parse().expect("feedback");
        let filter: Expression = FILTER.parse().expect("filter");
        assert_eq!(feedback.tokens().first(), Some(&fsr_core::Token::Index(16)));
        assert_eq!(filter.evaluate(&[0, 0, 0, 0, 0]), Ok(0));
    }
}
