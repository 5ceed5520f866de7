//! Initial-state resolution.

use core::str::FromStr;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::bits::{parse_bits, validate_bits, Bit};
use crate::error::{FsrError, Result};

/// How a register's state is seeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitialState {
    /// Explicit bits; the register length is taken from the vector.
    Bits(Vec<Bit>),
    /// Every bit set.
    AllOnes,
    /// Uniformly random bits from ChaCha20, seeded from the value or from the OS if `None`.
    Random(Option<u64>),
}

impl InitialState {
    /// Resolves to a concrete bit vector of `len` bits.
    ///
    /// `len` is ignored for [`InitialState::Bits`], whose length wins.
    pub fn resolve(&self, len: usize) -> Result<Vec<Bit>> {
        match self {
            InitialState::Bits(bits) => {
                validate_bits(bits)?;
                Ok(bits.clone())
            }
            InitialState::AllOnes => Ok(vec![1; len]),
            InitialState::Random(Some(seed)) => {
                Ok(random_bits(&mut ChaCha20Rng::seed_from_u64(*seed), len))
            }
            InitialState::Random(None) => Ok(random_bits(&mut ChaCha20Rng::from_entropy(), len)),
        }
    }

    /// Length implied by the seed itself, if any.
    pub fn explicit_len(&self) -> Option<usize> {
        match self {
            InitialState::Bits(bits) => Some(bits.len()),
            _ => None,
        }
    }
}

impl From<Vec<Bit>> for InitialState {
    fn from(bits: Vec<Bit>) -> Self {
        InitialState::Bits(bits)
    }
}

impl FromStr for InitialState {
    type Err = FsrError;

    /// Accepts `ones`, `random`, or a `0`/`1` string such as `011`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "ones" => Ok(InitialState::AllOnes),
            "random" => Ok(InitialState::Random(None)),
            text if !text.is_empty() && text.chars().all(|c| matches!(c, '0' | '1' | ',')) => {
                parse_bits(text).map(InitialState::Bits)
            }
            other => Err(FsrError::InvalidSeedSpecification(format!(
                "unknown initial state {other:?}"
            ))),
        }
    }
}

/// Draws `len` uniformly random bits.
pub fn random_bits<R: RngCore>(rng: &mut R, len: usize) -> Vec<Bit> {
    (0..len).map(|_| rng.gen_range(0..=1u8)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_random_is_reproducible() {
        let a = InitialState::Random(Some(7)).resolve(64).expect("resolve");
        let b = InitialState::Random(Some(7)).resolve(64).expect("resolve");
        let c = InitialState::Random(Some(8)).resolve(64).expect("resolve");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|&bit| bit <= 1));
    }

    #[test]
    fn seeded_random_matches_chacha_stream() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let expected = random_bits(&mut rng, 32);
        assert_eq!(InitialState::Random(Some(11)).resolve(32), Ok(expected));

        let unseeded = InitialState::Random(None).resolve(48).expect("resolve");
        assert_eq!(unseeded.len(), 48);
        assert!(unseeded.iter().all(|&bit| bit <= 1));
    }

    #[test]
    fn explicit_bits_keep_their_length() {
        let state = InitialState::Bits(vec![0, 1, 1]);
        assert_eq!(state.resolve(10), Ok(vec![0, 1, 1]));
        assert_eq!(state.explicit_len(), Some(3));
        assert_eq!(InitialState::AllOnes.resolve(4), Ok(vec![1, 1, 1, 1]));
    }

    #[test]
    fn explicit_bits_must_be_binary() {
        assert_eq!(
            InitialState::Bits(vec![0, 2]).resolve(2),
            Err(FsrError::InvalidBit(2))
        );
    }

    #[test]
    fn parses_keywords_and_bit_strings() {
        assert_eq!("ones".parse::<InitialState>(), Ok(InitialState::AllOnes));
        assert_eq!(
            "random".parse::<InitialState>(),
            Ok(InitialState::Random(None))
        );
        assert_eq!(
            "011".parse::<InitialState>(),
            Ok(InitialState::Bits(vec![0, 1, 1]))
        );
        assert!(matches!(
            "zeros".parse::<InitialState>(),
            Err(FsrError::InvalidSeedSpecification(_))
        ));
    }
}
