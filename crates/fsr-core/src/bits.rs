//! Bit-vector helpers for register state.

use crate::error::{FsrError, Result};

/// A single register bit, always 0 or 1.
pub type Bit = u8;

/// Checks that every element of `bits` is 0 or 1.
pub fn validate_bits(bits: &[Bit]) -> Result<()> {
    match bits.iter().find(|&&b| b > 1) {
        Some(&bad) => Err(FsrError::InvalidBit(bad)),
        None => Ok(()),
    }
}

/// Reads bit `index`, failing when it is past the end of `bits`.
#[inline]
pub fn read_bit(bits: &[Bit], index: usize) -> Result<Bit> {
    bits.get(index).copied().ok_or(FsrError::IndexOutOfRange {
        index,
        len: bits.len(),
    })
}

/// Writes bit `index` in place.
#[inline]
pub fn write_bit(bits: &mut [Bit], index: usize, value: Bit) -> Result<()> {
    if value > 1 {
        return Err(FsrError::InvalidBit(value));
    }
    let len = bits.len();
    let slot = bits
        .get_mut(index)
        .ok_or(FsrError::IndexOutOfRange { index, len })?;
    *slot = value;
    Ok(())
}

/// Rotates the state one position towards the tail; the old tail becomes the head.
#[inline]
pub fn rotate_right(bits: &mut [Bit]) {
    if !bits.is_empty() {
        bits.rotate_right(1);
    }
}

/// Expands bytes into bits, most significant bit first.
pub fn bits_from_bytes(bytes: &[u8]) -> Vec<Bit> {
    bytes
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
        .collect()
}

/// Parses a string of `0`/`1` characters.
pub fn parse_bits(text: &str) -> Result<Vec<Bit>> {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            other => Err(FsrError::InvalidSeedSpecification(format!(
                "unexpected character {other:?} in bit string"
            ))),
        })
        .collect()
}

/// Renders bits as a compact `0`/`1` string.
pub fn bits_to_string(bits: &[Bit]) -> String {
    bits.iter().map(|b| if *b == 0 { '0' } else { '1' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_expand_msb_first() {
        assert_eq!(bits_from_bytes(&[0xa1]), vec![1, 0, 1, 0, 0, 0, 0, 1]);
        assert_eq!(bits_from_bytes(&[0x00, 0xff]).len(), 16);
    }

    #[test]
    fn rotate_moves_tail_to_head() {
        let mut bits = vec![0, 1, 1];
        rotate_right(&mut bits);
        assert_eq!(bits, vec![1, 0, 1]);
    }

    #[test]
    fn indexed_access_is_bounds_checked() {
        let mut bits = vec![0, 1, 0];
        assert_eq!(read_bit(&bits, 1), Ok(1));
        assert_eq!(
            read_bit(&bits, 3),
            Err(FsrError::IndexOutOfRange { index: 3, len: 3 })
        );
        write_bit(&mut bits, 0, 1).expect("in range");
        assert_eq!(bits, vec![1, 1, 0]);
        assert_eq!(write_bit(&mut bits, 0, 2), Err(FsrError::InvalidBit(2)));
        assert!(write_bit(&mut bits, 5, 1).is_err());
    }

    #[test]
    fn parse_and_render_bit_strings() {
        let bits = parse_bits("0110").expect("valid");
        assert_eq!(bits, vec![0, 1, 1, 0]);
        assert_eq!(bits_to_string(&bits), "0110");
        assert!(parse_bits("01x").is_err());
        assert_eq!(validate_bits(&[0, 1, 3]), Err(FsrError::InvalidBit(3)));
    }
}
