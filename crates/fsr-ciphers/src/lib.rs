//! Example stream cipher compositions built on `fsr-core`.
//!
//! The constructions only use the public register surface: shifting, indexed
//! bit reads and direct writes into a register's head. They follow the shape
//! of the published ciphers but are not conformance-tested against them.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod a51;
mod e0;
mod grain;

pub use a51::A51;
pub use e0::E0;
pub use grain::Grain;

use fsr_core::{Bit, Result, ShiftRegister};

/// XORs `bit` into the head of `register`.
pub(crate) fn xor_head<R: ShiftRegister>(register: &mut R, bit: Bit) -> Result<()> {
    let head = register.bit(0)?;
    register.set_bit(0, head ^ bit)
}
