//! Feedback shift register simulation engine.
//!
//! This crate provides the building blocks behind classical stream ciphers:
//! - An RPN boolean expression evaluator used for output and feedback functions.
//! - Linear feedback shift registers with external (Fibonacci) or internal
//!   (Galois) feedback.
//! - Nonlinear feedback shift registers driven by arbitrary expressions.
//!
//! It is meant for teaching and prototyping; nothing here is constant-time or
//! tuned for throughput.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod bits;
mod error;
mod expr;
mod lfsr;
mod nlfsr;
mod register;
mod seed;

pub use crate::bits::{bits_from_bytes, bits_to_string, parse_bits, Bit};
pub use crate::error::{FsrError, Result};
pub use crate::expr::{Expression, Token};
pub use crate::lfsr::{Lfsr, LfsrConfig, Topology};
pub use crate::nlfsr::{Nlfsr, NlfsrConfig};
pub use crate::register::{RegisterInfo, ShiftRegister};
pub use crate::seed::{random_bits, InitialState};
