//! AES-shaped expression trees assembled with `bitfunc-core`.
//!
//! This crate is a consumer of the expression algebra. It provides:
//! - GF(2^8) table generators for the S-box and MixColumns multipliers.
//! - Round layers wired from substitution, permutation, slice and XOR nodes.
//! - A cipher builder that takes round keys from the caller and checks the
//!   finished tree against the 128-bit block width.
//!
//! The trees are only built and width-checked. Nothing here encrypts data.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
mod error;
pub mod gf;
mod key;
mod round;

pub use crate::cipher::{aes128, CipherBuilder, CipherConfig, BLOCK_BITS};
pub use crate::error::{Error, Result};
pub use crate::key::{expand_key, Aes128Key, RoundKey, RoundKeys};
pub use crate::round::{add_round_key, RoundLayers, MIX_COEFFICIENTS, SHIFT_ROWS};
