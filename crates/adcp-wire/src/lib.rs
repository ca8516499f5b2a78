//! Fixed-width little-endian scalar encoding for the ADCP instrument protocol.
//!
//! Every integer on the wire (command identifiers, argument values, state
//! fields) is a little-endian scalar of 8, 16, 32, or 64 bits, signed or
//! unsigned. This crate encodes and decodes those scalars and parses the
//! integer literal notations accepted by the command line (decimal, `0x`
//! hex, `0b` binary, leading-zero octal).

pub mod error;
pub mod number;
pub mod scalar;

pub use error::{Result, WireError};
pub use number::parse_number;
pub use scalar::{ScalarType, Width};
