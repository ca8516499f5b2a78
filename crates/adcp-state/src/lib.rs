//! Binary device-state decoder for the ADCP instrument protocol.
//!
//! The instrument reports its state as a fixed 29-byte global record
//! followed by a declared number of 9-byte per-measurement records. Decoded
//! snapshots are immutable; a new status frame always replaces the previous
//! snapshot wholesale.

pub mod error;
pub mod state;

pub use error::{Result, StateError};
pub use state::{
    DeviceState, FftWindow, Filter, MeasurementState, Pga, SampleRate, Started,
    MEASUREMENT_RECORD_SIZE, STATE_HEADER_SIZE,
};
