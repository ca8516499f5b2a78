//! Connection management and request/response correlation for ADCP
//! instruments.
//!
//! A [`Client`] owns one TCP connection with a fixed role negotiated at
//! handshake. Two execution paths share it: the caller's sender path
//! (resolve, encode, write, wait) and a background receiver thread that
//! frames inbound bytes, publishes status snapshots, and hands response
//! frames to the correlator. At most one command is in flight per
//! connection: the protocol has no request ids, so exchanges are strictly
//! sequential.

pub mod client;
pub mod connector;
pub mod correlator;
pub mod error;
pub mod handshake;
pub mod snapshot;
pub mod status;
pub mod timeout;

pub use client::{Client, CommandOutcome, CommandReply, ResponseValue};
pub use connector::{connect, connect_with_config, ClientConfig};
pub use correlator::Correlator;
pub use error::{ClientError, Result};
pub use handshake::{ConnectionRole, CONNECT_ACK, CONNECT_MAGIC};
pub use snapshot::StateCell;
pub use status::StatusCode;
pub use timeout::effective_timeout;
