//! Host-side control stack for ADCP precision ADC instruments.
//!
//! The instrument speaks a length-prefixed binary protocol over a TCP
//! stream socket. This crate ties the layers together and ships the
//! default protocol schema.
//!
//! # Crate Structure
//!
//! - [`wire`] — fixed-width little-endian scalar encoding
//! - [`frame`] — length-prefixed frame extraction
//! - [`schema`] — declarative command registry
//! - [`state`] — binary device-state decoder
//! - [`client`] — connection, handshake, and request/response correlation

/// Re-export wire codec types.
pub mod wire {
    pub use adcp_wire::*;
}

/// Re-export frame types.
pub mod frame {
    pub use adcp_frame::*;
}

/// Re-export command registry types.
pub mod schema {
    pub use adcp_schema::*;
}

/// Re-export device-state types.
pub mod state {
    pub use adcp_state::*;
}

/// Re-export client types.
pub mod client {
    pub use adcp_client::*;
}

/// The protocol schema shipped with this crate, covering the full
/// instrument command set.
pub const DEFAULT_SCHEMA_JSON: &str = include_str!("../schema/protocol.json");

/// Build a command registry from the embedded default schema.
pub fn default_registry() -> adcp_schema::Result<adcp_schema::CommandRegistry> {
    adcp_schema::CommandRegistry::from_json_str(DEFAULT_SCHEMA_JSON)
}
