//! Declarative command registry for the ADCP instrument protocol.
//!
//! Commands are described by a JSON protocol schema: a two-level map of
//! prefix byte → command byte → entry, where each entry carries the
//! human-typed command name and its positional argument specs. The registry
//! turns that schema into an in-memory catalog, resolves free-text input to
//! a command by name-prefix match, and encodes validated arguments into the
//! raw bytes sent to the instrument.
//!
//! Registration order is load-bearing: resolution takes the *first* command
//! whose name prefixes the input, not the longest match, so a schema file's
//! ordering is part of its meaning.

pub mod error;
pub mod registry;
pub mod spec;

pub use error::{Result, SchemaError};
pub use registry::CommandRegistry;
pub use spec::{ArgKind, ArgumentSpec, CommandSpec, ResponseKind, TimeoutKind};
