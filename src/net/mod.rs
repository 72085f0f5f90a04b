//! Outbound REST plumbing: wire types, error taxonomy, transport, and the
//! intercepting client.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;
