//! QR-menu admin: API access layer for the restaurant menu dashboard.
//!
//! ARCHITECTURE
//! ============
//! Leaf-first: `auth` holds the token jar, session store, identity decoding
//! and logout broadcast; `net` is the single request pipeline that attaches
//! bearer tokens and recovers from `401` with one refresh; `services` are thin
//! typed wrappers around the backend routes. The binary in `main.rs` is the
//! view layer.

pub mod auth;
pub mod config;
pub mod net;
pub mod services;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::AppConfig;
pub use net::client::ApiClient;
pub use net::error::ApiError;
