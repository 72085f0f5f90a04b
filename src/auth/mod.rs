//! Client-side session: token jar, identity decoding, session store, and the
//! logout broadcast.
//!
//! SYSTEM CONTEXT
//! ==============
//! The jar is the only state shared between the session store and the HTTP
//! client. The store writes it on login/logout; the client writes it during
//! token refresh.

pub mod cookies;
pub mod events;
pub mod session;
pub mod token;

pub use cookies::TokenJar;
pub use events::{SessionEvent, SessionEvents};
pub use session::{Session, SessionStore};
pub use token::TokenError;
