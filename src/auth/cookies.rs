//! Token jar: the cookie mirror that carries tokens to every request.
//!
//! DESIGN
//! ======
//! Entries are named like the browser cookies they replace (`accessToken`,
//! `refreshToken`) and carry an absolute expiry. Expired entries read as
//! absent. A jar opened with [`TokenJar::open`] rewrites its file on every
//! mutation so tokens survive restarts; persistence failures are logged and
//! otherwise ignored, the in-memory copy stays authoritative.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
pub const ACCESS_TOKEN_TTL: Duration = Duration::days(7);
pub const REFRESH_TOKEN_TTL: Duration = Duration::days(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub value: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl StoredCookie {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Default)]
pub struct TokenJar {
    entries: Mutex<BTreeMap<String, StoredCookie>>,
    path: Option<PathBuf>,
}

impl TokenJar {
    /// A jar that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed jar, loading any entries already on disk.
    ///
    /// A missing or unreadable file yields an empty jar.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self { entries: Mutex::new(entries), path: Some(path) }
    }

    /// Live value of the named entry.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let now = OffsetDateTime::now_utc();
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(name)
            .filter(|cookie| cookie.is_live(now))
            .map(|cookie| cookie.value.clone())
    }

    pub fn set(&self, name: &str, value: &str, ttl: Duration) {
        let cookie = StoredCookie { value: value.to_owned(), expires_at: OffsetDateTime::now_utc() + ttl };
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(name.to_owned(), cookie);
        self.persist(&entries);
    }

    pub fn remove(&self, name: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(name).is_some() {
            self.persist(&entries);
        }
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_COOKIE)
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_COOKIE)
    }

    pub fn set_access_token(&self, token: &str) {
        self.set(ACCESS_TOKEN_COOKIE, token, ACCESS_TOKEN_TTL);
    }

    pub fn set_refresh_token(&self, token: &str) {
        self.set(REFRESH_TOKEN_COOKIE, token, REFRESH_TOKEN_TTL);
    }

    /// Drop both token entries.
    pub fn clear_tokens(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(ACCESS_TOKEN_COOKIE);
        entries.remove(REFRESH_TOKEN_COOKIE);
        self.persist(&entries);
    }

    /// Expiry of the named entry, live or not.
    #[must_use]
    pub fn expires_at(&self, name: &str) -> Option<OffsetDateTime> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(name).map(|cookie| cookie.expires_at)
    }

    fn persist(&self, entries: &BTreeMap<String, StoredCookie>) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_entries(path, entries) {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist token jar");
        }
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, StoredCookie> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read token jar");
            return BTreeMap::new();
        }
    };
    serde_json::from_slice(&raw).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "discarding corrupt token jar");
        BTreeMap::new()
    })
}

fn write_entries(path: &Path, entries: &BTreeMap<String, StoredCookie>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_vec_pretty(entries).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
