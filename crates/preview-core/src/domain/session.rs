// ============================================================================
// Preview Core - Session Record
// File: crates/preview-core/src/domain/session.rs
// Description: Anonymous / admin session with its slot capability list
// ============================================================================

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on any session validity window (ten years).
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 3600;

/// Client-side credential metadata, kept alongside the record so the
/// `Set-Cookie` directive can be rebuilt from the store alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub secure: bool,
    pub http_only: bool,
}

/// Session record as persisted in the session store under its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub cookie: SessionCookie,
    pub is_admin: bool,
    #[serde(default)]
    pub owned_slots: Vec<String>,
}

impl SessionRecord {
    /// Create a fresh record with no owned slots
    pub fn new(cookie_name: &str, token: String, is_admin: bool, ttl: Duration, secure: bool) -> Self {
        let ttl_secs = ttl.as_secs().min(MAX_TTL_SECS) as i64;
        Self {
            cookie: SessionCookie {
                name: cookie_name.to_string(),
                value: token,
                expires: Utc::now() + ChronoDuration::seconds(ttl_secs),
                secure,
                http_only: true,
            },
            is_admin,
            owned_slots: Vec::new(),
        }
    }

    pub fn token(&self) -> &str {
        &self.cookie.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.cookie.expires
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.cookie.expires
    }

    /// Validity left at `now`, or `None` once expired
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.cookie.expires - now)
            .to_std()
            .ok()
            .filter(|d| !d.is_zero())
    }

    pub fn owns(&self, slot: &str) -> bool {
        self.owned_slots.iter().any(|s| s == slot)
    }

    /// Append a slot grant. Returns false if the slot was already owned.
    pub fn grant(&mut self, slot: &str) -> bool {
        if self.owns(slot) {
            return false;
        }
        self.owned_slots.push(slot.to_string());
        true
    }

    /// Remove one occurrence of `slot` (swap with last, truncate).
    pub fn revoke(&mut self, slot: &str) -> bool {
        match self.owned_slots.iter().position(|s| s == slot) {
            Some(idx) => {
                self.owned_slots.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
