// ============================================================================
// Preview Core - Session Manager
// File: crates/preview-core/src/services/session_manager.rs
// ============================================================================
//! Session creation, resolution and slot capability bookkeeping.
//!
//! Every mutation is persisted immediately. Read-modify-write cycles on the
//! same token are serialised through a striped lock so two requests from one
//! client cannot drop each other's grants inside this process.

use chrono::Utc;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use preview_security::{generate_session_token, token_hint, validate_session_token};

use crate::domain::{SessionRecord, SlotId};
use crate::error::DomainError;
use crate::repositories::SessionStore;

const LOCK_STRIPES: usize = 64;

/// Validity windows and cookie attributes for new sessions
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    pub cookie_name: String,
    pub anonymous_ttl: Duration,
    pub admin_ttl: Duration,
    pub secure_cookies: bool,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    policy: SessionPolicy,
    stripes: Vec<Mutex<()>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, policy: SessionPolicy) -> Self {
        Self {
            store,
            policy,
            stripes: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Look up a session by token.
    ///
    /// Absent, malformed, undecodable and expired sessions all resolve to
    /// `None`; only store failures are errors.
    pub async fn resolve(&self, token: &str) -> Result<Option<SessionRecord>, DomainError> {
        if validate_session_token(token).is_err() {
            debug!("Ignoring malformed session token");
            return Ok(None);
        }

        let raw = match self.store.get(token).await? {
            Some(raw) => raw,
            None => {
                debug!("No session for token {}", token_hint(token));
                return Ok(None);
            }
        };

        let record = match SessionRecord::decode(&raw) {
            Ok(r) => r,
            Err(e) => {
                warn!("Undecodable session record for token {}: {}", token_hint(token), e);
                return Ok(None);
            }
        };

        if record.token() != token || record.is_expired_at(Utc::now()) {
            debug!("Session {} expired or mismatched", token_hint(token));
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Create and persist a new session with an empty capability list
    pub async fn create_session(&self, is_admin: bool) -> Result<SessionRecord, DomainError> {
        let ttl = if is_admin { self.policy.admin_ttl } else { self.policy.anonymous_ttl };
        let record = SessionRecord::new(
            &self.policy.cookie_name,
            generate_session_token(),
            is_admin,
            ttl,
            self.policy.secure_cookies,
        );
        self.persist(&record).await?;

        info!(
            "Created {} session {}",
            if is_admin { "admin" } else { "anonymous" },
            token_hint(record.token())
        );
        Ok(record)
    }

    /// Write the long-lived administrative record under a provisioned token
    pub async fn bootstrap_admin(&self, token: &str) -> Result<SessionRecord, DomainError> {
        validate_session_token(token).map_err(|e| DomainError::InvalidToken(e.to_string()))?;

        let record = SessionRecord::new(
            &self.policy.cookie_name,
            token.to_string(),
            true,
            self.policy.admin_ttl,
            self.policy.secure_cookies,
        );
        self.persist(&record).await?;

        info!("Admin session bootstrapped, valid until {}", record.expires_at());
        Ok(record)
    }

    /// Resolve the request credential or fall back to a new anonymous session.
    ///
    /// The flag is true when the caller must attach the new credential to its response.
    pub async fn ensure_session(&self, token: Option<&str>) -> Result<(SessionRecord, bool), DomainError> {
        if let Some(token) = token {
            if let Some(record) = self.resolve(token).await? {
                return Ok((record, false));
            }
        }
        let record = self.create_session(false).await?;
        Ok((record, true))
    }

    /// Record that `token` may view `slot` once.
    ///
    /// Fails with `SessionNotFound` rather than dropping the grant when the
    /// token does not resolve.
    pub async fn grant_slot(&self, token: &str, slot: &SlotId) -> Result<(), DomainError> {
        let _guard = self.stripe(token).lock().await;

        let mut record = self.resolve(token).await?.ok_or(DomainError::SessionNotFound)?;
        let slot = slot.to_string();
        if record.grant(&slot) {
            self.persist(&record).await?;
            debug!("Granted {} to session {}", slot, token_hint(token));
        }
        Ok(())
    }

    /// Remove one grant of `slot`. Persists only when something was removed.
    pub async fn revoke_slot(&self, token: &str, slot: &SlotId) -> Result<bool, DomainError> {
        let _guard = self.stripe(token).lock().await;

        let mut record = match self.resolve(token).await? {
            Some(r) => r,
            None => return Ok(false),
        };

        let removed = record.revoke(&slot.to_string());
        if removed {
            self.persist(&record).await?;
            debug!("Revoked {} from session {}", slot, token_hint(token));
        }
        Ok(removed)
    }

    /// Health probe for the backing store
    pub async fn ping_store(&self) -> Result<(), DomainError> {
        self.store.ping().await.map_err(DomainError::from)
    }

    async fn persist(&self, record: &SessionRecord) -> Result<(), DomainError> {
        let ttl = record
            .remaining_ttl(Utc::now())
            .unwrap_or(Duration::from_secs(1))
            .max(Duration::from_secs(1));
        let raw = record
            .encode()
            .map_err(|e| DomainError::SessionEncoding(e.to_string()))?;
        self.store.set(record.token(), &raw, ttl).await?;
        Ok(())
    }

    fn stripe(&self, token: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        &self.stripes[(hasher.finish() as usize) % self.stripes.len()]
    }
}
