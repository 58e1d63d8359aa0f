// ============================================================================
// Preview Core - Access Controller
// File: crates/preview-core/src/services/access_controller.rs
// ============================================================================
//! Owner-or-admin gate for cached slots

use std::sync::Arc;
use tracing::{debug, warn};

use preview_security::token_hint;

use crate::domain::{SessionRecord, SlotId};
use crate::error::DomainError;
use crate::services::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    AllowedAdmin,
    AllowedOwner,
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, AccessDecision::Denied)
    }
}

pub struct AccessController {
    sessions: Arc<SessionManager>,
}

impl AccessController {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Pure decision on a session snapshot; never mutates.
    pub fn authorize(session: &SessionRecord, slot: &SlotId) -> AccessDecision {
        if session.is_admin {
            AccessDecision::AllowedAdmin
        } else if session.owns(&slot.to_string()) {
            AccessDecision::AllowedOwner
        } else {
            AccessDecision::Denied
        }
    }

    /// Decide and, for owners, consume the grant.
    ///
    /// Owner access only succeeds if this call is the one that removed the
    /// grant from the store, so a grant is spent at most once even when the
    /// snapshot is stale.
    pub async fn admit(&self, session: &SessionRecord, slot: &SlotId) -> Result<AccessDecision, DomainError> {
        match Self::authorize(session, slot) {
            AccessDecision::AllowedOwner => {
                if self.sessions.revoke_slot(session.token(), slot).await? {
                    debug!("Session {} consumed grant for {}", token_hint(session.token()), slot);
                    Ok(AccessDecision::AllowedOwner)
                } else {
                    warn!("Grant for {} already consumed by a concurrent request", slot);
                    Ok(AccessDecision::Denied)
                }
            }
            AccessDecision::Denied => {
                debug!("Session {} denied access to {}", token_hint(session.token()), slot);
                Ok(AccessDecision::Denied)
            }
            AccessDecision::AllowedAdmin => Ok(AccessDecision::AllowedAdmin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session_manager::test_support::manager;

    #[tokio::test]
    async fn test_owner_access_is_single_use() {
        let (_, mgr) = manager();
        let mgr = Arc::new(mgr);
        let access = AccessController::new(mgr.clone());
        let session = mgr.create_session(false).await.unwrap();
        let slot = SlotId::generate(".png").unwrap();

        mgr.grant_slot(session.token(), &slot).await.unwrap();

        let snapshot = mgr.resolve(session.token()).await.unwrap().unwrap();
        assert_eq!(access.admit(&snapshot, &slot).await.unwrap(), AccessDecision::AllowedOwner);

        let snapshot = mgr.resolve(session.token()).await.unwrap().unwrap();
        assert_eq!(access.admit(&snapshot, &slot).await.unwrap(), AccessDecision::Denied);
    }

    #[tokio::test]
    async fn test_stale_snapshot_cannot_reuse_grant() {
        let (_, mgr) = manager();
        let mgr = Arc::new(mgr);
        let access = AccessController::new(mgr.clone());
        let session = mgr.create_session(false).await.unwrap();
        let slot = SlotId::generate(".jpg").unwrap();
        mgr.grant_slot(session.token(), &slot).await.unwrap();

        let snapshot = mgr.resolve(session.token()).await.unwrap().unwrap();
        assert_eq!(access.admit(&snapshot, &slot).await.unwrap(), AccessDecision::AllowedOwner);
        assert_eq!(access.admit(&snapshot, &slot).await.unwrap(), AccessDecision::Denied);
    }

    #[tokio::test]
    async fn test_admin_sees_everything_without_mutation() {
        let (_, mgr) = manager();
        let mgr = Arc::new(mgr);
        let access = AccessController::new(mgr.clone());
        let admin = mgr.create_session(true).await.unwrap();
        let granted = SlotId::generate(".png").unwrap();
        mgr.grant_slot(admin.token(), &granted).await.unwrap();
        let admin = mgr.resolve(admin.token()).await.unwrap().unwrap();

        for slot in [granted.clone(), SlotId::generate(".jpg").unwrap()] {
            assert_eq!(access.admit(&admin, &slot).await.unwrap(), AccessDecision::AllowedAdmin);
        }
        let after = mgr.resolve(admin.token()).await.unwrap().unwrap();
        assert_eq!(after.owned_slots, admin.owned_slots);
    }

    #[tokio::test]
    async fn test_stranger_is_denied() {
        let (_, mgr) = manager();
        let mgr = Arc::new(mgr);
        let session = mgr.create_session(false).await.unwrap();
        let slot = SlotId::generate(".png").unwrap();
        assert_eq!(AccessController::authorize(&session, &slot), AccessDecision::Denied);
    }
}
