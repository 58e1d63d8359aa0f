// ============================================================================
// Preview Server - Admin Bootstrap
// File: preview-app/preview-server/src/bootstrap.rs
// ============================================================================
//! Provisioning of the administrative credential.
//!
//! The token is taken from configuration when present. Otherwise a valid
//! token already in the configured token file is reused, and only when there
//! is none is a fresh one generated and written there with owner-only
//! permissions. It is never logged.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{info, warn};

use preview_security::{generate_session_token, validate_session_token};
use preview_shared::config::AdminSettings;

/// Resolve the admin token for this process
pub async fn provision_admin_token(settings: &AdminSettings) -> Result<String> {
    if let Some(token) = settings.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        if let Err(e) = validate_session_token(token) {
            bail!("configured admin token is invalid: {}", e);
        }
        info!("Using configured admin credential");
        return Ok(token.to_string());
    }

    if let Some(token) = read_token_file(&settings.token_file).await? {
        info!("Reusing admin credential from {}", settings.token_file.display());
        return Ok(token);
    }

    let token = generate_session_token();
    write_token_file(&settings.token_file, &token).await?;
    info!("Generated admin credential, written to {}", settings.token_file.display());
    Ok(token)
}

/// A missing file or one without a valid token yields `None`
async fn read_token_file(path: &Path) -> Result<Option<String>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading admin token from {}", path.display())),
    };

    let token = contents.trim();
    match validate_session_token(token) {
        Ok(()) => Ok(Some(token.to_string())),
        Err(_) => {
            warn!("Admin token file {} holds no valid token, replacing it", path.display());
            Ok(None)
        }
    }
}

async fn write_token_file(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    tokio::fs::write(path, format!("{}\n", token))
        .await
        .with_context(|| format!("writing admin token to {}", path.display()))?;

    // Owner-only, the file is a bearer credential
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(path, perms).await?;
    }

    Ok(())
}
