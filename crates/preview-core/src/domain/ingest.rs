// ============================================================================
// Preview Core - Ingestion
// File: crates/preview-core/src/domain/ingest.rs
// Description: Source locators and ingestion outcomes
// ============================================================================

use url::Url;

use super::slot::SlotId;

const LOOPBACK_HOSTS: &[&str] = &["127.0.0.1", "localhost"];

/// Where the bytes of a fetch request come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    /// Path relative to the sandboxed local source root
    Local(String),
    /// Absolute http(s) URL
    Remote(String),
}

impl SourceLocator {
    /// Classify a raw `path` parameter.
    ///
    /// Loopback-prefixed locators (`127.0.0.1/...`, `localhost:8080/...`, with
    /// or without an http scheme) address the local source root; anything else
    /// must be an absolute http(s) URL.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (has_scheme, rest) = match raw.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") => {
                (true, rest)
            }
            Some(_) => return None,
            None => (false, raw),
        };

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        let host = authority.split(':').next().unwrap_or("");
        if LOOPBACK_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)) {
            let path = path.split(['?', '#']).next().unwrap_or("");
            let path = path.trim_start_matches('/');
            if path.is_empty() {
                return None;
            }
            return Some(SourceLocator::Local(path.to_string()));
        }

        if !has_scheme {
            return None;
        }
        let url = Url::parse(raw).ok()?;
        url.host_str()?;
        Some(SourceLocator::Remote(url.to_string()))
    }
}

/// Terminal state of an ingestion request, fed to the preview renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Success { slot: SlotId, bytes: u64 },
    NotExists,
    BadExtension,
    TooLarge,
    InvalidSource,
    FetchFailed,
}

impl IngestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, IngestOutcome::Success { .. })
    }

    pub fn message(&self) -> &'static str {
        match self {
            IngestOutcome::Success { .. } => "file cached",
            IngestOutcome::NotExists => "file does not exist",
            IngestOutcome::BadExtension => "file has wrong extension",
            IngestOutcome::TooLarge => "file size is too large",
            IngestOutcome::InvalidSource => "invalid source locator",
            IngestOutcome::FetchFailed => "failed to fetch file",
        }
    }
}
