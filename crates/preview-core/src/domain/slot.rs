// ============================================================================
// Preview Core - Cache Slot
// File: crates/preview-core/src/domain/slot.rs
// Description: Cache slot identifiers, namespaces and consumption policy
// ============================================================================

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use preview_security::{is_valid_fingerprint, slot_fingerprint};

use crate::error::DomainError;

const MAX_EXTENSION_LEN: usize = 8;

/// Unique cache slot name: `<fingerprint><.ext>`.
///
/// Parsing is strict (lowercase hex stem, short alphanumeric extension) so a
/// slot id taken from a URL can never name anything outside its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotId {
    stem: String,
    ext: String,
}

impl SlotId {
    /// Fresh id for an already-validated extension (leading dot included).
    pub fn generate(ext: &str) -> Result<Self, DomainError> {
        Self::from_parts(slot_fingerprint(), ext.to_string())
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let dot = s
            .rfind('.')
            .ok_or_else(|| DomainError::InvalidSlotId(s.to_string()))?;
        Self::from_parts(s[..dot].to_string(), s[dot..].to_string())
    }

    fn from_parts(stem: String, ext: String) -> Result<Self, DomainError> {
        let ext_ok = ext.len() > 1
            && ext.len() <= MAX_EXTENSION_LEN
            && ext.starts_with('.')
            && ext[1..].bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
        if !is_valid_fingerprint(&stem) || !ext_ok {
            return Err(DomainError::InvalidSlotId(format!("{}{}", stem, ext)));
        }
        Ok(Self { stem, ext })
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Extension including the leading dot
    pub fn ext(&self) -> &str {
        &self.ext
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.ext)
    }
}

impl FromStr for SlotId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SlotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What happens to a slot after it has been served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionPolicy {
    /// Kept until reviewed or explicitly deleted
    MultiFetch,
    /// Reclaimed a fixed delay after the first successful serve
    OneShot,
}

impl ConsumptionPolicy {
    /// Map the `/cache/<mode>/` path segment.
    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode {
            "0" => Some(ConsumptionPolicy::MultiFetch),
            "1" => Some(ConsumptionPolicy::OneShot),
            _ => None,
        }
    }
}

impl Default for ConsumptionPolicy {
    fn default() -> Self {
        ConsumptionPolicy::OneShot
    }
}

/// Storage area a slot currently lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotNamespace {
    /// Freshly ingested, awaiting review
    Cache,
    /// Approved by an administrator, publicly readable
    Approved,
}

impl SlotNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotNamespace::Cache => "cache",
            SlotNamespace::Approved => "approved",
        }
    }
}

/// Case-insensitive allow-list of file extensions
#[derive(Debug, Clone)]
pub struct ExtensionAllowList {
    allowed: Vec<String>,
}

impl ExtensionAllowList {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = extensions
            .into_iter()
            .map(|e| {
                let e = e.as_ref().trim().to_ascii_lowercase();
                if e.starts_with('.') { e } else { format!(".{}", e) }
            })
            .filter(|e| e.len() > 1)
            .collect();
        Self { allowed }
    }

    /// Extension of `name` (lowercased, dot included) if it is allowed.
    ///
    /// Query strings and fragments are ignored so remote URLs resolve the same
    /// way as plain paths.
    pub fn accept(&self, name: &str) -> Option<String> {
        let name = name.split(['?', '#']).next().unwrap_or("");
        let file = name.rsplit('/').next().unwrap_or(name);
        let dot = file.rfind('.')?;
        let ext = file[dot..].to_ascii_lowercase();
        self.allowed.iter().any(|a| *a == ext).then_some(ext)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.allowed
    }
}
