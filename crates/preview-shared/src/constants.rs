//! Application-wide constants

pub const SESSION_COOKIE_NAME: &str = "user";
pub const ANONYMOUS_SESSION_TTL_SECS: u64 = 3600;
pub const ADMIN_SESSION_TTL_SECS: u64 = 100 * 3600;
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];
pub const MAX_UPLOAD_BYTES: u64 = 32 << 20;
pub const RECLAIM_DELAY_MS: u64 = 5000;
pub const FETCH_TIMEOUT_SECS: u64 = 15;
