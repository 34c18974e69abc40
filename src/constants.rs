// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you the story of
//! how the system operates: where it talks to the provider, how long it
//! waits for an export job, how early it refreshes credentials.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Provider endpoints
// ---------------------------------------------------------------------------

/// Base URL for all Feishu open-platform API calls.
pub const FEISHU_API_BASE_URL: &str = "https://open.feishu.cn";

/// Tenant access token issuance endpoint (relative to the API base).
pub const FEISHU_TOKEN_ENDPOINT: &str = "open-apis/auth/v3/tenant_access_token/internal";

/// Export task creation endpoint (relative to the API base).
pub const FEISHU_EXPORT_TASKS_ENDPOINT: &str = "open-apis/drive/v1/export_tasks";

/// Spreadsheet metadata endpoint prefix; the spreadsheet token and
/// `/sheets/query` are appended per call.
pub const FEISHU_SPREADSHEETS_ENDPOINT: &str = "open-apis/sheets/v3/spreadsheets";

/// Base URL for public Google Sheets export downloads. No authentication —
/// these are shared-link exports.
pub const GOOGLE_SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

// ---------------------------------------------------------------------------
// Export job polling
// ---------------------------------------------------------------------------

/// How long the poller waits between consecutive export status checks.
///
/// Export jobs are short-lived (seconds to low minutes) and the provider
/// offers no push notification, so a fixed linear poll keeps worst-case
/// latency at `POLL_INTERVAL * POLL_MAX_ATTEMPTS` without request storms.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Maximum number of status checks before an export job is declared timed out.
pub const POLL_MAX_ATTEMPTS: u32 = 30;

// ---------------------------------------------------------------------------
// Credential lifetime
// ---------------------------------------------------------------------------

/// Nominal lifetime of a tenant access token as documented by the provider.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

/// Safety margin subtracted from the nominal token lifetime so a refresh
/// always happens slightly before real expiry.
pub const TOKEN_EXPIRY_SKEW: Duration = Duration::from_secs(5 * 60);

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Per-request timeout for all provider HTTP calls.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default TCP port for the relay server when `PORT` is not set.
pub const RELAY_DEFAULT_PORT: u16 = 3000;
