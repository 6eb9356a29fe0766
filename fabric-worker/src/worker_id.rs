//! Worker identifier minting (spec §4.2.1 step 2).

use fabric_types::WorkerId;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random token appended to `<hostname>-<pid>-`.
const TOKEN_LEN: usize = 8;

/// Mint a `<hostname>-<pid>-<8-char random token>` worker id. Falls
/// back to `"unknown"` if the hostname cannot be determined (a process
/// without a resolvable hostname should still be able to start).
pub fn mint() -> WorkerId {
    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());
    let pid = std::process::id();
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();
    WorkerId::new(format!("{hostname}-{pid}-{token}"))
}
