//! Process exit codes.
//!
//! ```text
//! 0  success
//! 1  anything else
//! 2  rejected locally (validation, stock, size selection)
//! 3  authentication (bad credentials, signed out, session expired)
//! 4  API unreachable or failing (transport, timeout, 5xx)
//! 5  not found
//! 78 configuration
//! ```

use vitrine_client::ClientError;

pub const FAILURE: i32 = 1;
pub const LOCAL: i32 = 2;
pub const AUTH: i32 = 3;
pub const UNAVAILABLE: i32 = 4;
pub const NOT_FOUND: i32 = 5;
pub const CONFIG: i32 = 78;

/// Maps an error to an exit code by its first [`ClientError`] in the chain.
pub fn code_for(error: &anyhow::Error) -> i32 {
    match error.chain().find_map(|e| e.downcast_ref::<ClientError>()) {
        Some(e) => client_code(e),
        None => FAILURE,
    }
}

fn client_code(error: &ClientError) -> i32 {
    if error.is_local() {
        LOCAL
    } else if error.is_auth_error() {
        AUTH
    } else if error.is_config_error() {
        CONFIG
    } else if error.is_retryable() {
        UNAVAILABLE
    } else if matches!(error, ClientError::NotFound { .. }) {
        NOT_FOUND
    } else {
        FAILURE
    }
}
