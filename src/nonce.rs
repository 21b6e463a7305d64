use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of the per-render CSP nonce.
pub const NONCE_LEN: usize = 32;

/// A fresh nonce drawn from `[A-Za-z0-9]`.
///
/// Only uniqueness across renders matters here, so the thread-local RNG is
/// enough.
pub fn generate() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}
