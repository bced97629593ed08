//! Bounded retries for multi-step bus transactions.
//!
//! Bus primitives never retry on their own. Layers that string several
//! primitives together (ROM search, sensor reads) wrap one complete attempt in
//! [`retry`] and decide afterwards what an exhausted budget means to them.

use core::fmt::Debug;

/// Runs `op` up to `attempts` times, until it succeeds or fails with an error
/// for which `retryable` returns `false`.
///
/// `op` receives the zero-based attempt number. The error of the last attempt
/// is returned when the budget runs out, so a caller can tell exhaustion apart
/// from an aborted run by asking `retryable` again. At least one attempt is
/// always made.
pub fn retry<T, E, F, P>(attempts: u8, retryable: P, mut op: F) -> Result<T, E>
where
    E: Debug,
    F: FnMut(u8) -> Result<T, E>,
    P: Fn(&E) -> bool,
{
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if retryable(&err) && attempt + 1 < attempts => {
                log::debug!("attempt {}/{} failed: {:?}", attempt + 1, attempts, err);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
