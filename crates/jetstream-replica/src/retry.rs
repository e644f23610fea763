//! Bounded retry loop with a fixed inter-attempt delay

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Run `op` up to `max_attempts` times, sleeping `delay` between attempts.
///
/// `retryable` classifies errors: an error it rejects ends the loop
/// immediately, without sleeping, and is returned with the attempt number it
/// occurred on. Returns the successful value together with the attempt number
/// that produced it, or the final error together with the number of attempts
/// made. There is no cross-attempt deadline: retries continue until the
/// attempt budget is exhausted regardless of elapsed wall time.
pub(crate) async fn retry_with_delay<T, E, F, Fut, R>(
   max_attempts: u32,
   delay: Duration,
   mut op: F,
   retryable: R,
) -> Result<(T, u32), (E, u32)>
where
   E: std::fmt::Display,
   F: FnMut(u32) -> Fut,
   Fut: Future<Output = Result<T, E>>,
   R: Fn(&E) -> bool,
{
   let max_attempts = max_attempts.max(1);
   let mut last_error = None;

   for attempt in 1..=max_attempts {
      match op(attempt).await {
         Ok(value) => return Ok((value, attempt)),
         Err(e) => {
            if !retryable(&e) {
               return Err((e, attempt));
            }
            warn!("secondary attempt {attempt}/{max_attempts} failed: {e}");
            last_error = Some(e);
            if attempt < max_attempts {
               sleep(delay).await;
            }
         }
      }
   }

   // max_attempts >= 1, so at least one error was recorded
   match last_error {
      Some(e) => Err((e, max_attempts)),
      None => unreachable!("retry loop ran zero attempts"),
   }
}
