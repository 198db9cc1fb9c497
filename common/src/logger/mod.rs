mod init;
mod trace_id;

pub use init::init_logger;
pub use trace_id::TraceId;

use std::time::Duration;

/// Awaits `fut`, logging a warning if it took longer than `max`.
///
/// Wrap store and provider calls with this so slow persistence or a slow
/// external API shows up in the logs without changing behavior.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = std::time::Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
