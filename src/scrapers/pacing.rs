use rand::Rng;
use std::time::Duration;

/// Random duration within `[lo, hi]` milliseconds
pub fn jitter((lo, hi): (u64, u64)) -> Duration {
    if hi <= lo {
        return Duration::from_millis(lo);
    }
    Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
}

/// Human-like pause between browser actions
pub async fn human_sleep(range: (u64, u64)) {
    let pause = jitter(range);
    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }
}
