use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Seconds since the unix epoch
pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

pub fn ms_since(start: &Instant) -> f32 {
    start.elapsed().as_secs_f32() * 1000.0
}
