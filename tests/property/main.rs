//! Property-test harness for the task engine.
//!
//! Case counts honor `PROPTEST_CASES`; CI runs the full defaults, local
//! runs are clamped down for fast iteration.

mod engine;
mod pool;
mod tsp;

pub fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}

pub fn proptest_cases(default: u32) -> u32 {
    if let Some(value) = env_u32("PROPTEST_CASES") {
        return value.max(1);
    }
    if std::env::var_os("CI").is_some() {
        return default.max(1);
    }
    default.clamp(1, 8)
}
