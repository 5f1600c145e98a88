use chrono::Utc;
use tessera_application::Clock;
use tessera_core::Timestamp;

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX))
    }
}
