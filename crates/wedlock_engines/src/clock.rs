#![forbid(unsafe_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use wedlock_kernel_contracts::UnixTimeSec;

/// External wall-clock collaborator. All temporal gating in the kernel
/// reads this port at call time; nothing is scheduled.
pub trait Clock {
    fn now(&self) -> UnixTimeSec;

    fn day_start(&self, ts: UnixTimeSec) -> UnixTimeSec {
        ts.day_start()
    }

    fn day_end(&self, ts: UnixTimeSec) -> UnixTimeSec {
        ts.day_end()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UnixTimeSec {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        UnixTimeSec(since_epoch.as_secs())
    }
}

/// Settable clock for tests and deterministic replay.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: UnixTimeSec,
}

impl FixedClock {
    pub fn at(now: UnixTimeSec) -> Self {
        Self { now }
    }

    pub fn set(&mut self, now: UnixTimeSec) {
        self.now = now;
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now = UnixTimeSec(self.now.0 + seconds);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> UnixTimeSec {
        self.now
    }
}
