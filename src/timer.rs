//! Monotonic counter derived from host time, with an offset tests can push forward.

/// Counter ticks per second.
pub const COUNTER_RATE_HZ: u64 = 1_000_000;

/// Source of host elapsed time.
pub trait HostClock {
    /// Nanoseconds since an arbitrary fixed point, never decreasing.
    fn nanos(&self) -> u64;
}

impl<C: HostClock + ?Sized> HostClock for &C {
    fn nanos(&self) -> u64 {
        (**self).nanos()
    }
}

#[cfg(feature = "std")]
static PROCESS_START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();

/// Host clock measuring from the first time any clock in this process was created.
///
/// Every instance shares that starting point, so all counters agree with each other.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug)]
pub struct StdClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        Self {
            start: *PROCESS_START.get_or_init(std::time::Instant::now),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl HostClock for StdClock {
    fn nanos(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Microsecond counter: host time plus an injected offset.
///
/// The offset starts at zero on every run and is only ever increased.
pub struct Counter<C: HostClock> {
    clock: C,
    /// Accumulated offset in milliseconds.
    offset_ms: u64,
}

impl<C: HostClock> Counter<C> {
    pub const fn new(clock: C) -> Self {
        Self {
            clock,
            offset_ms: 0,
        }
    }

    /// Pretend `delta_ms` milliseconds have passed. Applies to every later [`Counter::read`].
    pub fn add_offset(&mut self, delta_ms: u64) {
        self.offset_ms = self.offset_ms.saturating_add(delta_ms);
    }

    pub fn offset_ms(&self) -> u64 {
        self.offset_ms
    }

    /// Current counter value in ticks of [`COUNTER_RATE_HZ`].
    pub fn read(&self) -> u64 {
        (self.clock.nanos() / 1000).saturating_add(self.offset_ms.saturating_mul(1000))
    }
}

#[cfg(feature = "std")]
impl Counter<StdClock> {
    pub fn host() -> Self {
        Self::new(StdClock::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockClock;

    #[test]
    fn counts_in_microseconds() {
        let clock = MockClock::new();
        let counter = Counter::new(&clock);

        assert_eq!(counter.read(), 0);
        clock.advance(2_500_999);
        assert_eq!(counter.read(), 2_500);
    }

    #[test]
    fn offset_applies_immediately() {
        let clock = MockClock::new();
        clock.advance(7_000);
        let mut counter = Counter::new(&clock);

        let before = counter.read();
        counter.add_offset(15);
        let after = counter.read();

        assert_eq!(after - before, 15_000);
        assert!(after - before >= 15);
        assert_eq!(counter.offset_ms(), 15);
    }

    #[test]
    fn offset_saturates() {
        let mut counter = Counter::new(MockClock::new());
        counter.add_offset(u64::MAX);
        counter.add_offset(1);
        assert_eq!(counter.read(), u64::MAX);
    }

    #[cfg(feature = "std")]
    #[test]
    fn host_counter_never_goes_back() {
        let mut counter = Counter::host();

        let mut last = counter.read();
        for _ in 0..1000 {
            let now = counter.read();
            assert!(now >= last);
            last = now;
        }

        counter.add_offset(1);
        assert!(counter.read() >= last + 1000);
    }

    #[cfg(feature = "std")]
    #[test]
    fn host_counters_share_a_start() {
        let first = Counter::host();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let early = first.read();

        let second = Counter::host();
        assert!(early >= 5_000);
        assert!(second.read() >= early);
    }
}
