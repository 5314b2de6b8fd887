use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the unix timestamp embedded in signatures
pub trait Clock {
  /// Current unix timestamp in seconds
  fn now(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
/// Wall clock. A system time before the unix epoch reads as 0.
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> u64 {
    SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_secs())
      .unwrap_or_default()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Clock frozen at the given timestamp
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
  fn now(&self) -> u64 {
    self.0
  }
}

impl<C: Clock + ?Sized> Clock for &C {
  fn now(&self) -> u64 {
    (**self).now()
  }
}
