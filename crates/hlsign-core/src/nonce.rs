//! Nonces and expiry timestamps.
//!
//! A nonce is a millisecond timestamp. `NonceManager` hands out strictly
//! increasing values per signer so rapid or concurrent actions never share
//! one, even if the wall clock stalls or steps backwards.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Replay-protection nonce (unsigned milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(u64);

impl Nonce {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Accept a signed value from a loosely-typed boundary.
    ///
    /// # Errors
    /// `CoreError::NegativeTimestamp` if `value < 0`.
    pub fn from_signed(value: i64) -> CoreResult<Self> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| CoreError::NegativeTimestamp {
                field: "nonce",
                value,
            })
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// 8-byte big-endian encoding appended to the action preimage.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Nonce {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for Nonce {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_signed(value)
    }
}

/// Millisecond timestamp after which the exchange rejects the signed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpiresAfter(u64);

impl ExpiresAfter {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// # Errors
    /// `CoreError::NegativeTimestamp` if `value < 0`.
    pub fn from_signed(value: i64) -> CoreResult<Self> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| CoreError::NegativeTimestamp {
                field: "expiresAfter",
                value,
            })
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl TryFrom<i64> for ExpiresAfter {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_signed(value)
    }
}

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall-clock implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // Pre-epoch clocks clamp to zero; the counter still advances.
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Issues strictly increasing nonces seeded by wall-clock time.
///
/// `next()` returns `max(last + 1, now_ms)`. Safe to share across tasks.
pub struct NonceManager<C: Clock> {
    last: AtomicU64,
    clock: C,
}

impl<C: Clock> NonceManager<C> {
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            last: AtomicU64::new(0),
            clock,
        }
    }

    /// Next nonce for this signer.
    pub fn next(&self) -> Nonce {
        let now = self.clock.now_ms();
        loop {
            let current = self.last.load(Ordering::Acquire);
            let candidate = current.saturating_add(1).max(now);
            if self
                .last
                .compare_exchange_weak(current, candidate, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Nonce(candidate);
            }
        }
    }

    /// Last issued nonce, if any.
    #[must_use]
    pub fn last_issued(&self) -> Option<Nonce> {
        match self.last.load(Ordering::Acquire) {
            0 => None,
            n => Some(Nonce(n)),
        }
    }
}

impl NonceManager<SystemClock> {
    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(SystemClock)
    }
}

impl Default for NonceManager<SystemClock> {
    fn default() -> Self {
        Self::with_system_clock()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    struct FixedClock {
        time_ms: AtomicU64,
    }

    impl FixedClock {
        fn new(time_ms: u64) -> Self {
            Self {
                time_ms: AtomicU64::new(time_ms),
            }
        }

        fn set(&self, time_ms: u64) {
            self.time_ms.store(time_ms, Ordering::Release);
        }
    }

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.time_ms.load(Ordering::Acquire)
        }
    }

    const BASE_TIME: u64 = 1_700_000_000_000;

    #[test]
    fn test_negative_nonce_rejected() {
        assert_eq!(
            Nonce::from_signed(-1),
            Err(CoreError::NegativeTimestamp {
                field: "nonce",
                value: -1
            })
        );
        assert_eq!(Nonce::try_from(0i64).unwrap().value(), 0);
    }

    #[test]
    fn test_negative_expiry_rejected() {
        assert!(matches!(
            ExpiresAfter::from_signed(i64::MIN),
            Err(CoreError::NegativeTimestamp {
                field: "expiresAfter",
                ..
            })
        ));
    }

    #[test]
    fn test_nonce_big_endian_bytes() {
        let nonce = Nonce::new(BASE_TIME);
        assert_eq!(nonce.to_be_bytes(), [0, 0, 1, 0x8b, 0xcf, 0xe5, 0x68, 0]);
    }

    #[test]
    fn test_first_nonce_is_clock_time() {
        let manager = NonceManager::new(FixedClock::new(BASE_TIME));
        assert_eq!(manager.last_issued(), None);
        assert_eq!(manager.next(), Nonce::new(BASE_TIME));
        assert_eq!(manager.last_issued(), Some(Nonce::new(BASE_TIME)));
    }

    #[test]
    fn test_same_millisecond_still_increases() {
        let manager = NonceManager::new(FixedClock::new(BASE_TIME));
        let a = manager.next();
        let b = manager.next();
        let c = manager.next();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_clock_regression_does_not_decrease() {
        let manager = NonceManager::new(FixedClock::new(BASE_TIME));
        let before = manager.next();
        manager.clock.set(BASE_TIME - 60_000);
        let after = manager.next();
        assert!(after > before);
    }

    #[test]
    fn test_tracks_clock_when_it_moves_ahead() {
        let manager = NonceManager::new(FixedClock::new(BASE_TIME));
        manager.next();
        manager.clock.set(BASE_TIME + 5_000);
        assert_eq!(manager.next(), Nonce::new(BASE_TIME + 5_000));
    }

    #[test]
    fn test_concurrent_callers_never_collide() {
        let manager = Arc::new(NonceManager::new(FixedClock::new(BASE_TIME)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || (0..500).map(|_| manager.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<Nonce> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();

        assert_eq!(all.len(), total, "nonces must be unique across threads");
    }
}
