//! 비공개 API 호출용 nonce 생성기.
//!
//! Kraken은 같은 API 키로 들어온 요청의 nonce가 이전 값보다 커야만 받아들입니다.
//! 기본 구현은 나노초 시계로 시작하는 원자적 카운터이며, 동시 호출에서도
//! 같은 인스턴스가 같은 값이나 작은 값을 두 번 반환하지 않습니다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// nonce 생성 전략.
pub trait NonceSource: Send + Sync {
    /// 이 인스턴스가 이전에 반환한 모든 값보다 큰 nonce를 반환합니다.
    fn next_nonce(&self) -> u64;
}

/// 현재 시각을 나노초 단위로 제공하는 시계.
pub trait Clock: Send + Sync {
    fn now_nanos(&self) -> u64;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> u64 {
        // 1970년 이전 시계는 0으로 취급 (카운터가 단조성을 보장)
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}

/// 시계를 따라가는 단조 증가 nonce.
///
/// `max(last + 1, clock.now_nanos())`를 CAS 루프로 발급합니다.
pub struct MonotonicNonce<C: Clock = SystemClock> {
    last: AtomicU64,
    clock: C,
}

impl<C: Clock> MonotonicNonce<C> {
    /// 주어진 시계로 생성합니다. 카운터는 현재 시각에서 시작합니다.
    pub fn new(clock: C) -> Self {
        Self {
            last: AtomicU64::new(clock.now_nanos()),
            clock,
        }
    }
}

impl MonotonicNonce<SystemClock> {
    /// 시스템 시계로 생성합니다.
    pub fn with_system_clock() -> Self {
        Self::new(SystemClock)
    }
}

impl Default for MonotonicNonce<SystemClock> {
    fn default() -> Self {
        Self::with_system_clock()
    }
}

impl<C: Clock> NonceSource for MonotonicNonce<C> {
    fn next_nonce(&self) -> u64 {
        let now = self.clock.now_nanos();

        loop {
            let current = self.last.load(Ordering::Acquire);
            let next = current.saturating_add(1).max(now);

            match self
                .last
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(_) => continue,
            }
        }
    }
}

/// 고정 값에서 1씩 증가하는 결정적 nonce (테스트용).
#[derive(Debug)]
pub struct SequentialNonce {
    next: AtomicU64,
}

impl SequentialNonce {
    /// 첫 호출에서 `start`를 반환합니다.
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl NonceSource for SequentialNonce {
    fn next_nonce(&self) -> u64 {
        self.next.fetch_add(1, Ordering::AcqRel)
    }
}
