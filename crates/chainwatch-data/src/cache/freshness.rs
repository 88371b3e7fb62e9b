//! 저장 데이터 신선도 판단.

use std::time::Duration;

/// 신선도 기준 (초). 마지막 포인트가 이보다 최근이면 재조회하지 않습니다.
pub const FRESHNESS_WINDOW_SECS: i64 = 86_400;

/// 최신 타임스탬프가 기준 시간 안에 있는지 확인.
///
/// 경계값(정확히 24시간 전)은 신선하지 않은 것으로 봅니다.
pub fn is_fresh(latest: i64, now: i64) -> bool {
    now - latest < FRESHNESS_WINDOW_SECS
}

/// 신선도 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    window: i64,
}

impl FreshnessPolicy {
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.as_secs() as i64,
        }
    }

    pub fn window_secs(&self) -> i64 {
        self.window
    }

    /// 저장된 데이터가 없으면 항상 신선하지 않음.
    pub fn is_fresh(&self, latest: Option<i64>, now: i64) -> bool {
        match latest {
            Some(ts) => now - ts < self.window,
            None => false,
        }
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            window: FRESHNESS_WINDOW_SECS,
        }
    }
}
