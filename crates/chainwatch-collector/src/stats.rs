//! 갱신 통계 구조체.

use chainwatch_data::FetchSource;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 갱신 사이클 통계
///
/// 지표 조회 한 건(체인 × 지표)이 하나의 시도로 집계됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    /// 총 시도 횟수
    pub total: usize,
    /// 원격 소스에서 새로 가져온 횟수
    pub fetched: usize,
    /// 신선한 저장 데이터로 응답한 횟수
    pub cached: usize,
    /// 원격 실패로 저장 데이터를 사용한 횟수
    pub fallback: usize,
    /// 결과가 빈 시계열인 횟수
    pub empty: usize,
    /// 스냅샷에 담긴 총 포인트 수
    pub points: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CycleStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 조회 결과 하나를 집계
    pub fn record(&mut self, source: FetchSource, points: usize) {
        self.total += 1;
        match source {
            FetchSource::Cache => self.cached += 1,
            FetchSource::Remote => self.fetched += 1,
            FetchSource::Fallback => self.fallback += 1,
        }
        if points == 0 {
            self.empty += 1;
        }
        self.points += points;
    }

    /// 네트워크 성공률 계산 (%)
    ///
    /// 캐시 응답은 제외하며, 네트워크 시도가 없으면 100%.
    pub fn success_rate(&self) -> f64 {
        let attempts = self.fetched + self.fallback;
        if attempts == 0 {
            100.0
        } else {
            (self.fetched as f64 / attempts as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            fetched = self.fetched,
            cached = self.cached,
            fallback = self.fallback,
            empty = self.empty,
            points = self.points,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "갱신 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut stats = CycleStats::new();
        stats.record(FetchSource::Remote, 90);
        stats.record(FetchSource::Cache, 30);
        stats.record(FetchSource::Fallback, 0);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.fetched, 1);
        assert_eq!(stats.cached, 1);
        assert_eq!(stats.fallback, 1);
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.points, 120);
        assert!((stats.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_without_network() {
        let mut stats = CycleStats::new();
        stats.record(FetchSource::Cache, 10);
        assert_eq!(stats.success_rate(), 100.0);
    }
}
