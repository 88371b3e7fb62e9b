//! 시계열 포인트와 요약.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 요약 변동률 계산에 사용하는 기간 (일).
pub const CHANGE_WINDOW_DAYS: usize = 30;

/// 시계열의 한 지점.
///
/// 체인과 지표 종류별로 보관되며, 같은 타임스탬프에는 하나의 값만 존재합니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Unix 타임스탬프 (초)
    pub timestamp: i64,
    /// 지표 값 (TVL 또는 USD 가격)
    pub value: f64,
}

impl TimeSeriesPoint {
    /// 새 포인트 생성.
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// 타임스탬프의 UTC 시각.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// 타임스탬프의 UTC 날짜.
    pub fn date(&self) -> Option<NaiveDate> {
        self.datetime().map(|dt| dt.date_naive())
    }

    /// 저장용 날짜 문자열 (YYYY-MM-DD).
    pub fn date_label(&self) -> String {
        self.date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// 시계열을 타임스탬프 오름차순으로 정렬하고 중복 타임스탬프를 제거.
///
/// 같은 타임스탬프가 여러 번 나오면 나중 값이 남습니다.
pub fn normalize_series(mut points: Vec<TimeSeriesPoint>) -> Vec<TimeSeriesPoint> {
    // 안정 정렬이므로 같은 키 내 입력 순서가 유지됨
    points.sort_by_key(|p| p.timestamp);

    let mut normalized: Vec<TimeSeriesPoint> = Vec::with_capacity(points.len());
    for point in points {
        match normalized.last_mut() {
            Some(last) if last.timestamp == point.timestamp => *last = point,
            _ => normalized.push(point),
        }
    }
    normalized
}

/// 시계열 요약 (대시보드 지표 카드용).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// 가장 최근 값
    pub current: f64,
    /// 가장 최근 포인트의 타임스탬프
    pub as_of: i64,
    /// 30 포인트 전 대비 변동률 (%)
    ///
    /// 포인트가 30개 이하이거나 기준 값이 0이면 없음.
    pub change_30d_pct: Option<f64>,
}

impl SeriesSummary {
    /// 오름차순 시계열에서 요약 계산. 빈 시계열이면 `None`.
    pub fn from_series(points: &[TimeSeriesPoint]) -> Option<Self> {
        let last = points.last()?;

        let change_30d_pct = if points.len() > CHANGE_WINDOW_DAYS {
            let reference = points[points.len() - CHANGE_WINDOW_DAYS - 1].value;
            if reference == 0.0 {
                None
            } else {
                Some((last.value - reference) / reference * 100.0)
            }
        } else {
            None
        };

        Some(Self {
            current: last.value,
            as_of: last.timestamp,
            change_30d_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(1_700_000_000 + i as i64 * 86_400, *v))
            .collect()
    }

    #[test]
    fn test_date_label() {
        let point = TimeSeriesPoint::new(1_700_000_000, 1.0);
        assert_eq!(point.date_label(), "2023-11-14");
    }

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let points = vec![
            TimeSeriesPoint::new(3, 30.0),
            TimeSeriesPoint::new(1, 10.0),
            TimeSeriesPoint::new(3, 31.0),
            TimeSeriesPoint::new(2, 20.0),
        ];

        let normalized = normalize_series(points);
        assert_eq!(
            normalized,
            vec![
                TimeSeriesPoint::new(1, 10.0),
                TimeSeriesPoint::new(2, 20.0),
                TimeSeriesPoint::new(3, 31.0),
            ]
        );
    }

    #[test]
    fn test_summary_empty() {
        assert!(SeriesSummary::from_series(&[]).is_none());
    }

    #[test]
    fn test_summary_short_series_has_no_change() {
        let points = daily(&[1.0; 30]);
        let summary = SeriesSummary::from_series(&points).unwrap();
        assert_eq!(summary.current, 1.0);
        assert!(summary.change_30d_pct.is_none());
    }

    #[test]
    fn test_summary_change_uses_point_31_from_end() {
        let mut values = vec![100.0];
        values.extend(std::iter::repeat(105.0).take(29));
        values.push(110.0);
        let points = daily(&values);
        assert_eq!(points.len(), 31);

        let summary = SeriesSummary::from_series(&points).unwrap();
        assert_eq!(summary.current, 110.0);
        let change = summary.change_30d_pct.unwrap();
        assert!((change - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_zero_reference() {
        let mut values = vec![0.0];
        values.extend(std::iter::repeat(5.0).take(30));
        let summary = SeriesSummary::from_series(&daily(&values)).unwrap();
        assert!(summary.change_30d_pct.is_none());
    }
}
