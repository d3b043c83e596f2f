//! Shared-axis scaling for the backtest line chart and the allocation timeline.
//!
//! [`normalize_series`] maps any number of equal-length series into one
//! `width × height` box. The vertical scale is computed over *all* series
//! together so the lines stay comparable; the y axis points down.

use crate::core::config::ChartFrame;
use crate::core::error::SeriesError;
use crate::snapshot::model::HistoryPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
}

impl Polyline {
    /// `points` attribute for an SVG `<polyline>`.
    pub fn svg_points(&self) -> String {
        self.points
            .iter()
            .map(|p| format!("{},{}", trim_float(p.x), trim_float(p.y)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn trim_float(value: f64) -> String {
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Scale `series` into `frame`. All series must have the same length.
pub fn normalize_series(
    series: &[&[f64]],
    frame: ChartFrame,
) -> Result<Vec<Polyline>, SeriesError> {
    let Some(first) = series.first() else {
        return Ok(Vec::new());
    };
    let len = first.len();
    if let Some((index, found)) = series
        .iter()
        .enumerate()
        .find(|(_, s)| s.len() != len)
        .map(|(index, s)| (index, s.len()))
    {
        return Err(SeriesError::LengthMismatch {
            index,
            expected: len,
            found,
        });
    }

    let (min, max) = series
        .iter()
        .flat_map(|s| s.iter().copied())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let span = max - min;
    let flat = !span.is_finite() || span == 0.0;

    let x_at = |i: usize| -> f64 {
        if len == 1 {
            frame.width / 2.0
        } else {
            i as f64 / (len - 1) as f64 * frame.width
        }
    };
    let y_at = |value: f64| -> f64 {
        if flat || !value.is_finite() {
            frame.height / 2.0
        } else {
            frame.height - ((value - min) / span) * frame.height
        }
    };

    Ok(series
        .iter()
        .map(|s| Polyline {
            points: s
                .iter()
                .enumerate()
                .map(|(i, value)| Point {
                    x: x_at(i),
                    y: y_at(*value),
                })
                .collect(),
        })
        .collect())
}

/// The three valuations plotted on the backtest chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSeries {
    Strategy,
    BuyHold,
    Bond,
}

impl ChartSeries {
    pub const ALL: [ChartSeries; 3] = [
        ChartSeries::Strategy,
        ChartSeries::BuyHold,
        ChartSeries::Bond,
    ];

    pub fn value(self, point: &HistoryPoint) -> f64 {
        match self {
            ChartSeries::Strategy => point.strategy_value,
            ChartSeries::BuyHold => point.buy_hold_value,
            ChartSeries::Bond => point.bond_value,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ChartSeries::Strategy => "#22d3ee",
            ChartSeries::BuyHold => "#f97316",
            ChartSeries::Bond => "#f472b6",
        }
    }

    /// `stroke-dasharray`, if the line is dashed.
    pub fn dash(self) -> Option<&'static str> {
        match self {
            ChartSeries::Strategy => None,
            ChartSeries::BuyHold => Some("4"),
            ChartSeries::Bond => Some("2"),
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            ChartSeries::Strategy => "chart-series-strategy",
            ChartSeries::BuyHold => "chart-series-buy-hold",
            ChartSeries::Bond => "chart-series-bond",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub series: ChartSeries,
    pub polyline: Polyline,
    /// Last value of the series, shown next to the chart.
    pub final_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestChart {
    pub lines: Vec<ChartLine>,
    pub months: usize,
    pub first_date: String,
    pub last_date: String,
    pub frame: ChartFrame,
}

impl BacktestChart {
    /// `None` for an empty history: the chart is simply not drawn.
    pub fn from_history(history: &[HistoryPoint], frame: ChartFrame) -> Option<Self> {
        let (first, last) = (history.first()?, history.last()?);

        let columns: Vec<Vec<f64>> = ChartSeries::ALL
            .iter()
            .map(|series| history.iter().map(|p| series.value(p)).collect())
            .collect();
        let borrowed: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
        let polylines = normalize_series(&borrowed, frame).ok()?;

        let lines = ChartSeries::ALL
            .iter()
            .zip(polylines)
            .map(|(series, polyline)| ChartLine {
                series: *series,
                polyline,
                final_value: series.value(last),
            })
            .collect();

        Some(Self {
            lines,
            months: history.len(),
            first_date: first.date.clone(),
            last_date: last.date.clone(),
            frame,
        })
    }

    pub fn line(&self, series: ChartSeries) -> Option<&ChartLine> {
        self.lines.iter().find(|line| line.series == series)
    }

    /// Horizontal guide through the middle of the chart.
    pub fn midline_y(&self) -> f64 {
        self.frame.height / 2.0
    }
}

/// Pixels of bar height per allocation percentage point.
pub const TIMELINE_PX_PER_PCT: f64 = 0.4;

/// Allocations above this show their number inside the bar.
pub const TIMELINE_LABEL_MIN_PCT: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBar {
    pub tick: String,
    pub allocation_pct: f64,
    pub height_px: f64,
    pub correct: bool,
    pub show_value: bool,
}

/// Recommended equity share per backtest month, colored by hit/miss.
pub fn allocation_timeline(history: &[HistoryPoint]) -> Vec<TimelineBar> {
    history
        .iter()
        .map(|point| TimelineBar {
            tick: tick_label(&point.date),
            allocation_pct: point.allocation_pct,
            height_px: point.allocation_pct * TIMELINE_PX_PER_PCT,
            correct: point.predicted_correct,
            show_value: point.allocation_pct > TIMELINE_LABEL_MIN_PCT,
        })
        .collect()
}

/// Last two characters of the date (`"2025-03"` -> `"03"`).
fn tick_label(date: &str) -> String {
    let chars: Vec<char> = date.chars().collect();
    chars[chars.len().saturating_sub(2)..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: ChartFrame = ChartFrame {
        width: 300.0,
        height: 100.0,
    };

    fn point(date: &str, strategy: f64, buy_hold: f64, bond: f64) -> HistoryPoint {
        HistoryPoint {
            date: date.to_string(),
            allocation_pct: 60.0,
            predicted_correct: true,
            strategy_value: strategy,
            buy_hold_value: buy_hold,
            bond_value: bond,
        }
    }

    #[test]
    fn uses_one_scale_across_all_series() {
        let strategy = [100.0, 120.0];
        let buy_hold = [100.0, 140.0];
        let bond = [100.0, 100.0];
        let lines = normalize_series(&[&strategy, &buy_hold, &bond], FRAME).unwrap();

        assert_eq!(lines[0].points[0], Point { x: 0.0, y: 100.0 });
        assert_eq!(lines[1].points[1], Point { x: 300.0, y: 0.0 });
        // 120 is halfway between the global min (100) and max (140).
        assert_eq!(lines[0].points[1].y, 50.0);
        assert!(lines[2].points.iter().all(|p| p.y == 100.0));
    }

    #[test]
    fn y_values_stay_inside_the_frame() {
        let a = [3.0, -2.0, 8.5, 4.0, 7.0];
        let b = [1.0, 1.5, 2.0, 9.0, -4.0];
        let c = [0.0, 0.0, 0.0, 0.0, 0.0];
        for line in normalize_series(&[&a, &b, &c], FRAME).unwrap() {
            assert_eq!(line.len(), 5);
            assert!(line.points.iter().all(|p| (0.0..=100.0).contains(&p.y)));
            assert!(line.points.windows(2).all(|w| w[1].x > w[0].x));
        }
    }

    #[test]
    fn flat_input_sits_on_the_midline() {
        let same = [105.0, 105.0, 105.0];
        let lines = normalize_series(&[&same, &same, &same], FRAME).unwrap();
        assert!(lines
            .iter()
            .flat_map(|line| line.points.iter())
            .all(|p| p.y == 50.0));
    }

    #[test]
    fn single_point_is_centered() {
        let lines = normalize_series(&[&[100.0], &[90.0], &[95.0]], FRAME).unwrap();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.len(), 1);
            assert_eq!(line.points[0].x, 150.0);
        }
        assert_eq!(lines[0].points[0].y, 0.0);
        assert_eq!(lines[1].points[0].y, 100.0);
    }

    #[test]
    fn mismatched_lengths_are_reported() {
        let err = normalize_series(&[&[1.0, 2.0], &[1.0]], FRAME).unwrap_err();
        assert_eq!(
            err,
            SeriesError::LengthMismatch {
                index: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn empty_series_produce_empty_lines() {
        let empty: [f64; 0] = [];
        let lines = normalize_series(&[&empty, &empty], FRAME).unwrap();
        assert!(lines.iter().all(Polyline::is_empty));
        assert!(normalize_series(&[], FRAME).unwrap().is_empty());
    }

    #[test]
    fn svg_points_are_compact() {
        let line = Polyline {
            points: vec![Point { x: 0.0, y: 100.0 }, Point { x: 150.0, y: 33.3333 }],
        };
        assert_eq!(line.svg_points(), "0,100 150,33.333");
    }

    #[test]
    fn backtest_chart_keeps_series_order_and_final_values() {
        let history = vec![
            point("2025-01", 100.0, 100.0, 100.0),
            point("2025-02", 104.0, 97.0, 100.4),
            point("2025-03", 108.4, 105.1, 100.9),
        ];
        let chart = BacktestChart::from_history(&history, FRAME).unwrap();

        assert_eq!(chart.months, 3);
        assert_eq!(chart.first_date, "2025-01");
        assert_eq!(chart.last_date, "2025-03");
        let order: Vec<_> = chart.lines.iter().map(|l| l.series).collect();
        assert_eq!(order, ChartSeries::ALL.to_vec());
        assert_eq!(chart.line(ChartSeries::BuyHold).unwrap().final_value, 105.1);
        // Strategy ends on the global max.
        assert_eq!(chart.line(ChartSeries::Strategy).unwrap().polyline.points[2].y, 0.0);
    }

    #[test]
    fn no_history_means_no_chart() {
        assert!(BacktestChart::from_history(&[], FRAME).is_none());
        assert!(allocation_timeline(&[]).is_empty());
    }

    #[test]
    fn timeline_bars_scale_and_label() {
        let mut history = vec![point("2025-01", 1.0, 1.0, 1.0), point("2025-12", 1.0, 1.0, 1.0)];
        history[0].allocation_pct = 80.0;
        history[1].allocation_pct = 40.0;
        history[1].predicted_correct = false;

        let bars = allocation_timeline(&history);
        assert_eq!(bars[0].tick, "01");
        assert_eq!(bars[0].height_px, 32.0);
        assert!(bars[0].show_value);
        assert_eq!(bars[1].tick, "12");
        assert!(!bars[1].show_value);
        assert!(!bars[1].correct);
    }
}
