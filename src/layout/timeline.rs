use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use super::error::TimelineError;
use crate::config::LayoutConfig;
use crate::ir::Node;

/// A half-open run of calendar days, `end` exclusive of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Earliest start to latest end across a node set.
pub type DateSpan = DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarGeometry {
    pub offset_fraction: f64,
    pub width_fraction: f64,
    pub duration_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisTick {
    pub fraction: f64,
    pub date: NaiveDate,
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// The node's dates after default substitution: a missing start becomes the
/// reference date, a missing due date becomes start plus the default
/// duration, and anything shorter than one day is stretched to one day from
/// the start.
///
/// Callers laying out many nodes should pass a [`LayoutConfig::pinned`]
/// config so that "today" cannot move between nodes.
pub fn effective_range(node: &Node, config: &LayoutConfig) -> DateRange {
    let start = node.start_date.unwrap_or_else(|| config.reference_date());
    let end = node
        .due_date
        .unwrap_or_else(|| add_days(start, config.default_duration_days));
    if end > start {
        return DateRange { start, end };
    }
    match start.succ_opt() {
        Some(next) => DateRange { start, end: next },
        None => DateRange {
            start: start.pred_opt().unwrap_or(start),
            end: start,
        },
    }
}

pub fn compute_date_span<'n, I>(nodes: I, config: &LayoutConfig) -> Result<DateSpan, TimelineError>
where
    I: IntoIterator<Item = &'n Node>,
{
    let mut span: Option<DateSpan> = None;
    for node in nodes {
        let range = effective_range(node, config);
        span = Some(match span {
            Some(current) => DateSpan {
                start: current.start.min(range.start),
                end: current.end.max(range.end),
            },
            None => range,
        });
    }
    match span {
        Some(span) if span.duration_days() > 0 => Ok(span),
        _ => Err(TimelineError::EmptySpan),
    }
}

/// Bar position and width as fractions of `span`.
///
/// `offset_fraction` is `(start - span.start) / span_days` and
/// `width_fraction` is `duration / span_days`, with two exceptions. Widths
/// are floored to the configured minimum. A node lying inside the span
/// whose floored bar would run past the right edge has its offset moved to
/// `1 - width`, so its offset no longer equals the formula. Anything else is
/// plain arithmetic and may fall outside `[0, 1]`.
pub fn layout_bar(node: &Node, span: &DateSpan, config: &LayoutConfig) -> BarGeometry {
    let range = effective_range(node, config);
    let span_days = span.duration_days().max(1) as f64;
    let duration_days = range.duration_days();
    let mut offset_fraction = (range.start - span.start).num_days() as f64 / span_days;
    let raw_width = duration_days as f64 / span_days;
    let width_fraction = raw_width.max(config.min_bar_width());
    if width_fraction > raw_width && span.contains(&range) && offset_fraction + width_fraction > 1.0
    {
        offset_fraction = (1.0 - width_fraction).max(0.0);
    }
    BarGeometry {
        offset_fraction,
        width_fraction,
        duration_days,
    }
}

/// Stable sort by `(level, effective start)`. Nodes missing from `levels`
/// sort as roots.
pub fn order_for_display<'n>(
    nodes: &[&'n Node],
    levels: &HashMap<String, usize>,
    config: &LayoutConfig,
) -> Vec<&'n Node> {
    let mut ordered = nodes.to_vec();
    ordered.sort_by_cached_key(|node| {
        (
            levels.get(node.id.as_str()).copied().unwrap_or(0),
            effective_range(node, config).start,
        )
    });
    ordered
}

/// Upper bound on axis intervals, whatever the caller asks for.
pub const MAX_AXIS_TICKS: usize = 366;

/// `count + 1` evenly spaced ticks from span start to span end. `count` is
/// capped at [`MAX_AXIS_TICKS`] and at one interval per day of the span.
pub fn axis_ticks(span: &DateSpan, count: usize) -> Vec<AxisTick> {
    let span_days = span.duration_days().max(1);
    let per_day = usize::try_from(span_days).unwrap_or(usize::MAX);
    let count = count.clamp(1, MAX_AXIS_TICKS).min(per_day);
    (0..=count)
        .map(|i| {
            let offset = (span_days as f64 * i as f64 / count as f64).round() as u32;
            AxisTick {
                fraction: offset as f64 / span_days as f64,
                date: add_days(span.start, offset),
            }
        })
        .collect()
}

/// Where `date` falls in the span, if it falls inside at all.
pub fn marker_fraction(date: NaiveDate, span: &DateSpan) -> Option<f64> {
    if date < span.start || date > span.end {
        return None;
    }
    Some((date - span.start).num_days() as f64 / span.duration_days().max(1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            reference_date: Some(date(2024, 3, 1)),
            ..LayoutConfig::default()
        }
    }

    fn task(id: &str, start: Option<NaiveDate>, due: Option<NaiveDate>) -> Node {
        Node::new(id, None).with_dates(start, due)
    }

    #[test]
    fn missing_due_gets_default_duration() {
        let node = task("E1", Some(date(2024, 1, 1)), None);
        let range = effective_range(&node, &config());
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 1, 31));
        assert_eq!(range.duration_days(), 30);
    }

    #[test]
    fn missing_start_uses_reference_date() {
        let node = task("A", None, None);
        let range = effective_range(&node, &config());
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 3, 31));

        let node = task("B", None, Some(date(2024, 3, 11)));
        assert_eq!(effective_range(&node, &config()).duration_days(), 10);
    }

    #[test]
    fn same_day_and_inverted_ranges_clamp_to_one_day() {
        let same = task("A", Some(date(2024, 6, 1)), Some(date(2024, 6, 1)));
        let range = effective_range(&same, &config());
        assert_eq!(range.start, date(2024, 6, 1));
        assert_eq!(range.duration_days(), 1);

        let inverted = task("B", Some(date(2024, 6, 10)), Some(date(2024, 6, 1)));
        let range = effective_range(&inverted, &config());
        assert_eq!(range.start, date(2024, 6, 10));
        assert_eq!(range.end, date(2024, 6, 11));
    }

    #[test]
    fn zero_default_duration_still_yields_a_day() {
        let config = LayoutConfig {
            default_duration_days: 0,
            ..config()
        };
        let node = task("A", Some(date(2024, 6, 1)), None);
        assert_eq!(effective_range(&node, &config).duration_days(), 1);
    }

    #[test]
    fn range_at_calendar_limit_is_total() {
        let node = task("A", Some(NaiveDate::MAX), None);
        let range = effective_range(&node, &config());
        assert_eq!(range.duration_days(), 1);
    }

    #[test]
    fn span_covers_every_effective_range() {
        let nodes = vec![
            task("A", Some(date(2024, 1, 10)), Some(date(2024, 2, 1))),
            task("B", Some(date(2024, 1, 1)), None),
            task("C", Some(date(2024, 2, 20)), Some(date(2024, 2, 25))),
        ];
        let span = compute_date_span(&nodes, &config()).unwrap();
        assert_eq!(span.start, date(2024, 1, 1));
        assert_eq!(span.end, date(2024, 2, 25));
    }

    #[test]
    fn empty_collection_has_no_span() {
        let nodes: Vec<Node> = Vec::new();
        assert_eq!(
            compute_date_span(&nodes, &config()),
            Err(TimelineError::EmptySpan)
        );
    }

    #[test]
    fn bar_fractions_are_relative_to_span() {
        let nodes = vec![
            task("A", Some(date(2024, 1, 1)), Some(date(2024, 1, 11))),
            task("B", Some(date(2024, 1, 6)), Some(date(2024, 1, 21))),
        ];
        let config = config();
        let span = compute_date_span(&nodes, &config).unwrap();
        assert_eq!(span.duration_days(), 20);
        let a = layout_bar(&nodes[0], &span, &config);
        assert_eq!(a.offset_fraction, 0.0);
        assert_eq!(a.width_fraction, 0.5);
        assert_eq!(a.duration_days, 10);
        let b = layout_bar(&nodes[1], &span, &config);
        assert_eq!(b.offset_fraction, 0.25);
        assert_eq!(b.width_fraction, 0.75);
    }

    #[test]
    fn short_bar_is_floored_to_minimum_width() {
        let nodes = vec![
            task("long", Some(date(2020, 1, 1)), Some(date(2022, 9, 27))),
            task("day", Some(date(2021, 6, 1)), Some(date(2021, 6, 1))),
        ];
        let config = config();
        let span = compute_date_span(&nodes, &config).unwrap();
        assert_eq!(span.duration_days(), 1000);
        let bar = layout_bar(&nodes[1], &span, &config);
        assert_eq!(bar.duration_days, 1);
        assert_eq!(bar.width_fraction, 0.01);
    }

    #[test]
    fn floored_bar_at_span_end_stays_inside() {
        let nodes = vec![
            task("long", Some(date(2020, 1, 1)), Some(date(2022, 9, 26))),
            task("last", Some(date(2022, 9, 26)), Some(date(2022, 9, 27))),
        ];
        let config = config();
        let span = compute_date_span(&nodes, &config).unwrap();
        let bar = layout_bar(&nodes[1], &span, &config);
        let raw_offset = (date(2022, 9, 26) - span.start).num_days() as f64 / 1000.0;
        assert!((raw_offset - 0.999).abs() < 1e-9);
        assert!((bar.offset_fraction - 0.99).abs() < 1e-9);
        assert!(bar.offset_fraction + bar.width_fraction <= 1.0 + 1e-9);
    }

    #[test]
    fn nodes_outside_span_are_not_clamped() {
        let inside = vec![task("A", Some(date(2024, 1, 1)), Some(date(2024, 1, 11)))];
        let config = config();
        let span = compute_date_span(&inside, &config).unwrap();
        let later = task("B", Some(date(2024, 1, 21)), Some(date(2024, 1, 31)));
        let bar = layout_bar(&later, &span, &config);
        assert_eq!(bar.offset_fraction, 2.0);
        assert_eq!(bar.width_fraction, 1.0);
    }

    #[test]
    fn display_order_is_level_then_start_and_stable() {
        let e1 = task("E1", Some(date(2024, 2, 1)), None);
        let e2 = task("E2", Some(date(2024, 1, 1)), None);
        let s1 = task("S1", Some(date(2024, 1, 15)), None);
        let s2 = task("S2", Some(date(2024, 1, 15)), None);
        let levels: HashMap<String, usize> = [("E1", 0), ("E2", 0), ("S1", 1), ("S2", 1)]
            .into_iter()
            .map(|(id, level)| (id.to_string(), level))
            .collect();
        let input = vec![&s2, &e1, &s1, &e2];
        let ordered: Vec<&str> = order_for_display(&input, &levels, &config())
            .into_iter()
            .map(|node| node.id.as_str())
            .collect();
        assert_eq!(ordered, vec!["E2", "E1", "S2", "S1"]);
    }

    #[test]
    fn ticks_cover_span_ends() {
        let span = DateSpan {
            start: date(2024, 1, 1),
            end: date(2024, 1, 21),
        };
        let ticks = axis_ticks(&span, 4);
        assert_eq!(ticks.len(), 5);
        assert_eq!(ticks[0].date, date(2024, 1, 1));
        assert_eq!(ticks[2].date, date(2024, 1, 11));
        assert_eq!(ticks[4].date, date(2024, 1, 21));
        assert_eq!(ticks[4].fraction, 1.0);
    }

    #[test]
    fn oversized_tick_count_is_capped() {
        let short = DateSpan {
            start: date(2024, 1, 1),
            end: date(2024, 1, 4),
        };
        let ticks = axis_ticks(&short, usize::MAX);
        assert_eq!(ticks.len(), 4);
        assert_eq!(ticks[3].date, date(2024, 1, 4));

        let long = DateSpan {
            start: date(2000, 1, 1),
            end: date(2030, 1, 1),
        };
        assert_eq!(axis_ticks(&long, usize::MAX).len(), MAX_AXIS_TICKS + 1);
        assert_eq!(axis_ticks(&long, 0).len(), 2);
    }

    #[test]
    fn marker_only_inside_span() {
        let span = DateSpan {
            start: date(2024, 1, 1),
            end: date(2024, 1, 11),
        };
        assert_eq!(marker_fraction(date(2024, 1, 6), &span), Some(0.5));
        assert_eq!(marker_fraction(date(2023, 12, 31), &span), None);
        assert_eq!(marker_fraction(date(2024, 1, 12), &span), None);
    }
}
