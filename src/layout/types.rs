use chrono::NaiveDate;
use std::collections::HashMap;

use super::error::{DataIntegrityIssue, TimelineError};
use super::summary::Summary;
use super::timeline::{AxisTick, BarGeometry, DateRange, DateSpan};
use crate::ir::{Rag, Status};

/// One line of the tree view.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub id: String,
    pub label: String,
    pub title: String,
    pub status: Status,
    pub rag: Option<Rag>,
    pub level: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub id: String,
    pub label: String,
    pub status: Status,
    pub level: usize,
    pub range: DateRange,
    pub geometry: BarGeometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GanttLayout {
    pub span: DateSpan,
    pub bars: Vec<BarLayout>,
    pub ticks: Vec<AxisTick>,
    /// Position of the reference date ("today") when it falls in the span.
    pub reference_marker: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineData {
    Gantt(GanttLayout),
    /// Nothing visible carries a usable date range.
    Empty,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub reference_date: NaiveDate,
    pub rows: Vec<RowLayout>,
    pub levels: HashMap<String, usize>,
    pub timeline: TimelineData,
    pub issues: Vec<DataIntegrityIssue>,
    pub summary: Summary,
}

impl Layout {
    pub fn visible_ids(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.id.as_str()).collect()
    }

    pub fn gantt(&self) -> Result<&GanttLayout, TimelineError> {
        match &self.timeline {
            TimelineData::Gantt(gantt) => Ok(gantt),
            TimelineData::Empty => Err(TimelineError::EmptySpan),
        }
    }
}
