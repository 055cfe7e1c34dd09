use crate::ir::{Rag, Status};
use crate::layout::{
    AxisTick, BarGeometry, DataIntegrityIssue, DateRange, DateSpan, Layout, Summary, TimelineData,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub reference_date: NaiveDate,
    pub summary: Summary,
    pub issues: Vec<DataIntegrityIssue>,
    pub rows: Vec<RowDump>,
    pub levels: BTreeMap<String, usize>,
    pub gantt: Option<GanttDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDump {
    pub id: String,
    pub label: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rag: Option<Rag>,
    pub level: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub effective: DateRange,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarDump {
    pub id: String,
    pub label: String,
    pub status: Status,
    pub level: usize,
    pub effective: DateRange,
    #[serde(flatten)]
    pub geometry: BarGeometry,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttDump {
    pub span: DateSpan,
    pub span_days: i64,
    pub reference_marker: Option<f64>,
    pub ticks: Vec<AxisTick>,
    pub bars: Vec<BarDump>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let rows = layout
            .rows
            .iter()
            .map(|row| RowDump {
                id: row.id.clone(),
                label: row.label.clone(),
                status: row.status,
                rag: row.rag,
                level: row.level,
                has_children: row.has_children,
                expanded: row.expanded,
                start_date: row.start_date,
                due_date: row.due_date,
                effective: row.range,
            })
            .collect();

        let gantt = match &layout.timeline {
            TimelineData::Gantt(gantt) => Some(GanttDump {
                span: gantt.span,
                span_days: gantt.span.duration_days(),
                reference_marker: gantt.reference_marker,
                ticks: gantt.ticks.clone(),
                bars: gantt
                    .bars
                    .iter()
                    .map(|bar| BarDump {
                        id: bar.id.clone(),
                        label: bar.label.clone(),
                        status: bar.status,
                        level: bar.level,
                        effective: bar.range,
                        geometry: bar.geometry,
                    })
                    .collect(),
            }),
            TimelineData::Empty => None,
        };

        LayoutDump {
            reference_date: layout.reference_date,
            summary: layout.summary.clone(),
            issues: layout.issues.clone(),
            rows,
            levels: layout
                .levels
                .iter()
                .map(|(id, level)| (id.clone(), *level))
                .collect(),
            gantt,
        }
    }
}

pub fn write_layout_json<W: Write>(writer: W, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_layout_json(&mut writer, layout)?;
    writer.flush()?;
    Ok(())
}
