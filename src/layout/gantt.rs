use super::*;

pub(super) fn compute_gantt_layout(
    visible: &[&Node],
    levels: &HashMap<String, usize>,
    span: DateSpan,
    config: &LayoutConfig,
) -> GanttLayout {
    let bars = order_for_display(visible, levels, config)
        .into_iter()
        .map(|node| BarLayout {
            id: node.id.clone(),
            label: truncate_label(&node.title, config.title_max_chars),
            status: node.status,
            level: levels.get(node.id.as_str()).copied().unwrap_or(0),
            range: effective_range(node, config),
            geometry: layout_bar(node, &span, config),
        })
        .collect();

    GanttLayout {
        span,
        bars,
        ticks: axis_ticks(&span, config.axis_tick_count),
        reference_marker: marker_fraction(config.reference_date(), &span),
    }
}
