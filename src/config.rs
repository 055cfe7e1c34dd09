use chrono::{Local, NaiveDate};

use crate::layout::timeline::MAX_AXIS_TICKS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How siblings (and roots) are ordered in the tree view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SiblingOrder {
    /// Order of appearance in the input collection.
    #[default]
    Input,
    /// Stable lexical order by node id.
    Id,
}

/// Default-substitution and geometry parameters for one layout computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    /// Duration substituted for a missing due date.
    pub default_duration_days: u32,
    /// Lower bound for a bar's width, as a fraction of the span.
    pub min_bar_width_fraction: f64,
    /// Date substituted for a missing start date. `None` means today.
    pub reference_date: Option<NaiveDate>,
    pub sibling_order: SiblingOrder,
    pub axis_tick_count: usize,
    pub title_max_chars: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_duration_days: 30,
            min_bar_width_fraction: 0.01,
            reference_date: None,
            sibling_order: SiblingOrder::Input,
            axis_tick_count: 4,
            title_max_chars: 30,
        }
    }
}

impl LayoutConfig {
    /// The date standing in for "now": the configured reference date or
    /// the local calendar date.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Copy with "now" resolved, so that every node in one computation is
    /// measured against the same day.
    pub fn pinned(&self) -> Self {
        Self {
            reference_date: Some(self.reference_date()),
            ..self.clone()
        }
    }

    pub fn min_bar_width(&self) -> f64 {
        if self.min_bar_width_fraction.is_finite() {
            self.min_bar_width_fraction.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub layout: LayoutConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    default_duration_days: Option<u32>,
    min_bar_width_fraction: Option<f64>,
    reference_date: Option<NaiveDate>,
    sibling_order: Option<SiblingOrder>,
    axis_tick_count: Option<usize>,
    title_max_chars: Option<usize>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a config document (JSON, or JSON5 as a fallback) and merges it over
/// the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|json5_err| anyhow::anyhow!("invalid config: {json_err}; as JSON5: {json5_err}"))?,
    };

    let mut config = Config::default();
    if let Some(v) = parsed.default_duration_days {
        config.layout.default_duration_days = v;
    }
    if let Some(v) = parsed.min_bar_width_fraction {
        if !(0.0..=1.0).contains(&v) {
            anyhow::bail!("minBarWidthFraction must be within [0, 1], got {v}");
        }
        config.layout.min_bar_width_fraction = v;
    }
    if let Some(v) = parsed.reference_date {
        config.layout.reference_date = Some(v);
    }
    if let Some(v) = parsed.sibling_order {
        config.layout.sibling_order = v;
    }
    if let Some(v) = parsed.axis_tick_count {
        if !(1..=MAX_AXIS_TICKS).contains(&v) {
            anyhow::bail!("axisTickCount must be within [1, {MAX_AXIS_TICKS}], got {v}");
        }
        config.layout.axis_tick_count = v;
    }
    if let Some(v) = parsed.title_max_chars {
        config.layout.title_max_chars = v;
    }
    Ok(config)
}
