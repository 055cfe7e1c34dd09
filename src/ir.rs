use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

/// Workflow state of a ticket. The engine never branches on it; it is carried
/// through to the renderer and counted by the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Status {
    Done,
    InProgress,
    #[default]
    Todo,
}

impl Status {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "done" => Self::Done,
            "in progress" | "in_progress" | "inprogress" | "in-progress" => Self::InProgress,
            _ => Self::Todo,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Done => "Done",
            Self::InProgress => "In Progress",
            Self::Todo => "TO DO",
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(serde_json::Value::String(s)) => Status::from_token(&s),
            _ => Status::Todo,
        })
    }
}

/// Red/amber/green health flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rag {
    Green,
    Amber,
    Red,
}

impl Rag {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "green" => Some(Self::Green),
            "amber" | "yellow" => Some(Self::Amber),
            "red" => Some(Self::Red),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Amber => "Amber",
            Self::Red => "Red",
        }
    }
}

impl Serialize for Rag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

fn deserialize_rag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Rag>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Rag::from_token(&s),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(alias = "ticket_id")]
    pub id: String,
    #[serde(
        default,
        alias = "parent",
        alias = "parent_id",
        deserialize_with = "deserialize_parent",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<String>,
    #[serde(default, alias = "summary")]
    pub title: String,
    #[serde(default)]
    pub status: Status,
    #[serde(
        default,
        alias = "start_date",
        deserialize_with = "deserialize_lenient_date"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(default, alias = "due_date", deserialize_with = "deserialize_lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "deserialize_rag",
        skip_serializing_if = "Option::is_none"
    )]
    pub rag: Option<Rag>,
}

impl Node {
    pub fn new(id: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id
                .filter(|parent| !parent.is_empty())
                .map(str::to_string),
            title: String::new(),
            status: Status::Todo,
            start_date: None,
            due_date: None,
            rag: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, due: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.due_date = due;
        self
    }

    pub fn with_rag(mut self, rag: Rag) -> Self {
        self.rag = Some(rag);
        self
    }

    /// Parent reference with empty strings folded into "no parent".
    pub fn parent(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|parent| !parent.is_empty())
    }
}

fn deserialize_parent<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn deserialize_lenient_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Parses a calendar date, ignoring any trailing time-of-day part.
/// Returns `None` for anything that is not a recognizable date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(stamp.date());
    }
    let date_part = value
        .split(|ch: char| ch == 'T' || ch.is_whitespace())
        .next()
        .unwrap_or(value);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

/// A node collection together with the expanded ids stored next to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDocument {
    pub nodes: Vec<Node>,
    pub expanded: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
    Bare(Vec<Node>),
    Wrapped {
        nodes: Vec<Node>,
        #[serde(default)]
        expanded: Vec<String>,
    },
}

pub fn parse_nodes(input: &str) -> anyhow::Result<NodeDocument> {
    let parsed: DocumentFile = serde_json::from_str(input)?;
    Ok(match parsed {
        DocumentFile::Bare(nodes) => NodeDocument {
            nodes,
            expanded: Vec::new(),
        },
        DocumentFile::Wrapped { nodes, expanded } => NodeDocument { nodes, expanded },
    })
}

pub fn load_nodes(path: &Path) -> anyhow::Result<NodeDocument> {
    let contents = std::fs::read_to_string(path)?;
    parse_nodes(&contents)
}
