//! A2UI JSONL stream validation
//!
//! An A2UI stream is one JSON object per non-blank line. Each object carries
//! exactly one action key. v0.8 streams use `beginRendering`, `surfaceUpdate`,
//! `dataModelUpdate` and `deleteSurface`; v0.9 streams use `createSurface`.
//! A stream never mixes the two versions.
//!
//! Validation collects every violation before failing so that a payload author
//! sees all defects at once.

use std::fmt;

use serde_json::{Map, Value, json};

/// Action keys recognised in a stream, in reporting order
pub const ACTION_KEYS: [&str; 5] = [
    "beginRendering",
    "surfaceUpdate",
    "dataModelUpdate",
    "deleteSurface",
    "createSurface",
];

/// A2UI protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiVersion {
    /// Stream built from `beginRendering`/`surfaceUpdate`/`dataModelUpdate`/`deleteSurface`
    V0_8,
    /// Stream built from `createSurface`
    V0_9,
}

impl fmt::Display for UiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V0_8 => write!(f, "v0.8"),
            Self::V0_9 => write!(f, "v0.9"),
        }
    }
}

/// One line of an A2UI stream, keyed by its single action
#[derive(Debug, Clone, PartialEq)]
pub enum UiMessage {
    /// v0.8 `beginRendering`: mount a surface at its root component
    BeginRendering(Value),
    /// v0.8 `surfaceUpdate`: add or replace components
    SurfaceUpdate(Value),
    /// v0.8 `dataModelUpdate`: change bound data
    DataModelUpdate(Value),
    /// v0.8 `deleteSurface`: remove a surface
    DeleteSurface(Value),
    /// v0.9 `createSurface`
    CreateSurface(Value),
}

impl UiMessage {
    /// Build a message from a parsed JSON object
    ///
    /// # Errors
    ///
    /// Returns the action key count if the object has zero or several action keys
    pub fn from_object(mut object: Map<String, Value>) -> Result<Self, usize> {
        let present: Vec<&str> = ACTION_KEYS
            .iter()
            .copied()
            .filter(|key| object.contains_key(*key))
            .collect();

        let [key] = present.as_slice() else {
            return Err(present.len());
        };
        let key = *key;
        let body = object.remove(key).unwrap_or(Value::Null);

        Ok(match key {
            "beginRendering" => Self::BeginRendering(body),
            "surfaceUpdate" => Self::SurfaceUpdate(body),
            "dataModelUpdate" => Self::DataModelUpdate(body),
            "deleteSurface" => Self::DeleteSurface(body),
            _ => Self::CreateSurface(body),
        })
    }

    /// Action key that identifies this message
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::BeginRendering(_) => "beginRendering",
            Self::SurfaceUpdate(_) => "surfaceUpdate",
            Self::DataModelUpdate(_) => "dataModelUpdate",
            Self::DeleteSurface(_) => "deleteSurface",
            Self::CreateSurface(_) => "createSurface",
        }
    }

    /// Protocol version this message belongs to
    #[must_use]
    pub const fn version(&self) -> UiVersion {
        match self {
            Self::CreateSurface(_) => UiVersion::V0_9,
            _ => UiVersion::V0_8,
        }
    }
}

/// A single defect found in a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Line is not valid JSON
    InvalidJson { line: usize, message: String },
    /// Line parsed but is not a JSON object
    NotAnObject { line: usize },
    /// Line has zero or several action keys
    ActionKeyCount { line: usize, found: usize },
    /// No messages in the whole stream
    Empty,
    /// Stream mixes v0.8 and v0.9 actions
    MixedVersions,
}

impl Violation {
    /// 1-based line number, if the violation belongs to a line
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidJson { line, .. }
            | Self::NotAnObject { line }
            | Self::ActionKeyCount { line, .. } => Some(*line),
            Self::Empty | Self::MixedVersions => None,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson { line, message } => write!(f, "line {line}: {message}"),
            Self::NotAnObject { line } => write!(f, "line {line}: expected JSON object"),
            Self::ActionKeyCount { line, found } => write!(
                f,
                "line {line}: expected exactly one action key ({}), found {found}",
                ACTION_KEYS.join(", ")
            ),
            Self::Empty => write!(f, "no JSONL messages found"),
            Self::MixedVersions => write!(f, "mixed A2UI v0.8 and v0.9 messages"),
        }
    }
}

/// Every violation found in a rejected stream, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamErrors(Vec<Violation>);

impl StreamErrors {
    /// Violations in discovery order
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    /// Human-readable violation descriptions
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for StreamErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.0.len();
        let plural = if count == 1 { "" } else { "s" };
        write!(f, "invalid A2UI JSONL ({count} error{plural}):")?;
        for violation in &self.0 {
            write!(f, "\n- {violation}")?;
        }
        Ok(())
    }
}

/// Outcome of a successful validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub version: UiVersion,
    pub message_count: usize,
}

/// Parse a stream into typed messages, collecting every violation
///
/// # Errors
///
/// Returns all structural and stream-level violations if any were found
pub fn parse_jsonl(text: &str) -> Result<Vec<UiMessage>, StreamErrors> {
    let mut messages = Vec::new();
    let mut violations = Vec::new();

    // `lines` splits on `\n` and strips a trailing `\r`
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                violations.push(Violation::InvalidJson {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let Value::Object(object) = value else {
            violations.push(Violation::NotAnObject { line });
            continue;
        };

        match UiMessage::from_object(object) {
            Ok(message) => messages.push(message),
            Err(found) => violations.push(Violation::ActionKeyCount { line, found }),
        }
    }

    if messages.is_empty() && violations.is_empty() {
        violations.push(Violation::Empty);
    }

    let has_v08 = messages.iter().any(|m| m.version() == UiVersion::V0_8);
    let has_v09 = messages.iter().any(|m| m.version() == UiVersion::V0_9);
    if has_v08 && has_v09 {
        violations.push(Violation::MixedVersions);
    }

    if violations.is_empty() {
        Ok(messages)
    } else {
        Err(StreamErrors(violations))
    }
}

/// Validate a stream and report its version and message count
///
/// # Errors
///
/// Returns all structural and stream-level violations if any were found
pub fn validate_jsonl(text: &str) -> Result<StreamSummary, StreamErrors> {
    let messages = parse_jsonl(text)?;
    let version = if messages.iter().any(|m| m.version() == UiVersion::V0_9) {
        UiVersion::V0_9
    } else {
        UiVersion::V0_8
    };

    Ok(StreamSummary {
        version,
        message_count: messages.len(),
    })
}

/// Reject streams that the canvas cannot render yet
///
/// # Errors
///
/// Returns `UnsupportedProtocolVersion` for v0.9 streams
pub fn ensure_supported(summary: StreamSummary) -> crate::Result<StreamSummary> {
    match summary.version {
        UiVersion::V0_8 => Ok(summary),
        UiVersion::V0_9 => Err(crate::Error::UnsupportedProtocolVersion(UiVersion::V0_9)),
    }
}

/// Build a v0.8 stream that renders a single block of text on surface `main`
#[must_use]
pub fn build_text_jsonl(text: &str) -> String {
    let surface_id = "main";
    let root_id = "root";
    let text_id = "text";

    let payloads = [
        json!({
            "surfaceUpdate": {
                "surfaceId": surface_id,
                "components": [
                    {
                        "id": root_id,
                        "component": { "Column": { "children": { "explicitList": [text_id] } } }
                    },
                    {
                        "id": text_id,
                        "component": {
                            "Text": { "text": { "literalString": text }, "usageHint": "body" }
                        }
                    }
                ]
            }
        }),
        json!({ "beginRendering": { "surfaceId": surface_id, "root": root_id } }),
    ];

    payloads
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
