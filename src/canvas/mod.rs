//! Canvas commands forwarded to a node
//!
//! Each command maps to a `canvas.*` node command name plus a JSON params
//! object. Payloads returned by the node are only inspected for `canvas.eval`
//! and `canvas.snapshot`.

pub mod a2ui;

use std::path::{Path, PathBuf};

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{Error, Result};

/// Capability a node must advertise to receive canvas commands
pub const CANVAS_CAPABILITY: &str = "canvas";

/// Window placement for `canvas.present`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Placement {
    /// Whether no coordinate was supplied
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.width.is_none() && self.height.is_none()
    }
}

/// Image format requested from `canvas.snapshot`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
}

impl SnapshotFormat {
    /// File extension for written snapshots
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Canvas command sent to a node
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCommand {
    /// Show the canvas, optionally at a URL and placement
    Present {
        url: Option<String>,
        placement: Placement,
    },
    /// Hide the canvas
    Hide,
    /// Load a URL into the canvas
    Navigate { url: String },
    /// Evaluate JavaScript in the canvas
    Eval { javascript: String },
    /// Capture the canvas as an image
    Snapshot {
        format: SnapshotFormat,
        max_width: Option<u32>,
        quality: Option<f64>,
    },
    /// Push a validated A2UI JSONL stream
    A2uiPush { jsonl: String },
    /// Reset A2UI surfaces
    A2uiReset,
}

impl CanvasCommand {
    /// Node command name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Present { .. } => "canvas.present",
            Self::Hide => "canvas.hide",
            Self::Navigate { .. } => "canvas.navigate",
            Self::Eval { .. } => "canvas.eval",
            Self::Snapshot { .. } => "canvas.snapshot",
            Self::A2uiPush { .. } => "canvas.a2ui.pushJSONL",
            Self::A2uiReset => "canvas.a2ui.reset",
        }
    }

    /// Command params, `None` when the command takes none
    #[must_use]
    pub fn params(&self) -> Option<Value> {
        match self {
            Self::Present { url, placement } => {
                let mut params = serde_json::Map::new();
                if let Some(url) = url {
                    params.insert("url".to_string(), json!(url));
                }
                if !placement.is_empty() {
                    params.insert("placement".to_string(), json!(placement));
                }
                (!params.is_empty()).then_some(Value::Object(params))
            }
            Self::Navigate { url } => Some(json!({ "url": url })),
            Self::Eval { javascript } => Some(json!({ "javaScript": javascript })),
            Self::Snapshot {
                format,
                max_width,
                quality,
            } => {
                let mut params = json!({ "format": format });
                if let Some(max_width) = max_width {
                    params["maxWidth"] = json!(max_width);
                }
                if let Some(quality) = quality {
                    params["quality"] = json!(quality);
                }
                Some(params)
            }
            Self::A2uiPush { jsonl } => Some(json!({ "jsonl": jsonl })),
            Self::Hide | Self::A2uiReset => None,
        }
    }
}

/// Image returned by `canvas.snapshot`
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotPayload {
    pub format: SnapshotFormat,
    pub base64: String,
}

impl SnapshotPayload {
    /// Parse a snapshot from a node payload
    ///
    /// # Errors
    ///
    /// Returns error if the payload is missing `format` or `base64`
    pub fn from_payload(payload: &Value) -> Result<Self> {
        serde_json::from_value(payload.clone())
            .map_err(|e| Error::Snapshot(format!("invalid canvas.snapshot payload: {e}")))
    }

    /// Decode the image bytes
    ///
    /// # Errors
    ///
    /// Returns error if the data is not valid base64
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.base64.trim())
            .map_err(|e| Error::Snapshot(format!("invalid base64 image data: {e}")))
    }

    /// Write the decoded image to `out`, or to a timestamped file in `dir`
    ///
    /// # Errors
    ///
    /// Returns error if decoding or writing fails
    pub async fn write(&self, out: Option<&Path>, dir: &Path) -> Result<PathBuf> {
        let bytes = self.decode()?;
        let path = out.map_or_else(|| snapshot_path(dir, self.format), Path::to_path_buf);
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote canvas snapshot");
        Ok(path)
    }
}

/// Default snapshot location: `<dir>/beacon-canvas-snapshot-<timestamp>.<ext>`
#[must_use]
pub fn snapshot_path(dir: &Path, format: SnapshotFormat) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3fZ");
    dir.join(format!(
        "beacon-canvas-snapshot-{stamp}.{}",
        format.extension()
    ))
}

/// Extract the `result` of a `canvas.eval` payload for display
#[must_use]
pub fn eval_result(payload: &Value) -> Option<String> {
    match payload.get("result")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
