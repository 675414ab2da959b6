// Copyright 2026 Hostbridge Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Tool schemas, handlers, and outcomes.
//!
//! A tool is a named operation a remote caller can invoke. Its schema is
//! built once at startup and handed to the registry; it is never mutated
//! afterwards. Handlers are plain synchronous functions; they may touch
//! host APIs that are only legal on the owning thread, which is why the
//! dispatcher invokes them one at a time from the tick loop and never from
//! transport threads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments passed to a tool handler: the decoded JSON object from the
/// request envelope.
pub type ToolArguments = serde_json::Map<String, Value>;

/// A registered tool's callable. Synchronous by contract: a handler that
/// blocks stalls the entire host tick loop.
pub type ToolHandler = dyn Fn(&ToolArguments) -> ToolOutcome + Send + Sync;

/// Declared type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

/// Declaration of a single tool parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name as it appears in the arguments object.
    pub name: String,
    /// Declared value type.
    pub kind: ParamKind,
    /// Whether the dispatcher rejects calls that omit this parameter.
    pub required: bool,
    /// Human-readable description for discovery responses.
    pub description: String,
    /// Optional enumeration of allowed string values (discovery metadata).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

impl ParamSpec {
    /// Declare a required parameter.
    pub fn required(
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: description.into(),
            allowed_values: None,
        }
    }

    /// Declare an optional parameter.
    pub fn optional(
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: description.into(),
            allowed_values: None,
        }
    }

    /// Restrict the parameter to an enumerated set of string values.
    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Immutable description of a tool: the dispatch key, a description for
/// discovery, and the ordered parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique dispatch key. Non-empty; stable for the life of the process.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Ordered parameter declarations.
    #[serde(default)]
    pub parameters: Vec<ParamSpec>,
}

impl ToolSchema {
    /// Create a schema with no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter declaration, preserving declaration order.
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Names of all required parameters, in declaration order.
    pub fn required_params(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }
}

/// One piece of tool output, tagged for the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    /// Plain text: `{"type":"text","value":"..."}`.
    Text { value: String },
    /// Structured JSON payload: `{"type":"json","value":{...}}`.
    Json { value: Value },
    /// Base64-encoded image: `{"type":"image","mimeType":"...","data":"..."}`.
    Image {
        #[serde(rename = "mimeType")]
        mime_type: String,
        data: String,
    },
}

impl ContentPart {
    /// Build a text part.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Build a structured JSON part.
    pub fn json(value: Value) -> Self {
        Self::Json { value }
    }

    /// Build an image part from a MIME type and base64 payload.
    pub fn image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Image {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Text content, if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { value } => Some(value),
            _ => None,
        }
    }
}

/// Result of invoking a tool handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Ordered output parts to return to the caller.
    Success(Vec<ContentPart>),
    /// Human-readable failure message.
    Failure(String),
}

impl ToolOutcome {
    /// Success carrying a single text part.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Success(vec![ContentPart::text(value)])
    }

    /// Success carrying a single structured JSON part.
    pub fn json(value: Value) -> Self {
        Self::Success(vec![ContentPart::json(value)])
    }

    /// Failure with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// Whether this outcome is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_builder_preserves_param_order() {
        let schema = ToolSchema::new("set_material", "Assign a material to an object")
            .with_param(ParamSpec::required(
                "object",
                ParamKind::String,
                "Target object path",
            ))
            .with_param(ParamSpec::required(
                "material",
                ParamKind::String,
                "Material name",
            ))
            .with_param(
                ParamSpec::optional("slot", ParamKind::Number, "Material slot index")
                    .with_allowed_values(["0", "1", "2"]),
            );

        let names: Vec<&str> = schema.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["object", "material", "slot"]);
        assert_eq!(
            schema.required_params().collect::<Vec<_>>(),
            ["object", "material"]
        );
    }

    #[test]
    fn content_part_wire_shapes() {
        let text = serde_json::to_value(ContentPart::text("hi")).unwrap();
        assert_eq!(text, json!({"type": "text", "value": "hi"}));

        let structured = serde_json::to_value(ContentPart::json(json!({"ok": true}))).unwrap();
        assert_eq!(structured, json!({"type": "json", "value": {"ok": true}}));

        let image = serde_json::to_value(ContentPart::image("image/png", "aGVsbG8=")).unwrap();
        assert_eq!(
            image,
            json!({"type": "image", "mimeType": "image/png", "data": "aGVsbG8="})
        );
    }

    #[test]
    fn content_part_round_trips_through_tag() {
        let raw = r#"{"type":"text","value":"payload"}"#;
        let part: ContentPart = serde_json::from_str(raw).unwrap();
        assert_eq!(part.as_text(), Some("payload"));
    }

    #[test]
    fn outcome_helpers() {
        assert!(!ToolOutcome::text("done").is_failure());
        assert!(ToolOutcome::failure("nope").is_failure());
    }
}
