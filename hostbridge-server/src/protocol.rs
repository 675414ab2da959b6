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

//! Wire envelope types and encode/decode.
//!
//! Inbound: `{"id"?: string|number, "tool": string, "arguments": object}`.
//! Outbound: `{"id"?: ..., "isError": bool, "content": [...]}`.
//!
//! Decoding is two-stage: the raw text is first parsed into a JSON value so
//! that a structurally valid object with a bad shape (missing `tool`, wrong
//! argument type) still surfaces the caller's `id`, so the error reply can
//! be correlated. Only a total parse failure loses the id.

use hostbridge_core::tool::{ContentPart, ToolArguments};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Caller-supplied correlation token. Opaque: echoed back verbatim, never
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// A decoded request. Consumed exactly once by the dispatcher; never retried
/// or re-queued by the core.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEnvelope {
    /// Correlation token; absent for notifications.
    #[serde(default)]
    pub id: Option<RequestId>,
    /// Name of the tool to invoke.
    pub tool: String,
    /// Arguments object; defaults to empty.
    #[serde(default)]
    pub arguments: ToolArguments,
}

/// A response ready for encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    /// Echo of the request id, when the caller supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Whether the content carries an error message instead of results.
    #[serde(rename = "isError")]
    pub is_error: bool,
    /// Ordered output parts.
    pub content: Vec<ContentPart>,
}

impl OutboundEnvelope {
    /// Successful response carrying tool output.
    pub fn success(id: Option<RequestId>, content: Vec<ContentPart>) -> Self {
        Self {
            id,
            is_error: false,
            content,
        }
    }

    /// Error response carrying a single diagnostic text part.
    pub fn failure(id: Option<RequestId>, message: impl Into<String>) -> Self {
        Self {
            id,
            is_error: true,
            content: vec![ContentPart::text(message)],
        }
    }
}

/// Why a raw inbound message could not become an [`InboundEnvelope`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not JSON at all; no id is recoverable.
    #[error("malformed JSON: {detail}")]
    Malformed { detail: String },
    /// Valid JSON, wrong shape. The caller's id is preserved when present.
    #[error("invalid request: {detail}")]
    InvalidShape {
        id: Option<RequestId>,
        detail: String,
    },
}

impl DecodeError {
    /// The caller's id, when it survived decoding.
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Malformed { .. } => None,
            Self::InvalidShape { id, .. } => id.as_ref(),
        }
    }
}

/// Encoding failed. Envelopes built from [`ContentPart`]s cannot actually
/// hit this, but the boundary stays fallible rather than panicking.
#[derive(Debug, Error)]
#[error("failed to encode response: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Decode raw wire text into an envelope.
pub fn decode_request(raw: &str) -> Result<InboundEnvelope, DecodeError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| DecodeError::Malformed {
        detail: e.to_string(),
    })?;
    let id = value
        .get("id")
        .and_then(|v| serde_json::from_value::<RequestId>(v.clone()).ok());
    serde_json::from_value(value).map_err(|e| DecodeError::InvalidShape {
        id,
        detail: e.to_string(),
    })
}

/// Encode an envelope for the reply sink.
pub fn encode_response(envelope: &OutboundEnvelope) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(envelope)?)
}
