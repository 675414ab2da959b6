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

//! Request dispatch.
//!
//! [`Dispatcher::handle`] resolves a decoded envelope against the registry,
//! validates required arguments, invokes the handler inside a panic
//! boundary, and maps the outcome to a response envelope. It never panics
//! outward and always produces exactly one response per envelope.
//!
//! Handlers run sequentially on the calling thread, which is the owning
//! thread via the tick scheduler. That sequencing is what lets handlers
//! touch host-restricted state without their own locking.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use hostbridge_core::tool::{ToolArguments, ToolOutcome, ToolSchema};
use parking_lot::RwLock;
use tracing::{debug, error, warn};

use crate::protocol::{InboundEnvelope, OutboundEnvelope};
use crate::registry::ToolRegistry;

/// Resolves envelopes to registered handlers and converts outcomes into
/// response envelopes.
pub struct Dispatcher {
    registry: RwLock<Arc<ToolRegistry>>,
}

impl Dispatcher {
    /// Create a dispatcher over a registry.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    /// The registry currently in use.
    pub fn registry(&self) -> Arc<ToolRegistry> {
        self.registry.read().clone()
    }

    /// Atomically replace the registry (hot reload). In-flight lookups see
    /// either the old table or the new one, never a partial rebuild.
    pub fn swap_registry(&self, next: Arc<ToolRegistry>) {
        *self.registry.write() = next;
    }

    /// Handle one envelope. Infallible from the scheduler's perspective:
    /// every error class becomes an `isError` response.
    pub fn handle(&self, envelope: InboundEnvelope) -> OutboundEnvelope {
        let InboundEnvelope {
            id,
            tool,
            arguments,
        } = envelope;

        let Some(entry) = self.registry.read().lookup(&tool) else {
            warn!(tool = %tool, "unknown tool requested");
            return OutboundEnvelope::failure(id, format!("Unknown tool: {tool}"));
        };

        let missing = missing_required(&entry.schema, &arguments);
        if !missing.is_empty() {
            warn!(tool = %tool, missing = ?missing, "rejecting call with missing arguments");
            return OutboundEnvelope::failure(
                id,
                format!("Missing required parameter(s): {}", missing.join(", ")),
            );
        }

        debug!(tool = %tool, "invoking tool handler");
        let handler = entry.handler.clone();
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| handler(&arguments))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload);
                error!(tool = %tool, panic = %message, "tool handler panicked");
                ToolOutcome::Failure(message)
            }
        };

        match outcome {
            ToolOutcome::Success(content) => OutboundEnvelope::success(id, content),
            ToolOutcome::Failure(message) => {
                warn!(tool = %tool, error = %message, "tool reported failure");
                OutboundEnvelope::failure(id, message)
            }
        }
    }
}

/// Required parameters absent from the arguments object, in declaration
/// order.
fn missing_required<'a>(schema: &'a ToolSchema, arguments: &ToolArguments) -> Vec<&'a str> {
    schema
        .required_params()
        .filter(|name| !arguments.contains_key(*name))
        .collect()
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool handler panicked".to_string()
    }
}
