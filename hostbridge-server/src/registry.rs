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

//! Tool registry: name → (schema, handler).
//!
//! Registration happens during a startup phase, before the tick scheduler
//! starts draining; the table is logically immutable while serving, so
//! lookups need no coordination beyond the concurrent map itself. Hot reload
//! is done by building a fresh registry and swapping the `Arc` held by the
//! dispatcher, never by mutating a live table.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hostbridge_core::tool::{ToolArguments, ToolHandler, ToolOutcome, ToolSchema};
use thiserror::Error;
use tracing::debug;

/// Registration failures. Fatal to startup: a corrupted tool catalog is
/// unsafe to serve from.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("tool already registered: {name}")]
    DuplicateName { name: String },

    #[error("tool name must not be empty")]
    EmptyName,
}

/// A schema/handler pair as stored in the registry. Cheap to clone.
#[derive(Clone)]
pub struct RegisteredTool {
    pub schema: Arc<ToolSchema>,
    pub handler: Arc<ToolHandler>,
}

/// Name-keyed tool table.
#[derive(Default)]
pub struct ToolRegistry {
    tools: DashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its schema name. At most one handler per name;
    /// a duplicate is a startup configuration error, not a runtime condition.
    pub fn register<H>(&self, schema: ToolSchema, handler: H) -> Result<(), RegistrationError>
    where
        H: Fn(&ToolArguments) -> ToolOutcome + Send + Sync + 'static,
    {
        if schema.name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        match self.tools.entry(schema.name.clone()) {
            Entry::Occupied(_) => Err(RegistrationError::DuplicateName { name: schema.name }),
            Entry::Vacant(slot) => {
                debug!(tool = %schema.name, params = schema.parameters.len(), "registered tool");
                slot.insert(RegisteredTool {
                    schema: Arc::new(schema),
                    handler: Arc::new(handler),
                });
                Ok(())
            }
        }
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<RegisteredTool> {
        self.tools.get(name).map(|entry| entry.value().clone())
    }

    /// All schemas, sorted by name for stable discovery responses.
    pub fn list(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .iter()
            .map(|entry| entry.value().schema.as_ref().clone())
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
