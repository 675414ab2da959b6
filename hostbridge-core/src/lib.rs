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

//! Core data model for the Hostbridge tool dispatch system.
//!
//! This crate knows nothing about the wire protocol or the scheduler. It
//! defines what a tool *is* (schema, handler, outcome), the bounded log ring
//! the host UI reads from, and the runtime configuration knobs shared by the
//! server crate.
//!
//! Everything here is safe to construct on any thread. Tool handlers are the
//! one exception: they carry host-API calls and are only ever *invoked* on
//! the owning thread by the server's tick scheduler.

pub mod config;
pub mod logbuffer;
pub mod tool;

pub use config::BridgeConfig;
pub use logbuffer::{LogBuffer, LogEntry, LogLevel};
pub use tool::{
    ContentPart, ParamKind, ParamSpec, ToolArguments, ToolHandler, ToolOutcome, ToolSchema,
};
