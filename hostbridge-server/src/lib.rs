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

//! Tool dispatch core for embedding a remote-control surface in a host
//! application.
//!
//! ## Architecture
//!
//! ```text
//! transport threads              owning thread (host loop)
//! ─────────────────              ─────────────────────────
//! raw text + ReplySink ──► InboundQueue ──► TickScheduler::run_once
//!                                               │ decode (protocol)
//!                                               │ dispatch (Dispatcher)
//!                                               │ handler runs inline
//!                                               ▼
//!                                  encode ──► ReplySink ──► caller
//! ```
//!
//! Handlers execute only inside `run_once`, on whichever thread the host
//! calls it from. That is the whole point: handlers may touch state the host
//! restricts to one thread (a scene graph, a UI tree, an embedded
//! interpreter) without any locking of their own.
//!
//! ## Modules
//!
//! - [`protocol`]: wire envelopes and encode/decode
//! - [`registry`]: name → (schema, handler) table
//! - [`queue`]: MPSC inbound queue with optional backpressure
//! - [`dispatcher`]: lookup, argument validation, panic boundary
//! - [`scheduler`]: bounded per-tick drain loop
//! - [`transport`]: the [`ReplySink`] boundary transports implement

pub mod dispatcher;
pub mod protocol;
pub mod queue;
pub mod registry;
pub mod scheduler;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use protocol::{
    decode_request, encode_response, DecodeError, EncodeError, InboundEnvelope, OutboundEnvelope,
    RequestId,
};
pub use queue::{EnqueueError, InboundQueue, QueueSender, QueuedMessage};
pub use registry::{RegisteredTool, RegistrationError, ToolRegistry};
pub use scheduler::{TickReport, TickScheduler};
pub use transport::{ChannelReplySink, ReplyError, ReplySink};
