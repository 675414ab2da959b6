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

//! Runtime configuration for the dispatch core.

use serde::{Deserialize, Serialize};

/// Default number of messages drained per tick. Small on purpose: the drain
/// runs inside the host's frame budget.
pub const DEFAULT_DRAIN_PER_TICK: usize = 10;

/// Default capacity of the log ring.
pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// Tunable knobs for the queue, scheduler, and log ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Maximum messages processed per tick. Must be finite; excess messages
    /// wait for the next tick (temporal backpressure).
    pub max_drain_per_tick: usize,

    /// Inbound queue capacity. `None` = unbounded (growth limited only by
    /// memory); `Some(n)` rejects enqueues with backpressure once full.
    pub queue_capacity: Option<usize>,

    /// Number of entries retained by the log ring.
    pub log_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_drain_per_tick: DEFAULT_DRAIN_PER_TICK,
            queue_capacity: None,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl BridgeConfig {
    /// Cap the inbound queue; full enqueues fail with backpressure.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Override the per-tick drain cap (clamped to at least 1).
    pub fn with_drain_cap(mut self, cap: usize) -> Self {
        self.max_drain_per_tick = cap.max(1);
        self
    }

    /// Override the log ring capacity (clamped to at least 1).
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity.max(1);
        self
    }
}
