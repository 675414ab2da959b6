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

//! Thread-affinity inbound queue.
//!
//! Transport threads push raw `(text, reply sink)` pairs; only the owning
//! thread drains. Messages stay undecoded in the queue on purpose: decoding
//! can fail, and failing on a transport thread would split the error path
//! across threads. Keeping decode on the consumer side keeps every protocol
//! error single-threaded.
//!
//! Enqueue never blocks. In the default unbounded mode it also never fails
//! (growth is bounded only by memory); with a configured capacity it rejects
//! with [`EnqueueError::Backpressure`] once full. FIFO holds per producer;
//! no global order across producers is promised or needed.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use hostbridge_core::BridgeConfig;
use thiserror::Error;

use crate::transport::ReplySink;

/// Enqueue failures surfaced to the transport caller.
#[derive(Debug, Error)]
pub enum EnqueueError {
    /// Bounded mode only: the queue is at capacity. The caller owns retry
    /// semantics.
    #[error("inbound queue full (capacity {capacity})")]
    Backpressure { capacity: usize },

    /// The consuming side has been dropped.
    #[error("inbound queue disconnected")]
    Disconnected,
}

/// The raw pre-decode unit: wire text plus the one-shot reply capability.
pub struct QueuedMessage {
    /// Undecoded wire text.
    pub raw: String,
    /// Capability to deliver exactly one response.
    pub reply: Box<dyn ReplySink>,
}

/// Cloneable producer handle handed to transport threads.
#[derive(Clone)]
pub struct QueueSender {
    tx: Sender<QueuedMessage>,
    capacity: Option<usize>,
}

impl QueueSender {
    /// Push a message. Never blocks.
    pub fn enqueue(
        &self,
        raw: impl Into<String>,
        reply: Box<dyn ReplySink>,
    ) -> Result<(), EnqueueError> {
        push(&self.tx, self.capacity, raw.into(), reply)
    }
}

/// Multi-producer/single-consumer queue of inbound messages.
///
/// Exactly one consumer (the tick scheduler, on the owning thread) calls
/// [`InboundQueue::try_dequeue_batch`]; any number of producers enqueue
/// through clones of [`QueueSender`].
pub struct InboundQueue {
    tx: Sender<QueuedMessage>,
    rx: Receiver<QueuedMessage>,
    capacity: Option<usize>,
}

impl InboundQueue {
    /// Unbounded queue.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            capacity: None,
        }
    }

    /// Bounded queue that rejects with backpressure once `capacity` messages
    /// are waiting.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = bounded(capacity);
        Self {
            tx,
            rx,
            capacity: Some(capacity),
        }
    }

    /// Build from configuration.
    pub fn from_config(config: &BridgeConfig) -> Self {
        match config.queue_capacity {
            Some(capacity) => Self::with_capacity(capacity),
            None => Self::new(),
        }
    }

    /// A producer handle for transport threads.
    pub fn sender(&self) -> QueueSender {
        QueueSender {
            tx: self.tx.clone(),
            capacity: self.capacity,
        }
    }

    /// Push a message directly. Never blocks.
    pub fn enqueue(
        &self,
        raw: impl Into<String>,
        reply: Box<dyn ReplySink>,
    ) -> Result<(), EnqueueError> {
        push(&self.tx, self.capacity, raw.into(), reply)
    }

    /// Pop up to `max` messages, oldest first. Never blocks: returns
    /// whatever is immediately available, possibly nothing.
    pub fn try_dequeue_batch(&self, max: usize) -> Vec<QueuedMessage> {
        let mut batch = Vec::with_capacity(max.min(self.rx.len()).min(64));
        while batch.len() < max {
            match self.rx.try_recv() {
                Ok(message) => batch.push(message),
                Err(_) => break,
            }
        }
        batch
    }

    /// Messages currently waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

fn push(
    tx: &Sender<QueuedMessage>,
    capacity: Option<usize>,
    raw: String,
    reply: Box<dyn ReplySink>,
) -> Result<(), EnqueueError> {
    let message = QueuedMessage { raw, reply };
    match capacity {
        None => tx.send(message).map_err(|_| EnqueueError::Disconnected),
        Some(capacity) => tx.try_send(message).map_err(|err| match err {
            TrySendError::Full(_) => EnqueueError::Backpressure { capacity },
            TrySendError::Disconnected(_) => EnqueueError::Disconnected,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_sink() -> Box<dyn ReplySink> {
        Box::new(|_payload: String| {})
    }

    #[test]
    fn drains_in_fifo_order() {
        let queue = InboundQueue::new();
        for i in 0..5 {
            queue.enqueue(format!("msg {i}"), drop_sink()).unwrap();
        }

        let batch = queue.try_dequeue_batch(10);
        let raws: Vec<&str> = batch.iter().map(|m| m.raw.as_str()).collect();
        assert_eq!(raws, ["msg 0", "msg 1", "msg 2", "msg 3", "msg 4"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn batch_respects_cap_and_leaves_remainder() {
        let queue = InboundQueue::new();
        for i in 0..7 {
            queue.enqueue(i.to_string(), drop_sink()).unwrap();
        }

        assert_eq!(queue.try_dequeue_batch(3).len(), 3);
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.try_dequeue_batch(10).len(), 4);
        assert!(queue.try_dequeue_batch(10).is_empty());
    }

    #[test]
    fn bounded_queue_signals_backpressure() {
        let queue = InboundQueue::with_capacity(2);
        queue.enqueue("a", drop_sink()).unwrap();
        queue.enqueue("b", drop_sink()).unwrap();

        let err = queue.enqueue("c", drop_sink()).unwrap_err();
        assert!(matches!(err, EnqueueError::Backpressure { capacity: 2 }));

        // Draining frees capacity again.
        queue.try_dequeue_batch(1);
        queue.enqueue("c", drop_sink()).unwrap();
    }

    #[test]
    fn producers_on_other_threads() {
        let queue = InboundQueue::new();
        let mut handles = Vec::new();
        for t in 0..4 {
            let sender = queue.sender();
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    sender.enqueue(format!("t{t} m{i}"), drop_sink()).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(queue.len(), 200);

        // Per-producer FIFO: each thread's messages appear in its own order.
        let batch = queue.try_dequeue_batch(200);
        for t in 0..4 {
            let prefix = format!("t{t} ");
            let indices: Vec<usize> = batch
                .iter()
                .filter(|m| m.raw.starts_with(&prefix))
                .map(|m| m.raw.split(" m").nth(1).unwrap().parse().unwrap())
                .collect();
            assert_eq!(indices, (0..50).collect::<Vec<_>>());
        }
    }
}
