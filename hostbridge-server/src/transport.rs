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

//! The transport boundary.
//!
//! The core is agnostic to the underlying transport (WebSocket, pipe,
//! socket): it only requires that the transport enqueue `(text, reply sink)`
//! pairs and that each sink deliver exactly one reply. [`ReplySink::send`]
//! consumes the sink, so the one-shot contract is enforced by the type
//! system rather than by convention.

use crossbeam_channel::Sender;
use thiserror::Error;

/// Reply delivery failed; the scheduler logs this and drops the response.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply channel closed before delivery")]
    Closed,
}

/// One-shot capability for delivering a single response to the originating
/// caller.
pub trait ReplySink: Send {
    /// Deliver the encoded response. Consumes the sink.
    fn send(self: Box<Self>, payload: String) -> Result<(), ReplyError>;
}

/// Any `FnOnce(String)` closure is a reply sink. This is the usual shape a
/// transport hands over: a closure capturing the connection's write half.
impl<F> ReplySink for F
where
    F: FnOnce(String) + Send,
{
    fn send(self: Box<Self>, payload: String) -> Result<(), ReplyError> {
        (*self)(payload);
        Ok(())
    }
}

/// Channel-backed sink for transports (and tests) that collect replies on a
/// crossbeam channel.
pub struct ChannelReplySink {
    tx: Sender<String>,
}

impl ChannelReplySink {
    /// Wrap a channel sender.
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl ReplySink for ChannelReplySink {
    fn send(self: Box<Self>, payload: String) -> Result<(), ReplyError> {
        self.tx.send(payload).map_err(|_| ReplyError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn closure_sink_delivers() {
        let (tx, rx) = unbounded();
        let sink: Box<dyn ReplySink> = Box::new(move |payload: String| {
            tx.send(payload).unwrap();
        });
        sink.send("reply".to_string()).unwrap();
        assert_eq!(rx.recv().unwrap(), "reply");
    }

    #[test]
    fn channel_sink_reports_closed_receiver() {
        let (tx, rx) = unbounded();
        drop(rx);
        let sink = Box::new(ChannelReplySink::new(tx));
        assert!(matches!(sink.send("reply".into()), Err(ReplyError::Closed)));
    }
}
