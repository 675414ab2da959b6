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

//! Host-driven tick scheduler.
//!
//! The host application calls [`TickScheduler::run_once`] from its owning
//! thread (typically once per frame or event-loop iteration). Each tick
//! drains at most `max_drain_per_tick` messages so a burst of requests
//! cannot stall the host loop; whatever remains is picked up next tick.
//!
//! `run_once` never panics and never blocks waiting for input. A panic in a
//! tool handler is absorbed by the dispatcher; a panic in a reply sink is
//! absorbed here. Either way the remaining messages in the batch still run.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use hostbridge_core::{BridgeConfig, LogBuffer, LogEntry, LogLevel};
use tracing::{debug, warn};

use crate::dispatcher::Dispatcher;
use crate::protocol::{self, OutboundEnvelope};
use crate::queue::InboundQueue;

/// What one tick did. Returned to the host for its own instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Messages dequeued and processed this tick.
    pub drained: usize,
    /// How many of those produced an `isError` response.
    pub failures: usize,
}

/// Drains the inbound queue on the owning thread and pushes responses back
/// through each message's reply sink.
pub struct TickScheduler {
    queue: InboundQueue,
    dispatcher: Arc<Dispatcher>,
    log: Arc<LogBuffer>,
    max_drain: usize,
}

impl TickScheduler {
    /// Build a scheduler over a queue and dispatcher.
    pub fn new(
        queue: InboundQueue,
        dispatcher: Arc<Dispatcher>,
        log: Arc<LogBuffer>,
        config: &BridgeConfig,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            log,
            max_drain: config.max_drain_per_tick.max(1),
        }
    }

    /// The inbound queue, for handing senders to transports.
    pub fn queue(&self) -> &InboundQueue {
        &self.queue
    }

    /// The shared log buffer.
    pub fn log(&self) -> &Arc<LogBuffer> {
        &self.log
    }

    /// Process up to `max_drain_per_tick` queued messages. Must be called
    /// from the owning thread; handlers run inline on the caller.
    pub fn run_once(&self) -> TickReport {
        let batch = self.queue.try_dequeue_batch(self.max_drain);
        if batch.is_empty() {
            return TickReport::default();
        }

        let mut report = TickReport::default();
        for message in batch {
            report.drained += 1;

            let started = Instant::now();
            let (tool, response) = match protocol::decode_request(&message.raw) {
                Ok(envelope) => {
                    let tool = envelope.tool.clone();
                    (tool, self.dispatcher.handle(envelope))
                }
                Err(err) => {
                    warn!(error = %err, "dropping undecodable request");
                    let response = OutboundEnvelope::failure(
                        err.id().cloned(),
                        format!("Protocol error: {err}"),
                    );
                    ("<undecodable>".to_string(), response)
                }
            };
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

            if response.is_error {
                report.failures += 1;
            }

            match protocol::encode_response(&response) {
                Ok(payload) => self.deliver(&tool, message.reply, payload),
                Err(err) => warn!(tool = %tool, error = %err, "failed to encode response"),
            }

            let level = if response.is_error {
                LogLevel::Warning
            } else {
                LogLevel::Info
            };
            let detail = response.content.first().and_then(|part| part.as_text());
            let entry = LogEntry::new(
                level,
                format!(
                    "tool '{}' {} in {:.2}ms",
                    tool,
                    if response.is_error { "failed" } else { "completed" },
                    elapsed_ms
                ),
            );
            self.log.append(match (response.is_error, detail) {
                (true, Some(text)) => entry.with_detail(text),
                _ => entry,
            });
        }

        debug!(drained = report.drained, failures = report.failures, "tick complete");
        report
    }

    /// Push the encoded payload through the sink. A sink is foreign code
    /// (the transport's write path) so it gets the same panic boundary as
    /// handlers do.
    fn deliver(&self, tool: &str, sink: Box<dyn crate::transport::ReplySink>, payload: String) {
        match panic::catch_unwind(AssertUnwindSafe(|| sink.send(payload))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(tool = %tool, error = %err, "reply sink rejected response");
            }
            Err(_) => {
                warn!(tool = %tool, "reply sink panicked while delivering response");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolRegistry;
    use crate::transport::ChannelReplySink;
    use crossbeam_channel::{unbounded, Receiver};
    use hostbridge_core::tool::{ParamKind, ParamSpec, ToolOutcome, ToolSchema};

    fn scheduler_with_echo(config: BridgeConfig) -> TickScheduler {
        let registry = ToolRegistry::new();
        registry
            .register(
                ToolSchema::new("echo", "Echo text back").with_param(ParamSpec::required(
                    "text",
                    ParamKind::String,
                    "Text to echo",
                )),
                |args| ToolOutcome::text(args["text"].as_str().unwrap_or_default()),
            )
            .unwrap();
        TickScheduler::new(
            InboundQueue::from_config(&config),
            Arc::new(Dispatcher::new(Arc::new(registry))),
            Arc::new(LogBuffer::new(config.log_capacity)),
            &config,
        )
    }

    fn enqueue(scheduler: &TickScheduler, raw: &str) -> Receiver<String> {
        let (tx, rx) = unbounded();
        scheduler
            .queue()
            .enqueue(raw, Box::new(ChannelReplySink::new(tx)))
            .unwrap();
        rx
    }

    #[test]
    fn empty_queue_is_a_noop() {
        let scheduler = scheduler_with_echo(BridgeConfig::default());
        assert_eq!(scheduler.run_once(), TickReport::default());
        assert!(scheduler.log().is_empty());
    }

    #[test]
    fn echo_round_trip() {
        let scheduler = scheduler_with_echo(BridgeConfig::default());
        let rx = enqueue(&scheduler, r#"{"id":"1","tool":"echo","arguments":{"text":"hi"}}"#);

        let report = scheduler.run_once();
        assert_eq!(report, TickReport { drained: 1, failures: 0 });
        assert_eq!(
            rx.recv().unwrap(),
            r#"{"id":"1","isError":false,"content":[{"type":"text","value":"hi"}]}"#
        );
    }

    #[test]
    fn drain_cap_leaves_remainder_for_next_tick() {
        let config = BridgeConfig::default().with_drain_cap(3);
        let scheduler = scheduler_with_echo(config);
        let receivers: Vec<_> = (0..8)
            .map(|i| {
                enqueue(
                    &scheduler,
                    &format!(r#"{{"id":{i},"tool":"echo","arguments":{{"text":"m{i}"}}}}"#),
                )
            })
            .collect();

        assert_eq!(scheduler.run_once().drained, 3);
        assert_eq!(scheduler.queue().len(), 5);
        assert_eq!(scheduler.run_once().drained, 3);
        assert_eq!(scheduler.run_once().drained, 2);
        assert_eq!(scheduler.run_once().drained, 0);

        for (i, rx) in receivers.iter().enumerate() {
            assert!(rx.recv().unwrap().contains(&format!("m{i}")));
        }
    }

    #[test]
    fn undecodable_message_still_gets_a_reply() {
        let scheduler = scheduler_with_echo(BridgeConfig::default());
        let rx = enqueue(&scheduler, "not json at all");

        let report = scheduler.run_once();
        assert_eq!(report.failures, 1);
        let reply = rx.recv().unwrap();
        assert!(reply.contains("\"isError\":true"));
        assert!(reply.contains("Protocol error"));
    }

    #[test]
    fn panicking_sink_does_not_stop_the_batch() {
        let scheduler = scheduler_with_echo(BridgeConfig::default());
        scheduler
            .queue()
            .enqueue(
                r#"{"id":1,"tool":"echo","arguments":{"text":"a"}}"#,
                Box::new(|_payload: String| panic!("transport gone")),
            )
            .unwrap();
        let rx = enqueue(&scheduler, r#"{"id":2,"tool":"echo","arguments":{"text":"b"}}"#);

        let report = scheduler.run_once();
        assert_eq!(report.drained, 2);
        assert!(rx.recv().unwrap().contains("\"b\""));
    }

    #[test]
    fn closed_sink_is_logged_not_fatal() {
        let scheduler = scheduler_with_echo(BridgeConfig::default());
        let (tx, rx) = unbounded();
        drop(rx);
        scheduler
            .queue()
            .enqueue(
                r#"{"id":1,"tool":"echo","arguments":{"text":"a"}}"#,
                Box::new(ChannelReplySink::new(tx)),
            )
            .unwrap();
        assert_eq!(scheduler.run_once().drained, 1);
    }

    #[test]
    fn log_records_success_and_failure() {
        let scheduler = scheduler_with_echo(BridgeConfig::default());
        let _ok = enqueue(&scheduler, r#"{"id":1,"tool":"echo","arguments":{"text":"a"}}"#);
        let _bad = enqueue(&scheduler, r#"{"id":2,"tool":"nope","arguments":{}}"#);

        let report = scheduler.run_once();
        assert_eq!(report, TickReport { drained: 2, failures: 1 });

        let entries = scheduler.log().snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert!(entries[0].message.contains("tool 'echo' completed"));
        assert_eq!(entries[1].level, LogLevel::Warning);
        assert!(entries[1].message.contains("tool 'nope' failed"));
        assert_eq!(entries[1].detail.as_deref(), Some("Unknown tool: nope"));
    }
}
