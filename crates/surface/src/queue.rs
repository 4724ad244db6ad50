//! Multi-producer, single-consumer command queue feeding the render thread.
//!
//! Every producer goes through the same gate, so the consumer observes one
//! total order across all threads. Teardown is appended through
//! [`CommandSender::close_with`], after which the gate stays shut and the
//! render thread can drain up to the final command knowing nothing else will
//! follow it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::command::Command;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("command queue is closed; teardown has already been requested")]
    Closed,
}

#[derive(Debug, Default)]
struct Shared {
    closed: Mutex<bool>,
    redraw_queued: AtomicBool,
}

impl Shared {
    fn gate(&self) -> MutexGuard<'_, bool> {
        self.closed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Producer half. Cheap to clone and safe to use from any thread.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
    shared: Arc<Shared>,
}

/// Consumer half, owned by the render thread.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<Command>,
    shared: Arc<Shared>,
}

/// Builds an unbounded queue. There is no backpressure: producers are paced
/// by human input and OS callbacks.
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = unbounded();
    let shared = Arc::new(Shared::default());
    (
        CommandSender {
            tx,
            shared: shared.clone(),
        },
        CommandReceiver { rx, shared },
    )
}

impl CommandSender {
    /// `Teardown` is routed through [`close_with`](Self::close_with) so the
    /// gate shuts with it.
    pub fn enqueue(&self, command: Command) -> Result<(), QueueError> {
        if let Command::Teardown = command {
            return self.close_with(command);
        }
        let closed = self.shared.gate();
        if *closed {
            tracing::debug!(
                command = command.name(),
                "dropping command enqueued after teardown"
            );
            return Err(QueueError::Closed);
        }
        self.tx.send(command).map_err(|_| QueueError::Closed)
    }

    /// Appends `last` as the final command and rejects everything after it.
    pub fn close_with(&self, last: Command) -> Result<(), QueueError> {
        let mut closed = self.shared.gate();
        if *closed {
            return Err(QueueError::Closed);
        }
        *closed = true;
        self.tx.send(last).map_err(|_| QueueError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        *self.shared.gate()
    }

    /// Asks for a frame. At most one redraw token is in flight at a time.
    pub fn request_redraw(&self) -> Result<(), QueueError> {
        if self.shared.redraw_queued.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let result = self.enqueue(Command::Redraw);
        if result.is_err() {
            self.shared.redraw_queued.store(false, Ordering::Release);
        }
        result
    }

    pub fn request_idle_flush(&self) -> Result<(), QueueError> {
        self.enqueue(Command::FlushIdle)
    }
}

impl CommandReceiver {
    /// Blocks until a command arrives. Returns `None` once every sender is gone.
    pub fn next_blocking(&self) -> Option<Command> {
        self.rx.recv().ok()
    }

    pub fn try_next(&self) -> Option<Command> {
        self.rx.try_recv().ok()
    }

    /// Everything that is available right now, without blocking.
    pub fn drain_ready(&self) -> Vec<Command> {
        self.rx.try_iter().collect()
    }

    /// Drops whatever is still queued and reports how much was thrown away.
    pub fn discard_remaining(&self) -> usize {
        self.rx.try_iter().count()
    }

    /// Called just before a frame is drawn so requests made while drawing
    /// enqueue a fresh token.
    pub fn acknowledge_redraw(&self) {
        self.shared.redraw_queued.store(false, Ordering::Release);
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn delivers_in_enqueue_order() {
        let (tx, rx) = command_queue();
        tx.enqueue(Command::InitContext).unwrap();
        tx.enqueue(Command::Resize {
            width: 10,
            height: 20,
        })
        .unwrap();
        tx.enqueue(Command::FlushIdle).unwrap();

        let names: Vec<_> = rx.drain_ready().iter().map(Command::name).collect();
        assert_eq!(names, ["init-context", "resize", "flush-idle"]);
        assert!(rx.try_next().is_none());
    }

    #[test]
    fn close_rejects_later_commands() {
        let (tx, rx) = command_queue();
        tx.enqueue(Command::InitContext).unwrap();
        tx.close_with(Command::Teardown).unwrap();
        assert!(tx.is_closed());
        assert_eq!(tx.enqueue(Command::GestureCancel), Err(QueueError::Closed));
        assert_eq!(tx.close_with(Command::Teardown), Err(QueueError::Closed));

        let drained = rx.drain_ready();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained.last(), Some(Command::Teardown)));
    }

    #[test]
    fn enqueued_teardown_closes_the_gate() {
        let (tx, rx) = command_queue();
        let producer = tx.clone();
        producer.enqueue(Command::Teardown).unwrap();
        assert!(tx.is_closed());
        assert_eq!(tx.enqueue(Command::FlushIdle), Err(QueueError::Closed));
        assert_eq!(producer.enqueue(Command::Teardown), Err(QueueError::Closed));

        let drained = rx.drain_ready();
        assert_eq!(drained.len(), 1);
        assert!(matches!(drained[0], Command::Teardown));
    }

    #[test]
    fn redraw_requests_are_coalesced_until_drawn() {
        let (tx, rx) = command_queue();
        tx.request_redraw().unwrap();
        tx.request_redraw().unwrap();
        tx.request_redraw().unwrap();
        assert_eq!(rx.drain_ready().len(), 1);

        rx.acknowledge_redraw();
        tx.request_redraw().unwrap();
        assert_eq!(rx.pending(), 1);
    }

    #[test]
    fn producers_are_linearised() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: usize = 500;

        let (tx, rx) = command_queue();
        let handles: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        tx.enqueue(Command::SetLanguage(format!("{producer}:{seq}")))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut next = [0usize; PRODUCERS];
        let mut total = 0;
        while let Some(command) = rx.try_next() {
            let Command::SetLanguage(tag) = command else {
                panic!("unexpected command");
            };
            let (producer, seq) = tag.split_once(':').unwrap();
            let producer: usize = producer.parse().unwrap();
            let seq: usize = seq.parse().unwrap();
            assert_eq!(seq, next[producer], "producer {producer} reordered");
            next[producer] += 1;
            total += 1;
        }
        assert_eq!(total, PRODUCERS * PER_PRODUCER);
    }

    #[test]
    fn next_blocking_ends_when_senders_are_dropped() {
        let (tx, rx) = command_queue();
        tx.enqueue(Command::FlushIdle).unwrap();
        drop(tx);
        assert!(matches!(rx.next_blocking(), Some(Command::FlushIdle)));
        assert!(rx.next_blocking().is_none());
    }
}
