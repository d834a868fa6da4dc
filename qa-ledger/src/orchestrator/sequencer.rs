//! Stream-order execution for commands that share an [`OrderingKey`].
//!
//! Each keyed command waits for the previous command with the same key to
//! finish before it runs. Commands with different keys, or none, run in
//! parallel.

use std::collections::HashMap;

use tokio::sync::oneshot;

use crate::processor::OrderingKey;

/// Hands out turns in stream order. Lives on the orchestrator task.
#[derive(Default)]
pub(crate) struct Sequencer {
    // Most recent command per key: its line and the signal fired when it finishes.
    tails: HashMap<OrderingKey, (u64, oneshot::Receiver<()>)>,
}

/// A command's place in the queue of its key.
pub(crate) struct Turn {
    slot: Option<(OrderingKey, u64)>,
    predecessor: Option<oneshot::Receiver<()>>,
    done: Option<oneshot::Sender<()>>,
}

impl Sequencer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues the command on `line` behind the last command with the same key.
    ///
    /// Must be called in stream order.
    pub(crate) fn enqueue(&mut self, key: Option<OrderingKey>, line: u64) -> Turn {
        let Some(key) = key else {
            return Turn {
                slot: None,
                predecessor: None,
                done: None,
            };
        };
        let (done, finished) = oneshot::channel();
        let predecessor = self
            .tails
            .insert(key.clone(), (line, finished))
            .map(|(_, previous)| previous);
        Turn {
            slot: Some((key, line)),
            predecessor,
            done: Some(done),
        }
    }

    /// Forgets `key` when the command that finished on `line` is still its last one.
    pub(crate) fn release(&mut self, key: &OrderingKey, line: u64) {
        if self.tails.get(key).is_some_and(|(tail, _)| *tail == line) {
            self.tails.remove(key);
        }
    }

    /// Number of keys with a command queued or running.
    pub(crate) fn pending_keys(&self) -> usize {
        self.tails.len()
    }
}

impl Turn {
    /// Resolves once every earlier command with the same key has finished.
    ///
    /// Cancel safe: a dropped call leaves the turn waiting on the same predecessor.
    pub(crate) async fn ready(&mut self) {
        if let Some(predecessor) = self.predecessor.as_mut() {
            // A closed channel means the predecessor's task is gone, which ends its turn too.
            let _ = predecessor.await;
            self.predecessor = None;
        }
    }

    /// Ends the turn so the next command with the same key can start.
    ///
    /// Returns the key and line to hand back to [`Sequencer::release`].
    pub(crate) fn finish(self) -> Option<(OrderingKey, u64)> {
        if let Some(done) = self.done {
            let _ = done.send(());
        }
        self.slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;
    use uuid::Uuid;

    const SHORT: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_same_key_waits_for_predecessor() {
        let mut sequencer = Sequencer::new();
        let key = OrderingKey::Question(Uuid::new_v4());

        let mut first = sequencer.enqueue(Some(key.clone()), 1);
        let mut second = sequencer.enqueue(Some(key.clone()), 2);
        first.ready().await;
        assert!(timeout(SHORT, second.ready()).await.is_err());
        // Still queued after the cancelled wait.
        assert!(timeout(SHORT, second.ready()).await.is_err());

        assert_eq!(first.finish(), Some((key.clone(), 1)));
        assert!(timeout(SHORT, second.ready()).await.is_ok());
    }

    #[tokio::test]
    async fn test_other_keys_and_unkeyed_commands_do_not_wait() {
        let mut sequencer = Sequencer::new();
        let voter = Uuid::new_v4();

        let _busy = sequencer.enqueue(Some(OrderingKey::User(voter)), 1);
        let mut other = sequencer.enqueue(Some(OrderingKey::Vote(Uuid::new_v4())), 2);
        let mut unkeyed = sequencer.enqueue(None, 3);

        assert!(timeout(SHORT, other.ready()).await.is_ok());
        assert!(timeout(SHORT, unkeyed.ready()).await.is_ok());
        assert_eq!(unkeyed.finish(), None);
    }

    #[tokio::test]
    async fn test_release_only_drops_the_last_command() {
        let mut sequencer = Sequencer::new();
        let key = OrderingKey::Answer(Uuid::new_v4());

        let first = sequencer.enqueue(Some(key.clone()), 1);
        let second = sequencer.enqueue(Some(key.clone()), 2);

        let (k, line) = first.finish().unwrap();
        sequencer.release(&k, line);
        assert_eq!(sequencer.pending_keys(), 1);

        let (k, line) = second.finish().unwrap();
        sequencer.release(&k, line);
        assert_eq!(sequencer.pending_keys(), 0);
    }

    #[tokio::test]
    async fn test_dropped_predecessor_unblocks_successor() {
        let mut sequencer = Sequencer::new();
        let key = OrderingKey::User(Uuid::new_v4());

        let first = sequencer.enqueue(Some(key.clone()), 1);
        let mut second = sequencer.enqueue(Some(key), 2);
        drop(first);
        assert!(timeout(SHORT, second.ready()).await.is_ok());
    }
}
