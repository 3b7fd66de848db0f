use std::collections::HashMap;
use std::time::Duration;

use runtime::{TickScheduler, TimerId};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Real-time [`TickScheduler`] on the tokio timer wheel.
///
/// An expired timer sends its id into the channel; the owner of the
/// receiving end feeds it back to the session.
#[derive(Debug)]
pub struct TokioTimers {
    tx: UnboundedSender<TimerId>,
    next_id: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioTimers {
    pub fn new(tx: UnboundedSender<TimerId>) -> Self {
        Self {
            tx,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }
}

impl TickScheduler for TokioTimers {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.tasks.retain(|_, task| !task.is_finished());

        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(id);
        });
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        match self.tasks.remove(&id) {
            Some(task) => {
                let live = !task.is_finished();
                task.abort();
                live
            }
            None => false,
        }
    }
}
