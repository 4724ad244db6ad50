//! Work posted back to the UI thread.
//!
//! Some side effects finish on other threads (a player name confirmed by a
//! dialog, an invite delivered by the OS) but must reach the bridge through
//! the UI thread that owns it. Producers post tasks here; the UI thread runs
//! them in order on its next turn.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::bridge::{BridgeError, SurfaceBridge};
use crate::session::InviteRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiTask {
    CommitPlayerName(String),
    DeliverInvite(InviteRef),
}

#[derive(Debug, Clone)]
pub struct UiTaskPoster {
    tx: Sender<UiTask>,
}

#[derive(Debug)]
pub struct UiTaskQueue {
    rx: Receiver<UiTask>,
}

pub fn ui_task_queue() -> (UiTaskPoster, UiTaskQueue) {
    let (tx, rx) = unbounded();
    (UiTaskPoster { tx }, UiTaskQueue { rx })
}

impl UiTaskPoster {
    /// Returns false when the UI thread has already gone away.
    pub fn post(&self, task: UiTask) -> bool {
        self.tx.send(task).is_ok()
    }
}

impl UiTaskQueue {
    /// Applies pending tasks in FIFO order. Stops at the first task the
    /// bridge rejects; tasks behind it stay queued.
    pub fn run_pending(&self, bridge: &mut SurfaceBridge) -> Result<usize, BridgeError> {
        let mut applied = 0;
        while let Ok(task) = self.rx.try_recv() {
            match task {
                UiTask::CommitPlayerName(name) => bridge.set_player_name(name)?,
                UiTask::DeliverInvite(invite) => bridge.set_invite_reference(invite)?,
            }
            applied += 1;
        }
        Ok(applied)
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
