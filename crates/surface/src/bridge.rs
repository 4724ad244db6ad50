use crossbeam_channel::{bounded, unbounded, Receiver};

use crate::command::Command;
use crate::engine::{CreateParams, Engine};
use crate::lifecycle::LifecycleError;
use crate::pointer::{PointerTracker, TouchPhase};
use crate::queue::{command_queue, CommandSender, QueueError};
use crate::render::{RenderSignal, RenderThread};
use crate::session::{Decision, InviteRef, SessionSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("no surface is attached to the bridge")]
    SurfaceNotAcquired,
    #[error("a surface is already attached; release it before acquiring another")]
    SurfaceAlreadyAcquired,
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("{0}")]
    RenderThread(String),
}

/// Values applied to every new engine context right after it is created.
#[derive(Debug, Clone, Default)]
pub struct BridgeSettings {
    pub create: CreateParams,
    pub language: Option<String>,
    pub player_name: Option<String>,
    /// Tells the engine to show its first-run guide.
    pub first_run: bool,
}

struct LiveSurface {
    sender: CommandSender,
    render: RenderThread,
}

/// Entry point for the host's UI thread.
///
/// The bridge owns the pointer tracker and, while a surface is attached, the
/// command queue and the render thread that owns the engine context. UI
/// callbacks are filtered through the tracker and turned into commands; the
/// render thread applies them one at a time in enqueue order.
pub struct SurfaceBridge {
    settings: BridgeSettings,
    tracker: PointerTracker,
    live: Option<LiveSurface>,
    /// Signals from the current (or last) render thread. The thread holds
    /// the only sender, so the channel disconnects once it exits.
    signal_rx: Receiver<RenderSignal>,
}

impl SurfaceBridge {
    pub fn new(settings: BridgeSettings) -> Self {
        let (_, signal_rx) = unbounded();
        Self {
            settings,
            tracker: PointerTracker::new(),
            live: None,
            signal_rx,
        }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    pub fn is_attached(&self) -> bool {
        self.live.is_some()
    }

    /// Starts a surface lifetime.
    ///
    /// The engine context is created on a fresh render thread before this
    /// returns. `InitContext` is queued first, then the startup session
    /// decision, then the configured language, player name and first-run
    /// flag, so all of them precede any input the host delivers afterwards.
    /// Signals left over from a previous surface are discarded.
    pub fn on_surface_acquired<E: Engine>(
        &mut self,
        engine: E,
        startup: Decision,
    ) -> Result<(), BridgeError> {
        if self.live.is_some() {
            return Err(BridgeError::SurfaceAlreadyAcquired);
        }

        let (sender, receiver) = command_queue();
        let (signal_tx, signal_rx) = unbounded();
        let render = RenderThread::spawn(
            engine,
            self.settings.create.clone(),
            sender.clone(),
            receiver,
            signal_tx,
        )?;
        self.signal_rx = signal_rx;

        let mut prelude = vec![Command::InitContext];
        tracing::debug!(decision = startup.kind(), "seeding engine context");
        prelude.extend(startup.into_command());
        if let Some(code) = &self.settings.language {
            prelude.push(Command::SetLanguage(code.clone()));
        }
        if let Some(name) = &self.settings.player_name {
            prelude.push(Command::SetPlayerName(name.clone()));
        }
        if self.settings.first_run {
            prelude.push(Command::SetFirstRunFlag);
        }
        for command in prelude {
            sender.enqueue(command)?;
        }

        self.tracker.reset();
        self.live = Some(LiveSurface { sender, render });
        tracing::info!("surface acquired");
        Ok(())
    }

    pub fn on_surface_resized(&mut self, width: u32, height: u32) -> Result<(), BridgeError> {
        self.enqueue(Command::Resize { width, height })
    }

    /// Ends the surface lifetime. Teardown is queued behind everything the
    /// host already sent and the render thread is joined. Calling this with
    /// no surface attached does nothing.
    pub fn on_surface_lost(&mut self) -> Result<(), BridgeError> {
        let Some(live) = self.live.take() else {
            return Ok(());
        };
        self.tracker.reset();
        live.render.shutdown()?;
        drop(live.sender);
        tracing::info!("surface released");
        Ok(())
    }

    pub fn on_touch(&mut self, id: i32, phase: TouchPhase, x: i32, y: i32) {
        let Some(live) = &self.live else {
            tracing::trace!(id, ?phase, "touch without a surface; ignoring");
            return;
        };
        for command in self.tracker.on_touch(id, phase, x, y) {
            if let Err(err) = live.sender.enqueue(command) {
                tracing::debug!(error = %err, "touch command rejected");
            }
        }
    }

    pub fn on_touch_cancel(&mut self) {
        self.on_touch(0, TouchPhase::Cancel, 0, 0);
    }

    /// External dirty signal; coalesced with any redraw already pending.
    pub fn request_redraw(&self) -> Result<(), BridgeError> {
        Ok(self.live()?.sender.request_redraw()?)
    }

    /// Reads the engine's session snapshot. The query is ordered behind
    /// every command already queued, and this call blocks until the render
    /// thread answers.
    pub fn save_session(&self) -> Result<Option<SessionSnapshot>, BridgeError> {
        let live = self.live()?;
        let (reply_tx, reply_rx) = bounded(1);
        live.sender.enqueue(Command::QuerySessionState(reply_tx))?;
        reply_rx.recv().map_err(|_| {
            BridgeError::RenderThread("render thread dropped the session query".into())
        })
    }

    pub fn restore_session(&self, snapshot: SessionSnapshot) -> Result<(), BridgeError> {
        self.enqueue(Command::SetSessionState(snapshot))
    }

    pub fn set_invite_reference(&self, invite: InviteRef) -> Result<(), BridgeError> {
        self.enqueue(Command::SetInviteReference(invite))
    }

    pub fn set_player_name(&self, name: impl Into<String>) -> Result<(), BridgeError> {
        self.enqueue(Command::SetPlayerName(name.into()))
    }

    pub fn set_language(&self, code: impl Into<String>) -> Result<(), BridgeError> {
        self.enqueue(Command::SetLanguage(code.into()))
    }

    pub fn flush_idle(&self) -> Result<(), BridgeError> {
        self.enqueue(Command::FlushIdle)
    }

    /// A producer handle for other threads, valid until the surface is lost.
    pub fn command_sender(&self) -> Option<CommandSender> {
        self.live.as_ref().map(|live| live.sender.clone())
    }

    pub fn take_signals(&self) -> Vec<RenderSignal> {
        self.signal_rx.try_iter().collect()
    }

    /// Blocks until the render thread reports something. Returns `None` once
    /// that thread has exited and every signal it sent has been taken, or
    /// when no surface was ever attached.
    pub fn wait_signal(&self) -> Option<RenderSignal> {
        self.signal_rx.recv().ok()
    }

    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }

    fn enqueue(&self, command: Command) -> Result<(), BridgeError> {
        Ok(self.live()?.sender.enqueue(command)?)
    }

    fn live(&self) -> Result<&LiveSurface, BridgeError> {
        self.live.as_ref().ok_or(BridgeError::SurfaceNotAcquired)
    }
}

impl Drop for SurfaceBridge {
    fn drop(&mut self) {
        if let Err(err) = self.on_surface_lost() {
            tracing::error!(error = %err, "failed to release surface on drop");
        }
    }
}
