use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Sender};

use crate::bridge::BridgeError;
use crate::command::Command;
use crate::engine::{CreateParams, Engine, EngineNotifier};
use crate::lifecycle::{ContextLifecycle, LifecycleError};
use crate::queue::{CommandReceiver, CommandSender};

const THREAD_NAME: &str = "gemelo-render";

/// Notifications from the render thread back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderSignal {
    ContextReady,
    /// The engine could not set up graphics. The bridge takes no further
    /// action; the host decides how to degrade.
    ContextInitFailed(String),
    ContextDestroyed,
}

/// Handle to the thread that owns the engine context.
pub(crate) struct RenderThread {
    sender: CommandSender,
    join_handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Starts the thread and waits until the engine context exists.
    pub(crate) fn spawn<E: Engine>(
        engine: E,
        params: CreateParams,
        sender: CommandSender,
        receiver: CommandReceiver,
        signals: Sender<RenderSignal>,
    ) -> Result<Self, BridgeError> {
        let (ready_tx, ready_rx) = bounded(1);
        let notifier = EngineNotifier::new(sender.clone());
        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || run_render_thread(engine, params, notifier, receiver, ready_tx, signals))
            .map_err(|err| BridgeError::RenderThread(format!("failed to spawn render thread: {err}")))?;

        let mut render = Self {
            sender,
            join_handle: Some(handle),
        };
        match ready_rx.recv() {
            Ok(Ok(())) => Ok(render),
            Ok(Err(err)) => {
                render.join()?;
                Err(err.into())
            }
            Err(_) => {
                render.join()?;
                Err(BridgeError::RenderThread(
                    "render thread exited before creating the engine context".into(),
                ))
            }
        }
    }

    /// Appends Teardown behind everything already queued and waits for the
    /// thread to process it.
    pub(crate) fn shutdown(mut self) -> Result<(), BridgeError> {
        if self.sender.close_with(Command::Teardown).is_err() {
            tracing::debug!("teardown already queued");
        }
        self.join()
    }

    fn join(&mut self) -> Result<(), BridgeError> {
        if let Some(handle) = self.join_handle.take() {
            handle
                .join()
                .map_err(|err| BridgeError::RenderThread(format!("render thread panicked: {err:?}")))?;
        }
        Ok(())
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        if self.join_handle.is_some() {
            let _ = self.sender.close_with(Command::Teardown);
            let _ = self.join();
        }
    }
}

fn run_render_thread<E: Engine>(
    engine: E,
    params: CreateParams,
    notifier: EngineNotifier,
    receiver: CommandReceiver,
    ready_tx: Sender<Result<(), LifecycleError>>,
    signals: Sender<RenderSignal>,
) {
    let mut lifecycle = ContextLifecycle::new(engine);
    let created = lifecycle.create(&params, notifier);
    let failed = created.is_err();
    let _ = ready_tx.send(created);
    if failed {
        return;
    }

    let mut render_loop = RenderLoop {
        lifecycle,
        receiver,
        signals,
        frame_pending: false,
        frames: 0,
    };
    render_loop.run();
}

enum Flow {
    Continue,
    Stop,
}

struct RenderLoop<E: Engine> {
    lifecycle: ContextLifecycle<E>,
    receiver: CommandReceiver,
    signals: Sender<RenderSignal>,
    frame_pending: bool,
    frames: u64,
}

impl<E: Engine> RenderLoop<E> {
    /// Sleep until work arrives, apply everything that is ready in order,
    /// then draw at most one frame.
    fn run(&mut self) {
        while let Some(first) = self.receiver.next_blocking() {
            let mut next = Some(first);
            while let Some(command) = next {
                if let Flow::Stop = self.apply(command) {
                    self.finish();
                    return;
                }
                next = self.receiver.try_next();
            }
            self.draw_if_pending();
        }

        tracing::warn!("all command senders dropped without teardown");
        self.finish();
    }

    fn apply(&mut self, command: Command) -> Flow {
        let name = command.name();
        tracing::trace!(command = name, "applying command");
        let result = match command {
            Command::InitContext => {
                match self.lifecycle.on_surface_ready() {
                    Ok(()) => {
                        self.frame_pending = true;
                        self.signal(RenderSignal::ContextReady);
                    }
                    Err(err) => self.signal(RenderSignal::ContextInitFailed(err.to_string())),
                }
                Ok(())
            }
            Command::Resize { width, height } => {
                let result = self.lifecycle.resize(width, height);
                if result.is_ok() {
                    self.frame_pending = true;
                }
                result
            }
            Command::Redraw => {
                self.frame_pending = true;
                Ok(())
            }
            Command::PointerDown { slot, x, y } => self.lifecycle.pointer_down(slot, x, y),
            Command::PointerMotion { slot, x, y } => self.lifecycle.pointer_motion(slot, x, y),
            Command::PointerUp { slot } => self.lifecycle.pointer_up(slot),
            Command::GestureCancel => self.lifecycle.gesture_cancel(),
            Command::SetSessionState(snapshot) => self.lifecycle.set_session_state(&snapshot),
            Command::SetInviteReference(invite) => self.lifecycle.set_invite_reference(&invite),
            Command::SetPlayerName(name) => self.lifecycle.set_player_name(&name),
            Command::SetLanguage(code) => self.lifecycle.set_language(&code),
            Command::SetFirstRunFlag => self.lifecycle.set_first_run_flag(),
            Command::QuerySessionState(reply) => {
                let snapshot = self.lifecycle.session_state();
                let _ = reply.send(snapshot.as_ref().ok().cloned().flatten());
                snapshot.map(|_| ())
            }
            Command::FlushIdle => self.lifecycle.flush_idle(),
            Command::Teardown => return Flow::Stop,
        };

        if let Err(err) = result {
            tracing::warn!(
                command = name,
                phase = %self.lifecycle.phase(),
                error = %err,
                "engine context cannot accept command; dropping it"
            );
        }
        Flow::Continue
    }

    fn draw_if_pending(&mut self) {
        if !self.frame_pending {
            return;
        }
        self.frame_pending = false;
        self.receiver.acknowledge_redraw();
        if !self.lifecycle.is_ready() {
            tracing::debug!("skipping frame; engine context is not ready");
            return;
        }
        if self.lifecycle.redraw_frame().is_ok() {
            self.frames += 1;
        }
    }

    fn finish(&mut self) {
        match self.lifecycle.destroy() {
            Ok(()) => self.signal(RenderSignal::ContextDestroyed),
            Err(err) => tracing::warn!(error = %err, "engine context was not live at teardown"),
        }
        let discarded = self.receiver.discard_remaining();
        if discarded > 0 {
            tracing::warn!(discarded, "discarded commands queued behind teardown");
        }
        tracing::debug!(frames = self.frames, "render thread exiting");
    }

    fn signal(&self, signal: RenderSignal) {
        if self.signals.send(signal).is_err() {
            tracing::trace!("render signal dropped; host is gone");
        }
    }
}
