//! The seam between the bridge and the game engine.
//!
//! The engine is a black box reached through a fixed set of synchronous
//! calls. Everything except [`Engine::create`] happens on the render thread
//! in command order; `create` also runs there, once, when the render thread
//! starts. The engine is free to keep the [`EngineNotifier`] it receives and
//! call it from its own worker threads.

use std::path::PathBuf;

use anyhow::Result;

use crate::command::Slot;
use crate::queue::{CommandSender, QueueError};
use crate::session::{InviteRef, SessionSnapshot};

/// Inputs handed to the engine when its context is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParams {
    /// Where the engine loads fonts, textures and other bundled assets from.
    pub asset_root: PathBuf,
    /// Screen density hint in dots per inch.
    pub density_dpi: u32,
}

impl Default for CreateParams {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            density_dpi: 160,
        }
    }
}

pub trait Engine: Send + 'static {
    /// Live engine state for one surface lifetime.
    type Context: Send;

    fn create(&mut self, params: &CreateParams, notifier: EngineNotifier) -> Self::Context;
    /// Sets up graphics resources. Failure leaves the context usable for
    /// configuration but not for drawing.
    fn init_context(&mut self, ctx: &mut Self::Context) -> Result<()>;
    fn resize(&mut self, ctx: &mut Self::Context, width: u32, height: u32);
    fn redraw(&mut self, ctx: &mut Self::Context);
    fn flush_idle_events(&mut self, ctx: &mut Self::Context);
    /// Consumes the context; nothing can reach it afterwards.
    fn destroy(&mut self, ctx: Self::Context);

    fn set_session_state(&mut self, ctx: &mut Self::Context, snapshot: &SessionSnapshot);
    fn session_state(&mut self, ctx: &mut Self::Context) -> Option<SessionSnapshot>;
    fn set_invite_reference(&mut self, ctx: &mut Self::Context, invite: &InviteRef);
    fn set_language(&mut self, ctx: &mut Self::Context, code: &str);
    fn set_player_name(&mut self, ctx: &mut Self::Context, name: &str);
    fn set_first_run_flag(&mut self, ctx: &mut Self::Context);

    fn pointer_down(&mut self, ctx: &mut Self::Context, slot: Slot, x: i32, y: i32);
    fn pointer_motion(&mut self, ctx: &mut Self::Context, slot: Slot, x: i32, y: i32);
    fn pointer_up(&mut self, ctx: &mut Self::Context, slot: Slot);
    fn gesture_cancel(&mut self, ctx: &mut Self::Context);
}

/// Lets the engine ask for work on the render thread from any thread.
#[derive(Debug, Clone)]
pub struct EngineNotifier {
    sender: CommandSender,
}

impl EngineNotifier {
    pub fn new(sender: CommandSender) -> Self {
        Self { sender }
    }

    /// Marks the surface dirty. Requests made before the next frame collapse
    /// into one redraw.
    pub fn request_redraw(&self) {
        if let Err(QueueError::Closed) = self.sender.request_redraw() {
            tracing::trace!("redraw requested after teardown");
        }
    }

    /// Schedules `flush_idle_events` behind everything already queued.
    pub fn request_idle_flush(&self) {
        if let Err(QueueError::Closed) = self.sender.request_idle_flush() {
            tracing::trace!("idle flush requested after teardown");
        }
    }
}

/// Sole owner of a live engine context.
///
/// Not `Clone`: the only way to release the context is to move the handle
/// into [`EngineContextHandle::into_inner`], which the lifecycle does exactly
/// once on its destroy path.
#[derive(Debug)]
pub struct EngineContextHandle<C> {
    context: C,
}

impl<C> EngineContextHandle<C> {
    pub(crate) fn new(context: C) -> Self {
        Self { context }
    }

    pub(crate) fn get_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub(crate) fn into_inner(self) -> C {
        self.context
    }
}
