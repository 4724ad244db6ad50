//! Engine used by the headless host. It has no graphics; it tracks the
//! little state the game persists and logs everything else.

use anyhow::Result;
use surface::{
    CreateParams, Engine, EngineNotifier, InstanceState, InviteRef, SessionSnapshot, Slot,
};

#[derive(Debug, Default)]
pub struct HeadlessEngine;

pub struct HeadlessContext {
    notifier: EngineNotifier,
    state: InstanceState,
    size: (u32, u32),
    frames: u64,
}

impl HeadlessContext {
    fn changed(&mut self) {
        self.notifier.request_redraw();
    }
}

impl Engine for HeadlessEngine {
    type Context = HeadlessContext;

    fn create(&mut self, params: &CreateParams, notifier: EngineNotifier) -> HeadlessContext {
        tracing::info!(
            assets = %params.asset_root.display(),
            dpi = params.density_dpi,
            "creating headless engine context"
        );
        HeadlessContext {
            notifier,
            state: InstanceState::default(),
            size: (0, 0),
            frames: 0,
        }
    }

    fn init_context(&mut self, _ctx: &mut HeadlessContext) -> Result<()> {
        tracing::debug!("headless graphics ready");
        Ok(())
    }

    fn resize(&mut self, ctx: &mut HeadlessContext, width: u32, height: u32) {
        tracing::debug!(width, height, "surface resized");
        ctx.size = (width, height);
    }

    fn redraw(&mut self, ctx: &mut HeadlessContext) {
        ctx.frames += 1;
        tracing::trace!(frame = ctx.frames, size = ?ctx.size, "frame");
    }

    fn flush_idle_events(&mut self, ctx: &mut HeadlessContext) {
        tracing::debug!(frames = ctx.frames, "idle flush");
    }

    fn destroy(&mut self, ctx: HeadlessContext) {
        tracing::info!(frames = ctx.frames, "headless engine context destroyed");
    }

    fn set_session_state(&mut self, ctx: &mut HeadlessContext, snapshot: &SessionSnapshot) {
        ctx.state = InstanceState::from_snapshot(snapshot);
        tracing::info!(snapshot = snapshot.as_str(), "resuming session");
        ctx.changed();
    }

    fn session_state(&mut self, ctx: &mut HeadlessContext) -> Option<SessionSnapshot> {
        Some(ctx.state.to_snapshot())
    }

    fn set_invite_reference(&mut self, ctx: &mut HeadlessContext, invite: &InviteRef) {
        match invite.conversation_id() {
            Some(id) => {
                tracing::info!(conversation = %format!("{id:016x}"), "joining invite");
                ctx.state.person_id = Some(id);
            }
            None => tracing::warn!(invite = invite.as_str(), "invite link is not a gemelo invite"),
        }
        ctx.state.invite_visible = true;
        ctx.changed();
    }

    fn set_language(&mut self, _ctx: &mut HeadlessContext, code: &str) {
        tracing::debug!(code, "language set");
    }

    fn set_player_name(&mut self, _ctx: &mut HeadlessContext, name: &str) {
        tracing::debug!(name, "player name set");
    }

    fn set_first_run_flag(&mut self, ctx: &mut HeadlessContext) {
        tracing::info!("first run; showing the guide");
        ctx.changed();
    }

    fn pointer_down(&mut self, ctx: &mut HeadlessContext, slot: Slot, x: i32, y: i32) {
        tracing::debug!(%slot, x, y, "pointer down");
        ctx.changed();
    }

    fn pointer_motion(&mut self, _ctx: &mut HeadlessContext, slot: Slot, x: i32, y: i32) {
        tracing::trace!(%slot, x, y, "pointer motion");
    }

    /// Lifting a finger dismisses the invite panel.
    fn pointer_up(&mut self, ctx: &mut HeadlessContext, slot: Slot) {
        tracing::debug!(%slot, "pointer up");
        if ctx.state.invite_visible {
            ctx.state.invite_visible = false;
            ctx.changed();
        }
    }

    fn gesture_cancel(&mut self, ctx: &mut HeadlessContext) {
        tracing::debug!("gesture cancelled");
        ctx.changed();
    }
}
