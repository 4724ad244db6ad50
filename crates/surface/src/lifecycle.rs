use std::fmt;

use crate::command::Slot;
use crate::engine::{CreateParams, Engine, EngineContextHandle, EngineNotifier};
use crate::session::{InviteRef, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Uninitialized,
    Created,
    Ready,
    Destroyed,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Uninitialized => f.write_str("uninitialized"),
            LifecyclePhase::Created => f.write_str("created"),
            LifecyclePhase::Ready => f.write_str("ready"),
            LifecyclePhase::Destroyed => f.write_str("destroyed"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{operation} is not valid while the engine context is {phase}")]
    OutOfOrder {
        operation: &'static str,
        phase: LifecyclePhase,
    },
    #[error("engine context initialisation failed: {0}")]
    InitFailed(String),
    #[error("engine context has already been destroyed")]
    AlreadyDestroyed,
}

enum ContextState<C> {
    Uninitialized,
    Created(EngineContextHandle<C>),
    Ready(EngineContextHandle<C>),
    Destroyed,
}

/// Owns the engine and its context for one surface lifetime.
///
/// `Uninitialized -> Created -> Ready -> Destroyed`. Drawing needs `Ready`;
/// configuration works from `Created` on. The handle leaves this struct only
/// through [`ContextLifecycle::destroy`], so the engine's `destroy` runs at
/// most once whether teardown is explicit or happens on drop.
pub struct ContextLifecycle<E: Engine> {
    engine: E,
    state: ContextState<E::Context>,
}

impl<E: Engine> ContextLifecycle<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: ContextState::Uninitialized,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        match self.state {
            ContextState::Uninitialized => LifecyclePhase::Uninitialized,
            ContextState::Created(_) => LifecyclePhase::Created,
            ContextState::Ready(_) => LifecyclePhase::Ready,
            ContextState::Destroyed => LifecyclePhase::Destroyed,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ContextState::Ready(_))
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn create(
        &mut self,
        params: &CreateParams,
        notifier: EngineNotifier,
    ) -> Result<(), LifecycleError> {
        if !matches!(self.state, ContextState::Uninitialized) {
            return Err(self.out_of_order("create"));
        }
        let context = self.engine.create(params, notifier);
        self.state = ContextState::Created(EngineContextHandle::new(context));
        tracing::debug!(
            asset_root = %params.asset_root.display(),
            dpi = params.density_dpi,
            "engine context created"
        );
        Ok(())
    }

    /// Runs the engine's graphics initialisation. Calling it again while
    /// ready re-initialises after the host lost its graphics context.
    pub fn on_surface_ready(&mut self) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.live("on_surface_ready")?;
        match engine.init_context(ctx) {
            Ok(()) => {
                self.set_ready(true);
                tracing::info!("engine context ready");
                Ok(())
            }
            Err(err) => {
                self.set_ready(false);
                tracing::error!(error = %err, "engine context failed to initialise");
                Err(LifecycleError::InitFailed(format!("{err:#}")))
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.ready("resize")?;
        engine.resize(ctx, width, height);
        Ok(())
    }

    pub fn redraw_frame(&mut self) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.ready("redraw_frame")?;
        engine.redraw(ctx);
        Ok(())
    }

    pub fn flush_idle(&mut self) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.live("flush_idle")?;
        engine.flush_idle_events(ctx);
        Ok(())
    }

    pub fn set_session_state(&mut self, snapshot: &SessionSnapshot) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.live("set_session_state")?;
        engine.set_session_state(ctx, snapshot);
        Ok(())
    }

    pub fn session_state(&mut self) -> Result<Option<SessionSnapshot>, LifecycleError> {
        let (engine, ctx) = self.live("session_state")?;
        Ok(engine.session_state(ctx))
    }

    pub fn set_invite_reference(&mut self, invite: &InviteRef) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.live("set_invite_reference")?;
        engine.set_invite_reference(ctx, invite);
        Ok(())
    }

    pub fn set_language(&mut self, code: &str) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.live("set_language")?;
        engine.set_language(ctx, code);
        Ok(())
    }

    pub fn set_player_name(&mut self, name: &str) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.live("set_player_name")?;
        engine.set_player_name(ctx, name);
        Ok(())
    }

    pub fn set_first_run_flag(&mut self) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.live("set_first_run_flag")?;
        engine.set_first_run_flag(ctx);
        Ok(())
    }

    pub fn pointer_down(&mut self, slot: Slot, x: i32, y: i32) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.ready("pointer_down")?;
        engine.pointer_down(ctx, slot, x, y);
        Ok(())
    }

    pub fn pointer_motion(&mut self, slot: Slot, x: i32, y: i32) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.ready("pointer_motion")?;
        engine.pointer_motion(ctx, slot, x, y);
        Ok(())
    }

    pub fn pointer_up(&mut self, slot: Slot) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.ready("pointer_up")?;
        engine.pointer_up(ctx, slot);
        Ok(())
    }

    pub fn gesture_cancel(&mut self) -> Result<(), LifecycleError> {
        let (engine, ctx) = self.ready("gesture_cancel")?;
        engine.gesture_cancel(ctx);
        Ok(())
    }

    /// Hands the context back to the engine. A second call is rejected and
    /// never reaches the engine.
    pub fn destroy(&mut self) -> Result<(), LifecycleError> {
        match std::mem::replace(&mut self.state, ContextState::Destroyed) {
            ContextState::Created(handle) | ContextState::Ready(handle) => {
                self.engine.destroy(handle.into_inner());
                tracing::info!("engine context destroyed");
                Ok(())
            }
            ContextState::Destroyed => {
                tracing::warn!("ignoring repeated destroy of engine context");
                Err(LifecycleError::AlreadyDestroyed)
            }
            ContextState::Uninitialized => {
                self.state = ContextState::Uninitialized;
                Err(self.out_of_order("destroy"))
            }
        }
    }

    fn live(
        &mut self,
        operation: &'static str,
    ) -> Result<(&mut E, &mut E::Context), LifecycleError> {
        let phase = self.phase();
        match &mut self.state {
            ContextState::Created(handle) | ContextState::Ready(handle) => {
                Ok((&mut self.engine, handle.get_mut()))
            }
            _ => Err(LifecycleError::OutOfOrder { operation, phase }),
        }
    }

    fn ready(
        &mut self,
        operation: &'static str,
    ) -> Result<(&mut E, &mut E::Context), LifecycleError> {
        let phase = self.phase();
        match &mut self.state {
            ContextState::Ready(handle) => Ok((&mut self.engine, handle.get_mut())),
            _ => Err(LifecycleError::OutOfOrder { operation, phase }),
        }
    }

    fn set_ready(&mut self, ready: bool) {
        self.state = match std::mem::replace(&mut self.state, ContextState::Uninitialized) {
            ContextState::Created(handle) | ContextState::Ready(handle) if ready => {
                ContextState::Ready(handle)
            }
            ContextState::Created(handle) | ContextState::Ready(handle) => {
                ContextState::Created(handle)
            }
            other => other,
        };
    }

    fn out_of_order(&self, operation: &'static str) -> LifecycleError {
        LifecycleError::OutOfOrder {
            operation,
            phase: self.phase(),
        }
    }
}

impl<E: Engine> Drop for ContextLifecycle<E> {
    fn drop(&mut self) {
        if matches!(
            self.state,
            ContextState::Created(_) | ContextState::Ready(_)
        ) {
            let _ = self.destroy();
        }
    }
}
