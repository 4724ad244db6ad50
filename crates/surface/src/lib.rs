//! Control plane between a host's UI thread and the thread that renders the
//! game.
//!
//! ```text
//!   UI thread                                   render thread
//!   ─────────                                   ─────────────
//!   on_touch ──▶ PointerTracker ──┐
//!   lifecycle / config calls ─────┼──▶ CommandQueue ──▶ RenderLoop ──▶ ContextLifecycle ──▶ Engine
//!   other threads (CommandSender)─┘        ▲                  │
//!                                          └── EngineNotifier ┘  (redraw / idle flush)
//! ```
//!
//! [`SurfaceBridge`] is the composition root. It de-duplicates raw touches,
//! serialises every cross-thread request into one ordered command stream,
//! and owns the render thread for the lifetime of a surface. The engine sits
//! behind the [`Engine`] trait and only ever sees its context on the render
//! thread, one command at a time. [`session::resolve`] decides at start-up
//! whether the engine resumes a persisted snapshot or follows a fresh
//! invitation.

pub mod bridge;
pub mod command;
pub mod engine;
pub mod instance_state;
pub mod invite;
pub mod lifecycle;
pub mod pointer;
pub mod queue;
mod render;
pub mod session;
#[cfg(test)]
mod testing;
pub mod ui_thread;

pub use bridge::{BridgeError, BridgeSettings, SurfaceBridge};
pub use command::{Command, Slot, MAX_POINTERS};
pub use engine::{CreateParams, Engine, EngineContextHandle, EngineNotifier};
pub use instance_state::InstanceState;
pub use lifecycle::{ContextLifecycle, LifecycleError, LifecyclePhase};
pub use pointer::{PointerTracker, TouchPhase};
pub use queue::{command_queue, CommandReceiver, CommandSender, QueueError};
pub use render::RenderSignal;
pub use session::{resolve, Decision, InviteRef, SessionSnapshot};
pub use ui_thread::{ui_task_queue, UiTask, UiTaskPoster, UiTaskQueue};
