use crossbeam_channel::Sender;

use crate::session::{InviteRef, SessionSnapshot};

/// Number of touch contacts the engine's gesture vocabulary understands.
pub const MAX_POINTERS: usize = 2;

/// A validated pointer slot. Only ids in `[0, MAX_POINTERS)` can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u8);

impl Slot {
    /// Validates a raw pointer id delivered by the host runtime.
    pub fn new(id: i32) -> Option<Self> {
        if (0..MAX_POINTERS as i32).contains(&id) {
            Some(Slot(id as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Slot> {
        (0..MAX_POINTERS as u8).map(Slot)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of work addressed to the render thread.
///
/// Commands are created on a producer thread, owned by the queue while in
/// flight and consumed by the render thread, which applies them strictly in
/// the order they were enqueued.
#[derive(Debug, Clone)]
pub enum Command {
    PointerDown { slot: Slot, x: i32, y: i32 },
    PointerMotion { slot: Slot, x: i32, y: i32 },
    PointerUp { slot: Slot },
    GestureCancel,
    Resize { width: u32, height: u32 },
    InitContext,
    /// Marks a frame as pending. Several of these in one batch still draw once.
    Redraw,
    SetSessionState(SessionSnapshot),
    SetInviteReference(InviteRef),
    SetPlayerName(String),
    SetLanguage(String),
    SetFirstRunFlag,
    /// Reads the engine's session snapshot in queue order and sends it back.
    QuerySessionState(Sender<Option<SessionSnapshot>>),
    FlushIdle,
    Teardown,
}

impl Command {
    /// True for commands produced by the pointer tracker.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Command::PointerDown { .. }
                | Command::PointerMotion { .. }
                | Command::PointerUp { .. }
                | Command::GestureCancel
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::PointerDown { .. } => "pointer-down",
            Command::PointerMotion { .. } => "pointer-motion",
            Command::PointerUp { .. } => "pointer-up",
            Command::GestureCancel => "gesture-cancel",
            Command::Resize { .. } => "resize",
            Command::InitContext => "init-context",
            Command::Redraw => "redraw",
            Command::SetSessionState(_) => "set-session-state",
            Command::SetInviteReference(_) => "set-invite-reference",
            Command::SetPlayerName(_) => "set-player-name",
            Command::SetLanguage(_) => "set-language",
            Command::SetFirstRunFlag => "set-first-run-flag",
            Command::QuerySessionState(_) => "query-session-state",
            Command::FlushIdle => "flush-idle",
            Command::Teardown => "teardown",
        }
    }
}
