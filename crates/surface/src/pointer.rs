//! Pointer de-duplication on the UI thread.
//!
//! The host runtime delivers overlapping and sometimes spurious touch events.
//! `PointerTracker` keeps one `PointerSlot` per supported contact and turns
//! raw events into commands only when a slot actually changes state, so the
//! render thread never sees a duplicate down or a stray motion after an up.

use crate::command::{Command, Slot, MAX_POINTERS};

/// Phase of a raw touch event as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    /// The last contact left the screen; every active slot is released.
    ReleaseAll,
    Cancel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerSlot {
    pub active: bool,
    pub last_position: (i32, i32),
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    slots: [PointerSlot; MAX_POINTERS],
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_down(&mut self, id: i32, x: i32, y: i32) -> Option<Command> {
        let slot = validate(id)?;
        let state = &mut self.slots[slot.index()];
        if state.active {
            return None;
        }
        state.active = true;
        state.last_position = (x, y);
        Some(Command::PointerDown { slot, x, y })
    }

    pub fn on_motion(&mut self, id: i32, x: i32, y: i32) -> Option<Command> {
        let slot = validate(id)?;
        let state = &mut self.slots[slot.index()];
        if !state.active {
            return None;
        }
        state.last_position = (x, y);
        Some(Command::PointerMotion { slot, x, y })
    }

    pub fn on_up(&mut self, id: i32) -> Option<Command> {
        let slot = validate(id)?;
        let state = &mut self.slots[slot.index()];
        if !state.active {
            return None;
        }
        state.active = false;
        Some(Command::PointerUp { slot })
    }

    /// Clears every slot and emits exactly one cancel, whatever was active.
    pub fn on_cancel_all(&mut self) -> Command {
        self.reset();
        Command::GestureCancel
    }

    /// Releases each active slot individually, in slot order.
    pub fn on_release_all(&mut self) -> Vec<Command> {
        Slot::all()
            .filter_map(|slot| self.on_up(slot.index() as i32))
            .collect()
    }

    pub fn on_touch(&mut self, id: i32, phase: TouchPhase, x: i32, y: i32) -> Vec<Command> {
        match phase {
            TouchPhase::Down => self.on_down(id, x, y).into_iter().collect(),
            TouchPhase::Move => self.on_motion(id, x, y).into_iter().collect(),
            TouchPhase::Up => self.on_up(id).into_iter().collect(),
            TouchPhase::ReleaseAll => self.on_release_all(),
            TouchPhase::Cancel => vec![self.on_cancel_all()],
        }
    }

    /// Forgets all contacts without emitting anything; used when the surface goes away.
    pub fn reset(&mut self) {
        self.slots = [PointerSlot::default(); MAX_POINTERS];
    }

    pub fn slot(&self, slot: Slot) -> &PointerSlot {
        &self.slots[slot.index()]
    }

    pub fn is_active(&self, slot: Slot) -> bool {
        self.slots[slot.index()].active
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }
}

fn validate(id: i32) -> Option<Slot> {
    let slot = Slot::new(id);
    if slot.is_none() {
        tracing::trace!(id, "ignoring pointer id outside the tracked range");
    }
    slot
}
