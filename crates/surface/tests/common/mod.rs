#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};

use surface::{CreateParams, Engine, EngineNotifier, InviteRef, SessionSnapshot, Slot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { density_dpi: u32 },
    Init,
    Resize(u32, u32),
    Redraw,
    FlushIdle,
    Destroy,
    SetSession(String),
    SetInvite(String),
    SetLanguage(String),
    SetName(String),
    FirstRun,
    Down(usize, i32, i32),
    Motion(usize, i32, i32),
    Up(usize),
    Cancel,
}

pub type Calls = Arc<Mutex<Vec<Call>>>;

pub fn snapshot(calls: &Calls) -> Vec<Call> {
    calls.lock().unwrap().clone()
}

pub fn count(calls: &[Call], wanted: &Call) -> usize {
    calls.iter().filter(|call| *call == wanted).count()
}

pub fn position(calls: &[Call], wanted: &Call) -> usize {
    calls
        .iter()
        .position(|call| call == wanted)
        .unwrap_or_else(|| panic!("{wanted:?} was never called in {calls:?}"))
}

/// Polls until at least `wanted` frames have been drawn.
pub fn wait_for_redraws(calls: &Calls, wanted: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while count(&snapshot(calls), &Call::Redraw) < wanted {
        assert!(Instant::now() < deadline, "timed out waiting for {wanted} redraws");
        thread::sleep(Duration::from_millis(2));
    }
}

/// Holds the render thread inside `flush_idle_events` until released.
pub struct FlushGate {
    pub entered: Receiver<()>,
    pub release: Sender<()>,
}

/// Drops frames, whose placement depends on how the render thread batches.
pub fn without_redraws(calls: &[Call]) -> Vec<Call> {
    calls
        .iter()
        .filter(|call| **call != Call::Redraw)
        .cloned()
        .collect()
}

/// Pointer calls in the order the engine saw them.
pub fn inputs(calls: &[Call]) -> Vec<Call> {
    calls
        .iter()
        .filter(|call| {
            matches!(
                call,
                Call::Down(..) | Call::Motion(..) | Call::Up(_) | Call::Cancel
            )
        })
        .cloned()
        .collect()
}

pub struct RecordingEngine {
    calls: Calls,
    fail_init: bool,
    /// Redraw requests the engine issues itself after each pointer down.
    redraw_on_down: bool,
    flush_gate: Option<(Sender<()>, Receiver<()>)>,
}

pub struct RecordingContext {
    notifier: EngineNotifier,
    session: Option<SessionSnapshot>,
}

impl RecordingEngine {
    pub fn new() -> (Self, Calls) {
        let calls = Calls::default();
        (
            Self {
                calls: calls.clone(),
                fail_init: false,
                redraw_on_down: false,
                flush_gate: None,
            },
            calls,
        )
    }

    pub fn failing() -> (Self, Calls) {
        let (mut engine, calls) = Self::new();
        engine.fail_init = true;
        (engine, calls)
    }

    pub fn redrawing_on_down() -> (Self, Calls) {
        let (mut engine, calls) = Self::new();
        engine.redraw_on_down = true;
        (engine, calls)
    }

    pub fn gated() -> (Self, Calls, FlushGate) {
        let (mut engine, calls) = Self::new();
        let (entered_tx, entered) = unbounded();
        let (release, release_rx) = unbounded();
        engine.flush_gate = Some((entered_tx, release_rx));
        (engine, calls, FlushGate { entered, release })
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Engine for RecordingEngine {
    type Context = RecordingContext;

    fn create(&mut self, params: &CreateParams, notifier: EngineNotifier) -> RecordingContext {
        self.record(Call::Create {
            density_dpi: params.density_dpi,
        });
        RecordingContext {
            notifier,
            session: None,
        }
    }

    fn init_context(&mut self, _: &mut RecordingContext) -> anyhow::Result<()> {
        self.record(Call::Init);
        if self.fail_init {
            anyhow::bail!("EGL_BAD_DISPLAY");
        }
        Ok(())
    }

    fn resize(&mut self, _: &mut RecordingContext, width: u32, height: u32) {
        self.record(Call::Resize(width, height));
    }

    fn redraw(&mut self, _: &mut RecordingContext) {
        self.record(Call::Redraw);
    }

    fn flush_idle_events(&mut self, _: &mut RecordingContext) {
        self.record(Call::FlushIdle);
        if let Some((entered, release)) = &self.flush_gate {
            let _ = entered.send(());
            let _ = release.recv();
        }
    }

    fn destroy(&mut self, _: RecordingContext) {
        self.record(Call::Destroy);
    }

    fn set_session_state(&mut self, ctx: &mut RecordingContext, snapshot: &SessionSnapshot) {
        self.record(Call::SetSession(snapshot.as_str().to_owned()));
        ctx.session = Some(snapshot.clone());
    }

    fn session_state(&mut self, ctx: &mut RecordingContext) -> Option<SessionSnapshot> {
        ctx.session.clone()
    }

    fn set_invite_reference(&mut self, _: &mut RecordingContext, invite: &InviteRef) {
        self.record(Call::SetInvite(invite.as_str().to_owned()));
    }

    fn set_language(&mut self, _: &mut RecordingContext, code: &str) {
        self.record(Call::SetLanguage(code.to_owned()));
    }

    fn set_player_name(&mut self, _: &mut RecordingContext, name: &str) {
        self.record(Call::SetName(name.to_owned()));
    }

    fn set_first_run_flag(&mut self, _: &mut RecordingContext) {
        self.record(Call::FirstRun);
    }

    fn pointer_down(&mut self, ctx: &mut RecordingContext, slot: Slot, x: i32, y: i32) {
        self.record(Call::Down(slot.index(), x, y));
        if self.redraw_on_down {
            ctx.notifier.request_redraw();
        }
    }

    fn pointer_motion(&mut self, _: &mut RecordingContext, slot: Slot, x: i32, y: i32) {
        self.record(Call::Motion(slot.index(), x, y));
    }

    fn pointer_up(&mut self, _: &mut RecordingContext, slot: Slot) {
        self.record(Call::Up(slot.index()));
    }

    fn gesture_cancel(&mut self, _: &mut RecordingContext) {
        self.record(Call::Cancel);
    }
}
