use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::command::Slot;
use crate::engine::{CreateParams, Engine, EngineNotifier};
use crate::session::{InviteRef, SessionSnapshot};

pub(crate) type Log = Arc<Mutex<Vec<String>>>;

pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Polls until `entry` has been logged; the render thread draws after it
/// drains a batch, so there is no reply to block on.
pub(crate) fn wait_for(log: &Log, entry: &str) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !entries(log).iter().any(|logged| logged == entry) {
        assert!(Instant::now() < deadline, "timed out waiting for {entry:?}");
        thread::sleep(Duration::from_millis(2));
    }
}

/// Engine that writes one line per call. Pressing a finger marks the
/// surface dirty, the way a real painter would.
pub(crate) struct LogEngine {
    log: Log,
    fail_init: bool,
}

pub(crate) struct LogContext {
    notifier: EngineNotifier,
    snapshot: Option<SessionSnapshot>,
}

impl LogEngine {
    pub(crate) fn new(fail_init: bool) -> (Self, Log) {
        let log = Log::default();
        (
            Self {
                log: log.clone(),
                fail_init,
            },
            log,
        )
    }

    fn push(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }
}

impl Engine for LogEngine {
    type Context = LogContext;

    fn create(&mut self, _: &CreateParams, notifier: EngineNotifier) -> LogContext {
        self.push("create");
        LogContext {
            notifier,
            snapshot: None,
        }
    }
    fn init_context(&mut self, _: &mut LogContext) -> anyhow::Result<()> {
        self.push("init");
        if self.fail_init {
            anyhow::bail!("no GL library");
        }
        Ok(())
    }
    fn resize(&mut self, _: &mut LogContext, w: u32, h: u32) {
        self.push(format!("resize {w}x{h}"));
    }
    fn redraw(&mut self, _: &mut LogContext) {
        self.push("redraw");
    }
    fn flush_idle_events(&mut self, _: &mut LogContext) {
        self.push("flush");
    }
    fn destroy(&mut self, _: LogContext) {
        self.push("destroy");
    }
    fn set_session_state(&mut self, ctx: &mut LogContext, s: &SessionSnapshot) {
        self.push(format!("session {}", s.as_str()));
        ctx.snapshot = Some(s.clone());
    }
    fn session_state(&mut self, ctx: &mut LogContext) -> Option<SessionSnapshot> {
        Some(ctx.snapshot.clone().unwrap_or_else(|| SessionSnapshot::new("saved")))
    }
    fn set_invite_reference(&mut self, _: &mut LogContext, i: &InviteRef) {
        self.push(format!("invite {}", i.as_str()));
    }
    fn set_language(&mut self, _: &mut LogContext, code: &str) {
        self.push(format!("language {code}"));
    }
    fn set_player_name(&mut self, _: &mut LogContext, name: &str) {
        self.push(format!("name {name}"));
    }
    fn set_first_run_flag(&mut self, _: &mut LogContext) {
        self.push("first-run");
    }
    fn pointer_down(&mut self, ctx: &mut LogContext, slot: Slot, _: i32, _: i32) {
        self.push(format!("down {slot}"));
        ctx.notifier.request_redraw();
    }
    fn pointer_motion(&mut self, _: &mut LogContext, slot: Slot, _: i32, _: i32) {
        self.push(format!("motion {slot}"));
    }
    fn pointer_up(&mut self, _: &mut LogContext, slot: Slot) {
        self.push(format!("up {slot}"));
    }
    fn gesture_cancel(&mut self, _: &mut LogContext) {
        self.push("cancel");
    }
}
