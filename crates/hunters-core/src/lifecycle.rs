//! Run/pause handshake between the UI and the emulator thread.
//!
//! The UI writes the *requested* status; the emulator thread polls it at the
//! start of every frame advance and publishes the status it is actually in.
//! Blocking calls wait on a condvar for that acknowledgement.

use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;

use crate::display::GlScreen;
use crate::settings::Settings;

/// Pause nesting depth of a running emulator.
pub const PAUSE_STACK_RUNNING: u32 = 0;
/// Depth at which the emulator is actually paused.
pub const PAUSE_THRESHOLD: u32 = 1;

/// Re-check interval for blocking waits.
const WAIT_SLICE: Duration = Duration::from_millis(20);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EmuStatus {
    #[default]
    Exit,
    Paused,
    Running,
    /// Run one frame, then pause.
    FrameStep,
}

pub enum ContextRequest {
    None,
    InitGl(Box<dyn GlScreen>),
    DeinitGl,
    /// Taken by the emulator thread, not yet completed.
    InProgress,
}

impl fmt::Debug for ContextRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContextRequest::None => "None",
            ContextRequest::InitGl(_) => "InitGl",
            ContextRequest::DeinitGl => "DeinitGl",
            ContextRequest::InProgress => "InProgress",
        })
    }
}

#[derive(Debug)]
struct ControlState {
    requested: EmuStatus,
    previous: EmuStatus,
    status: EmuStatus,
    pause_stack: u32,
    active: bool,
    context: ContextRequest,
    settings: Option<Settings>,
}

/// Shared between the UI thread and the emulator thread.
#[derive(Debug)]
pub struct EmuControl {
    state: Mutex<ControlState>,
    changed: Condvar,
}

impl Default for EmuControl {
    fn default() -> Self {
        Self::new()
    }
}

impl EmuControl {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ControlState {
                requested: EmuStatus::Paused,
                previous: EmuStatus::Paused,
                status: EmuStatus::Exit,
                pause_stack: PAUSE_STACK_RUNNING,
                active: false,
                context: ContextRequest::None,
                settings: None,
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_until<'a, F>(
        &self,
        mut guard: MutexGuard<'a, ControlState>,
        done: F,
    ) -> MutexGuard<'a, ControlState>
    where
        F: Fn(&ControlState) -> bool,
    {
        while !done(&guard) {
            guard = match self.changed.wait_timeout(guard, WAIT_SLICE) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        guard
    }

    /// Push one pause level; waits for the worker when this is the level
    /// that actually pauses it.
    fn push_pause<'a>(
        &self,
        mut s: MutexGuard<'a, ControlState>,
    ) -> MutexGuard<'a, ControlState> {
        if s.requested == EmuStatus::Exit {
            return s;
        }
        s.pause_stack += 1;
        if s.pause_stack > PAUSE_THRESHOLD {
            return s;
        }

        s.previous = s.requested;
        s.requested = EmuStatus::Paused;
        self.changed.notify_all();
        self.wait_until(s, |s| {
            matches!(s.status, EmuStatus::Paused | EmuStatus::Exit)
                || s.requested == EmuStatus::Exit
        })
    }

    // UI side.

    pub fn run(&self) {
        let mut s = self.lock();
        s.requested = EmuStatus::Running;
        s.pause_stack = PAUSE_STACK_RUNNING;
        s.active = true;
        self.changed.notify_all();
    }

    /// Request a pause and wait for the emulator thread to settle in it.
    ///
    /// Nested calls only bump the counter; each needs a matching
    /// [`unpause`](Self::unpause).
    pub fn pause(&self) {
        drop(self.push_pause(self.lock()));
    }

    pub fn unpause(&self) {
        let mut s = self.lock();
        if s.pause_stack < PAUSE_THRESHOLD {
            return;
        }

        s.pause_stack -= 1;
        if s.pause_stack >= PAUSE_THRESHOLD {
            return;
        }

        s.requested = s.previous;
        self.changed.notify_all();
    }

    pub fn stop(&self) {
        let mut s = self.lock();
        s.requested = EmuStatus::Exit;
        s.pause_stack = PAUSE_STACK_RUNNING;
        self.changed.notify_all();
    }

    /// Run a single frame, pausing first if needed.
    ///
    /// Does nothing if the emulator was unpaused or stopped while waiting for
    /// the pause to take.
    pub fn frame_step(&self) {
        let mut s = self.lock();
        if s.pause_stack < PAUSE_THRESHOLD {
            s = self.push_pause(s);
        }
        if s.pause_stack < PAUSE_THRESHOLD || s.requested == EmuStatus::Exit {
            return;
        }
        s.requested = EmuStatus::FrameStep;
        self.changed.notify_all();
    }

    pub fn is_running(&self) -> bool {
        self.lock().requested == EmuStatus::Running
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn is_paused(&self) -> bool {
        self.lock().pause_stack >= PAUSE_THRESHOLD
    }

    /// Hand a GL surface to the emulator thread and wait until it is set up.
    ///
    /// Serviced while paused.
    pub fn init_context(&self, screen: Box<dyn GlScreen>) {
        let mut s = self.lock();
        s.context = ContextRequest::InitGl(screen);
        drop(self.wait_until(s, |s| {
            matches!(s.context, ContextRequest::None) || s.status == EmuStatus::Exit
        }));
    }

    pub fn deinit_context(&self) {
        let mut s = self.lock();
        s.context = ContextRequest::DeinitGl;
        drop(self.wait_until(s, |s| {
            matches!(s.context, ContextRequest::None) || s.status == EmuStatus::Exit
        }));
    }

    /// Replace the settings; video settings are re-applied on the next frame.
    pub fn update_settings(&self, settings: Settings) {
        self.lock().settings = Some(settings);
    }

    // Emulator thread side.

    /// Mark a worker as starting, so blocking requests made before its first
    /// frame wait for it instead of seeing no worker.
    pub fn worker_starting(&self) {
        let mut s = self.lock();
        if s.status == EmuStatus::Exit {
            s.status = EmuStatus::Running;
        }
    }

    pub fn requested(&self) -> EmuStatus {
        self.lock().requested
    }

    pub fn status(&self) -> EmuStatus {
        self.lock().status
    }

    /// Mark the start of an emulated frame. A pending frame step turns into a
    /// pause request for the next advance.
    pub fn begin_frame(&self) {
        let mut s = self.lock();
        s.status = EmuStatus::Running;
        if s.requested == EmuStatus::FrameStep {
            s.requested = EmuStatus::Paused;
        }
        self.changed.notify_all();
    }

    /// Publish the requested status as the current one.
    pub fn acknowledge(&self) {
        let mut s = self.lock();
        if s.status != s.requested {
            debug!("Emulator status {:?} -> {:?}", s.status, s.requested);
        }
        s.status = s.requested;
        self.changed.notify_all();
    }

    pub fn publish_exit(&self) {
        let mut s = self.lock();
        s.status = EmuStatus::Exit;
        s.requested = EmuStatus::Exit;
        s.active = false;
        self.changed.notify_all();
    }

    pub fn take_settings(&self) -> Option<Settings> {
        self.lock().settings.take()
    }

    pub fn take_context_request(&self) -> ContextRequest {
        let mut s = self.lock();
        match s.context {
            ContextRequest::None | ContextRequest::InProgress => ContextRequest::None,
            _ => std::mem::replace(&mut s.context, ContextRequest::InProgress),
        }
    }

    pub fn complete_context_request(&self) {
        let mut s = self.lock();
        s.context = ContextRequest::None;
        self.changed.notify_all();
    }
}
