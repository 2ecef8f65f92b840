use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel as cb;
use log::{info, warn};

use crate::console::ConsoleFactory;
use crate::display::DisplayShare;
use crate::error::ConsoleError;
use crate::input::HostInput;
use crate::lifecycle::EmuControl;
use crate::pacing::SystemClock;
use crate::pump::{FramePump, FrontendEvent};
use crate::settings::Settings;

/// The emulator worker: owns the console and runs the frame pump.
pub struct EmuThread {
    control: Arc<EmuControl>,
    display: Arc<DisplayShare>,
    handle: Option<JoinHandle<()>>,
}

impl EmuThread {
    /// Create the console and start the worker thread.
    ///
    /// A console that cannot be created is reported here and no thread is
    /// started. The worker comes up paused; call [`EmuControl::run`] to start
    /// emulating.
    pub fn launch<F, H>(
        factory: &F,
        host: H,
        settings: Settings,
        events: cb::Sender<FrontendEvent>,
    ) -> Result<Self, ConsoleError>
    where
        F: ConsoleFactory,
        F::Output: 'static,
        H: HostInput + Send + 'static,
    {
        let console = factory.create(settings.console_type)?;
        let control = Arc::new(EmuControl::new());
        let display = Arc::new(DisplayShare::default());
        control.worker_starting();

        let handle = {
            let control = control.clone();
            let display = display.clone();
            thread::Builder::new()
                .name("emu".into())
                .spawn(move || {
                    let mut pump = FramePump::new(
                        console,
                        host,
                        SystemClock::new(),
                        control,
                        events,
                        display,
                        settings,
                    );
                    pump.run();
                })?
        };
        info!("Emulator thread started");

        Ok(Self {
            control,
            display,
            handle: Some(handle),
        })
    }

    pub fn control(&self) -> &Arc<EmuControl> {
        &self.control
    }

    pub fn display(&self) -> &Arc<DisplayShare> {
        &self.display
    }

    /// Ask the worker to stop and wait for it to save and exit.
    pub fn stop(&mut self) {
        self.control.stop();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Emulator thread panicked");
        }
    }
}

impl Drop for EmuThread {
    fn drop(&mut self) {
        self.stop();
    }
}
