use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::{shell_error::ShellError, MAIN_WINDOW_LABEL, SPLASH_WINDOW_LABEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum HandoffStage {
    #[default]
    NoWindows,
    AwaitingFirstLoad,
    Settling,
    Fading,
    Complete,
}

/// Which windows exist and how far the splash-to-main handoff has progressed.
///
/// Every window pair gets a new generation; signals carrying an older
/// generation are ignored.
#[derive(Debug, Default)]
pub(crate) struct WindowLifecycle {
    generation: u64,
    main_open: bool,
    splash_open: bool,
    main_visible: bool,
    stage: HandoffStage,
}

impl WindowLifecycle {
    pub(crate) fn begin_create(&mut self) -> Result<u64, ShellError> {
        if self.main_open || self.splash_open {
            return Err(ShellError::WindowsAlreadyOpen {
                main_open: self.main_open,
                splash_open: self.splash_open,
            });
        }

        self.generation += 1;
        self.main_open = true;
        self.splash_open = true;
        self.main_visible = false;
        self.stage = HandoffStage::AwaitingFirstLoad;
        Ok(self.generation)
    }

    pub(crate) fn abort_create(&mut self, generation: u64) {
        if generation == self.generation {
            self.main_open = false;
            self.splash_open = false;
            self.main_visible = false;
            self.stage = HandoffStage::NoWindows;
        }
    }

    /// Returns the generation whose handoff should start, once per window pair.
    pub(crate) fn main_first_load(&mut self) -> Option<u64> {
        if self.stage != HandoffStage::AwaitingFirstLoad || !self.main_open {
            return None;
        }
        self.stage = HandoffStage::Settling;
        Some(self.generation)
    }

    pub(crate) fn settle_elapsed(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.stage != HandoffStage::Settling {
            return false;
        }
        self.stage = HandoffStage::Fading;
        true
    }

    /// Closes the splash and reveals the main window in the bookkeeping.
    pub(crate) fn fade_finished(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.stage != HandoffStage::Fading {
            return false;
        }
        self.stage = HandoffStage::Complete;
        self.splash_open = false;
        self.main_visible = self.main_open;
        true
    }

    pub(crate) fn window_destroyed(&mut self, label: &str) {
        match label {
            MAIN_WINDOW_LABEL => {
                self.main_open = false;
                self.main_visible = false;
                if self.stage != HandoffStage::Complete {
                    self.stage = HandoffStage::NoWindows;
                }
            }
            SPLASH_WINDOW_LABEL => self.splash_open = false,
            _ => {}
        }
        if !self.main_open && !self.splash_open {
            self.stage = HandoffStage::NoWindows;
        }
    }

    pub(crate) fn stage(&self) -> HandoffStage {
        self.stage
    }

    pub(crate) fn main_open(&self) -> bool {
        self.main_open
    }

    pub(crate) fn splash_open(&self) -> bool {
        self.splash_open
    }

    pub(crate) fn main_visible(&self) -> bool {
        self.main_visible
    }
}

/// Tauri-managed window lifecycle plus the pending fade-complete signal.
#[derive(Default)]
pub(crate) struct WindowLifecycleState {
    lifecycle: Mutex<WindowLifecycle>,
    fade_signal: Mutex<Option<oneshot::Sender<()>>>,
}

impl WindowLifecycleState {
    pub(crate) fn with<T>(&self, f: impl FnOnce(&mut WindowLifecycle) -> T) -> T {
        let mut lifecycle = self
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut lifecycle)
    }

    /// Installs a fresh fade-complete signal; any earlier one is dropped.
    pub(crate) fn arm_fade_signal(&self) -> oneshot::Receiver<()> {
        let (sender, receiver) = oneshot::channel();
        *self
            .fade_signal
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(sender);
        receiver
    }

    /// Resolves the armed fade signal. Returns `false` when no fade is running.
    pub(crate) fn signal_fade_complete(&self) -> bool {
        let sender = self
            .fade_signal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        sender.is_some_and(|sender| sender.send(()).is_ok())
    }
}
