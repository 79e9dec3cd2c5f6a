use signal_hook::SigId;
use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Signals that end the session through the normal return path
pub const TERMINATING_SIGNALS: [i32; 4] = [SIGHUP, SIGINT, SIGQUIT, SIGTERM];

/// Records the last terminating signal delivered to the process
///
/// The handler only stores the signal number; the session loop looks at it
/// after each readiness wait and winds down from there, so the terminal is
/// restored by ordinary code rather than inside a signal handler.
pub struct SignalFlag {
    raised: Arc<AtomicUsize>,
    ids: Vec<SigId>,
}

impl SignalFlag {
    pub fn register() -> io::Result<Self> {
        let mut flag = Self::detached();
        for signal in TERMINATING_SIGNALS {
            let id = signal_hook::flag::register_usize(
                signal,
                Arc::clone(&flag.raised),
                signal as usize,
            )?;
            flag.ids.push(id);
        }
        Ok(flag)
    }

    /// A flag with no handlers behind it
    pub fn detached() -> Self {
        Self {
            raised: Arc::new(AtomicUsize::new(0)),
            ids: Vec::new(),
        }
    }

    /// Signal number, if one has arrived
    pub fn raised(&self) -> Option<i32> {
        match self.raised.load(Ordering::SeqCst) {
            0 => None,
            signal => i32::try_from(signal).ok(),
        }
    }

    /// Mark `signal` as delivered
    pub fn raise(&self, signal: i32) {
        if let Ok(value) = usize::try_from(signal) {
            self.raised.store(value, Ordering::SeqCst);
        }
    }
}

impl Drop for SignalFlag {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }
}
