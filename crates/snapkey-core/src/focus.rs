use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const FOCUS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Reports which window currently has input focus, as an opaque id.
/// `None` means the platform cannot tell, and never triggers a reset.
pub trait FocusProbe: Send + 'static {
    fn focused_window(&mut self) -> Option<u64>;
}

/// Polls a [`FocusProbe`] and fires a callback when the foreground window
/// changes. Catches focus changes that never arrive as key events, like
/// mouse-driven window switches.
pub struct FocusWatcher {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl FocusWatcher {
    pub fn spawn<P, F>(probe: P, on_change: F) -> FocusWatcher
    where
        P: FocusProbe,
        F: FnMut() + Send + 'static,
    {
        FocusWatcher::spawn_with_interval(probe, on_change, FOCUS_POLL_INTERVAL)
    }

    pub fn spawn_with_interval<P, F>(
        mut probe: P,
        mut on_change: F,
        interval: Duration,
    ) -> FocusWatcher
    where
        P: FocusProbe,
        F: FnMut() + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_in_worker = Arc::clone(&stop);

        let worker = thread::spawn(move || {
            let mut last = probe.focused_window();
            while !stop_in_worker.load(Ordering::SeqCst) {
                thread::sleep(interval);
                if stop_in_worker.load(Ordering::SeqCst) {
                    break;
                }
                let current = probe.focused_window();
                if let (Some(current), Some(last)) = (current, last) {
                    if current != last {
                        on_change();
                    }
                }
                last = current;
            }
        });

        FocusWatcher {
            stop,
            worker: Some(worker),
        }
    }

    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for FocusWatcher {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Fallback probe for platforms without foreground-window support; focus
/// resets then rely on the navigation-key heuristics alone.
pub struct NullProbe;

impl FocusProbe for NullProbe {
    fn focused_window(&mut self) -> Option<u64> {
        None
    }
}
