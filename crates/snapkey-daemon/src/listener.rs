use rdev::{Event, EventType, Key};
use snapkey_core::{
    Interceptor, Modifiers, PipelineHandle, RawKeyEvent, Result, SnapkeyError,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::error;

/// How long to wait for the hook attach to fail before assuming it took.
/// `rdev::listen` blocks forever on success, so an early return is the only
/// failure signal available.
const ATTACH_GRACE: Duration = Duration::from_millis(500);

/// Attach the system-wide keyboard listener and feed classified signals into
/// the pipeline.
///
/// Classification runs on the hook callback thread and is the only work
/// done there; everything stateful happens on the pipeline's worker thread,
/// on the far side of the channel. A hook that cannot attach at all is fatal
/// for the whole feature and is reported to the caller.
pub fn start_listener(
    handle: PipelineHandle,
    suppressed: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    let (failure_tx, failure_rx) = mpsc::channel();

    let worker = thread::spawn(move || {
        let mut interceptor = Interceptor::new(suppressed);
        let mut modifiers = ModifierTracker::default();

        let callback = move |event: Event| {
            // The hook must survive anything classification does; a dropped
            // signal is acceptable, a poisoned hook thread is not. rdev
            // observes the event stream without gating OS delivery, so
            // returning is all that is needed to keep input flowing.
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                handle_event(&event, &mut interceptor, &mut modifiers, &handle);
            }));
            if outcome.is_err() {
                error!("keyboard callback panicked; event dropped");
            }
        };

        if let Err(err) = rdev::listen(callback) {
            let _ = failure_tx.send(format!("{:?}", err));
        }
    });

    match failure_rx.recv_timeout(ATTACH_GRACE) {
        Ok(reason) => Err(SnapkeyError::Hook(format!(
            "failed to attach keyboard listener: {}",
            reason
        ))),
        Err(_) => Ok(worker),
    }
}

fn handle_event(
    event: &Event,
    interceptor: &mut Interceptor,
    modifiers: &mut ModifierTracker,
    handle: &PipelineHandle,
) {
    match event.event_type {
        EventType::KeyPress(key) => {
            modifiers.press(key);
            let raw = RawKeyEvent::physical(key, event.name.clone(), modifiers.current());
            if let Some(signal) = interceptor.classify(&raw) {
                handle.signal(signal);
            }
        }
        EventType::KeyRelease(key) => {
            modifiers.release(key);
        }
        _ => {}
    }
}

/// Ctrl/Alt state reconstructed from press/release pairs; rdev does not
/// report modifier state on the event itself.
#[derive(Default)]
struct ModifierTracker {
    ctrl_left: bool,
    ctrl_right: bool,
    alt: bool,
    alt_gr: bool,
}

impl ModifierTracker {
    fn press(&mut self, key: Key) {
        self.set(key, true);
    }

    fn release(&mut self, key: Key) {
        self.set(key, false);
    }

    fn set(&mut self, key: Key, down: bool) {
        match key {
            Key::ControlLeft => self.ctrl_left = down,
            Key::ControlRight => self.ctrl_right = down,
            Key::Alt => self.alt = down,
            Key::AltGr => self.alt_gr = down,
            _ => {}
        }
    }

    fn current(&self) -> Modifiers {
        Modifiers {
            ctrl: self.ctrl_left || self.ctrl_right,
            alt: self.alt || self.alt_gr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_follows_press_and_release() {
        let mut tracker = ModifierTracker::default();
        assert_eq!(tracker.current(), Modifiers::default());

        tracker.press(Key::ControlLeft);
        tracker.press(Key::Alt);
        assert!(tracker.current().ctrl);
        assert!(tracker.current().alt);

        tracker.release(Key::ControlLeft);
        assert!(!tracker.current().ctrl);
        assert!(tracker.current().alt);

        tracker.release(Key::Alt);
        assert_eq!(tracker.current(), Modifiers::default());
    }

    #[test]
    fn either_control_key_counts() {
        let mut tracker = ModifierTracker::default();
        tracker.press(Key::ControlRight);
        assert!(tracker.current().ctrl);
        tracker.press(Key::ControlLeft);
        tracker.release(Key::ControlRight);
        assert!(tracker.current().ctrl);
    }
}
