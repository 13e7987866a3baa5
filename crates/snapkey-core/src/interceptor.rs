use crate::event::{EventOrigin, LogicalSignal, Modifiers, RawKeyEvent};
use rdev::Key;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identical key-downs arriving within this window are treated as driver
/// redelivery, not typing.
pub const KEY_DEBOUNCE: Duration = Duration::from_millis(100);

/// Classifies raw key-downs into logical signals.
///
/// Runs on the hook callback thread: classification is pure computation,
/// never blocks, and drops events rather than erroring. Synthetic self-echo
/// is filtered twice, by origin tag and by the shared suppression flag,
/// because origin tagging alone is not reliable across all injection
/// surfaces.
pub struct Interceptor {
    suppressed: Arc<AtomicBool>,
    last_key: Option<(Key, Option<String>, Modifiers)>,
    last_at: Option<Instant>,
}

impl Interceptor {
    pub fn new(suppressed: Arc<AtomicBool>) -> Self {
        Interceptor {
            suppressed,
            last_key: None,
            last_at: None,
        }
    }

    /// Classify one key-down. `None` means the event is ignored entirely.
    pub fn classify(&mut self, event: &RawKeyEvent) -> Option<LogicalSignal> {
        // Self-echo defense, layer 1: the replayer tags its own output.
        if event.origin == EventOrigin::Synthetic {
            return None;
        }

        // Self-echo defense, layer 2: nothing is real input while a replay
        // is in flight.
        if self.suppressed.load(Ordering::SeqCst) {
            return None;
        }

        let identity = (event.key, event.text.clone(), event.modifiers);
        if let (Some(last), Some(at)) = (&self.last_key, self.last_at) {
            if *last == identity && event.at.duration_since(at) < KEY_DEBOUNCE {
                return None;
            }
        }
        self.last_key = Some(identity);
        self.last_at = Some(event.at);

        if is_context_reset(event.key, event.modifiers) {
            return Some(LogicalSignal::Reset);
        }

        match event.key {
            Key::Backspace => Some(LogicalSignal::Backspace),
            Key::Return | Key::KpReturn => Some(LogicalSignal::Char('\n')),
            Key::Tab => Some(LogicalSignal::Char('\t')),
            Key::Space => Some(LogicalSignal::Char(' ')),
            _ => resolve_char(event)
                .filter(|ch| !ch.is_control())
                .map(LogicalSignal::Char),
        }
    }
}

/// Keys that mean the caret moved or the content changed out from under the
/// trigger buffer: navigation, delete, clipboard/undo shortcuts, Alt+Tab.
fn is_context_reset(key: Key, modifiers: Modifiers) -> bool {
    match key {
        Key::LeftArrow
        | Key::RightArrow
        | Key::UpArrow
        | Key::DownArrow
        | Key::PageUp
        | Key::PageDown
        | Key::Home
        | Key::End
        | Key::Delete => true,
        Key::Tab if modifiers.alt => true,
        Key::KeyC | Key::KeyX | Key::KeyV | Key::KeyZ | Key::KeyY if modifiers.ctrl => true,
        _ => false,
    }
}

/// Resolve a key-down to the printable character the active layout produced.
/// Multi-character names (function keys, dead-key sequences) do not type a
/// single character and are dropped.
fn resolve_char(event: &RawKeyEvent) -> Option<char> {
    let text = event.text.as_deref()?;
    let mut chars = text.chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interceptor() -> (Interceptor, Arc<AtomicBool>) {
        let suppressed = Arc::new(AtomicBool::new(false));
        (Interceptor::new(Arc::clone(&suppressed)), suppressed)
    }

    fn key_event(key: Key, text: &str) -> RawKeyEvent {
        RawKeyEvent::physical(key, Some(text.to_string()), Modifiers::default())
    }

    #[test]
    fn printable_key_becomes_char() {
        let (mut interceptor, _) = interceptor();
        assert_eq!(
            interceptor.classify(&key_event(Key::KeyA, "a")),
            Some(LogicalSignal::Char('a'))
        );
    }

    #[test]
    fn whitespace_keys_map_to_their_characters() {
        let (mut interceptor, _) = interceptor();
        assert_eq!(
            interceptor.classify(&key_event(Key::Space, " ")),
            Some(LogicalSignal::Char(' '))
        );
        assert_eq!(
            interceptor.classify(&key_event(Key::Return, "\n")),
            Some(LogicalSignal::Char('\n'))
        );
        assert_eq!(
            interceptor.classify(&key_event(Key::Tab, "\t")),
            Some(LogicalSignal::Char('\t'))
        );
        assert_eq!(
            interceptor.classify(&RawKeyEvent::physical(Key::Backspace, None, Modifiers::default())),
            Some(LogicalSignal::Backspace)
        );
    }

    #[test]
    fn synthetic_origin_is_discarded() {
        let (mut interceptor, _) = interceptor();
        let mut event = key_event(Key::KeyA, "a");
        event.origin = EventOrigin::Synthetic;
        assert_eq!(interceptor.classify(&event), None);
    }

    #[test]
    fn suppression_flag_discards_physical_events() {
        let (mut interceptor, suppressed) = interceptor();
        suppressed.store(true, Ordering::SeqCst);
        assert_eq!(interceptor.classify(&key_event(Key::KeyA, "a")), None);

        suppressed.store(false, Ordering::SeqCst);
        assert_eq!(
            interceptor.classify(&key_event(Key::KeyA, "a")),
            Some(LogicalSignal::Char('a'))
        );
    }

    #[test]
    fn duplicate_event_within_window_is_debounced() {
        let (mut interceptor, _) = interceptor();
        let first = key_event(Key::KeyA, "a");
        let mut duplicate = first.clone();
        duplicate.at = first.at + Duration::from_millis(20);

        assert!(interceptor.classify(&first).is_some());
        assert_eq!(interceptor.classify(&duplicate), None);
    }

    #[test]
    fn duplicate_event_after_window_passes() {
        let (mut interceptor, _) = interceptor();
        let first = key_event(Key::KeyA, "a");
        let mut later = first.clone();
        later.at = first.at + Duration::from_millis(150);

        assert!(interceptor.classify(&first).is_some());
        assert!(interceptor.classify(&later).is_some());
    }

    #[test]
    fn different_key_is_not_debounced() {
        let (mut interceptor, _) = interceptor();
        assert!(interceptor.classify(&key_event(Key::KeyA, "a")).is_some());
        assert!(interceptor.classify(&key_event(Key::KeyB, "b")).is_some());
    }

    #[test]
    fn navigation_keys_reset() {
        let (mut interceptor, _) = interceptor();
        for key in [
            Key::LeftArrow,
            Key::RightArrow,
            Key::UpArrow,
            Key::DownArrow,
            Key::PageUp,
            Key::PageDown,
            Key::Home,
            Key::End,
            Key::Delete,
        ] {
            assert_eq!(
                interceptor.classify(&RawKeyEvent::physical(key, None, Modifiers::default())),
                Some(LogicalSignal::Reset),
                "{:?} should reset",
                key
            );
        }
    }

    #[test]
    fn clipboard_shortcuts_reset() {
        let (mut interceptor, _) = interceptor();
        let ctrl = Modifiers {
            ctrl: true,
            alt: false,
        };
        for key in [Key::KeyC, Key::KeyX, Key::KeyV, Key::KeyZ, Key::KeyY] {
            assert_eq!(
                interceptor.classify(&RawKeyEvent::physical(key, None, ctrl)),
                Some(LogicalSignal::Reset),
                "ctrl+{:?} should reset",
                key
            );
        }
    }

    #[test]
    fn plain_c_is_a_character_not_a_reset() {
        let (mut interceptor, _) = interceptor();
        assert_eq!(
            interceptor.classify(&key_event(Key::KeyC, "c")),
            Some(LogicalSignal::Char('c'))
        );
    }

    #[test]
    fn alt_tab_resets_but_plain_tab_types() {
        let (mut interceptor, _) = interceptor();
        let alt = Modifiers {
            ctrl: false,
            alt: true,
        };
        assert_eq!(
            interceptor.classify(&RawKeyEvent::physical(Key::Tab, None, alt)),
            Some(LogicalSignal::Reset)
        );
        assert_eq!(
            interceptor.classify(&key_event(Key::Tab, "\t")),
            Some(LogicalSignal::Char('\t'))
        );
    }

    #[test]
    fn unresolvable_keys_are_dropped() {
        let (mut interceptor, _) = interceptor();
        // Function keys report multi-character names.
        assert_eq!(interceptor.classify(&key_event(Key::F5, "F5")), None);
        assert_eq!(
            interceptor.classify(&RawKeyEvent::physical(
                Key::ShiftLeft,
                None,
                Modifiers::default()
            )),
            None
        );
    }
}
