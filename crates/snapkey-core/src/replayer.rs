use crate::models::ExpansionRequest;
use crate::output::KeyOutput;
use crate::settings::Settings;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Pause before the first synthetic backspace, so the delimiter the user
/// just typed has been rendered by the target before we start deleting.
pub const PRE_DELETE_SETTLE: Duration = Duration::from_millis(30);

/// Physically undoes a typed keyword and types the replacement in its place.
///
/// Raises the shared suppression flag before the first synthetic event; the
/// pipeline lowers it again once the trigger buffer has been cleared and the
/// replay has settled. The send lock makes the whole delete-then-insert
/// sequence mutually exclusive with itself, so two expansions can never
/// interleave synthetic events.
pub struct Replayer<O: KeyOutput> {
    output: O,
    suppressed: Arc<AtomicBool>,
    send_lock: Mutex<()>,
}

impl<O: KeyOutput> Replayer<O> {
    pub fn new(output: O, suppressed: Arc<AtomicBool>) -> Self {
        Replayer {
            output,
            suppressed,
            send_lock: Mutex::new(()),
        }
    }

    /// Run one replay to completion. Injection failures are logged and the
    /// sequence proceeds optimistically to the next keystroke; there is no
    /// retry protocol.
    pub fn replay(&mut self, request: &ExpansionRequest, settings: &Settings) {
        let _guard = self
            .send_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        self.suppressed.store(true, Ordering::SeqCst);
        thread::sleep(PRE_DELETE_SETTLE);

        let backspace_delay = Duration::from_millis(settings.backspace_delay_ms);
        // One extra deletion covers the delimiter that triggered the match.
        for _ in 0..request.keyword_length + 1 {
            if let Err(err) = self.output.backspace() {
                warn!(%err, "synthetic backspace failed");
            }
            thread::sleep(backspace_delay);
        }
        // Let the last deletion land before insertion begins.
        thread::sleep(backspace_delay);

        let char_delay = Duration::from_millis(settings.char_delay_ms);
        for ch in request.replacement.chars() {
            let sent = match ch {
                // A line break is represented once, not twice.
                '\r' => continue,
                '\n' => self.output.newline(),
                '\t' => self.output.tab(),
                _ => self.output.unicode_char(ch),
            };
            if let Err(err) = sent {
                warn!(%err, character = %ch, "synthetic character failed");
            }
            thread::sleep(char_delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SentKey {
        Backspace,
        Newline,
        Tab,
        Char(char),
    }

    #[derive(Clone, Default)]
    struct RecordingOutput {
        sent: Arc<Mutex<Vec<SentKey>>>,
        fail_backspaces: bool,
    }

    impl KeyOutput for RecordingOutput {
        fn backspace(&mut self) -> Result<()> {
            if self.fail_backspaces {
                return Err(crate::SnapkeyError::Injection("boom".to_string()));
            }
            self.sent.lock().unwrap().push(SentKey::Backspace);
            Ok(())
        }

        fn newline(&mut self) -> Result<()> {
            self.sent.lock().unwrap().push(SentKey::Newline);
            Ok(())
        }

        fn tab(&mut self) -> Result<()> {
            self.sent.lock().unwrap().push(SentKey::Tab);
            Ok(())
        }

        fn unicode_char(&mut self, ch: char) -> Result<()> {
            self.sent.lock().unwrap().push(SentKey::Char(ch));
            Ok(())
        }
    }

    fn request(keyword: &str, replacement: &str) -> ExpansionRequest {
        ExpansionRequest {
            keyword: keyword.to_string(),
            replacement: replacement.to_string(),
            delimiter: ' ',
            keyword_length: keyword.chars().count(),
        }
    }

    fn fast_settings() -> Settings {
        Settings {
            backspace_delay_ms: 0,
            char_delay_ms: 0,
            ..Settings::default()
        }
    }

    #[test]
    fn deletes_keyword_plus_delimiter_then_types_replacement() {
        let output = RecordingOutput::default();
        let sent = Arc::clone(&output.sent);
        let suppressed = Arc::new(AtomicBool::new(false));
        let mut replayer = Replayer::new(output, Arc::clone(&suppressed));

        replayer.replay(&request(";sig", "Best"), &fast_settings());

        let expected: Vec<SentKey> = std::iter::repeat(SentKey::Backspace)
            .take(5)
            .chain("Best".chars().map(SentKey::Char))
            .collect();
        assert_eq!(*sent.lock().unwrap(), expected);
    }

    #[test]
    fn raises_suppression_and_leaves_it_raised() {
        // Lowering is the pipeline's job, after the buffer is cleared.
        let output = RecordingOutput::default();
        let suppressed = Arc::new(AtomicBool::new(false));
        let mut replayer = Replayer::new(output, Arc::clone(&suppressed));

        replayer.replay(&request(";a", "x"), &fast_settings());
        assert!(suppressed.load(Ordering::SeqCst));
    }

    #[test]
    fn newline_tab_and_carriage_return_handling() {
        let output = RecordingOutput::default();
        let sent = Arc::clone(&output.sent);
        let suppressed = Arc::new(AtomicBool::new(false));
        let mut replayer = Replayer::new(output, suppressed);

        replayer.replay(&request(";x", "a\r\n\tb"), &fast_settings());

        assert_eq!(
            *sent.lock().unwrap(),
            vec![
                SentKey::Backspace,
                SentKey::Backspace,
                SentKey::Backspace,
                SentKey::Char('a'),
                SentKey::Newline,
                SentKey::Tab,
                SentKey::Char('b'),
            ]
        );
    }

    #[test]
    fn failed_backspaces_still_reach_the_insertion_phase() {
        let output = RecordingOutput {
            fail_backspaces: true,
            ..RecordingOutput::default()
        };
        let sent = Arc::clone(&output.sent);
        let suppressed = Arc::new(AtomicBool::new(false));
        let mut replayer = Replayer::new(output, suppressed);

        replayer.replay(&request(";x", "ok"), &fast_settings());

        assert_eq!(
            *sent.lock().unwrap(),
            vec![SentKey::Char('o'), SentKey::Char('k')]
        );
    }
}
