use crate::event::LogicalSignal;
use crate::models::ExpansionRequest;
use crate::settings::Settings;
use crate::store::SnippetLookup;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Trigger buffer capacity. On overflow the oldest characters are dropped.
pub const MAX_BUFFER_LEN: usize = 200;

/// Consumes the interceptor's logical stream and decides, on each delimiter,
/// whether a keyword was just completed.
///
/// The buffer is the whole state machine: characters append, backspace pops,
/// space/newline/reset clear, delimiters trigger a match and then clear.
/// Single-threaded by construction; only the worker thread touches it.
pub struct MatchEngine {
    buffer: String,
    lookup: Arc<dyn SnippetLookup>,
    settings: Settings,
    suppressed: Arc<AtomicBool>,
    enabled: Arc<AtomicBool>,
    last_processed: Option<Instant>,
}

impl MatchEngine {
    pub fn new(
        lookup: Arc<dyn SnippetLookup>,
        settings: Settings,
        suppressed: Arc<AtomicBool>,
        enabled: Arc<AtomicBool>,
    ) -> Self {
        MatchEngine {
            buffer: String::new(),
            lookup,
            settings,
            suppressed,
            enabled,
            last_processed: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swap in new settings. Safe between expansions; the pipeline never
    /// calls this mid-replay.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Discard everything accumulated.
    pub fn reset_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Process one logical signal. Returns an expansion request when the
    /// signal completed a known keyword.
    pub fn handle(&mut self, signal: LogicalSignal) -> Option<ExpansionRequest> {
        if !self.enabled.load(Ordering::SeqCst) || self.suppressed.load(Ordering::SeqCst) {
            return None;
        }

        // Optional throttle for low-spec machines: signals arriving faster
        // than the configured interval are dropped without touching state.
        if self.settings.key_interval_ms > 0 {
            let now = Instant::now();
            if let Some(last) = self.last_processed {
                if now.duration_since(last).as_millis() < u128::from(self.settings.key_interval_ms)
                {
                    return None;
                }
            }
            self.last_processed = Some(now);
        }

        match signal {
            LogicalSignal::Reset => {
                self.buffer.clear();
                None
            }
            LogicalSignal::Backspace => {
                self.buffer.pop();
                None
            }
            // Space and newline are the most common legitimate word
            // boundaries: always hard resets, never match triggers.
            LogicalSignal::Char(ch) if ch == ' ' || ch == '\n' => {
                self.buffer.clear();
                None
            }
            LogicalSignal::Char(ch) if self.settings.is_delimiter(ch) => self.handle_delimiter(ch),
            LogicalSignal::Char(ch) => {
                self.buffer.push(ch);
                self.trim_to_bound();
                None
            }
        }
    }

    /// Extract the trailing word, look it up, and clear the buffer whether
    /// or not anything matched. A failed match never leaves residue that
    /// could combine with later typing.
    fn handle_delimiter(&mut self, delimiter: char) -> Option<ExpansionRequest> {
        let last_word = self.extract_last_word();

        if last_word.trim().is_empty() {
            self.buffer.clear();
            return None;
        }

        let matched = self.lookup.find_active_by_keyword(&last_word);
        self.buffer.clear();

        let snippet = matched?;
        debug!(keyword = %last_word, delimiter = %delimiter, "keyword matched");

        Some(ExpansionRequest {
            keyword_length: last_word.chars().count(),
            keyword: last_word,
            replacement: snippet.replacement,
            delimiter,
        })
    }

    /// The candidate keyword: everything after the last delimiter or
    /// whitespace character, or the whole buffer if there is none.
    fn extract_last_word(&self) -> String {
        for (idx, ch) in self.buffer.char_indices().rev() {
            if self.settings.is_delimiter(ch) || ch.is_whitespace() {
                return self.buffer[idx + ch.len_utf8()..].to_string();
            }
        }
        self.buffer.clone()
    }

    fn trim_to_bound(&mut self) {
        let excess = self.buffer.chars().count().saturating_sub(MAX_BUFFER_LEN);
        if excess > 0 {
            self.buffer = self.buffer.chars().skip(excess).collect();
        }
    }

    #[cfg(test)]
    fn buffer(&self) -> &str {
        &self.buffer
    }
}
