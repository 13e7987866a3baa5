use crate::engine::MatchEngine;
use crate::event::LogicalSignal;
use crate::models::ExpansionRequest;
use crate::output::KeyOutput;
use crate::replayer::Replayer;
use crate::settings::Settings;
use crate::store::SnippetLookup;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Pause after a replay, before the suppression flag drops, to absorb
/// trailing timing noise from the synthetic events.
pub const REARM_DELAY: Duration = Duration::from_millis(100);

/// Host callback fired exactly once per successful expansion.
pub type ExpansionObserver = Box<dyn Fn(&ExpansionRequest) + Send>;

enum PipelineEvent {
    Signal(LogicalSignal),
    UpdateSettings(Settings),
    Shutdown,
}

/// Cheap, cloneable feeder for the hook thread and the focus watcher.
/// Sending never blocks; if the worker is gone the signal is dropped.
#[derive(Clone)]
pub struct PipelineHandle {
    sender: Sender<PipelineEvent>,
}

impl PipelineHandle {
    pub fn signal(&self, signal: LogicalSignal) {
        let _ = self.sender.send(PipelineEvent::Signal(signal));
    }

    pub fn reset(&self) {
        self.signal(LogicalSignal::Reset);
    }

    pub fn update_settings(&self, settings: Settings) {
        let _ = self.sender.send(PipelineEvent::UpdateSettings(settings));
    }
}

/// Owns the whole expansion pipeline: the shared suppression flag, the match
/// engine, the replayer and the worker thread that runs them.
///
/// The hook callback thread submits classified signals through a
/// [`PipelineHandle`]; everything stateful happens on the single worker
/// thread, so the hook thread never waits on the engine or the replayer.
pub struct Pipeline {
    sender: Sender<PipelineEvent>,
    suppressed: Arc<AtomicBool>,
    enabled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Pipeline {
    pub fn spawn<O: KeyOutput + 'static>(
        lookup: Arc<dyn SnippetLookup>,
        settings: Settings,
        output: O,
        observer: Option<ExpansionObserver>,
    ) -> Pipeline {
        let suppressed = Arc::new(AtomicBool::new(false));
        let enabled = Arc::new(AtomicBool::new(true));

        let mut engine = MatchEngine::new(
            lookup,
            settings,
            Arc::clone(&suppressed),
            Arc::clone(&enabled),
        );
        let mut replayer = Replayer::new(output, Arc::clone(&suppressed));

        let (sender, receiver): (Sender<PipelineEvent>, Receiver<PipelineEvent>) = mpsc::channel();
        let worker_suppressed = Arc::clone(&suppressed);

        let worker = thread::spawn(move || {
            while let Ok(event) = receiver.recv() {
                match event {
                    PipelineEvent::Shutdown => break,
                    PipelineEvent::UpdateSettings(settings) => engine.set_settings(settings),
                    PipelineEvent::Signal(signal) => {
                        let Some(request) = engine.handle(signal) else {
                            continue;
                        };

                        replayer.replay(&request, engine.settings());

                        // Characters the replay itself queued up must not be
                        // treated as real typed input: clear first, then
                        // settle, and only then lower the flag.
                        engine.reset_buffer();
                        thread::sleep(REARM_DELAY);
                        worker_suppressed.store(false, Ordering::SeqCst);

                        info!(
                            keyword = %request.keyword,
                            replacement_len = request.replacement.chars().count(),
                            "expansion completed"
                        );
                        if let Some(observer) = &observer {
                            observer(&request);
                        }
                    }
                }
            }
            debug!("pipeline worker stopped");
        });

        Pipeline {
            sender,
            suppressed,
            enabled,
            worker: Some(worker),
        }
    }

    pub fn handle(&self) -> PipelineHandle {
        PipelineHandle {
            sender: self.sender.clone(),
        }
    }

    /// The flag the interceptor reads on the hook thread.
    pub fn suppression(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.suppressed)
    }

    /// Administrative pause, independent of the suppression flag.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Stop the worker and wait for it to drain.
    pub fn shutdown(mut self) {
        let _ = self.sender.send(PipelineEvent::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        let _ = self.sender.send(PipelineEvent::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
