use app_curator::prelude::*;
use std::sync::{Arc, Mutex};

/// One call made on the reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Message(String),
    Step { current: usize, total: usize },
    Warning(String),
    Done(String),
}

/// Mock ProgressReporter recording every call, shared between clones
#[derive(Default, Clone)]
pub struct MockProgressReporter {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Warning(w) => Some(w),
                _ => None,
            })
            .collect()
    }

    pub fn completed(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Done(_)))
    }

    fn push(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, message: &str) {
        self.push(ProgressEvent::Message(message.to_string()));
    }

    fn report_progress(&self, current: usize, total: usize, _message: Option<&str>) {
        self.push(ProgressEvent::Step { current, total });
    }

    fn report_error(&self, message: &str) {
        self.push(ProgressEvent::Warning(message.to_string()));
    }

    fn report_completion(&self, message: &str) {
        self.push(ProgressEvent::Done(message.to_string()));
    }
}
