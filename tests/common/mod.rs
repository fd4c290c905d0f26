//! Shared utilities for integration tests.

use std::sync::{Arc, Mutex};

use pathwarden::routing::Handler;

/// A handler that records every invocation under a label.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that records its segments under `label`.
    pub fn handler(&self, label: &str) -> Handler {
        let calls = self.calls.clone();
        let label = label.to_string();
        Arc::new(move |segments: &[String]| {
            calls.lock().unwrap().push((label.clone(), segments.to_vec()));
        })
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.calls().into_iter().map(|(label, _)| label).collect()
    }

    pub fn last(&self) -> Option<(String, Vec<String>)> {
        self.calls().pop()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// Owned segments from string literals.
#[allow(dead_code)]
pub fn segs(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}
