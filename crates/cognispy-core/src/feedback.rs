//! Audio feedback signals.
//!
//! Correct, incorrect and complete events each map to a short tone played by
//! the UI. Playback is optional and its failures never reach session state.

use crate::actions::SessionEvent;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Discrete feedback signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Correct,
    Incorrect,
    Complete,
}

impl FeedbackKind {
    pub fn from_event(event: &SessionEvent) -> Option<FeedbackKind> {
        match event {
            SessionEvent::Correct { .. } => Some(FeedbackKind::Correct),
            SessionEvent::Incorrect { .. } => Some(FeedbackKind::Incorrect),
            SessionEvent::StageComplete { .. } => Some(FeedbackKind::Complete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FeedbackError {
    #[error("Feedback channel closed")]
    Closed,

    #[error("Feedback playback failed: {0}")]
    Playback(String),
}

/// Something that can play a feedback signal
pub trait FeedbackSink {
    fn play(&mut self, kind: FeedbackKind) -> Result<(), FeedbackError>;
}

/// A sink plus the user's sound preference
pub struct Feedback<S> {
    sink: S,
    enabled: bool,
}

impl<S: FeedbackSink> Feedback<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            enabled: true,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Play the signal for every event that has one. Returns how many played.
    pub fn dispatch(&mut self, events: &[SessionEvent]) -> usize {
        if !self.enabled {
            return 0;
        }

        let mut played = 0;
        for kind in events.iter().filter_map(FeedbackKind::from_event) {
            match self.sink.play(kind) {
                Ok(()) => played += 1,
                Err(e) => warn!(?kind, error = %e, "feedback playback failed"),
            }
        }
        played
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder(Vec<FeedbackKind>);

    impl FeedbackSink for Recorder {
        fn play(&mut self, kind: FeedbackKind) -> Result<(), FeedbackError> {
            self.0.push(kind);
            Ok(())
        }
    }

    struct Broken;

    impl FeedbackSink for Broken {
        fn play(&mut self, _kind: FeedbackKind) -> Result<(), FeedbackError> {
            Err(FeedbackError::Playback("no audio device".to_string()))
        }
    }

    fn events() -> Vec<SessionEvent> {
        vec![
            SessionEvent::Correct {
                item_id: "w-1".to_string(),
                found: 6,
                total: 6,
                score: 60,
            },
            SessionEvent::StageComplete {
                stage: 1,
                score: 60,
                found: 6,
                elapsed_ms: 1200,
            },
            SessionEvent::ProgressReset,
        ]
    }

    #[test]
    fn test_dispatch_maps_events_to_kinds() {
        let mut feedback = Feedback::new(Recorder::default());
        assert_eq!(feedback.dispatch(&events()), 2);
        assert_eq!(
            feedback.sink().0,
            vec![FeedbackKind::Correct, FeedbackKind::Complete]
        );
    }

    #[test]
    fn test_disabled_feedback_is_silent() {
        let mut feedback = Feedback::new(Recorder::default());
        feedback.set_enabled(false);
        assert_eq!(feedback.dispatch(&events()), 0);
        assert!(feedback.sink().0.is_empty());
    }

    #[test]
    fn test_sink_failures_are_swallowed() {
        let mut feedback = Feedback::new(Broken);
        assert_eq!(feedback.dispatch(&events()), 0);
    }
}
