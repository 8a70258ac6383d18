//! Per-connection game view.

use crate::protocol::ServerMessage;
use cognispy_core::{
    Activity, ActivityKind, AdvisoryRequest, Feedback, FeedbackError, FeedbackKind, FeedbackSink,
    Locale, RoundToken, SessionAction, SessionError, SessionEvent,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq)]
pub enum ViewError {
    #[error("No game selected")]
    NoGame,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Feedback tones go to the client as protocol messages
pub struct ChannelSink(pub mpsc::UnboundedSender<ServerMessage>);

impl FeedbackSink for ChannelSink {
    fn play(&mut self, kind: FeedbackKind) -> Result<(), FeedbackError> {
        self.0
            .send(ServerMessage::Feedback { kind })
            .map_err(|_| FeedbackError::Closed)
    }
}

/// What one connected player is looking at: the menu or a running game.
pub struct GameView {
    pub username: String,
    pub locale: Locale,
    seed: Option<u64>,
    activity: Option<Activity>,
    feedback: Feedback<ChannelSink>,
    advisory_task: Option<JoinHandle<()>>,
}

impl GameView {
    pub fn new(sender: mpsc::UnboundedSender<ServerMessage>, seed: Option<u64>) -> Self {
        Self {
            username: String::new(),
            locale: Locale::default(),
            seed,
            activity: None,
            feedback: Feedback::new(ChannelSink(sender)),
            advisory_task: None,
        }
    }

    /// Record who is playing. Unknown locales fall back to the default.
    pub fn greet(&mut self, username: &str, locale: &str) {
        self.username = username.trim().to_string();
        self.locale = locale.parse().unwrap_or_else(|e| {
            warn!("{}, using {}", e, Locale::default());
            Locale::default()
        });
    }

    pub fn activity(&self) -> Option<&Activity> {
        self.activity.as_ref()
    }

    /// Open a game from the menu, replacing whatever was running
    pub fn select(&mut self, game: &str) -> Result<ActivityKind, SessionError> {
        let activity = Activity::from_name(game, self.seed)?;
        let kind = activity.kind();
        self.cancel_advisory();
        self.activity = Some(activity);
        debug!(game = %kind, "game selected");
        Ok(kind)
    }

    pub fn apply(&mut self, action: SessionAction) -> Result<Vec<SessionEvent>, ViewError> {
        // A new round or leaving makes any pending text stale
        if !matches!(action, SessionAction::Click { .. }) {
            self.cancel_advisory();
        }
        let activity = self.activity.as_mut().ok_or(ViewError::NoGame)?;
        let events = activity.apply(action)?;
        self.feedback.dispatch(&events);
        Ok(events)
    }

    /// Back to the menu
    pub fn leave(&mut self) {
        self.cancel_advisory();
        if let Some(mut activity) = self.activity.take() {
            let _ = activity.apply(SessionAction::Exit);
        }
    }

    pub fn set_sound(&mut self, enabled: bool) {
        self.feedback.set_enabled(enabled);
    }

    pub fn sound_enabled(&self) -> bool {
        self.feedback.is_enabled()
    }

    pub fn state_json(&self) -> Option<serde_json::Value> {
        self.activity.as_ref().map(Activity::state_json)
    }

    /// Token and request for the round that just finished, if any
    pub fn pending_advisory(&self) -> Option<(RoundToken, AdvisoryRequest)> {
        self.activity
            .as_ref()?
            .advisory_request(&self.username, self.locale)
    }

    pub fn completion_message(&self) -> Option<String> {
        self.activity
            .as_ref()
            .map(|activity| activity.completion_message(&self.username, self.locale))
    }

    /// Store fetched text if the round is still current; returns the message to show
    pub fn accept_advisory(&mut self, token: RoundToken, text: &str) -> Option<String> {
        let activity = self.activity.as_mut()?;
        if activity.accept_advisory(token, text) {
            self.advisory_task = None;
            Some(activity.completion_message(&self.username, self.locale))
        } else {
            debug!(token = token.0, "stale advisory text dropped");
            None
        }
    }

    pub fn set_advisory_task(&mut self, task: JoinHandle<()>) {
        if let Some(previous) = self.advisory_task.replace(task) {
            previous.abort();
        }
    }

    pub fn cancel_advisory(&mut self) {
        if let Some(task) = self.advisory_task.take() {
            task.abort();
        }
    }
}

impl Drop for GameView {
    fn drop(&mut self) {
        self.cancel_advisory();
    }
}
