//! Notification adapter: turns store events into user-facing notices
//!
//! The stores never talk to presentation directly; they publish
//! [`StoreEvent`]s. [`NotificationRelay`] subscribes to the bus, maps each
//! event to at most one [`Notice`] and hands it to a [`Notifier`], the
//! seam behind which the actual toast widget (or test recorder) lives.
//!
//! The event→notice mapping is a pure function ([`notice_for`]) so the
//! wording is testable without running the relay task. Successful loads
//! produce no notice; every mutation outcome and every failure produces
//! exactly one.

use crate::core::events::{EventBus, EventEnvelope, StoreEvent};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Fire-and-forget notification sink
///
/// Implementations surface the message to the user (toast, status bar,
/// log); no return value is consumed.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One user-facing message derived from a store event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    fn success(text: String) -> Self {
        Self {
            level: NoticeLevel::Success,
            text,
        }
    }

    fn error(text: String) -> Self {
        Self {
            level: NoticeLevel::Error,
            text,
        }
    }
}

/// Map a store event to its user-facing notice, if it has one.
///
/// Failure wording appends the classified phrase ("duplicate record",
/// "connection problem", ...) so the user sees a specific reason, not just
/// that something failed. Classification never changes what happened; it
/// only picks words.
pub fn notice_for(event: &StoreEvent) -> Option<Notice> {
    match event {
        StoreEvent::Loaded { .. } => None,
        StoreEvent::LoadFailed { entity, error } => Some(Notice::error(format!(
            "Failed to load {}: {}",
            plural(entity),
            error.kind().user_phrase()
        ))),
        StoreEvent::Created { entity, .. } => {
            Some(Notice::success(format!("{} added successfully", capitalize(entity))))
        }
        StoreEvent::Updated { entity, .. } => {
            Some(Notice::success(format!("{} updated successfully", capitalize(entity))))
        }
        StoreEvent::Deleted { entity, .. } => {
            Some(Notice::success(format!("{} removed successfully", capitalize(entity))))
        }
        StoreEvent::MutationFailed {
            entity,
            operation,
            error,
        } => Some(Notice::error(format!(
            "Failed to {} {}: {}",
            operation.verb(),
            entity,
            error.kind().user_phrase()
        ))),
        StoreEvent::ProcedureFailed { procedure, error } => Some(Notice::error(format!(
            "{}: {}",
            procedure_label(procedure),
            error.kind().user_phrase()
        ))),
    }
}

fn procedure_label(procedure: &str) -> String {
    match procedure {
        "check_room_availability" => "Failed to check room availability".to_string(),
        "calculate_booking_total" => "Failed to calculate booking total".to_string(),
        other => format!("Remote procedure '{}' failed", other),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Naive plural for notification copy ("guest" → "guests",
/// "category" → "categories")
fn plural(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        format!("{}ies", stem)
    } else if word.ends_with('s') || word.ends_with("ch") || word.ends_with('x') {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

/// Subscriber task bridging the event bus to a [`Notifier`]
pub struct NotificationRelay {
    receiver: broadcast::Receiver<EventEnvelope>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationRelay {
    /// Subscribe a notifier to the given bus
    pub fn new(bus: &EventBus, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            receiver: bus.subscribe(),
            notifier,
        }
    }

    /// Subscribe and run on a background task
    pub fn spawn(bus: &EventBus, notifier: Arc<dyn Notifier>) -> JoinHandle<()> {
        let relay = Self::new(bus, notifier);
        tokio::spawn(relay.run())
    }

    /// Consume events until the bus closes
    pub async fn run(mut self) {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => self.dispatch(&envelope.event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "notification relay lagged; notices dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    fn dispatch(&self, event: &StoreEvent) {
        if let Some(notice) = notice_for(event) {
            match notice.level {
                NoticeLevel::Success => self.notifier.success(&notice.text),
                NoticeLevel::Error => self.notifier.error(&notice.text),
            }
        }
    }
}

/// Notifier that writes notices to the operational log
///
/// Useful default for headless contexts and demos.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notice = message, "notification");
    }

    fn error(&self, message: &str) {
        tracing::error!(notice = message, "notification");
    }
}
