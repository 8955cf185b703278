//! Command surface exposed to a UI host.
//!
//! Inbound messages are JSON objects tagged by `type`; every reply is an
//! object with a `success` flag and the command's payload alongside it.
//! Errors never propagate out of [`Bridge::dispatch`].

use std::sync::Arc;

use ema_core::{CollectionStatistics, CollectorSettings, PostRecord, ProfileRecord};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::collector::{lock, PostCollector, SharedCollector};
use crate::controller::RefreshController;
use crate::error::ScraperError;
use crate::page::Page;
use crate::profile::extract_profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    #[serde(rename = "GET_PROFILE_DATA")]
    GetProfile,
    #[serde(rename = "EXTRACT_TWEETS")]
    ExtractPosts,
    #[serde(rename = "START_TWEET_COUNTING")]
    StartCounting,
    #[serde(rename = "STOP_TWEET_COUNTING")]
    StopCounting,
    #[serde(rename = "GET_CURRENT_TWEET_COUNT")]
    GetCurrentCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Profile {
        data: Option<ProfileRecord>,
    },
    Posts {
        data: Vec<PostRecord>,
        statistics: CollectionStatistics,
        count: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Count {
        count: usize,
    },
    Ack {},
    Rejected {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(flatten)]
    pub reply: Reply,
}

impl Response {
    fn ok(reply: Reply) -> Self {
        Self {
            success: true,
            reply,
        }
    }

    fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            reply: Reply::Rejected {
                error: error.into(),
            },
        }
    }
}

/// Outbound, fire-and-forget message to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    #[serde(rename = "TWEET_COUNT_UPDATED")]
    CountChanged { count: usize },
}

/// Delivers notifications to whoever listens on the host side.
pub trait Notifier: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ScraperError::NoListener`] when nobody is listening.
    /// Callers treat that as non-fatal.
    fn notify(&self, notification: Notification) -> Result<(), ScraperError>;
}

/// [`Notifier`] backed by an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) -> Result<(), ScraperError> {
        self.tx
            .send(notification)
            .map_err(|_| ScraperError::NoListener)
    }
}

/// Wires one page to its collector and refresh controller and answers
/// commands against them.
pub struct Bridge<P: Page + ?Sized + 'static> {
    page: Arc<P>,
    collector: SharedCollector,
    controller: RefreshController<P>,
}

impl<P: Page + ?Sized + 'static> Bridge<P> {
    pub fn new(page: Arc<P>, notifier: Arc<dyn Notifier>, settings: &CollectorSettings) -> Self {
        let collector = PostCollector::from_settings(settings).shared();
        let controller =
            RefreshController::new(Arc::clone(&page), Arc::clone(&collector), notifier, settings);
        Self {
            page,
            collector,
            controller,
        }
    }

    #[must_use]
    pub fn collector(&self) -> &SharedCollector {
        &self.collector
    }

    #[must_use]
    pub fn controller(&self) -> &RefreshController<P> {
        &self.controller
    }

    pub async fn dispatch(&mut self, command: Command) -> Response {
        tracing::debug!(?command, "bridge command");
        let reply = match command {
            Command::GetProfile => Reply::Profile {
                data: self.profile(),
            },
            Command::ExtractPosts => {
                let snapshot = lock(&self.collector).scan(self.page.as_ref());
                Reply::Posts {
                    count: snapshot.total_found,
                    data: snapshot.posts,
                    statistics: snapshot.statistics,
                    error: snapshot.error,
                }
            }
            Command::StartCounting => {
                self.controller.start().await;
                Reply::Count {
                    count: self.count(),
                }
            }
            Command::StopCounting => {
                self.controller.stop().await;
                Reply::Ack {}
            }
            Command::GetCurrentCount => Reply::Count {
                count: self.count(),
            },
        };
        Response::ok(reply)
    }

    /// Parses a JSON command, dispatches it and serializes the reply.
    /// Malformed input produces a `success: false` reply.
    pub async fn handle_json(&mut self, raw: &str) -> String {
        let response = match serde_json::from_str::<Command>(raw).map_err(ScraperError::from) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting bridge message");
                Response::rejected(e.to_string())
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize bridge reply");
            r#"{"success":false,"error":"reply serialization failed"}"#.to_string()
        })
    }

    fn profile(&self) -> Option<ProfileRecord> {
        match self.page.snapshot() {
            Ok(document) => extract_profile(&document),
            Err(e) => {
                tracing::warn!(error = %e, "profile extraction skipped");
                None
            }
        }
    }

    fn count(&self) -> usize {
        lock(&self.collector).count()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn commands_use_wire_names() {
        let cmd: Command = serde_json::from_str(r#"{"type":"EXTRACT_TWEETS"}"#).unwrap();
        assert_eq!(cmd, Command::ExtractPosts);
        let cmd: Command = serde_json::from_str(r#"{"type":"GET_CURRENT_TWEET_COUNT"}"#).unwrap();
        assert_eq!(cmd, Command::GetCurrentCount);
        assert!(serde_json::from_str::<Command>(r#"{"type":"NOPE"}"#).is_err());
    }

    #[test]
    fn notification_wire_shape() {
        let value = serde_json::to_value(Notification::CountChanged { count: 7 }).unwrap();
        assert_eq!(value, json!({"type": "TWEET_COUNT_UPDATED", "count": 7}));
    }

    #[test]
    fn responses_flatten_payload_next_to_success() {
        let value = serde_json::to_value(Response::ok(Reply::Count { count: 3 })).unwrap();
        assert_eq!(value, json!({"success": true, "count": 3}));

        let value = serde_json::to_value(Response::ok(Reply::Ack {})).unwrap();
        assert_eq!(value, json!({"success": true}));

        let value = serde_json::to_value(Response::ok(Reply::Profile { data: None })).unwrap();
        assert_eq!(value, json!({"success": true, "data": null}));

        let value = serde_json::to_value(Response::rejected("bad")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "bad"}));
    }

    #[test]
    fn channel_notifier_reports_missing_listener() {
        let (notifier, rx) = ChannelNotifier::channel();
        assert!(notifier
            .notify(Notification::CountChanged { count: 1 })
            .is_ok());
        drop(rx);
        let err = notifier
            .notify(Notification::CountChanged { count: 2 })
            .unwrap_err();
        assert!(matches!(err, ScraperError::NoListener));
    }

    #[test]
    fn posts_reply_omits_error_when_absent() {
        let value: Value = serde_json::to_value(Response::ok(Reply::Posts {
            data: Vec::new(),
            statistics: CollectionStatistics::default(),
            count: 0,
            error: None,
        }))
        .unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["count"], 0);
        assert_eq!(value["statistics"]["total"], 0);
    }
}
