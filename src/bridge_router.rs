use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use serde_json::Value;
use tauri::{AppHandle, Emitter};

use crate::{
    MAIN_WINDOW_LABEL, UPDATE_AVAILABLE_EVENT, UPDATE_CHECKING_EVENT, UPDATE_DOWNLOADED_EVENT,
    UPDATE_ERROR_EVENT, UPDATE_NOT_AVAILABLE_EVENT, UPDATE_PROGRESS_EVENT,
};

/// The six one-way update channels window content can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BridgeChannel {
    Checking,
    Available,
    NotAvailable,
    Progress,
    Downloaded,
    Error,
}

impl BridgeChannel {
    pub(crate) const ALL: [Self; 6] = [
        Self::Checking,
        Self::Available,
        Self::NotAvailable,
        Self::Progress,
        Self::Downloaded,
        Self::Error,
    ];

    pub(crate) fn event_name(self) -> &'static str {
        match self {
            Self::Checking => UPDATE_CHECKING_EVENT,
            Self::Available => UPDATE_AVAILABLE_EVENT,
            Self::NotAvailable => UPDATE_NOT_AVAILABLE_EVENT,
            Self::Progress => UPDATE_PROGRESS_EVENT,
            Self::Downloaded => UPDATE_DOWNLOADED_EVENT,
            Self::Error => UPDATE_ERROR_EVENT,
        }
    }

    pub(crate) fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.event_name() == name)
    }
}

pub(crate) trait BridgeEmitter: Send + Sync {
    fn emit(&self, event_name: &'static str, payload: Option<Value>) -> Result<(), String>;
}

pub(crate) struct TauriBridgeEmitter {
    app_handle: AppHandle,
}

impl TauriBridgeEmitter {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl BridgeEmitter for TauriBridgeEmitter {
    fn emit(&self, event_name: &'static str, payload: Option<Value>) -> Result<(), String> {
        self.app_handle
            .emit_to(MAIN_WINDOW_LABEL, event_name, payload)
            .map_err(|error| format!("Failed to emit {event_name} to main window: {error}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ForwardOutcome {
    Delivered,
    NoSubscribers,
    Failed(String),
}

/// Subscription record for the update channels of the main window.
///
/// A forwarded event produces exactly one emitted message when its channel has
/// at least one subscriber and none otherwise.
pub(crate) struct BridgeRouter {
    emitter: Arc<dyn BridgeEmitter>,
    subscriptions: Mutex<HashMap<BridgeChannel, usize>>,
}

impl BridgeRouter {
    pub(crate) fn new(emitter: Arc<dyn BridgeEmitter>) -> Self {
        Self {
            emitter,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn subscribe(&self, event_name: &str) -> Result<BridgeChannel, String> {
        let channel = BridgeChannel::from_event_name(event_name)
            .ok_or_else(|| format!("Unknown update channel '{event_name}'."))?;
        let mut subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *subscriptions.entry(channel).or_insert(0) += 1;
        Ok(channel)
    }

    pub(crate) fn remove_update_listeners(&self) -> usize {
        let mut subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let removed = subscriptions.values().sum();
        subscriptions.clear();
        removed
    }

    pub(crate) fn subscriber_count(&self, channel: BridgeChannel) -> usize {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&channel)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn forward(&self, channel: BridgeChannel, payload: Option<Value>) -> ForwardOutcome {
        if self.subscriber_count(channel) == 0 {
            return ForwardOutcome::NoSubscribers;
        }

        match self.emitter.emit(channel.event_name(), payload) {
            Ok(()) => ForwardOutcome::Delivered,
            Err(error) => ForwardOutcome::Failed(error),
        }
    }
}
