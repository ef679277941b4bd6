use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::bridge_router::BridgeChannel;

pub(crate) type UpdateEventSender = mpsc::UnboundedSender<UpdateEvent>;
pub(crate) type UpdateEventReceiver = mpsc::UnboundedReceiver<UpdateEvent>;

pub(crate) fn update_event_channel() -> (UpdateEventSender, UpdateEventReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateInfo {
    pub(crate) version: String,
    pub(crate) current_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) release_notes: Option<String>,
}

impl UpdateInfo {
    pub(crate) fn current(current_version: &str) -> Self {
        Self {
            version: current_version.to_string(),
            current_version: current_version.to_string(),
            release_date: None,
            release_notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DownloadProgress {
    pub(crate) transferred: u64,
    pub(crate) total: Option<u64>,
    pub(crate) percent: f64,
    pub(crate) bytes_per_second: u64,
    pub(crate) delta: u64,
}

/// Accumulates download chunks and decides when a progress event is due.
///
/// Intermediate chunks are coalesced to at most one report per `min_interval`.
/// The chunk that completes a download of known length is always reported.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    started_at: Instant,
    min_interval: Duration,
    last_reported_at: Option<Instant>,
    transferred: u64,
    unreported: u64,
}

impl ProgressTracker {
    pub(crate) fn new(started_at: Instant, min_interval: Duration) -> Self {
        Self {
            started_at,
            min_interval,
            last_reported_at: None,
            transferred: 0,
            unreported: 0,
        }
    }

    pub(crate) fn record_chunk(
        &mut self,
        chunk_length: usize,
        content_length: Option<u64>,
        now: Instant,
    ) -> Option<DownloadProgress> {
        let chunk_length = chunk_length as u64;
        self.transferred = self.transferred.saturating_add(chunk_length);
        self.unreported = self.unreported.saturating_add(chunk_length);

        let finished = content_length.is_some_and(|total| self.transferred >= total);
        let due = self
            .last_reported_at
            .is_none_or(|last| now.saturating_duration_since(last) >= self.min_interval);
        if !finished && !due {
            return None;
        }

        self.last_reported_at = Some(now);
        let delta = std::mem::take(&mut self.unreported);
        Some(self.snapshot(content_length, delta, now))
    }

    fn snapshot(&self, total: Option<u64>, delta: u64, now: Instant) -> DownloadProgress {
        let percent = match total {
            Some(total) if total > 0 => {
                (self.transferred as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        };
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        let bytes_per_second = if elapsed > 0.0 {
            (self.transferred as f64 / elapsed) as u64
        } else {
            0
        };

        DownloadProgress {
            transferred: self.transferred,
            total,
            percent,
            bytes_per_second,
            delta,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UpdateEvent {
    Checking,
    Available(UpdateInfo),
    NotAvailable(UpdateInfo),
    Progress(DownloadProgress),
    Downloaded(UpdateInfo),
    Error(String),
}

impl UpdateEvent {
    pub(crate) fn channel(&self) -> BridgeChannel {
        match self {
            Self::Checking => BridgeChannel::Checking,
            Self::Available(_) => BridgeChannel::Available,
            Self::NotAvailable(_) => BridgeChannel::NotAvailable,
            Self::Progress(_) => BridgeChannel::Progress,
            Self::Downloaded(_) => BridgeChannel::Downloaded,
            Self::Error(_) => BridgeChannel::Error,
        }
    }

    /// The payload handed to window content; `Checking` carries none.
    pub(crate) fn payload(&self) -> Option<Value> {
        match self {
            Self::Checking => None,
            Self::Available(info) | Self::NotAvailable(info) | Self::Downloaded(info) => {
                serde_json::to_value(info).ok()
            }
            Self::Progress(progress) => serde_json::to_value(progress).ok(),
            Self::Error(message) => Some(Value::String(message.clone())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum UpdatePhase {
    #[default]
    Idle,
    Checking,
    Available,
    NotAvailable,
    Downloading,
    Downloaded,
    Errored,
}

impl UpdatePhase {
    /// A session in one of these phases still expects further updater events.
    pub(crate) fn is_in_flight(self) -> bool {
        matches!(self, Self::Checking | Self::Available | Self::Downloading)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Available => "available",
            Self::NotAvailable => "not-available",
            Self::Downloading => "downloading",
            Self::Downloaded => "downloaded",
            Self::Errored => "errored",
        }
    }
}
