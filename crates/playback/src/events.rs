//! Asynchronous events from stages to the state machine.
//!
//! Stages publish into an [`EventChannel`] from their own contexts with
//! [`try_publish`], which never blocks. The task owning the
//! [`PipelineStateMachine`](crate::engine::PipelineStateMachine) is the only
//! receiver, which makes it the single serialization point for restarts.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};
use platform::AudioConfig;

use crate::stage::Generation;

/// Depth of the stage event channel.
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineEventKind {
    /// The source could not open its transport.
    SourceOpenFailed,
    /// The decoder determined the stream format.
    FormatResolved(AudioConfig),
}

/// A stage event stamped with the generation of the pipeline that sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineEvent {
    /// Sender's pipeline generation.
    pub generation: Generation,
    /// Payload.
    pub kind: PipelineEventKind,
}

impl PipelineEvent {
    /// Source open failure from pipeline `generation`.
    #[must_use]
    pub fn source_open_failed(generation: Generation) -> Self {
        Self {
            generation,
            kind: PipelineEventKind::SourceOpenFailed,
        }
    }

    /// Resolved stream format from pipeline `generation`.
    #[must_use]
    pub fn format_resolved(generation: Generation, format: AudioConfig) -> Self {
        Self {
            generation,
            kind: PipelineEventKind::FormatResolved(format),
        }
    }
}

/// Channel carrying [`PipelineEvent`]s.
pub type EventChannel = Channel<CriticalSectionRawMutex, PipelineEvent, EVENT_QUEUE_DEPTH>;

/// Sending half handed to stages.
pub type EventSender<'a> = Sender<'a, CriticalSectionRawMutex, PipelineEvent, EVENT_QUEUE_DEPTH>;

/// Publish without blocking. Returns `false` if the channel was full and the
/// event was dropped.
pub fn try_publish(tx: &EventSender<'_>, event: PipelineEvent) -> bool {
    match tx.try_send(event) {
        Ok(()) => true,
        Err(_) => {
            warn!("pipeline event channel full, dropped event");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_try_publish_drops_when_full() {
        let channel = EventChannel::new();
        let tx = channel.sender();
        for _ in 0..EVENT_QUEUE_DEPTH {
            assert!(try_publish(&tx, PipelineEvent::source_open_failed(1)));
        }
        assert!(!try_publish(&tx, PipelineEvent::source_open_failed(1)));
        assert_eq!(
            channel.try_receive().unwrap(),
            PipelineEvent::source_open_failed(1)
        );
    }
}
