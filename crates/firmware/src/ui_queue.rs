//! Channel-backed [`UiSink`]: producers post without blocking, the display
//! task drains at its own pace.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};
use platform::{UiSink, UiUpdate};

/// Updates that may queue before new ones are dropped.
pub const UI_QUEUE_DEPTH: usize = 16;

/// Channel carrying UI updates to the display task.
pub type UiChannel = Channel<CriticalSectionRawMutex, UiUpdate, UI_QUEUE_DEPTH>;

/// Producer handle. Cheap to copy; one per task.
#[derive(Clone, Copy)]
pub struct UiQueue<'a> {
    tx: Sender<'a, CriticalSectionRawMutex, UiUpdate, UI_QUEUE_DEPTH>,
}

impl<'a> UiQueue<'a> {
    /// Producer for `channel`.
    pub fn new(channel: &'a UiChannel) -> Self {
        Self {
            tx: channel.sender(),
        }
    }
}

impl UiSink for UiQueue<'_> {
    fn post(&self, update: UiUpdate) {
        if self.tx.try_send(update).is_err() {
            warn!("ui queue full, update dropped");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::VolumePercent;

    #[test]
    fn test_post_enqueues_in_order() {
        let channel = UiChannel::new();
        let ui = UiQueue::new(&channel);
        ui.post(UiUpdate::Bitrate(128));
        ui.post(UiUpdate::Volume(VolumePercent::new(30)));
        assert_eq!(channel.try_receive().unwrap(), UiUpdate::Bitrate(128));
        assert_eq!(
            channel.try_receive().unwrap(),
            UiUpdate::Volume(VolumePercent::new(30))
        );
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let channel = UiChannel::new();
        let ui = UiQueue::new(&channel);
        for i in 0..=UI_QUEUE_DEPTH {
            ui.post(UiUpdate::StationRoller(i));
        }
        assert_eq!(channel.len(), UI_QUEUE_DEPTH);
        assert_eq!(channel.try_receive().unwrap(), UiUpdate::StationRoller(0));
    }
}
