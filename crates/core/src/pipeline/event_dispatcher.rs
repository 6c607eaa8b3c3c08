use std::thread::JoinHandle;

use crossbeam_channel::Sender;

use crate::capture::domain::capture_settings::CaptureSettings;
use crate::detection::domain::face_record_store::FaceRecordStore;
use crate::detection::domain::matching_engine::FrameOutcomes;
use crate::detection::domain::tracked_face::TrackedFace;
use crate::shared::error::TrackingError;

/// Per-frame change in the tracked set. Carries an owned snapshot so the
/// consumer never touches the record store.
#[derive(Clone, Debug, PartialEq)]
pub enum FaceEvent {
    FacesDetected(Vec<TrackedFace>),
    FacesUpdated(Vec<TrackedFace>),
    TrackingLost,
}

/// Decides which event, if any, a frame's store mutation produces.
pub fn event_for_frame(
    was_empty: bool,
    outcomes: &FrameOutcomes,
    store: &FaceRecordStore,
) -> Option<FaceEvent> {
    match (was_empty, store.is_empty()) {
        (true, false) => Some(FaceEvent::FacesDetected(store.snapshot())),
        (false, false) if outcomes.has_changes() => Some(FaceEvent::FacesUpdated(store.snapshot())),
        (false, true) => Some(FaceEvent::TrackingLost),
        _ => None,
    }
}

/// Receives pipeline notifications on the delivery thread.
pub trait FaceEventConsumer: Send {
    /// The capture device was opened with `settings`.
    fn capture_opened(&mut self, _settings: &CaptureSettings) {}

    fn faces_detected(&mut self, faces: &[TrackedFace]);

    fn faces_updated(&mut self, faces: &[TrackedFace]);

    fn tracking_lost(&mut self);

    fn failed(&mut self, error: &TrackingError);
}

#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    CaptureOpened(CaptureSettings),
    Face(FaceEvent),
    Failed(TrackingError),
}

/// Delivers notifications to a consumer on one dedicated thread, in the
/// order they were sent.
///
/// The channel is unbounded: frames are dropped upstream, events never are.
pub struct EventDispatcher {
    tx: Option<Sender<Notification>>,
    handle: Option<JoinHandle<Box<dyn FaceEventConsumer>>>,
}

impl EventDispatcher {
    pub fn spawn(mut consumer: Box<dyn FaceEventConsumer>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<Notification>();
        let handle = std::thread::spawn(move || {
            for notification in rx {
                deliver(consumer.as_mut(), notification);
            }
            consumer
        });
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// A sender for producers on other threads. Notifications from all
    /// senders share one queue.
    pub fn sender(&self) -> Option<Sender<Notification>> {
        self.tx.clone()
    }

    /// Returns false once the delivery thread is gone.
    pub fn dispatch(&self, notification: Notification) -> bool {
        self.tx
            .as_ref()
            .is_some_and(|tx| tx.send(notification).is_ok())
    }

    /// Delivers everything still queued and hands the consumer back.
    ///
    /// Blocks until every outstanding `sender()` clone is dropped.
    pub fn join(mut self) -> Option<Box<dyn FaceEventConsumer>> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<Box<dyn FaceEventConsumer>> {
        drop(self.tx.take());
        match self.handle.take()?.join() {
            Ok(consumer) => Some(consumer),
            Err(_) => {
                log::error!("Event delivery thread panicked");
                None
            }
        }
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn deliver(consumer: &mut dyn FaceEventConsumer, notification: Notification) {
    match notification {
        Notification::CaptureOpened(settings) => consumer.capture_opened(&settings),
        Notification::Face(FaceEvent::FacesDetected(faces)) => consumer.faces_detected(&faces),
        Notification::Face(FaceEvent::FacesUpdated(faces)) => consumer.faces_updated(&faces),
        Notification::Face(FaceEvent::TrackingLost) => consumer.tracking_lost(),
        Notification::Failed(error) => consumer.failed(&error),
    }
}
