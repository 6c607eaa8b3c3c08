use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_observation::FaceObservation;
use crate::detection::domain::face_record_store::FaceRecordStore;
use crate::detection::domain::matching_engine::{FrameOutcomes, MatchingEngine};
use crate::pipeline::event_dispatcher::{event_for_frame, FaceEvent};
use crate::pipeline::mode_selector::{DetectorRequest, ModeSelector, TrackingMode};
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;
use crate::shared::geometry::Size;

/// Result of processing one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub request: DetectorRequest,
    pub observation_count: usize,
    pub outcomes: FrameOutcomes,
    /// Mode the next frame runs in.
    pub mode: TrackingMode,
    pub event: Option<FaceEvent>,
}

/// Owns the tracking state and applies one frame at a time.
///
/// Every mutation of the record store goes through `&mut self`, so
/// confining a `FrameIntake` to one thread serializes frame processing.
pub struct FrameIntake {
    store: FaceRecordStore,
    engine: MatchingEngine,
    selector: ModeSelector,
    view_size: Size,
    grace_frames: usize,
    consecutive_misses: usize,
    /// Last frame's detector-space observations, seed for track-forward.
    prior: Vec<FaceObservation>,
}

impl FrameIntake {
    pub fn new(engine: MatchingEngine, view_size: Size, grace_frames: usize) -> Self {
        Self {
            store: FaceRecordStore::new(),
            engine,
            selector: ModeSelector::new(),
            view_size,
            grace_frames,
            consecutive_misses: 0,
            prior: Vec::new(),
        }
    }

    pub fn store(&self) -> &FaceRecordStore {
        &self.store
    }

    pub fn mode(&self) -> TrackingMode {
        self.selector.mode()
    }

    /// Requests observations for `frame` and applies them.
    pub fn process(
        &mut self,
        frame: &Frame,
        detector: &mut dyn FaceDetector,
    ) -> Result<FrameReport, TrackingError> {
        let (request, observations) = self.request_observations(frame, detector)?;
        Ok(self.ingest(request, observations))
    }

    /// Issues the detector call the current mode calls for.
    ///
    /// A failed request leaves the store untouched and drops tracking back
    /// to detection for the next frame.
    pub fn request_observations(
        &mut self,
        frame: &Frame,
        detector: &mut dyn FaceDetector,
    ) -> Result<(DetectorRequest, Vec<FaceObservation>), TrackingError> {
        let request = self.selector.next_request();
        let result = match request {
            DetectorRequest::Detect => detector.detect(frame),
            DetectorRequest::Track => detector.track(frame, &self.prior),
        };
        match result {
            Ok(observations) => Ok((request, observations)),
            Err(e) => {
                self.selector.force_detect();
                Err(TrackingError::RequestFailure {
                    frame_index: frame.index(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Applies one frame's detector-space observations to the store.
    pub fn ingest(
        &mut self,
        request: DetectorRequest,
        observations: Vec<FaceObservation>,
    ) -> FrameReport {
        let observation_count = observations.len();
        let was_empty = self.store.is_empty();

        if observations.is_empty() {
            self.prior.clear();
            let event = if was_empty {
                self.selector.advance(0);
                None
            } else {
                self.register_miss()
            };
            return FrameReport {
                request,
                observation_count,
                outcomes: FrameOutcomes::default(),
                mode: self.selector.mode(),
                event,
            };
        }

        self.consecutive_misses = 0;
        let in_view: Vec<FaceObservation> = observations
            .iter()
            .map(|o| o.to_view_space(self.view_size))
            .collect();
        let outcomes = self.engine.apply(&mut self.store, &in_view);
        // Only observations that can reach the store count toward stability.
        let trackable = if self.store.is_empty() {
            0
        } else {
            observations.iter().filter(|o| o.landmarks.is_some()).count()
        };
        let mode = self.selector.advance(trackable);
        self.prior = observations;

        let event = event_for_frame(was_empty, &outcomes, &self.store);
        if matches!(event, Some(FaceEvent::FacesDetected(_))) {
            log::info!("Tracking {} face(s)", self.store.count());
        }
        log::trace!(
            "{request:?}: {observation_count} observation(s), {} created, {} updated, next {mode:?}",
            outcomes.created(),
            outcomes.updated()
        );

        FrameReport {
            request,
            observation_count,
            outcomes,
            mode,
            event,
        }
    }

    /// Clears all tracking state. Returns `TrackingLost` if anything was
    /// being tracked.
    pub fn reset(&mut self) -> Option<FaceEvent> {
        let was_tracking = !self.store.is_empty();
        self.store.clear();
        self.selector.reset();
        self.prior.clear();
        self.consecutive_misses = 0;
        was_tracking.then_some(FaceEvent::TrackingLost)
    }

    fn register_miss(&mut self) -> Option<FaceEvent> {
        self.consecutive_misses += 1;
        if self.consecutive_misses <= self.grace_frames {
            log::debug!(
                "No faces observed ({}/{} grace frames)",
                self.consecutive_misses,
                self.grace_frames
            );
            self.selector.force_detect();
            return None;
        }
        log::info!("Tracking lost after {} empty frame(s)", self.consecutive_misses);
        self.reset()
    }
}
