//! Geometric association of a frame's observations with tracked faces.
//!
//! Each observation is matched to the first record, in store order, whose
//! margin-expanded box fully contains the observation's box. First match
//! wins even when a later record fits better, which keeps the result
//! deterministic for a given store order.

use crate::detection::domain::face_observation::FaceObservation;
use crate::detection::domain::face_record_store::FaceRecordStore;
use crate::shared::constants::DEFAULT_MATCH_MARGIN;
use crate::shared::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No record matched; a new one was appended at `slot`.
    Created { slot: usize },
    /// The record at `slot` was overwritten in place.
    Updated { slot: usize },
    /// Observation ignored: its match was already claimed this frame, or it
    /// carried no landmark data.
    NoOp,
}

/// Per-observation outcomes for one frame, in observation order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameOutcomes {
    outcomes: Vec<MatchOutcome>,
}

impl FrameOutcomes {
    pub fn as_slice(&self) -> &[MatchOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, MatchOutcome::Created { .. }))
            .count()
    }

    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, MatchOutcome::Updated { .. }))
            .count()
    }

    /// At least one record was created or updated.
    pub fn has_changes(&self) -> bool {
        self.outcomes.iter().any(|o| *o != MatchOutcome::NoOp)
    }
}

pub struct MatchingEngine {
    margin: f64,
}

impl MatchingEngine {
    pub fn new(margin: f64) -> Self {
        Self { margin }
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Matches `observations` (view space) against `store` and mutates it.
    ///
    /// A record is claimed by at most one observation per frame, including
    /// records created earlier in the same frame, so a duplicated
    /// observation never yields a second record.
    pub fn apply(
        &self,
        store: &mut FaceRecordStore,
        observations: &[FaceObservation],
    ) -> FrameOutcomes {
        store.begin_frame();
        let mut claimed = vec![false; store.count()];
        let mut outcomes = Vec::with_capacity(observations.len());

        for observation in observations {
            if observation.landmarks.is_none() {
                outcomes.push(MatchOutcome::NoOp);
                continue;
            }

            let outcome = match self.find_match(store, &observation.bounding_box) {
                Some(slot) if claimed[slot] => MatchOutcome::NoOp,
                Some(slot) => {
                    store.upsert(Some(slot), observation);
                    claimed[slot] = true;
                    MatchOutcome::Updated { slot }
                }
                None => {
                    let slot = store.upsert(None, observation);
                    claimed.push(true);
                    MatchOutcome::Created { slot }
                }
            };
            outcomes.push(outcome);
        }

        FrameOutcomes { outcomes }
    }

    fn find_match(&self, store: &FaceRecordStore, bbox: &Rect) -> Option<usize> {
        store
            .faces()
            .iter()
            .position(|face| face.bounding_box.expand(self.margin).contains(bbox))
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_MARGIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_observation::{FaceLandmarks, ObservationToken};
    use crate::shared::geometry::Point;
    use rstest::rstest;

    fn landmarks() -> FaceLandmarks {
        FaceLandmarks::new(
            vec![Point::new(20.0, 50.0), Point::new(40.0, 52.0)],
            vec![Point::new(30.0, 40.0)],
            vec![Point::new(30.0, 30.0)],
        )
    }

    fn obs(token: u64, x: f64, y: f64, w: f64, h: f64) -> FaceObservation {
        FaceObservation::new(
            ObservationToken(token),
            Rect::new(x, y, w, h),
            Some(landmarks()),
        )
    }

    fn store_with(observations: &[FaceObservation]) -> FaceRecordStore {
        let mut store = FaceRecordStore::new();
        for o in observations {
            store.upsert(None, o);
        }
        store
    }

    // ── Scenarios ────────────────────────────────────────────────────

    #[test]
    fn test_first_observation_creates_slot_zero() {
        let mut store = FaceRecordStore::new();
        let engine = MatchingEngine::default();

        let outcomes = engine.apply(&mut store, &[obs(1, 10.0, 10.0, 50.0, 50.0)]);

        assert_eq!(outcomes.as_slice(), &[MatchOutcome::Created { slot: 0 }]);
        assert_eq!(store.count(), 1);
        assert_eq!(store.get(0).unwrap().bounding_box, Rect::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_nearby_observation_updates_in_place() {
        let mut store = store_with(&[obs(1, 10.0, 10.0, 50.0, 50.0)]);
        let engine = MatchingEngine::new(20.0);

        let outcomes = engine.apply(&mut store, &[obs(2, 12.0, 11.0, 48.0, 49.0)]);

        assert_eq!(outcomes.as_slice(), &[MatchOutcome::Updated { slot: 0 }]);
        assert_eq!(store.count(), 1);
        assert_eq!(store.get(0).unwrap().bounding_box, Rect::new(12.0, 11.0, 48.0, 49.0));
        assert_eq!(store.get(0).unwrap().token, ObservationToken(2));
    }

    #[test]
    fn test_two_separated_observations_create_two_records() {
        let mut store = FaceRecordStore::new();
        let engine = MatchingEngine::default();

        let outcomes = engine.apply(
            &mut store,
            &[obs(1, 10.0, 10.0, 50.0, 50.0), obs(2, 300.0, 10.0, 50.0, 50.0)],
        );

        assert_eq!(outcomes.created(), 2);
        assert_eq!(store.count(), 2);
    }

    // ── Properties ───────────────────────────────────────────────────

    #[test]
    fn test_duplicate_observation_in_same_frame_is_noop() {
        let mut store = FaceRecordStore::new();
        let engine = MatchingEngine::default();
        let o = obs(1, 10.0, 10.0, 50.0, 50.0);

        let outcomes = engine.apply(&mut store, &[o.clone(), o]);

        assert_eq!(
            outcomes.as_slice(),
            &[MatchOutcome::Created { slot: 0 }, MatchOutcome::NoOp]
        );
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_existing_record_is_not_matched_twice_in_one_frame() {
        let mut store = store_with(&[obs(1, 10.0, 10.0, 50.0, 50.0)]);
        let engine = MatchingEngine::default();

        let outcomes = engine.apply(
            &mut store,
            &[obs(2, 12.0, 12.0, 48.0, 48.0), obs(3, 11.0, 11.0, 49.0, 49.0)],
        );

        assert_eq!(
            outcomes.as_slice(),
            &[MatchOutcome::Updated { slot: 0 }, MatchOutcome::NoOp]
        );
        assert_eq!(store.get(0).unwrap().token, ObservationToken(2));
    }

    #[test]
    fn test_ties_resolve_to_first_record_in_store_order() {
        // Both records' expanded boxes contain the observation.
        let mut store = store_with(&[
            obs(1, 10.0, 10.0, 50.0, 50.0),
            obs(2, 14.0, 14.0, 50.0, 50.0),
        ]);
        let engine = MatchingEngine::default();

        let outcomes = engine.apply(&mut store, &[obs(3, 15.0, 15.0, 48.0, 48.0)]);

        assert_eq!(outcomes.as_slice(), &[MatchOutcome::Updated { slot: 0 }]);
    }

    #[test]
    fn test_more_observations_than_records_appends_only_unmatched() {
        let mut store = store_with(&[
            obs(1, 10.0, 10.0, 50.0, 50.0),
            obs(2, 300.0, 10.0, 50.0, 50.0),
        ]);
        let engine = MatchingEngine::default();

        // Reversed order relative to the store plus one new face.
        let outcomes = engine.apply(
            &mut store,
            &[
                obs(5, 302.0, 12.0, 48.0, 48.0),
                obs(6, 600.0, 10.0, 50.0, 50.0),
                obs(7, 11.0, 11.0, 49.0, 49.0),
            ],
        );

        assert_eq!(
            outcomes.as_slice(),
            &[
                MatchOutcome::Updated { slot: 1 },
                MatchOutcome::Created { slot: 2 },
                MatchOutcome::Updated { slot: 0 },
            ]
        );
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_observation_without_landmarks_is_ignored() {
        let mut store = FaceRecordStore::new();
        let engine = MatchingEngine::default();
        let mut o = obs(1, 10.0, 10.0, 50.0, 50.0);
        o.landmarks = None;

        let outcomes = engine.apply(&mut store, &[o]);

        assert_eq!(outcomes.as_slice(), &[MatchOutcome::NoOp]);
        assert!(!outcomes.has_changes());
        assert!(store.is_empty());
    }

    #[test]
    fn test_unmatched_records_are_left_stale() {
        let mut store = store_with(&[
            obs(1, 10.0, 10.0, 50.0, 50.0),
            obs(2, 300.0, 10.0, 50.0, 50.0),
        ]);
        let engine = MatchingEngine::default();

        engine.apply(&mut store, &[obs(3, 301.0, 10.0, 50.0, 50.0)]);

        assert!(!store.get(0).unwrap().fresh);
        assert!(store.get(1).unwrap().fresh);
    }

    #[rstest]
    #[case::forward([0, 1, 2])]
    #[case::reversed([2, 1, 0])]
    #[case::rotated([1, 2, 0])]
    fn test_separated_faces_match_regardless_of_store_order(#[case] order: [usize; 3]) {
        let faces = [
            obs(1, 0.0, 0.0, 50.0, 50.0),
            obs(2, 300.0, 0.0, 50.0, 50.0),
            obs(3, 600.0, 300.0, 50.0, 50.0),
        ];
        let ordered: Vec<FaceObservation> = order.iter().map(|&i| faces[i].clone()).collect();
        let mut store = store_with(&ordered);
        let engine = MatchingEngine::default();

        let moved: Vec<FaceObservation> = faces
            .iter()
            .map(|f| {
                let b = f.bounding_box;
                obs(f.token.0 + 10, b.x + 3.0, b.y + 3.0, b.width, b.height)
            })
            .collect();
        let outcomes = engine.apply(&mut store, &moved);

        assert_eq!(outcomes.updated(), 3);
        assert_eq!(store.count(), 3);
        for f in store.faces() {
            let original = ordered[f.slot].bounding_box;
            assert_eq!(f.bounding_box.x, original.x + 3.0);
            assert_eq!(f.bounding_box.y, original.y + 3.0);
        }
    }

    #[test]
    fn test_record_count_never_exceeds_accumulated_observations() {
        let mut store = FaceRecordStore::new();
        let engine = MatchingEngine::default();
        let frames = vec![
            vec![obs(1, 0.0, 0.0, 50.0, 50.0)],
            vec![obs(1, 2.0, 0.0, 50.0, 50.0), obs(2, 200.0, 0.0, 50.0, 50.0)],
            vec![obs(2, 201.0, 1.0, 50.0, 50.0)],
            vec![obs(3, 400.0, 0.0, 50.0, 50.0), obs(3, 400.0, 0.0, 50.0, 50.0)],
        ];

        let mut accumulated = 0;
        let mut previous = 0;
        for frame in &frames {
            accumulated += frame.len();
            engine.apply(&mut store, frame);
            assert!(store.count() <= accumulated);
            assert!(store.count() >= previous);
            previous = store.count();
        }
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_observation_outside_margin_creates_new_record() {
        let mut store = store_with(&[obs(1, 10.0, 10.0, 50.0, 50.0)]);
        let engine = MatchingEngine::new(20.0);

        // 21px right of the original: overflows the expanded box by 1px.
        let outcomes = engine.apply(&mut store, &[obs(2, 31.0, 10.0, 50.0, 50.0)]);

        assert_eq!(outcomes.as_slice(), &[MatchOutcome::Created { slot: 1 }]);
    }
}
