use crate::detection::domain::face_observation::FaceObservation;
use crate::detection::domain::tracked_face::TrackedFace;

/// Ordered arena of tracked faces, indexed by slot.
///
/// Not synchronized: the owner serializes all mutation.
#[derive(Debug, Default)]
pub struct FaceRecordStore {
    faces: Vec<TrackedFace>,
}

impl FaceRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&TrackedFace> {
        self.faces.get(slot)
    }

    pub fn faces(&self) -> &[TrackedFace] {
        &self.faces
    }

    /// Owned copy of all records, for handing to another thread.
    pub fn snapshot(&self) -> Vec<TrackedFace> {
        self.faces.clone()
    }

    /// Writes `observation` into the store and returns its slot.
    ///
    /// `None` appends a new record. `Some(slot)` replaces that record's box
    /// and landmarks wholesale, even when the new landmarks are sparser.
    ///
    /// # Panics
    ///
    /// If `slot` is out of range.
    pub fn upsert(&mut self, slot: Option<usize>, observation: &FaceObservation) -> usize {
        let landmarks = observation.landmarks.clone().unwrap_or_default();
        match slot {
            None => {
                let slot = self.faces.len();
                self.faces.push(TrackedFace {
                    slot,
                    token: observation.token,
                    bounding_box: observation.bounding_box,
                    landmarks,
                    fresh: true,
                });
                slot
            }
            Some(slot) => {
                assert!(
                    slot < self.faces.len(),
                    "upsert slot {slot} out of range for {} records",
                    self.faces.len()
                );
                let face = &mut self.faces[slot];
                face.token = observation.token;
                face.bounding_box = observation.bounding_box;
                face.landmarks = landmarks;
                face.fresh = true;
                slot
            }
        }
    }

    /// Removes a record and compacts the arena; later slots shift down by one.
    pub fn remove(&mut self, slot: usize) -> Option<TrackedFace> {
        if slot >= self.faces.len() {
            return None;
        }
        let removed = self.faces.remove(slot);
        for (i, face) in self.faces.iter_mut().enumerate().skip(slot) {
            face.slot = i;
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.faces.clear();
    }

    /// Marks every record stale at the start of a frame cycle.
    pub fn begin_frame(&mut self) {
        for face in &mut self.faces {
            face.fresh = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_observation::{FaceLandmarks, ObservationToken};
    use crate::shared::geometry::{Point, Rect};

    fn observation(token: u64, x: f64) -> FaceObservation {
        FaceObservation::new(
            ObservationToken(token),
            Rect::new(x, 10.0, 50.0, 50.0),
            Some(FaceLandmarks::new(
                vec![Point::new(x + 10.0, 50.0)],
                vec![Point::new(x + 20.0, 40.0)],
                vec![Point::new(x + 20.0, 30.0)],
            )),
        )
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = FaceRecordStore::new();
        assert_eq!(store.count(), 0);
        assert!(store.is_empty());
        assert!(store.get(0).is_none());
    }

    #[test]
    fn test_upsert_none_appends_with_next_slot() {
        let mut store = FaceRecordStore::new();
        assert_eq!(store.upsert(None, &observation(1, 0.0)), 0);
        assert_eq!(store.upsert(None, &observation(2, 100.0)), 1);
        assert_eq!(store.count(), 2);
        assert_eq!(store.get(1).unwrap().slot, 1);
        assert_eq!(store.get(1).unwrap().token, ObservationToken(2));
    }

    #[test]
    fn test_upsert_slot_replaces_in_place() {
        let mut store = FaceRecordStore::new();
        store.upsert(None, &observation(1, 0.0));
        store.upsert(None, &observation(2, 100.0));

        let slot = store.upsert(Some(0), &observation(9, 5.0));

        assert_eq!(slot, 0);
        assert_eq!(store.count(), 2);
        let face = store.get(0).unwrap();
        assert_eq!(face.token, ObservationToken(9));
        assert_eq!(face.bounding_box.x, 5.0);
    }

    #[test]
    fn test_upsert_sparser_landmarks_overwrite_previous() {
        let mut store = FaceRecordStore::new();
        store.upsert(None, &observation(1, 0.0));

        let mut sparse = observation(1, 2.0);
        sparse.landmarks.as_mut().unwrap().nose.clear();
        store.upsert(Some(0), &sparse);

        let face = store.get(0).unwrap();
        assert!(face.landmarks.nose.is_empty());
        assert!(!face.landmarks.outer_lips.is_empty());
    }

    #[test]
    fn test_upsert_without_landmarks_stores_empty_landmarks() {
        let mut store = FaceRecordStore::new();
        let mut obs = observation(1, 0.0);
        obs.landmarks = None;
        store.upsert(None, &obs);
        assert_eq!(store.get(0).unwrap().landmarks, FaceLandmarks::default());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_upsert_unknown_slot_panics() {
        let mut store = FaceRecordStore::new();
        store.upsert(Some(0), &observation(1, 0.0));
    }

    #[test]
    fn test_remove_compacts_and_renumbers() {
        let mut store = FaceRecordStore::new();
        store.upsert(None, &observation(1, 0.0));
        store.upsert(None, &observation(2, 100.0));
        store.upsert(None, &observation(3, 200.0));

        let removed = store.remove(0).unwrap();

        assert_eq!(removed.token, ObservationToken(1));
        assert_eq!(store.count(), 2);
        assert_eq!(store.get(0).unwrap().token, ObservationToken(2));
        assert_eq!(store.get(0).unwrap().slot, 0);
        assert_eq!(store.get(1).unwrap().slot, 1);
    }

    #[test]
    fn test_remove_out_of_range_is_none() {
        let mut store = FaceRecordStore::new();
        assert!(store.remove(3).is_none());
    }

    #[test]
    fn test_clear_empties_store() {
        let mut store = FaceRecordStore::new();
        store.upsert(None, &observation(1, 0.0));
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_begin_frame_marks_all_stale_and_upsert_refreshes() {
        let mut store = FaceRecordStore::new();
        store.upsert(None, &observation(1, 0.0));
        store.upsert(None, &observation(2, 100.0));
        assert!(store.faces().iter().all(|f| f.fresh));

        store.begin_frame();
        assert!(store.faces().iter().all(|f| !f.fresh));

        store.upsert(Some(1), &observation(2, 101.0));
        assert!(!store.get(0).unwrap().fresh);
        assert!(store.get(1).unwrap().fresh);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut store = FaceRecordStore::new();
        store.upsert(None, &observation(1, 0.0));
        let snapshot = store.snapshot();
        store.clear();
        assert_eq!(snapshot.len(), 1);
    }
}
