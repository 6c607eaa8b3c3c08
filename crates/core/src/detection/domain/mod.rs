pub mod face_detector;
pub mod face_observation;
pub mod face_record_store;
pub mod matching_engine;
pub mod tracked_face;
