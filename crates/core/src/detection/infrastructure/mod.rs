pub mod replay_face_detector;
pub mod threaded_detector;
