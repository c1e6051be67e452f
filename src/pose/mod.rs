pub mod keypoint;
pub mod openpose;
pub mod verify;

pub use keypoint::{Landmark, LandmarkIndex, PoseKeypoints};
pub use openpose::{load_openpose, PoseError};
pub use verify::{
    verify, verify_landmark, DEFAULT_CONFIDENCE_THRESHOLD, FEET_CONFIDENCE_THRESHOLD,
};
