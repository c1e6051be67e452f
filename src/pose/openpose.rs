use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::keypoint::{Landmark, LandmarkIndex, PoseKeypoints};

/// 1キーポイントあたりの値の数 (x, y, confidence)
const VALUES_PER_LANDMARK: usize = 3;

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("expected {expected} keypoint values, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("no person found in pose document")]
    NoPerson,

    #[error("failed to parse pose document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct OpenPoseDocument {
    #[serde(default)]
    people: Vec<OpenPosePerson>,
}

#[derive(Deserialize)]
struct OpenPosePerson {
    pose_keypoints_2d: Vec<f64>,
}

impl PoseKeypoints {
    /// BODY_25 のフラット配列 [x0, y0, c0, x1, y1, c1, ...] から構築
    pub fn from_flat(values: &[f64]) -> Result<Self, PoseError> {
        let expected = LandmarkIndex::COUNT * VALUES_PER_LANDMARK;
        if values.len() != expected {
            return Err(PoseError::WrongLength {
                expected,
                actual: values.len(),
            });
        }
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        for (landmark, chunk) in landmarks
            .iter_mut()
            .zip(values.chunks_exact(VALUES_PER_LANDMARK))
        {
            *landmark = Landmark::new(chunk[0], chunk[1], chunk[2]);
        }
        Ok(Self::new(landmarks))
    }

    /// OpenPose の出力JSONから最初の人物を読み込む
    pub fn from_openpose_json(json: &str) -> Result<Self, PoseError> {
        let doc: OpenPoseDocument = serde_json::from_str(json)?;
        let person = doc.people.first().ok_or(PoseError::NoPerson)?;
        Self::from_flat(&person.pose_keypoints_2d)
    }
}

pub fn load_openpose<P: AsRef<Path>>(path: P) -> Result<PoseKeypoints> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read keypoint file {}", path.display()))?;
    let pose = PoseKeypoints::from_openpose_json(&content)
        .with_context(|| format!("Invalid keypoint file {}", path.display()))?;
    Ok(pose)
}
