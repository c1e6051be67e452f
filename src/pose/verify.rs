use super::keypoint::{Landmark, LandmarkIndex, PoseKeypoints};
use crate::warning::Warning;

/// 通常のランドマークの信頼度閾値
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// かかと・つま先の信頼度閾値（足元は誤検出が多い）
pub const FEET_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// ランドマークの存在と信頼度を確認
///
/// - 未検出 → Severe
/// - 信頼度が閾値未満 → Minor
pub fn verify_landmark(landmark: &Landmark, name: &str, threshold: f64) -> Option<Warning> {
    if !landmark.exists() {
        return Some(Warning::Severe(format!("could not find landmark {}", name)));
    }
    if landmark.confidence < threshold {
        return Some(Warning::Minor(format!(
            "uncertain where {} is, confidence is {:.2}; please make sure {} is visible",
            name, landmark.confidence, name
        )));
    }
    None
}

/// インデックス指定版。名前は LandmarkIndex::name を使う
pub fn verify(pose: &PoseKeypoints, index: LandmarkIndex, threshold: f64) -> Option<Warning> {
    verify_landmark(pose.get(index), index.name(), threshold)
}
