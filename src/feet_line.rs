use serde::{Deserialize, Serialize};

use crate::geometry::{Line, Point};
use crate::pose::{verify, LandmarkIndex, PoseKeypoints, FEET_CONFIDENCE_THRESHOLD};
use crate::warning::{accumulate, Warning};

/// 足の基準線に使うランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeetLineMethod {
    #[default]
    #[serde(rename = "heel", alias = "UseHeelLine")]
    UseHeelLine,
    #[serde(rename = "toe", alias = "UseToeLine")]
    UseToeLine,
}

impl FeetLineMethod {
    /// (左, 右) のランドマーク
    pub fn landmarks(self) -> (LandmarkIndex, LandmarkIndex) {
        match self {
            Self::UseHeelLine => (LandmarkIndex::LeftHeel, LandmarkIndex::RightHeel),
            Self::UseToeLine => (LandmarkIndex::LeftBigToe, LandmarkIndex::RightBigToe),
        }
    }

    pub fn alternative(self) -> Self {
        match self {
            Self::UseHeelLine => Self::UseToeLine,
            Self::UseToeLine => Self::UseHeelLine,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::UseHeelLine => "heel line",
            Self::UseToeLine => "toe line",
        }
    }
}

/// 左右の足の基準点を結ぶ線（右 → 左）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeetLine {
    pub method: FeetLineMethod,
    pub left_point: Point,
    pub right_point: Point,
    pub line: Line,
}

/// 指定方式で足の線を構築
///
/// Severe は Err。Minor は別方式を勧める一文を付けて返す
pub fn resolve_feet_line(
    pose: &PoseKeypoints,
    method: FeetLineMethod,
) -> Result<(FeetLine, Option<String>), String> {
    let (left_idx, right_idx) = method.landmarks();
    let warning = accumulate(None, verify(pose, left_idx, FEET_CONFIDENCE_THRESHOLD))?;
    let warning = accumulate(warning, verify(pose, right_idx, FEET_CONFIDENCE_THRESHOLD))?;
    let warning = warning.map(|msg| {
        format!(
            "{} (consider using the {} instead of the {})",
            msg,
            method.alternative().description(),
            method.description()
        )
    });

    let left_point = pose.get(left_idx).point();
    let right_point = pose.get(right_idx).point();
    let feet_line = FeetLine {
        method,
        left_point,
        right_point,
        line: Line::through(right_point, left_point),
    };
    Ok((feet_line, warning))
}

/// resolve_feet_line の Minor を蓄積中の警告に足す
pub(crate) fn resolve_into(
    pose: &PoseKeypoints,
    method: FeetLineMethod,
    acc: Option<String>,
) -> Result<(FeetLine, Option<String>), String> {
    let (feet_line, minor) = resolve_feet_line(pose, method)?;
    let acc = accumulate(acc, minor.map(Warning::Minor))?;
    Ok((feet_line, acc))
}
