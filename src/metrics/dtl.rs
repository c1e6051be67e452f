//! Down-The-Line（目標方向の後方から撮影）の指標
//!
//! 右打ちを前提とし、右半身（カメラ側）の関節を使う。

use serde::{Deserialize, Serialize};

use super::{alignment, angle_from_vertical, verify_landmarks};
use crate::calibration::CalibrationInfo;
use crate::feet_line::{resolve_into, FeetLineMethod};
use crate::geometry::{angle_at_intersection, distance, rotate_vector, signed_angle_of_rotation};
use crate::pose::{LandmarkIndex, PoseKeypoints, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::warning::{accumulate, MetricResult, Warning};

const NO_SHOULDER_TILT: &str =
    "shoulder tilt from the face-on photo is unavailable, assuming level shoulders";

/// DTL 写真から計算する全指標
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtlMetrics {
    pub spine_angle: MetricResult,
    pub feet_alignment: MetricResult,
    pub heel_alignment: MetricResult,
    pub toe_alignment: MetricResult,
    pub shoulder_alignment: MetricResult,
    pub waist_alignment: MetricResult,
    pub knee_bend: MetricResult,
    pub distance_from_ball: MetricResult,
    pub ulnar_deviation: MetricResult,
}

pub fn compute_dtl_metrics(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> DtlMetrics {
    DtlMetrics {
        spine_angle: spine_angle(pose, calibration),
        feet_alignment: feet_alignment(pose, calibration),
        heel_alignment: heel_alignment(pose, calibration),
        toe_alignment: toe_alignment(pose, calibration),
        shoulder_alignment: shoulder_alignment(pose, calibration),
        waist_alignment: waist_alignment(pose, calibration),
        knee_bend: knee_bend(pose, calibration),
        distance_from_ball: distance_from_ball(pose, calibration),
        ulnar_deviation: ulnar_deviation(pose, calibration),
    }
}

/// 腰中点 → 首 の線の垂直からの傾き（度）
pub fn spine_angle(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome("spine angle", spine_angle_inner(pose, calibration))
}

fn spine_angle_inner(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
) -> Result<MetricResult, String> {
    let vertical = calibration.vertical_axis()?;
    let warning = verify_landmarks(
        None,
        pose,
        &[LandmarkIndex::MidHip, LandmarkIndex::Neck],
        DEFAULT_CONFIDENCE_THRESHOLD,
    )?;
    let value = angle_from_vertical(
        pose.get(LandmarkIndex::MidHip).point(),
        pose.get(LandmarkIndex::Neck).point(),
        &vertical,
    );
    Ok(MetricResult::new(value, warning))
}

/// キャリブレーションで選んだ足の線のアライメント
pub fn feet_alignment(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    foot_alignment(pose, calibration, calibration.feet_line_method)
}

pub fn heel_alignment(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    foot_alignment(pose, calibration, FeetLineMethod::UseHeelLine)
}

pub fn toe_alignment(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    foot_alignment(pose, calibration, FeetLineMethod::UseToeLine)
}

/// 右足 → 消失点 に対する 右足 → 左足 の回転角
/// クローズ: 正、オープン: 負、スクエア: 0
pub fn foot_alignment(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
    method: FeetLineMethod,
) -> MetricResult {
    let name = match method {
        FeetLineMethod::UseHeelLine => "heel alignment",
        FeetLineMethod::UseToeLine => "toe alignment",
    };
    MetricResult::from_outcome(name, foot_alignment_inner(pose, calibration, method))
}

fn foot_alignment_inner(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
    method: FeetLineMethod,
) -> Result<MetricResult, String> {
    let vanishing_point = calibration.vanishing_point()?;
    let (feet, warning) = resolve_into(pose, method, None)?;
    let value = alignment(feet.right_point, feet.left_point, vanishing_point);
    Ok(MetricResult::new(value, warning))
}

/// 肩のアライメント
///
/// 肩は前傾で右側が下がるため、消失点方向を Face-On の肩の傾き分だけ回した線を基準にする
pub fn shoulder_alignment(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome("shoulder alignment", shoulder_alignment_inner(pose, calibration))
}

fn shoulder_alignment_inner(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
) -> Result<MetricResult, String> {
    let vanishing_point = calibration.vanishing_point()?;
    let warning = verify_landmarks(
        None,
        pose,
        &[LandmarkIndex::RightShoulder, LandmarkIndex::LeftShoulder],
        DEFAULT_CONFIDENCE_THRESHOLD,
    )?;
    let (tilt, warning) = match calibration.shoulder_tilt {
        Some(tilt) => (tilt, warning),
        None => (
            0.0,
            accumulate(warning, Some(Warning::Minor(NO_SHOULDER_TILT.to_string())))?,
        ),
    };

    let right = pose.get(LandmarkIndex::RightShoulder).point();
    let left = pose.get(LandmarkIndex::LeftShoulder).point();
    // 右が下がる（tilt > 0）ほど基準線は上向きに立つ
    let reference = rotate_vector(right.vector_to(vanishing_point), -tilt);
    let value = signed_angle_of_rotation(reference, right.vector_to(left));
    Ok(MetricResult::new(value, warning))
}

pub fn waist_alignment(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome("waist alignment", waist_alignment_inner(pose, calibration))
}

fn waist_alignment_inner(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
) -> Result<MetricResult, String> {
    let vanishing_point = calibration.vanishing_point()?;
    let warning = verify_landmarks(
        None,
        pose,
        &[LandmarkIndex::RightHip, LandmarkIndex::LeftHip],
        DEFAULT_CONFIDENCE_THRESHOLD,
    )?;
    let value = alignment(
        pose.get(LandmarkIndex::RightHip).point(),
        pose.get(LandmarkIndex::LeftHip).point(),
        vanishing_point,
    );
    Ok(MetricResult::new(value, warning))
}

/// 膝の曲がり: 伸び切った脚からの角度（度）
pub fn knee_bend(pose: &PoseKeypoints, _calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome("knee bend", knee_bend_inner(pose))
}

fn knee_bend_inner(pose: &PoseKeypoints) -> Result<MetricResult, String> {
    let warning = verify_landmarks(
        None,
        pose,
        &[
            LandmarkIndex::RightHip,
            LandmarkIndex::RightKnee,
            LandmarkIndex::RightAnkle,
        ],
        DEFAULT_CONFIDENCE_THRESHOLD,
    )?;
    let leg = angle_at_intersection(
        pose.get(LandmarkIndex::RightHip).point(),
        pose.get(LandmarkIndex::RightKnee).point(),
        pose.get(LandmarkIndex::RightAnkle).point(),
    );
    Ok(MetricResult::new(180.0 - leg, warning))
}

/// ボールからつま先の線までの距離 / 背骨の長さ。大きいほどボールから遠い
pub fn distance_from_ball(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome("distance from ball", distance_from_ball_inner(pose, calibration))
}

fn distance_from_ball_inner(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
) -> Result<MetricResult, String> {
    let ball = calibration.golf_ball()?;
    let (toe_line, warning) = resolve_into(pose, FeetLineMethod::UseToeLine, None)?;
    let warning = verify_landmarks(
        warning,
        pose,
        &[LandmarkIndex::MidHip, LandmarkIndex::Neck],
        DEFAULT_CONFIDENCE_THRESHOLD,
    )?;

    let foot_of_ball = toe_line.line.projection(ball);
    let spine_length = distance(
        pose.get(LandmarkIndex::MidHip).point(),
        pose.get(LandmarkIndex::Neck).point(),
    );
    Ok(MetricResult::new(distance(ball, foot_of_ball) / spine_length, warning))
}

/// 手首での 肘 - 手首 - クラブヘッド の角度。大きいほど手元が高い
pub fn ulnar_deviation(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome("ulnar deviation", ulnar_deviation_inner(pose, calibration))
}

fn ulnar_deviation_inner(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
) -> Result<MetricResult, String> {
    let club_head = calibration.club_head()?;
    let warning = verify_landmarks(
        None,
        pose,
        &[LandmarkIndex::RightElbow, LandmarkIndex::RightWrist],
        DEFAULT_CONFIDENCE_THRESHOLD,
    )?;
    let value = angle_at_intersection(
        pose.get(LandmarkIndex::RightElbow).point(),
        pose.get(LandmarkIndex::RightWrist).point(),
        club_head,
    );
    Ok(MetricResult::new(value, warning))
}
