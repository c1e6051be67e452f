//! Face-On（正面から撮影）の指標
//!
//! 画像上でゴルファーの右半身は左側に写る。

use serde::{Deserialize, Serialize};

use super::{acute, angle_from_vertical, verify_landmarks};
use crate::calibration::CalibrationInfo;
use crate::feet_line::resolve_into;
use crate::geometry::{
    angle_at_intersection, convert_slope_to_degrees, distance, midpoint, slope,
    slope_to_signed_degrees, Line, Point,
};
use crate::pose::{
    LandmarkIndex, PoseKeypoints, DEFAULT_CONFIDENCE_THRESHOLD, FEET_CONFIDENCE_THRESHOLD,
};
use crate::warning::MetricResult;

/// Face-On 写真から計算する全指標
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceOnMetrics {
    pub side_bend: MetricResult,
    pub left_foot_flare: MetricResult,
    pub right_foot_flare: MetricResult,
    pub stance_width: MetricResult,
    pub shoulder_tilt: MetricResult,
    pub waist_tilt: MetricResult,
    pub shaft_lean: MetricResult,
    pub ball_position: MetricResult,
    pub head_position: MetricResult,
    pub chest_position: MetricResult,
    pub mid_hip_position: MetricResult,
}

pub fn compute_face_on_metrics(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
) -> FaceOnMetrics {
    FaceOnMetrics {
        side_bend: side_bend(pose, calibration),
        left_foot_flare: left_foot_flare(pose, calibration),
        right_foot_flare: right_foot_flare(pose, calibration),
        stance_width: stance_width(pose, calibration),
        shoulder_tilt: shoulder_tilt(pose, calibration),
        waist_tilt: waist_tilt(pose, calibration),
        shaft_lean: shaft_lean(pose, calibration),
        ball_position: ball_position(pose, calibration),
        head_position: head_position(pose, calibration),
        chest_position: chest_position(pose, calibration),
        mid_hip_position: mid_hip_position(pose, calibration),
    }
}

// --- 上半身 ---

/// 腰中点 → 首 の線の垂直からの傾き。首が腰中点より画像左（右半身側）なら正
pub fn side_bend(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome("side bend", side_bend_inner(pose, calibration))
}

fn side_bend_inner(
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
    let mid_hip = pose.get(LandmarkIndex::MidHip).point();
    let neck = pose.get(LandmarkIndex::Neck).point();
    let angle = angle_from_vertical(mid_hip, neck, &vertical);
    let value = if neck.x < mid_hip.x { angle } else { -angle };
    Ok(MetricResult::new(value, warning))
}

/// 肩の傾き。右肩が下がっていれば正
pub fn shoulder_tilt(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome(
        "shoulder tilt",
        tilt(
            pose,
            calibration,
            LandmarkIndex::RightShoulder,
            LandmarkIndex::LeftShoulder,
        ),
    )
}

/// 腰の傾き。右腰が下がっていれば正
pub fn waist_tilt(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome(
        "waist tilt",
        tilt(pose, calibration, LandmarkIndex::RightHip, LandmarkIndex::LeftHip),
    )
}

/// 水平軸の角度と 右 → 左 の線の角度の差
fn tilt(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
    right: LandmarkIndex,
    left: LandmarkIndex,
) -> Result<MetricResult, String> {
    let horizontal = calibration.horizontal_axis()?;
    let warning = verify_landmarks(None, pose, &[right, left], DEFAULT_CONFIDENCE_THRESHOLD)?;
    let (right, left) = (pose.get(right).point(), pose.get(left).point());
    if distance(right, left) == 0.0 {
        return Ok(MetricResult::new(f64::NAN, warning));
    }
    let line_slope = slope(right, left);
    let value = slope_to_signed_degrees(horizontal.slope) - slope_to_signed_degrees(line_slope);
    Ok(MetricResult::new(value, warning))
}

/// シャフトの傾き。ヘッドよりグリップが目標側にあれば正（ハンドファースト）
pub fn shaft_lean(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome("shaft lean", shaft_lean_inner(pose, calibration))
}

fn shaft_lean_inner(
    _pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
) -> Result<MetricResult, String> {
    let vertical = calibration.vertical_axis()?;
    let butt = calibration.club_butt()?;
    let head = calibration.club_head()?;
    if distance(butt, head) == 0.0 {
        return Ok(MetricResult::new(f64::NAN, None));
    }
    let value =
        convert_slope_to_degrees(slope(butt, head)) - convert_slope_to_degrees(vertical.slope);
    Ok(MetricResult::new(value, None))
}

// --- 足 ---

pub fn left_foot_flare(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome(
        "left foot flare",
        foot_flare(pose, calibration, LandmarkIndex::LeftHeel, LandmarkIndex::LeftBigToe),
    )
}

pub fn right_foot_flare(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome(
        "right foot flare",
        foot_flare(pose, calibration, LandmarkIndex::RightHeel, LandmarkIndex::RightBigToe),
    )
}

/// かかと → つま先 の線と、両かかと中点を通る垂直軸のなす角
///
/// 交点がつま先より上なら外向き（正）、下なら内向き（負）。平行なら 0
fn foot_flare(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
    heel: LandmarkIndex,
    toe: LandmarkIndex,
) -> Result<MetricResult, String> {
    let vertical = calibration.vertical_axis()?;
    let warning = verify_landmarks(
        None,
        pose,
        &[LandmarkIndex::LeftHeel, LandmarkIndex::RightHeel, toe],
        FEET_CONFIDENCE_THRESHOLD,
    )?;

    let heel_point = pose.get(heel).point();
    let toe_point = pose.get(toe).point();
    if distance(heel_point, toe_point) == 0.0 {
        return Ok(MetricResult::new(f64::NAN, warning));
    }
    let heels_mid = midpoint(
        pose.get(LandmarkIndex::LeftHeel).point(),
        pose.get(LandmarkIndex::RightHeel).point(),
    );
    let foot = Line::through(heel_point, toe_point);
    let axis = vertical.translated_through(heels_mid);

    let value = match foot.intersection(&axis) {
        Some(intersection) => {
            let angle = acute(intersection.angle_at_intersect);
            if intersection.point.y < toe_point.y {
                angle
            } else {
                -angle
            }
        }
        None => 0.0,
    };
    Ok(MetricResult::new(value, warning))
}

/// かかと間の距離 / 背骨の長さ
pub fn stance_width(pose: &PoseKeypoints, _calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome("stance width", stance_width_inner(pose))
}

fn stance_width_inner(pose: &PoseKeypoints) -> Result<MetricResult, String> {
    let warning = verify_landmarks(
        None,
        pose,
        &[LandmarkIndex::LeftHeel, LandmarkIndex::RightHeel],
        FEET_CONFIDENCE_THRESHOLD,
    )?;
    let warning = verify_landmarks(
        warning,
        pose,
        &[LandmarkIndex::MidHip, LandmarkIndex::Neck],
        DEFAULT_CONFIDENCE_THRESHOLD,
    )?;
    let heels = distance(
        pose.get(LandmarkIndex::LeftHeel).point(),
        pose.get(LandmarkIndex::RightHeel).point(),
    );
    let spine = distance(
        pose.get(LandmarkIndex::MidHip).point(),
        pose.get(LandmarkIndex::Neck).point(),
    );
    Ok(MetricResult::new(heels / spine, warning))
}

// --- 位置 ---

pub fn ball_position(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome("ball position", ball_position_inner(pose, calibration))
}

fn ball_position_inner(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
) -> Result<MetricResult, String> {
    let ball = calibration.golf_ball()?;
    position(pose, calibration, ball, None)
}

pub fn head_position(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome(
        "head position",
        landmark_position(pose, calibration, LandmarkIndex::Nose),
    )
}

pub fn chest_position(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome(
        "chest position",
        landmark_position(pose, calibration, LandmarkIndex::Neck),
    )
}

pub fn mid_hip_position(pose: &PoseKeypoints, calibration: &CalibrationInfo) -> MetricResult {
    MetricResult::from_outcome(
        "mid hip position",
        landmark_position(pose, calibration, LandmarkIndex::MidHip),
    )
}

fn landmark_position(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
    target: LandmarkIndex,
) -> Result<MetricResult, String> {
    let warning = verify_landmarks(None, pose, &[target], DEFAULT_CONFIDENCE_THRESHOLD)?;
    position(pose, calibration, pose.get(target).point(), warning)
}

/// 足の線の中点での、足の線の垂線と 中点 → target のなす角（0〜90）
///
/// target が左足側（目標側）なら正、右足側なら負
fn position(
    pose: &PoseKeypoints,
    calibration: &CalibrationInfo,
    target: Point,
    warning: Option<String>,
) -> Result<MetricResult, String> {
    let (feet, warning) = resolve_into(pose, calibration.feet_line_method, warning)?;
    let center = midpoint(feet.left_point, feet.right_point);
    let normal = feet.line.perpendicular_through(center);

    let angle = acute(angle_at_intersection(
        center.offset(normal.direction()),
        center,
        target,
    ));
    let lead_side = center
        .vector_to(target)
        .dot(&feet.right_point.vector_to(feet.left_point));
    let value = if lead_side >= 0.0 { angle } else { -angle };
    Ok(MetricResult::new(value, warning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::ReferencePoints;
    use crate::feet_line::FeetLineMethod;
    use crate::fixtures;
    use crate::pose::Landmark;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn assert_metric(result: &MetricResult, expected: f64) {
        assert!(!result.failed, "unexpected failure: {:?}", result.warning);
        assert!(
            approx_eq(result.value, expected, 0.01),
            "expected {}, got {}",
            expected,
            result.value
        );
    }

    #[test]
    fn test_side_bend() {
        let pose = fixtures::face_on_target_pose();
        let calibration = fixtures::face_on_calibration();
        assert_metric(&side_bend(&pose, &calibration), 4.101);

        // 首を腰中点の反対側へ
        let mirrored = pose.with(LandmarkIndex::Neck, Landmark::new(575.0, 700.0, 0.9));
        let result = side_bend(&mirrored, &calibration);
        assert!(result.value < 0.0);
    }

    #[test]
    fn test_side_bend_requires_axes() {
        let result = side_bend(
            &fixtures::face_on_target_pose(),
            &CalibrationInfo::uncalibrated(FeetLineMethod::UseHeelLine),
        );
        assert!(result.failed);
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn test_foot_flare() {
        let pose = fixtures::face_on_target_pose();
        let calibration = fixtures::face_on_calibration();
        assert_metric(&left_foot_flare(&pose, &calibration), 35.346);
        assert_metric(&right_foot_flare(&pose, &calibration), 22.333);
    }

    #[test]
    fn test_foot_flare_pigeon_toed_is_negative() {
        // つま先を内側へ向ける
        let pose = fixtures::face_on_target_pose()
            .with(LandmarkIndex::LeftBigToe, Landmark::new(600.0, 1755.0, 0.9));
        let result = left_foot_flare(&pose, &fixtures::face_on_calibration());
        assert!(!result.failed);
        assert!(result.value < 0.0, "got {}", result.value);
    }

    #[test]
    fn test_foot_flare_parallel_is_zero() {
        let vertical = Line::with_slope(Point::new(545.0, 1000.0), f64::INFINITY);
        let horizontal = Line::with_slope(Point::new(450.0, 1700.0), 0.0);
        let calibration =
            CalibrationInfo::from_axes(FeetLineMethod::UseHeelLine, vertical, horizontal);
        let pose = fixtures::face_on_target_pose()
            .with(LandmarkIndex::RightBigToe, Landmark::new(450.0, 1760.0, 0.9));
        let result = right_foot_flare(&pose, &calibration);
        assert!(!result.failed);
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn test_foot_flare_missing_toe() {
        let pose = fixtures::face_on_target_pose()
            .with(LandmarkIndex::RightBigToe, Landmark::default());
        let calibration = fixtures::face_on_calibration();
        let result = right_foot_flare(&pose, &calibration);
        assert!(result.failed);
        assert_eq!(result.warning.as_deref(), Some("could not find landmark right big toe"));
        // 左足は影響なし
        assert!(!left_foot_flare(&pose, &calibration).failed);
    }

    #[test]
    fn test_foot_flare_toe_on_heel_is_severe() {
        let pose = fixtures::face_on_target_pose()
            .with(LandmarkIndex::LeftBigToe, Landmark::new(640.0, 1698.0, 0.9));
        let result = left_foot_flare(&pose, &fixtures::face_on_calibration());
        assert!(result.failed);
        assert_eq!(result.value, 0.0);
        assert_eq!(
            result.warning.as_deref(),
            Some("could not compute left foot flare: degenerate geometry")
        );
    }

    #[test]
    fn test_side_bend_level_neck() {
        let pose = fixtures::face_on_target_pose()
            .with(LandmarkIndex::Neck, Landmark::new(480.0, 1000.0, 0.9));
        let result = side_bend(&pose, &fixtures::face_on_calibration());
        assert!(!result.failed);
        assert!(approx_eq(result.value, 90.287, 0.01), "got {}", result.value);
    }

    #[test]
    fn test_tilt_and_shaft_lean_coincident_points_are_severe() {
        let calibration = fixtures::face_on_calibration();
        let pose = fixtures::face_on_target_pose()
            .with(LandmarkIndex::LeftShoulder, Landmark::new(450.0, 715.0, 0.9));
        assert!(shoulder_tilt(&pose, &calibration).failed);

        let stacked = calibration.with_reference_points(ReferencePoints {
            club_butt: Some(Point::new(598.0, 1755.0)),
            ..fixtures::face_on_reference_points()
        });
        let result = shaft_lean(&fixtures::face_on_target_pose(), &stacked);
        assert!(result.failed);
        assert_eq!(
            result.warning.as_deref(),
            Some("could not compute shaft lean: degenerate geometry")
        );
    }

    #[test]
    fn test_stance_width() {
        let calibration = CalibrationInfo::uncalibrated(FeetLineMethod::UseHeelLine);
        assert_metric(&stance_width(&fixtures::face_on_target_pose(), &calibration), 0.632);
    }

    #[test]
    fn test_stance_width_low_confidence_heel() {
        let pose = fixtures::face_on_target_pose()
            .with(LandmarkIndex::RightHeel, Landmark::new(450.0, 1700.0, 0.55));
        let result = stance_width(&pose, &fixtures::face_on_calibration());
        assert!(!result.failed);
        assert!(result.warning.unwrap().contains("right heel"));
    }

    #[test]
    fn test_tilts() {
        let pose = fixtures::face_on_target_pose();
        let calibration = fixtures::face_on_calibration();
        assert_metric(&shoulder_tilt(&pose, &calibration), 4.470);
        assert_metric(&waist_tilt(&pose, &calibration), 4.621);

        // 左肩が下がると負
        let dropped = pose.with(LandmarkIndex::LeftShoulder, Landmark::new(620.0, 740.0, 0.9));
        assert!(shoulder_tilt(&dropped, &calibration).value < 0.0);
    }

    #[test]
    fn test_shaft_lean() {
        let result = shaft_lean(&fixtures::face_on_target_pose(), &fixtures::face_on_calibration());
        assert_metric(&result, 1.796);
    }

    #[test]
    fn test_shaft_lean_without_club_butt() {
        let calibration = fixtures::face_on_calibration().with_reference_points(ReferencePoints {
            club_butt: None,
            ..fixtures::face_on_reference_points()
        });
        let result = shaft_lean(&fixtures::face_on_target_pose(), &calibration);
        assert!(result.failed);
        assert_eq!(result.warning.as_deref(), Some("club butt position was not provided"));
    }

    #[test]
    fn test_positions() {
        let pose = fixtures::face_on_target_pose();
        let calibration = fixtures::face_on_calibration();
        assert_metric(&ball_position(&pose, &calibration), 41.436);
        assert_metric(&head_position(&pose, &calibration), -0.151);
        assert_metric(&chest_position(&pose, &calibration), 0.030);
        assert_metric(&mid_hip_position(&pose, &calibration), 1.423);
    }

    #[test]
    fn test_position_missing_nose() {
        let pose = fixtures::face_on_target_pose().with(LandmarkIndex::Nose, Landmark::default());
        let result = head_position(&pose, &fixtures::face_on_calibration());
        assert!(result.failed);
        assert_eq!(result.warning.as_deref(), Some("could not find landmark nose"));
    }

    #[test]
    fn test_compute_face_on_metrics() {
        let metrics = compute_face_on_metrics(
            &fixtures::face_on_target_pose(),
            &fixtures::face_on_calibration(),
        );
        assert!(!metrics.side_bend.failed);
        assert!(!metrics.shaft_lean.failed);
        assert!(!metrics.ball_position.failed);
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json["left_foot_flare"]["value"].as_f64().unwrap() > 35.0);
        assert_eq!(json["stance_width"]["failed"], false);
    }
}
