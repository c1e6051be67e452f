//! テスト用の写真データ（ピクセル座標）

use crate::calibration::{calibrate, CalibrationInfo, ReferencePoints};
use crate::config::CalibrationConfig;
use crate::geometry::Point;
use crate::pose::{Landmark, LandmarkIndex, PoseKeypoints};

const CONFIDENCE: f64 = 0.9;

fn pose(points: &[(LandmarkIndex, f64, f64)]) -> PoseKeypoints {
    points.iter().fold(PoseKeypoints::default(), |pose, &(idx, x, y)| {
        pose.with(idx, Landmark::new(x, y, CONFIDENCE))
    })
}

// --- DTL ---

/// 軸キャリブレーション用（正面を向いて直立）
pub fn dtl_axes_pose() -> PoseKeypoints {
    use LandmarkIndex::*;
    pose(&[
        (MidHip, 795.025, 1400.0),
        (Neck, 796.656, 1190.0),
        (LeftHeel, 905.0, 1798.0),
        (RightHeel, 735.0, 1803.0),
    ])
}

/// 消失点キャリブレーション用（かかとを目標方向へ向けて立つ）
pub fn dtl_vanishing_pose() -> PoseKeypoints {
    use LandmarkIndex::*;
    pose(&[
        (MidHip, 480.0, 1420.0),
        (Neck, 500.0, 1210.0),
        (RightHeel, 420.0, 1830.0),
        (LeftHeel, 465.723, 1685.7),
    ])
}

/// アドレス姿勢
pub fn dtl_target_pose() -> PoseKeypoints {
    use LandmarkIndex::*;
    pose(&[
        (Nose, 450.0, 1150.0),
        (Neck, 401.453, 1196.713),
        (MidHip, 299.682, 1400.564),
        (RightShoulder, 380.0, 1215.0),
        (LeftShoulder, 430.0, 1180.0),
        (RightElbow, 420.0, 1390.0),
        (RightWrist, 460.0, 1520.0),
        (RightHip, 299.587, 1414.083),
        (LeftHip, 340.0, 1390.0),
        (RightKnee, 306.190, 1597.461),
        (RightAnkle, 292.723, 1794.595),
        (LeftHeel, 326.782, 1706.318),
        (RightHeel, 272.357, 1815.146),
        (LeftBigToe, 380.5, 1712.0),
        (RightBigToe, 330.1, 1830.4),
    ])
}

pub fn dtl_reference_points() -> ReferencePoints {
    ReferencePoints {
        golf_ball: Some(Point::new(620.0, 1905.0)),
        club_head: Some(Point::new(600.0, 1900.0)),
        club_butt: None,
    }
}

pub fn dtl_calibration() -> CalibrationInfo {
    calibrate(
        &dtl_axes_pose(),
        Some(&dtl_vanishing_pose()),
        dtl_reference_points(),
        &CalibrationConfig::default(),
    )
    .expect("dtl fixture calibrates")
}

// --- Face-On ---

pub fn face_on_axes_pose() -> PoseKeypoints {
    use LandmarkIndex::*;
    pose(&[
        (MidHip, 540.0, 1000.0),
        (Neck, 541.5, 700.0),
        (LeftHeel, 640.0, 1700.0),
        (RightHeel, 440.0, 1702.0),
    ])
}

pub fn face_on_target_pose() -> PoseKeypoints {
    use LandmarkIndex::*;
    pose(&[
        (Nose, 530.0, 560.0),
        (Neck, 535.0, 700.0),
        (MidHip, 555.0, 1000.0),
        (RightShoulder, 450.0, 715.0),
        (LeftShoulder, 620.0, 700.0),
        (RightHip, 500.0, 1005.0),
        (LeftHip, 610.0, 995.0),
        (RightHeel, 450.0, 1700.0),
        (LeftHeel, 640.0, 1698.0),
        (RightBigToe, 425.0, 1760.0),
        (LeftBigToe, 680.0, 1755.0),
    ])
}

pub fn face_on_reference_points() -> ReferencePoints {
    ReferencePoints {
        golf_ball: Some(Point::new(600.0, 1760.0)),
        club_head: Some(Point::new(598.0, 1755.0)),
        club_butt: Some(Point::new(620.0, 1150.0)),
    }
}

pub fn face_on_calibration() -> CalibrationInfo {
    calibrate(
        &face_on_axes_pose(),
        None,
        face_on_reference_points(),
        &CalibrationConfig::default(),
    )
    .expect("face-on fixture calibrates")
}
