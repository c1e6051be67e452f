use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CalibrationConfig;
use crate::feet_line::{resolve_into, FeetLineMethod};
use crate::geometry::{slope_to_signed_degrees, Line, Point};
use crate::pose::{verify, LandmarkIndex, PoseKeypoints, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::warning::{accumulate, Warning};

// --- データ構造 ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalibrationType {
    #[default]
    NoCalibration,
    /// 垂直軸・水平軸のみ
    AxesOnly,
    /// 軸 + 消失点
    FullCalibration,
}

/// ユーザーが画像上で指定する任意の基準点
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoints {
    pub golf_ball: Option<Point>,
    pub club_head: Option<Point>,
    pub club_butt: Option<Point>,
}

/// 指標計算の基準座標系
///
/// 一度構築したら読み取り専用。各キャリブレーション段階は新しい値を返す
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationInfo {
    pub calibration_type: CalibrationType,
    pub feet_line_method: FeetLineMethod,
    pub horizontal_axis_line: Option<Line>,
    pub vertical_axis_line: Option<Line>,
    /// FullCalibration のときのみ Some
    pub vanishing_point: Option<Point>,
    pub golf_ball_point: Option<Point>,
    pub club_head_point: Option<Point>,
    pub club_butt_point: Option<Point>,
    /// Face-On で計算済みの肩の傾き（DTLの肩アライメントで使う）
    pub shoulder_tilt: Option<f64>,
    pub golf_ball_warning: Option<Warning>,
    pub club_head_warning: Option<Warning>,
    pub club_butt_warning: Option<Warning>,
    pub vanishing_point_warning: Option<Warning>,
    /// キャリブレーション画像で見つかった Minor 警告
    pub warning: Option<String>,
}

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("{0}")]
    Landmark(String),

    #[error(
        "axes calibration image off, please make sure the camera is level and the feet \
         are square to the spine; difference of {difference:.2} degrees is too large"
    )]
    AxesNotOrthogonal { difference: f64 },

    #[error(
        "vanishing point calibration image off, please angle the feet line towards the \
         target; slope difference of {divergence:.3} is too small"
    )]
    FeetLineParallel { divergence: f64 },

    #[error("vanishing point calibration requires axes calibration first")]
    AxesRequired,
}

impl From<CalibrationError> for Warning {
    fn from(e: CalibrationError) -> Self {
        Warning::Severe(e.to_string())
    }
}

const MISSING_BALL: &str = "golf ball position was not provided";
const MISSING_CLUB_HEAD: &str = "club head position was not provided";
const MISSING_CLUB_BUTT: &str = "club butt position was not provided";
const MISSING_VANISHING_POINT: &str =
    "no vanishing point calibration image provided; alignment metrics need full calibration";
const AXES_REQUIRED: &str =
    "no axes calibration available; this metric needs a calibrated vertical axis";

// --- 構築 ---

impl CalibrationInfo {
    /// キャリブレーション無し。軸に依存する指標は計算できない
    pub fn uncalibrated(feet_line_method: FeetLineMethod) -> Self {
        Self {
            calibration_type: CalibrationType::NoCalibration,
            feet_line_method,
            horizontal_axis_line: None,
            vertical_axis_line: None,
            vanishing_point: None,
            golf_ball_point: None,
            club_head_point: None,
            club_butt_point: None,
            shoulder_tilt: None,
            golf_ball_warning: Some(Warning::Minor(MISSING_BALL.to_string())),
            club_head_warning: Some(Warning::Minor(MISSING_CLUB_HEAD.to_string())),
            club_butt_warning: Some(Warning::Minor(MISSING_CLUB_BUTT.to_string())),
            vanishing_point_warning: Some(Warning::Minor(MISSING_VANISHING_POINT.to_string())),
            warning: None,
        }
    }

    /// 既知の軸から AxesOnly を構築（保存済みデータの復元やテスト用）
    pub fn from_axes(feet_line_method: FeetLineMethod, vertical: Line, horizontal: Line) -> Self {
        Self {
            calibration_type: CalibrationType::AxesOnly,
            vertical_axis_line: Some(vertical),
            horizontal_axis_line: Some(horizontal),
            ..Self::uncalibrated(feet_line_method)
        }
    }

    /// 2枚目の写真から消失点を求めて FullCalibration にする
    ///
    /// 2枚目の足の線と垂直軸の交点が消失点。両者がほぼ平行だと交点が不安定なため拒否する
    pub fn with_vanishing_point(
        self,
        pose: &PoseKeypoints,
        config: &CalibrationConfig,
    ) -> Result<Self, CalibrationError> {
        let vertical = match (self.calibration_type, self.vertical_axis_line) {
            (CalibrationType::NoCalibration, _) | (_, None) => {
                return Err(CalibrationError::AxesRequired)
            }
            (_, Some(line)) => line,
        };

        let (feet_line, warning) = resolve_into(pose, self.feet_line_method, self.warning.clone())
            .map_err(CalibrationError::Landmark)?;

        let divergence = (feet_line.line.slope - vertical.slope).abs();
        // 垂直線同士は NaN になるため否定形で比較
        if !(divergence >= config.min_vanishing_slope_divergence) {
            log::warn!("vanishing point calibration rejected: slope divergence {}", divergence);
            return Err(CalibrationError::FeetLineParallel { divergence });
        }

        let intersection = feet_line
            .line
            .intersection(&vertical)
            .ok_or(CalibrationError::FeetLineParallel { divergence })?;
        log::info!(
            "vanishing point calibrated at ({:.3}, {:.3})",
            intersection.point.x,
            intersection.point.y
        );

        Ok(Self {
            calibration_type: CalibrationType::FullCalibration,
            vanishing_point: Some(intersection.point),
            vanishing_point_warning: None,
            warning,
            ..self
        })
    }

    /// ボール・クラブの基準点を設定。無い入力は警告スロットに記録する
    pub fn with_reference_points(self, points: ReferencePoints) -> Self {
        fn slot(point: Option<Point>, message: &str) -> Option<Warning> {
            match point {
                Some(_) => None,
                None => Some(Warning::Minor(message.to_string())),
            }
        }
        Self {
            golf_ball_point: points.golf_ball,
            club_head_point: points.club_head,
            club_butt_point: points.club_butt,
            golf_ball_warning: slot(points.golf_ball, MISSING_BALL),
            club_head_warning: slot(points.club_head, MISSING_CLUB_HEAD),
            club_butt_warning: slot(points.club_butt, MISSING_CLUB_BUTT),
            ..self
        }
    }

    pub fn with_shoulder_tilt(self, shoulder_tilt: f64) -> Self {
        Self {
            shoulder_tilt: Some(shoulder_tilt),
            ..self
        }
    }

    // --- 指標計算向けアクセサ（Err は Severe メッセージ） ---

    pub fn vertical_axis(&self) -> Result<Line, String> {
        match (self.calibration_type, self.vertical_axis_line) {
            (CalibrationType::NoCalibration, _) | (_, None) => Err(AXES_REQUIRED.to_string()),
            (_, Some(line)) => Ok(line),
        }
    }

    pub fn horizontal_axis(&self) -> Result<Line, String> {
        match (self.calibration_type, self.horizontal_axis_line) {
            (CalibrationType::NoCalibration, _) | (_, None) => Err(AXES_REQUIRED.to_string()),
            (_, Some(line)) => Ok(line),
        }
    }

    pub fn vanishing_point(&self) -> Result<Point, String> {
        match (self.calibration_type, self.vanishing_point) {
            (CalibrationType::FullCalibration, Some(point)) => Ok(point),
            _ => Err(slot_message(&self.vanishing_point_warning, MISSING_VANISHING_POINT)),
        }
    }

    pub fn golf_ball(&self) -> Result<Point, String> {
        self.golf_ball_point
            .ok_or_else(|| slot_message(&self.golf_ball_warning, MISSING_BALL))
    }

    pub fn club_head(&self) -> Result<Point, String> {
        self.club_head_point
            .ok_or_else(|| slot_message(&self.club_head_warning, MISSING_CLUB_HEAD))
    }

    pub fn club_butt(&self) -> Result<Point, String> {
        self.club_butt_point
            .ok_or_else(|| slot_message(&self.club_butt_warning, MISSING_CLUB_BUTT))
    }
}

fn slot_message(slot: &Option<Warning>, fallback: &str) -> String {
    slot.as_ref()
        .map(|w| w.message().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

// --- 軸キャリブレーション ---

/// |垂直軸角度| + |水平軸角度| と 90° の差（度）
///
/// 角度は (-90, 90] の符号付き。カメラのロールで両軸が同じだけ回っても差は 0 のまま
pub fn axes_difference(vertical: &Line, horizontal: &Line) -> f64 {
    let vertical_deg = slope_to_signed_degrees(vertical.slope);
    let horizontal_deg = slope_to_signed_degrees(horizontal.slope);
    (vertical_deg.abs() + horizontal_deg.abs() - 90.0).abs()
}

/// 直交性チェック。OKなら差を返す
pub fn check_axes_orthogonality(
    vertical: &Line,
    horizontal: &Line,
    tolerance_deg: f64,
) -> Result<f64, CalibrationError> {
    let difference = axes_difference(vertical, horizontal);
    if difference > tolerance_deg {
        return Err(CalibrationError::AxesNotOrthogonal { difference });
    }
    Ok(difference)
}

/// 1枚目の写真から軸を求める
///
/// 水平軸 = 足の線、垂直軸 = 腰中点 → 首
pub fn calibrate_axes(
    pose: &PoseKeypoints,
    config: &CalibrationConfig,
) -> Result<CalibrationInfo, CalibrationError> {
    let method = config.feet_line_method;
    let (feet_line, warning) =
        resolve_into(pose, method, None).map_err(CalibrationError::Landmark)?;
    let warning = accumulate(
        warning,
        verify(pose, LandmarkIndex::MidHip, DEFAULT_CONFIDENCE_THRESHOLD),
    )
    .map_err(CalibrationError::Landmark)?;
    let warning = accumulate(
        warning,
        verify(pose, LandmarkIndex::Neck, DEFAULT_CONFIDENCE_THRESHOLD),
    )
    .map_err(CalibrationError::Landmark)?;

    let vertical = Line::through(
        pose.get(LandmarkIndex::MidHip).point(),
        pose.get(LandmarkIndex::Neck).point(),
    );
    let horizontal = feet_line.line;

    log::debug!(
        "axes calibration: vertical {:.3} deg, horizontal {:.3} deg",
        slope_to_signed_degrees(vertical.slope),
        slope_to_signed_degrees(horizontal.slope)
    );
    let difference = match check_axes_orthogonality(
        &vertical,
        &horizontal,
        config.axes_tolerance_deg,
    ) {
        Ok(d) => d,
        Err(e) => {
            log::warn!("axes calibration rejected: {}", e);
            return Err(e);
        }
    };
    log::info!("axes calibrated (orthogonality off by {:.2} deg)", difference);

    Ok(CalibrationInfo {
        warning,
        ..CalibrationInfo::from_axes(method, vertical, horizontal)
    })
}

/// 軸写真 + 任意の消失点写真 + 基準点からまとめてキャリブレーション
pub fn calibrate(
    axes_pose: &PoseKeypoints,
    vanishing_pose: Option<&PoseKeypoints>,
    reference: ReferencePoints,
    config: &CalibrationConfig,
) -> Result<CalibrationInfo, CalibrationError> {
    let info = calibrate_axes(axes_pose, config)?;
    let info = match vanishing_pose {
        Some(pose) => info.with_vanishing_point(pose, config)?,
        None => info,
    };
    Ok(info.with_reference_points(reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::pose::Landmark;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn line_at_degrees(degrees: f64) -> Line {
        Line::with_slope(Point::new(0.0, 0.0), degrees.to_radians().tan())
    }

    #[test]
    fn test_axes_summing_to_90_pass() {
        let vertical = line_at_degrees(80.0);
        let horizontal = line_at_degrees(10.0);
        let d = check_axes_orthogonality(&vertical, &horizontal, 10.0).unwrap();
        assert!(d < 1e-9);

        // 負の傾き（カメラが逆向きにロール）
        let d = check_axes_orthogonality(&line_at_degrees(-80.0), &line_at_degrees(-10.0), 10.0)
            .unwrap();
        assert!(d < 1e-9);
    }

    #[test]
    fn test_axes_15_degrees_off_is_severe() {
        let vertical = line_at_degrees(80.0);
        let horizontal = line_at_degrees(25.0);
        let err = check_axes_orthogonality(&vertical, &horizontal, 10.0).unwrap_err();
        match &err {
            CalibrationError::AxesNotOrthogonal { difference } => {
                assert!(approx_eq(*difference, 15.0, 1e-9))
            }
            other => panic!("unexpected {:?}", other),
        }
        let warning: Warning = err.into();
        assert!(warning.is_severe());
        assert!(warning.message().contains("difference of 15.00 degrees is too large"));
    }

    #[test]
    fn test_calibrate_axes_fixture() {
        let info =
            calibrate_axes(&fixtures::dtl_axes_pose(), &CalibrationConfig::default()).unwrap();
        assert_eq!(info.calibration_type, CalibrationType::AxesOnly);
        assert!(info.vanishing_point.is_none());
        assert!(info.warning.is_none());
        let vertical = info.vertical_axis().unwrap();
        assert!(approx_eq(vertical.slope, -210.0 / 1.631, 1e-6));
        assert!(info.vanishing_point().is_err());
    }

    #[test]
    fn test_calibrate_axes_rejects_tilted_photo() {
        // 背骨に対して足の線が大きく傾いている
        let pose = fixtures::dtl_axes_pose()
            .with(LandmarkIndex::LeftHeel, Landmark::new(905.0, 1700.0, 0.9));
        let err = calibrate_axes(&pose, &CalibrationConfig::default()).unwrap_err();
        assert!(matches!(err, CalibrationError::AxesNotOrthogonal { .. }));
    }

    #[test]
    fn test_calibrate_axes_missing_neck_is_severe() {
        let pose = fixtures::dtl_axes_pose().with(LandmarkIndex::Neck, Landmark::default());
        let err = calibrate_axes(&pose, &CalibrationConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "could not find landmark neck");
    }

    #[test]
    fn test_calibrate_axes_low_confidence_is_kept() {
        let pose = fixtures::dtl_axes_pose()
            .with(LandmarkIndex::MidHip, Landmark::new(795.025, 1400.0, 0.4));
        let info = calibrate_axes(&pose, &CalibrationConfig::default()).unwrap();
        assert_eq!(
            info.warning.as_deref(),
            Some("uncertain where mid hip is, confidence is 0.40; please make sure mid hip is visible")
        );
    }

    #[test]
    fn test_full_calibration_vanishing_point() {
        let info = fixtures::dtl_calibration();
        assert_eq!(info.calibration_type, CalibrationType::FullCalibration);
        let vp = info.vanishing_point().unwrap();
        assert!(approx_eq(vp.x, 801.0247, 1e-3), "vp {:?}", vp);
        assert!(approx_eq(vp.y, 627.5008, 1e-3), "vp {:?}", vp);
        assert!(info.vanishing_point_warning.is_none());
    }

    #[test]
    fn test_vanishing_point_rejects_parallel_feet_line() {
        let axes =
            calibrate_axes(&fixtures::dtl_axes_pose(), &CalibrationConfig::default()).unwrap();
        // 垂直軸とほぼ同じ傾きの足の線
        let pose = fixtures::dtl_vanishing_pose()
            .with(LandmarkIndex::RightHeel, Landmark::new(420.0, 1830.0, 0.9))
            .with(LandmarkIndex::LeftHeel, Landmark::new(421.631, 1620.0, 0.9));
        let err = axes
            .with_vanishing_point(&pose, &CalibrationConfig::default())
            .unwrap_err();
        assert!(matches!(err, CalibrationError::FeetLineParallel { .. }));
    }

    #[test]
    fn test_vanishing_point_requires_axes() {
        let err = CalibrationInfo::uncalibrated(FeetLineMethod::UseHeelLine)
            .with_vanishing_point(&fixtures::dtl_vanishing_pose(), &CalibrationConfig::default())
            .unwrap_err();
        assert!(matches!(err, CalibrationError::AxesRequired));
    }

    #[test]
    fn test_reference_point_slots() {
        let info = CalibrationInfo::uncalibrated(FeetLineMethod::UseHeelLine).with_reference_points(
            ReferencePoints {
                golf_ball: Some(Point::new(1.0, 2.0)),
                ..Default::default()
            },
        );
        assert!(info.golf_ball_warning.is_none());
        assert_eq!(info.golf_ball().unwrap(), Point::new(1.0, 2.0));
        assert_eq!(info.club_head().unwrap_err(), "club head position was not provided");
        assert!(info.club_butt_warning.is_some());
    }

    #[test]
    fn test_uncalibrated_gates_axes() {
        let info = CalibrationInfo::uncalibrated(FeetLineMethod::UseToeLine);
        assert!(info.vertical_axis().is_err());
        assert!(info.horizontal_axis().is_err());
        assert!(info.vanishing_point().is_err());
    }

    #[test]
    fn test_calibration_serde_round_trip() {
        let info = fixtures::dtl_calibration().with_shoulder_tilt(4.5);
        let json = serde_json::to_string(&info).unwrap();
        let back: CalibrationInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.calibration_type, CalibrationType::FullCalibration);
        let (vp, original) = (back.vanishing_point().unwrap(), info.vanishing_point().unwrap());
        assert!(approx_eq(vp.x, original.x, 1e-9));
        assert!(approx_eq(vp.y, original.y, 1e-9));
        assert_eq!(back.shoulder_tilt, Some(4.5));
        assert_eq!(back.golf_ball_point, info.golf_ball_point);
        let v = back.vertical_axis().unwrap();
        assert!(approx_eq(v.slope, info.vertical_axis().unwrap().slope, 1e-9));
    }
}
