pub mod dtl;
pub mod face_on;

pub use dtl::{compute_dtl_metrics, DtlMetrics};
pub use face_on::{compute_face_on_metrics, FaceOnMetrics};

use crate::geometry::{signed_angle_of_rotation, Line, Point};
use crate::pose::{verify, LandmarkIndex, PoseKeypoints};
use crate::warning::accumulate;

/// 複数ランドマークを順に確認して警告を蓄積
pub(crate) fn verify_landmarks(
    acc: Option<String>,
    pose: &PoseKeypoints,
    indices: &[LandmarkIndex],
    threshold: f64,
) -> Result<Option<String>, String> {
    indices
        .iter()
        .try_fold(acc, |acc, &idx| accumulate(acc, verify(pose, idx, threshold)))
}

/// base → top の線と垂直軸との角度（度, 0〜180）
///
/// 軸の向きは top 側（y の符号）に合わせる。同じ高さなら画像の上向きを使う
pub(crate) fn angle_from_vertical(base: Point, top: Point, vertical: &Line) -> f64 {
    let body = base.vector_to(top);
    let toward_top = if body.y > 0.0 { 1.0 } else { -1.0 };
    let axis = vertical.direction();
    let axis = if axis.y * toward_top < 0.0 { -axis } else { axis };
    signed_angle_of_rotation(axis, body).abs()
}

/// right → reference を基準に right → left がどれだけ回っているか（度）
/// 点が重なる場合は NaN
pub(crate) fn alignment(right: Point, left: Point, reference: Point) -> f64 {
    signed_angle_of_rotation(right.vector_to(reference), right.vector_to(left))
}

/// 2直線のなす角を 0〜90 に畳む
pub(crate) fn acute(angle: f64) -> f64 {
    if angle > 90.0 {
        180.0 - angle
    } else {
        angle
    }
}
