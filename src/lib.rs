//! ゴルフのアドレス姿勢を 2D キーポイントから数値化する
//!
//! キャリブレーションと指標計算の経過は `log` クレートで出力する。
//! 表示するには組み込み側のアプリケーションでロガーを初期化すること。
//! 付属の `swing-metrics` バイナリはロガーを入れず、進捗を stderr に直接書く。

pub mod calibration;
pub mod config;
pub mod feet_line;
pub mod geometry;
pub mod metrics;
pub mod pose;
pub mod warning;

#[cfg(test)]
mod fixtures;

pub use calibration::{
    calibrate, calibrate_axes, CalibrationError, CalibrationInfo, CalibrationType, ReferencePoints,
};
pub use feet_line::{resolve_feet_line, FeetLine, FeetLineMethod};
pub use geometry::{Line, Point};
pub use metrics::{compute_dtl_metrics, compute_face_on_metrics, DtlMetrics, FaceOnMetrics};
pub use pose::{Landmark, LandmarkIndex, PoseKeypoints};
pub use warning::{MetricResult, Warning};
