use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// OpenPose BODY_25 の 25 キーポイントインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    Neck = 1,
    RightShoulder = 2,
    RightElbow = 3,
    RightWrist = 4,
    LeftShoulder = 5,
    LeftElbow = 6,
    LeftWrist = 7,
    MidHip = 8,
    RightHip = 9,
    RightKnee = 10,
    RightAnkle = 11,
    LeftHip = 12,
    LeftKnee = 13,
    LeftAnkle = 14,
    RightEye = 15,
    LeftEye = 16,
    RightEar = 17,
    LeftEar = 18,
    LeftBigToe = 19,
    LeftSmallToe = 20,
    LeftHeel = 21,
    RightBigToe = 22,
    RightSmallToe = 23,
    RightHeel = 24,
}

impl LandmarkIndex {
    pub const COUNT: usize = 25;

    pub const ALL: [LandmarkIndex; Self::COUNT] = [
        Self::Nose,
        Self::Neck,
        Self::RightShoulder,
        Self::RightElbow,
        Self::RightWrist,
        Self::LeftShoulder,
        Self::LeftElbow,
        Self::LeftWrist,
        Self::MidHip,
        Self::RightHip,
        Self::RightKnee,
        Self::RightAnkle,
        Self::LeftHip,
        Self::LeftKnee,
        Self::LeftAnkle,
        Self::RightEye,
        Self::LeftEye,
        Self::RightEar,
        Self::LeftEar,
        Self::LeftBigToe,
        Self::LeftSmallToe,
        Self::LeftHeel,
        Self::RightBigToe,
        Self::RightSmallToe,
        Self::RightHeel,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 警告メッセージ用の名前
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::Neck => "neck",
            Self::RightShoulder => "right shoulder",
            Self::RightElbow => "right elbow",
            Self::RightWrist => "right wrist",
            Self::LeftShoulder => "left shoulder",
            Self::LeftElbow => "left elbow",
            Self::LeftWrist => "left wrist",
            Self::MidHip => "mid hip",
            Self::RightHip => "right hip",
            Self::RightKnee => "right knee",
            Self::RightAnkle => "right ankle",
            Self::LeftHip => "left hip",
            Self::LeftKnee => "left knee",
            Self::LeftAnkle => "left ankle",
            Self::RightEye => "right eye",
            Self::LeftEye => "left eye",
            Self::RightEar => "right ear",
            Self::LeftEar => "left ear",
            Self::LeftBigToe => "left big toe",
            Self::LeftSmallToe => "left small toe",
            Self::LeftHeel => "left heel",
            Self::RightBigToe => "right big toe",
            Self::RightSmallToe => "right small toe",
            Self::RightHeel => "right heel",
        }
    }
}

/// 単一ランドマーク（ピクセル座標）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// 信頼度スコア (0.0〜1.0)
    pub confidence: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// 検出されたか。未検出は (0, 0) で表される
    pub fn exists(&self) -> bool {
        self.x != 0.0 || self.y != 0.0
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// 1枚の写真から得た 25 ランドマーク
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseKeypoints {
    pub landmarks: [Landmark; LandmarkIndex::COUNT],
}

impl PoseKeypoints {
    pub fn new(landmarks: [Landmark; LandmarkIndex::COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.landmarks[index as usize]
    }

    /// 指定ランドマークを差し替えたコピー
    pub fn with(&self, index: LandmarkIndex, landmark: Landmark) -> Self {
        let mut landmarks = self.landmarks;
        landmarks[index as usize] = landmark;
        Self { landmarks }
    }

    /// 検出済みランドマークの平均信頼度
    pub fn average_confidence(&self) -> f64 {
        let detected: Vec<f64> = self
            .landmarks
            .iter()
            .filter(|l| l.exists())
            .map(|l| l.confidence)
            .collect();
        if detected.is_empty() {
            0.0
        } else {
            detected.iter().sum::<f64>() / detected.len() as f64
        }
    }
}

impl Default for PoseKeypoints {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); LandmarkIndex::COUNT],
        }
    }
}
