use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

/// 傾き比較の許容誤差
const SLOPE_EPSILON: f64 = 1e-12;

/// 基準点が交点と重なっているとみなす距離（ピクセル）
const REFERENCE_EPSILON: f64 = 1e-6;

/// 画像上の2D座標（信頼度なし）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `self` から `to` へのベクトル
    pub fn vector_to(self, to: Point) -> Vector2<f64> {
        Vector2::new(to.x - self.x, to.y - self.y)
    }

    pub fn offset(self, v: Vector2<f64>) -> Point {
        Point::new(self.x + v.x, self.y + v.y)
    }
}

/// 直線 y = slope * x + y_intercept
///
/// 垂直線は slope = +∞, y_intercept = NaN で表し、x座標は point_on_line.x で決まる。
/// point_on_line は角度計算の基準点にも使う。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LineRepr", into = "LineRepr")]
pub struct Line {
    pub slope: f64,
    pub y_intercept: f64,
    pub point_on_line: Point,
}

/// JSONは非有限値を表せないため、垂直線の傾きは None で保存する
#[derive(Serialize, Deserialize)]
struct LineRepr {
    slope: Option<f64>,
    point_on_line: Point,
}

impl From<LineRepr> for Line {
    fn from(repr: LineRepr) -> Self {
        Line::with_slope(repr.point_on_line, repr.slope.unwrap_or(f64::INFINITY))
    }
}

impl From<Line> for LineRepr {
    fn from(line: Line) -> Self {
        LineRepr {
            slope: if line.is_vertical() { None } else { Some(line.slope) },
            point_on_line: line.point_on_line,
        }
    }
}

/// 2直線の交点と交差角
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Point,
    /// 各直線上の基準点を通して余弦定理で測った角度（度, 0〜180）
    pub angle_at_intersect: f64,
}

impl Line {
    /// 2点を通る直線。x座標が等しければ垂直線
    pub fn through(p1: Point, p2: Point) -> Self {
        Self::with_slope(p1, slope(p1, p2))
    }

    /// 点と傾きから直線を構築。非有限の傾きは垂直線として扱う
    pub fn with_slope(point: Point, slope: f64) -> Self {
        if slope.is_finite() {
            Self {
                slope,
                y_intercept: point.y - slope * point.x,
                point_on_line: point,
            }
        } else {
            Self {
                slope: f64::INFINITY,
                y_intercept: f64::NAN,
                point_on_line: point,
            }
        }
    }

    pub fn is_vertical(&self) -> bool {
        !self.slope.is_finite()
    }

    /// 同じ傾きで `point` を通る直線
    pub fn translated_through(&self, point: Point) -> Self {
        Self::with_slope(point, self.slope)
    }

    /// x における y。垂直線では NaN
    pub fn y_at(&self, x: f64) -> f64 {
        if self.is_vertical() {
            f64::NAN
        } else {
            self.slope * x + self.y_intercept
        }
    }

    /// y における x。水平線では NaN
    pub fn x_at(&self, y: f64) -> f64 {
        if self.is_vertical() {
            self.point_on_line.x
        } else if self.slope.abs() < SLOPE_EPSILON {
            f64::NAN
        } else {
            (y - self.y_intercept) / self.slope
        }
    }

    /// 単位方向ベクトル（x正方向、垂直線はy正方向）
    pub fn direction(&self) -> Vector2<f64> {
        if self.is_vertical() {
            Vector2::new(0.0, 1.0)
        } else {
            Vector2::new(1.0, self.slope).normalize()
        }
    }

    /// `point` を通る垂線
    pub fn perpendicular_through(&self, point: Point) -> Self {
        let perpendicular = if self.is_vertical() {
            0.0
        } else if self.slope.abs() < SLOPE_EPSILON {
            f64::INFINITY
        } else {
            -1.0 / self.slope
        };
        Self::with_slope(point, perpendicular)
    }

    /// 交点。平行（垂直線同士を含む）なら None
    pub fn intersection(&self, other: &Line) -> Option<Intersection> {
        let point = match (self.is_vertical(), other.is_vertical()) {
            (true, true) => return None,
            (true, false) => {
                let x = self.point_on_line.x;
                Point::new(x, other.y_at(x))
            }
            (false, true) => {
                let x = other.point_on_line.x;
                Point::new(x, self.y_at(x))
            }
            (false, false) => {
                if (self.slope - other.slope).abs() < SLOPE_EPSILON {
                    return None;
                }
                let x = (other.y_intercept - self.y_intercept) / (self.slope - other.slope);
                Point::new(x, self.y_at(x))
            }
        };

        let angle_at_intersect = angle_at_intersection(
            self.reference_point(point),
            point,
            other.reference_point(point),
        );
        Some(Intersection {
            point,
            angle_at_intersect,
        })
    }

    /// 直線上で `point` に最も近い点
    pub fn projection(&self, point: Point) -> Point {
        // 垂線とは必ず交わる
        self.intersection(&self.perpendicular_through(point))
            .map(|i| i.point)
            .unwrap_or(point)
    }

    /// 角度計算の基準点。point_on_line が交点と重なる場合は直線に沿ってずらす
    fn reference_point(&self, vertex: Point) -> Point {
        if distance(self.point_on_line, vertex) > REFERENCE_EPSILON {
            self.point_on_line
        } else {
            vertex.offset(self.direction())
        }
    }
}

/// 2点間の傾き。x座標が等しい場合は +∞（垂直）
pub fn slope(p1: Point, p2: Point) -> f64 {
    let dx = p2.x - p1.x;
    if dx == 0.0 {
        f64::INFINITY
    } else {
        (p2.y - p1.y) / dx
    }
}

/// 2点を結ぶ線分に垂直な傾き（-dx/dy）
pub fn slope_reciprocal(p1: Point, p2: Point) -> f64 {
    let dy = p2.y - p1.y;
    if dy == 0.0 {
        f64::INFINITY
    } else {
        -(p2.x - p1.x) / dy
    }
}

pub fn distance(p1: Point, p2: Point) -> f64 {
    p1.vector_to(p2).norm()
}

pub fn midpoint(p1: Point, p2: Point) -> Point {
    Point::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0)
}

/// 頂点 `vertex` における p1-vertex-p2 の角度（度, 0〜180）
/// 余弦定理: cos = (a² + b² - c²) / 2ab
/// 辺の長さが0の場合は NaN
pub fn angle_at_intersection(p1: Point, vertex: Point, p2: Point) -> f64 {
    let a = distance(p1, vertex);
    let b = distance(p2, vertex);
    let c = distance(p1, p2);
    if a == 0.0 || b == 0.0 {
        return f64::NAN;
    }
    let cos = ((a * a + b * b - c * c) / (2.0 * a * b)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// `from` から `to` への符号付き回転角（度, -180〜180）
/// 画像座標（y下向き）では正が時計回りに見える
/// どちらかが長さ0の場合は NaN
pub fn signed_angle_of_rotation(from: Vector2<f64>, to: Vector2<f64>) -> f64 {
    if from.norm() == 0.0 || to.norm() == 0.0 {
        return f64::NAN;
    }
    let cross = from.x * to.y - from.y * to.x;
    let dot = from.dot(&to);
    cross.atan2(dot).to_degrees()
}

/// ベクトルを `degrees` だけ回転（signed_angle_of_rotation と同じ向き）
pub fn rotate_vector(v: Vector2<f64>, degrees: f64) -> Vector2<f64> {
    Rotation2::new(degrees.to_radians()) * v
}

/// 傾きを [0, 180) の角度に変換
/// +slope と 180° 補角が同じ値になるため、垂直に近い直線向け
pub fn convert_slope_to_degrees(slope: f64) -> f64 {
    let degrees = slope.atan().to_degrees();
    if degrees < 0.0 {
        degrees + 180.0
    } else {
        degrees
    }
}

/// 傾きを (-90, 90] の角度に変換（水平に近い直線向け）
pub fn slope_to_signed_degrees(slope: f64) -> f64 {
    slope.atan().to_degrees()
}
