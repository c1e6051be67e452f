use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::feet_line::FeetLineMethod;

/// 軸キャリブレーションの直交性許容誤差（度）
pub const DEFAULT_AXES_TOLERANCE_DEG: f64 = 10.0;

/// 消失点キャリブレーションで足の線と垂直軸に必要な傾きの差
pub const DEFAULT_MIN_VANISHING_SLOPE_DIVERGENCE: f64 = 1.0;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalibrationConfig {
    /// 水平軸・消失点に使う足の線
    #[serde(default)]
    pub feet_line_method: FeetLineMethod,
    /// |垂直軸角度| + |水平軸角度| と 90° の差の上限
    #[serde(default = "default_axes_tolerance")]
    pub axes_tolerance_deg: f64,
    /// 消失点写真の足の線と垂直軸の傾きの最小差
    #[serde(default = "default_min_vanishing_slope_divergence")]
    pub min_vanishing_slope_divergence: f64,
}

fn default_axes_tolerance() -> f64 { DEFAULT_AXES_TOLERANCE_DEG }
fn default_min_vanishing_slope_divergence() -> f64 { DEFAULT_MIN_VANISHING_SLOPE_DIVERGENCE }

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            feet_line_method: FeetLineMethod::default(),
            axes_tolerance_deg: default_axes_tolerance(),
            min_vanishing_slope_divergence: default_min_vanishing_slope_divergence(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 設定ファイルが無ければデフォルト。あるのに読めない場合はエラー
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path).with_context(|| format!("Invalid config file {}", path.display()))
    }
}
