use serde::{Deserialize, Serialize};

/// 信頼度警告
///
/// Minor: 計算は続行できるが結果の信頼度が下がる
/// Severe: 計算不能。その指標は 0 と警告メッセージを返す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "severity", content = "message", rename_all = "snake_case")]
pub enum Warning {
    Minor(String),
    Severe(String),
}

impl Warning {
    pub fn message(&self) -> &str {
        match self {
            Warning::Minor(msg) | Warning::Severe(msg) => msg,
        }
    }

    pub fn is_severe(&self) -> bool {
        matches!(self, Warning::Severe(_))
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// 警告の集約（左から順に適用）
///
/// - Severe → Err(メッセージ) で即時終了
/// - Minor → ", " 区切りで連結
/// - None → 変化なし
pub fn accumulate(acc: Option<String>, next: Option<Warning>) -> Result<Option<String>, String> {
    match next {
        None => Ok(acc),
        Some(Warning::Severe(msg)) => Err(msg),
        Some(Warning::Minor(msg)) => Ok(Some(match acc {
            Some(prev) => format!("{}, {}", prev, msg),
            None => msg,
        })),
    }
}

/// 個々の指標の計算結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub value: f64,
    pub warning: Option<String>,
    /// Severe で計算を中断した場合 true（value は 0）
    #[serde(default)]
    pub failed: bool,
}

impl MetricResult {
    pub fn new(value: f64, warning: Option<String>) -> Self {
        Self {
            value,
            warning,
            failed: false,
        }
    }

    pub fn severe(message: impl Into<String>) -> Self {
        Self {
            value: 0.0,
            warning: Some(message.into()),
            failed: true,
        }
    }

    /// 指標関数の内部結果を変換。非有限値は幾何的に不定として Severe 扱い
    pub(crate) fn from_outcome(name: &str, outcome: Result<MetricResult, String>) -> Self {
        match outcome {
            Ok(result) if result.value.is_finite() => result,
            Ok(_) => {
                log::debug!("{}: degenerate geometry", name);
                Self::severe(format!("could not compute {}: degenerate geometry", name))
            }
            Err(msg) => {
                log::debug!("{}: {}", name, msg);
                Self::severe(msg)
            }
        }
    }
}
