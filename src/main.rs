use anyhow::{bail, Context, Result};

use swing_metrics::config::Config;
use swing_metrics::pose::load_openpose;
use swing_metrics::{
    calibrate, compute_dtl_metrics, compute_face_on_metrics, Point, ReferencePoints,
};

const CONFIG_PATH: &str = "config.toml";

const USAGE: &str = "Usage: swing-metrics <dtl|face-on> <target.json> <axes.json> [vanishing.json] \
[--ball x,y] [--club-head x,y] [--club-butt x,y] [--shoulder-tilt deg]";

#[derive(Debug, Clone, Copy, PartialEq)]
enum View {
    Dtl,
    FaceOn,
}

struct Args {
    view: View,
    target: String,
    axes: String,
    vanishing: Option<String>,
    reference: ReferencePoints,
    shoulder_tilt: Option<f64>,
}

/// "x,y" 形式の座標
fn parse_point(s: &str) -> Result<Point> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("座標は x,y 形式で指定してください: {}", s))?;
    Ok(Point::new(x.trim().parse()?, y.trim().parse()?))
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut positional = Vec::new();
    let mut reference = ReferencePoints::default();
    let mut shoulder_tilt = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ball" | "--club-head" | "--club-butt" | "--shoulder-tilt" => {
                let value = iter
                    .next()
                    .with_context(|| format!("{} に値がありません", arg))?;
                match arg.as_str() {
                    "--ball" => reference.golf_ball = Some(parse_point(value)?),
                    "--club-head" => reference.club_head = Some(parse_point(value)?),
                    "--club-butt" => reference.club_butt = Some(parse_point(value)?),
                    _ => shoulder_tilt = Some(value.parse()?),
                }
            }
            flag if flag.starts_with("--") => bail!("不明なオプション: {}\n{}", flag, USAGE),
            _ => positional.push(arg.clone()),
        }
    }

    if positional.len() < 3 || positional.len() > 4 {
        bail!("{}", USAGE);
    }
    let view = match positional[0].as_str() {
        "dtl" => View::Dtl,
        "face-on" => View::FaceOn,
        other => bail!("不明なビュー: {}\n{}", other, USAGE),
    };

    Ok(Args {
        view,
        target: positional[1].clone(),
        axes: positional[2].clone(),
        vanishing: positional.get(3).cloned(),
        reference,
        shoulder_tilt,
    })
}

fn main() -> Result<()> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&raw)?;
    let config = Config::load_or_default(CONFIG_PATH)?;

    // stdout は JSON 専用。進捗は stderr へ
    let target = load_openpose(&args.target)?;
    let axes = load_openpose(&args.axes)?;
    let vanishing = match &args.vanishing {
        Some(path) => Some(load_openpose(path)?),
        None => None,
    };
    eprintln!(
        "キーポイント読み込み完了 (平均信頼度: 対象 {:.2}, 軸 {:.2})",
        target.average_confidence(),
        axes.average_confidence()
    );

    // ロガーは入れないため、ライブラリの log 出力の代わりにここで結果を表示する
    let calibration =
        match calibrate(&axes, vanishing.as_ref(), args.reference, &config.calibration) {
            Ok(calibration) => calibration,
            Err(e) => {
                eprintln!("キャリブレーション失敗: {}", e);
                return Err(e).context("キャリブレーション失敗");
            }
        };
    eprintln!("キャリブレーション: {:?}", calibration.calibration_type);
    if let Ok(vp) = calibration.vanishing_point() {
        eprintln!("  消失点: ({:.1}, {:.1})", vp.x, vp.y);
    }
    let calibration = match args.shoulder_tilt {
        Some(tilt) => calibration.with_shoulder_tilt(tilt),
        None => calibration,
    };
    if let Some(warning) = &calibration.warning {
        eprintln!("キャリブレーション警告: {}", warning);
    }

    let json = match args.view {
        View::Dtl => serde_json::to_string_pretty(&compute_dtl_metrics(&target, &calibration))?,
        View::FaceOn => {
            serde_json::to_string_pretty(&compute_face_on_metrics(&target, &calibration))?
        }
    };
    println!("{}", json);
    Ok(())
}
