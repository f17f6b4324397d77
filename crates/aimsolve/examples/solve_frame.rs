use argh::FromArgs;

use aimsolve::{AimConfig, RotatedRect, TargetType};

/// Computes gimbal angles for one detected rectangle
#[derive(Debug, FromArgs)]
struct Args {
    /// path to a JSON solver configuration
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// target type: large_armor, small_armor or rune
    #[argh(option, short = 't', default = "TargetType::SmallArmor", from_str_fn(to_target_type))]
    target: TargetType,

    /// rectangle center x in pixels
    #[argh(option, default = "320.0")]
    cx: f64,

    /// rectangle center y in pixels
    #[argh(option, default = "240.0")]
    cy: f64,

    /// rectangle width in pixels
    #[argh(option, default = "100.0")]
    width: f64,

    /// rectangle height in pixels
    #[argh(option, default = "40.0")]
    height: f64,

    /// rectangle rotation in degrees
    #[argh(option, short = 'a', default = "0.0")]
    angle: f64,

    /// bullet speed
    #[argh(option, short = 's', default = "15.0")]
    speed: f64,
}

fn to_target_type(value: &str) -> Result<TargetType, String> {
    match value {
        "large_armor" => Ok(TargetType::LargeArmor),
        "small_armor" => Ok(TargetType::SmallArmor),
        "rune" => Ok(TargetType::Rune),
        _ => Err(format!("Unsupported target type: {value}")),
    }
}

const DEFAULT_CONFIG: &str = r#"{
    "camera_matrix": [[1000.0, 0.0, 320.0], [0.0, 1000.0, 240.0], [0.0, 0.0, 1.0]],
    "distance_range": { "min": 300.0, "max": 10000.0 }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => AimConfig::from_path(path)?,
        None => AimConfig::from_json_str(DEFAULT_CONFIG)?,
    };
    let mut factory = config.build_factory()?;

    let rect = RotatedRect::new([args.cx, args.cy], args.width, args.height, args.angle);
    let solution = factory.solve_frame(&rect, args.target, args.speed, 0.0, [0.0, 0.0])?;

    println!("corners: {:?}", solution.corners);
    println!("t (camera): {:?}", solution.pose.translation);
    println!("rvec: {:?}", solution.pose.rvec);
    println!("rmse: {:?}", solution.pose.reproj_rmse);
    println!("position (gimbal): {:?}", solution.position_gimbal);
    println!(
        "angle_x: {:.3} deg, angle_y: {:.3} deg",
        solution.angles.angle_x, solution.angles.angle_y
    );

    Ok(())
}
