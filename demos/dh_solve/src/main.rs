use argh::FromArgs;
use std::path::PathBuf;

use rokin::kinematics::{ChainConfig, DHKinematics, IkParams, JointConfig};
use rokin::linalg::Vector3;

#[derive(FromArgs)]
/// Move the end effector of a serial chain to a target position
struct Args {
    /// target x coordinate
    #[argh(option, short = 'x')]
    x: f32,

    /// target y coordinate
    #[argh(option, short = 'y')]
    y: f32,

    /// target z coordinate
    #[argh(option, short = 'z', default = "0.0")]
    z: f32,

    /// convergence tolerance, overrides the chain file
    #[argh(option)]
    tolerance: Option<f32>,

    /// maximum number of iterations, overrides the chain file
    #[argh(option)]
    iterations: Option<usize>,

    /// path to a JSON chain description, a planar two link arm if omitted
    #[argh(option)]
    chain: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.chain {
        Some(path) => serde_json::from_str::<ChainConfig>(&std::fs::read_to_string(path)?)?,
        None => ChainConfig {
            params: IkParams::default(),
            joints: vec![JointConfig::revolute(1.0); 2],
        },
    };
    if let Some(tolerance) = args.tolerance {
        config.params.tolerance = tolerance;
    }
    if let Some(iterations) = args.iterations {
        config.params.max_iterations = iterations;
    }
    log::info!("chain with {} joints, {:?}", config.joints.len(), config.params);

    let mut arm = DHKinematics::with_params(config.params, config.joints)?;
    arm.forward();
    println!("Start effector: {:?}", arm.effector());

    arm.set_target(Vector3::new(args.x, args.y, args.z));
    let report = arm.inverse()?;

    println!("IK result: {:?}", report);
    println!("Joint values: {:?}", arm.params());
    println!("Final effector: {:?}", arm.effector());

    if !report.converged {
        println!(
            "Target not reached, closest approach is {:.4} away",
            report.position_error
        );
    }

    Ok(())
}
