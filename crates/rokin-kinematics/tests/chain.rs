use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rokin_kinematics::{DHKinematics, IkParams, JointConfig, JointKind, KinematicsError};
use rokin_linalg::Vector3;

fn random_chain(rng: &mut StdRng, dof: usize) -> Vec<JointConfig> {
    (0..dof)
        .map(|_| {
            let joint = if rng.random_bool(0.75) {
                JointConfig::revolute(rng.random_range(0.2..1.0))
                    .with_limits(-2.5, 2.5)
                    .with_d(rng.random_range(-0.3..0.3))
            } else {
                JointConfig::prismatic(0.0, 0.5)
            };
            joint.with_alpha(rng.random_range(-1.5..1.5))
        })
        .collect()
}

fn random_state(rng: &mut StdRng, joints: &[JointConfig]) -> Vec<f32> {
    joints
        .iter()
        .map(|j| rng.random_range(j.min..=j.max))
        .collect()
}

#[test]
fn effector_transform_is_rigid() -> Result<(), KinematicsError> {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let dof = rng.random_range(1..7);
        let joints = random_chain(&mut rng, dof);
        let state = random_state(&mut rng, &joints);
        let mut arm = DHKinematics::new(1e-4, 50, joints)?;
        arm.forward_from(&state)?;

        let r = arm.transforms()[dof].get_rotation();
        let rtr = r.transpose() * r;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(rtr[(i, j)], expected, epsilon = 1e-5);
            }
        }
        assert!(r.det() > 0.0);
        assert_eq!(arm.transforms()[dof].row(3), [0.0, 0.0, 0.0, 1.0]);

        // the stored quaternion is the effector rotation
        let q = arm.orientation();
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-5);
        let v = Vector3::new(0.3, -0.2, 0.9);
        let by_q = q.rotate(v);
        let by_r = r.mul_vec(&v.to_array());
        for k in 0..3 {
            assert_relative_eq!(by_q[k], by_r[k], epsilon = 1e-4);
        }
    }
    Ok(())
}

#[test]
fn params_stay_within_limits() -> Result<(), KinematicsError> {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let dof = rng.random_range(2..6);
        let joints = random_chain(&mut rng, dof);
        let mut arm = DHKinematics::new(1e-4, 20, joints.clone())?;

        // out of range values are pulled back on evaluation
        let wild: Vec<f32> = (0..dof).map(|_| rng.random_range(-10.0..10.0)).collect();
        arm.forward_from(&wild)?;
        for (q, j) in arm.params().iter().zip(&joints) {
            assert!((j.min..=j.max).contains(q));
        }

        arm.set_target(Vector3::new(
            rng.random_range(-3.0..3.0),
            rng.random_range(-3.0..3.0),
            rng.random_range(-3.0..3.0),
        ));
        match arm.inverse() {
            Ok(_) | Err(KinematicsError::SolverFailure { .. }) => {}
            Err(e) => return Err(e),
        }
        for (q, j) in arm.params().iter().zip(&joints) {
            assert!(q.is_finite());
            assert!((j.min..=j.max).contains(q));
        }
    }
    Ok(())
}

#[test]
fn forward_inverse_forward_roundtrip() -> Result<(), KinematicsError> {
    let mut rng = StdRng::seed_from_u64(1234);
    let joints = vec![
        JointConfig::revolute(0.0).with_d(0.4).with_alpha(std::f32::consts::FRAC_PI_2),
        JointConfig::revolute(0.8),
        JointConfig::revolute(0.6),
    ];
    let ik = IkParams::new().with_tolerance(1e-4).with_max_iterations(200);
    let mut arm = DHKinematics::with_params(ik, joints)?;

    let mut converged = 0;
    for _ in 0..20 {
        let params0: Vec<f32> = (0..3).map(|_| rng.random_range(-1.2..1.2)).collect();
        let pose0 = arm.forward_from(&params0)?;

        // start near the answer so the local solver stays in one branch
        let seed: Vec<f32> = params0.iter().map(|q| q + rng.random_range(-0.2..0.2)).collect();
        let report = arm.inverse_from(Some(&seed), &pose0)?;
        if !report.converged {
            continue;
        }
        converged += 1;

        let params1 = arm.params().to_vec();
        let pose1 = arm.forward_from(&params1)?;
        let d = Vector3::new(pose1[0], pose1[1], pose1[2])
            .distance(&Vector3::new(pose0[0], pose0[1], pose0[2]));
        assert!(d < 1e-4, "reached {d} away from the original position");
    }
    assert!(converged >= 15, "only {converged} of 20 solves converged");
    Ok(())
}

#[test]
fn prismatic_chain_solves_along_axis() -> Result<(), KinematicsError> {
    let joints = vec![JointConfig::revolute(0.0), JointConfig::prismatic(0.0, 2.0)];
    assert_eq!(joints[1].kind, JointKind::PrismaticZ);
    let mut arm = DHKinematics::new(1e-4, 50, joints)?;
    arm.set_target(Vector3::new(0.0, 0.0, 1.5));
    let report = arm.inverse()?;
    assert!(report.converged);
    assert_relative_eq!(arm.params()[1], 1.5, epsilon = 1e-3);
    Ok(())
}
