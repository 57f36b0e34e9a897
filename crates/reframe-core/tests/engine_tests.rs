mod common;

use common::*;
use nalgebra::Vector3 as NVector3;
use reframe_core::{
    FrameTransform, Geometry, transform_plain, transform_stamped, transform_stamped_with_child,
    transform_unstamped,
    msgs::{
        Accel, AccelStamped, Point, Pose, PoseStamped, Quaternion, Transform, TransformStamped,
        TwistStamped, Vector3, Wrench, WrenchStamped,
    },
};
use std::f64::consts::FRAC_PI_2;

fn operators() -> Vec<FrameTransform> {
    vec![
        FrameTransform::identity(),
        FrameTransform::flu_to_frd(),
        FrameTransform::enu_to_ned(),
        FrameTransform::from_rpy(0.3, -0.7, 1.9),
        FrameTransform::from_rpy(FRAC_PI_2, 0.0, 0.0)
            .with_translation(NVector3::new(1.0, -4.0, 2.5)),
    ]
}

#[test]
fn test_flu_to_frd_negates_lateral_and_vertical_axes() {
    let tf = FrameTransform::flu_to_frd();

    let twist = transform_plain(sample_twist(), &tf);
    assert_vector_eq(twist.linear, Vector3::new(0.5, -0.1, 0.2));
    assert_vector_eq(twist.angular, Vector3::new(0.0, -0.05, -0.3));

    let pose = transform_plain(sample_pose(), &tf);
    assert_point_eq(pose.position, Point::new(1.5, 2.0, -0.25));
}

#[test]
fn test_enu_to_ned_swaps_horizontal_axes() {
    let tf = FrameTransform::enu_to_ned();

    let pose = transform_plain(
        Pose {
            position: Point::new(1.0, 2.0, 3.0),
            orientation: Quaternion::identity(),
        },
        &tf,
    );
    assert_point_eq(pose.position, Point::new(2.0, 1.0, -3.0));

    let wrench = transform_plain(
        Wrench {
            force: Vector3::new(0.0, 0.0, -9.81),
            torque: Vector3::new(1.0, 0.0, 0.0),
        },
        &tf,
    );
    assert_vector_eq(wrench.force, Vector3::new(0.0, 0.0, 9.81));
    assert_vector_eq(wrench.torque, Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn test_identity_orientation_becomes_operator_rotation() {
    let pose = transform_plain(
        Pose {
            position: Point::new(1.0, 0.0, 0.0),
            orientation: Quaternion::identity(),
        },
        &FrameTransform::flu_to_frd(),
    );

    assert_point_eq(pose.position, Point::new(1.0, 0.0, 0.0));
    assert_quat_eq(pose.orientation, Quaternion::new(1.0, 0.0, 0.0, 0.0));
}

#[test]
fn test_translation_only_moves_positions() {
    let tf = FrameTransform::identity().with_translation(NVector3::new(10.0, 0.0, -1.0));

    let pose = transform_plain(sample_pose(), &tf);
    assert_point_eq(pose.position, Point::new(11.5, -2.0, -0.75));
    assert_quat_eq(pose.orientation, sample_pose().orientation);

    let transform = transform_plain(
        Transform {
            translation: Vector3::new(1.0, 1.0, 1.0),
            rotation: Quaternion::identity(),
        },
        &tf,
    );
    assert_vector_eq(transform.translation, Vector3::new(11.0, 1.0, 0.0));

    // Rates and forces are free vectors.
    let twist = transform_plain(sample_twist(), &tf);
    assert_eq!(twist, sample_twist());

    let accel = transform_plain(
        Accel {
            linear: Vector3::new(0.0, 0.0, 9.81),
            angular: Vector3::default(),
        },
        &tf,
    );
    assert_vector_eq(accel.linear, Vector3::new(0.0, 0.0, 9.81));
}

#[test]
fn test_fields_are_transformed_independently() {
    let tf = FrameTransform::from_rpy(0.3, -0.7, 1.9);

    let mut left = sample_pose();
    let mut right = sample_pose();
    right.orientation = Quaternion::new(0.0, 0.0, 1.0, 0.0);
    left = transform_plain(left, &tf);
    right = transform_plain(right, &tf);
    assert_point_eq(left.position, right.position);

    // A zero torque stays zero whatever the force is.
    let wrench = transform_plain(
        Wrench {
            force: Vector3::new(3.0, -2.0, 1.0),
            torque: Vector3::default(),
        },
        &tf,
    );
    assert_vector_eq(wrench.torque, Vector3::default());

    let mut odometry = sample_odometry();
    odometry.pose.pose.position = Point::new(100.0, 100.0, 100.0);
    let moved = transform_plain(odometry, &tf);
    let still = transform_plain(sample_odometry(), &tf);
    assert_eq!(moved.twist, still.twist);
}

#[test]
fn test_inverse_round_trips() {
    for tf in operators() {
        let inverse = tf.inverse();

        let pose = transform_plain(transform_plain(sample_pose(), &tf), &inverse);
        assert_point_eq(pose.position, sample_pose().position);
        assert_quat_eq(pose.orientation, sample_pose().orientation);

        let twist = transform_plain(transform_plain(sample_twist(), &tf), &inverse);
        assert_vector_eq(twist.linear, sample_twist().linear);
        assert_vector_eq(twist.angular, sample_twist().angular);

        let wrench = Wrench {
            force: Vector3::new(3.0, -2.0, 9.81),
            torque: Vector3::new(0.1, 0.4, -1.5),
        };
        let back = transform_plain(transform_plain(wrench, &tf), &inverse);
        assert_vector_eq(back.force, wrench.force);
        assert_vector_eq(back.torque, wrench.torque);

        let accel = Accel {
            linear: Vector3::new(-0.3, 0.0, 9.81),
            angular: Vector3::new(0.02, -0.7, 0.25),
        };
        let back = transform_plain(transform_plain(accel, &tf), &inverse);
        assert_vector_eq(back.linear, accel.linear);
        assert_vector_eq(back.angular, accel.angular);

        let transform = Transform {
            translation: Vector3::new(1.5, -2.0, 0.25),
            rotation: sample_pose().orientation,
        };
        let back = transform_plain(transform_plain(transform, &tf), &inverse);
        assert_vector_eq(back.translation, transform.translation);
        assert_quat_eq(back.rotation, transform.rotation);

        let odometry = transform_plain(transform_plain(sample_odometry(), &tf), &inverse);
        let expected = sample_odometry();
        assert_point_eq(odometry.pose.pose.position, expected.pose.pose.position);
        for (actual, expected) in odometry
            .pose
            .covariance
            .iter()
            .zip(expected.pose.covariance.iter())
        {
            assert_approx_eq(*actual, *expected, "pose covariance");
        }
        for (actual, expected) in odometry
            .twist
            .covariance
            .iter()
            .zip(expected.twist.covariance.iter())
        {
            assert_approx_eq(*actual, *expected, "twist covariance");
        }
    }
}

#[test]
fn test_covariance_follows_axis_flips() {
    let covariance = sample_covariance();
    let odometry = transform_plain(sample_odometry(), &FrameTransform::flu_to_frd());
    let rotated = odometry.pose.covariance;

    // Diagonal variances are unchanged by a pure axis flip.
    for i in 0..6 {
        assert_approx_eq(rotated[i * 6 + i], covariance[i * 6 + i], "variance");
    }

    // Cross terms pick up the product of the axis signs (+x, -y, -z).
    assert_approx_eq(rotated[1], -covariance[1], "x/y");
    assert_approx_eq(rotated[2], -covariance[2], "x/z");
    assert_approx_eq(rotated[6 + 2], covariance[6 + 2], "y/z");
    assert_approx_eq(rotated[3], covariance[3], "x/roll");
    assert_approx_eq(rotated[4], -covariance[4], "x/pitch");
}

#[test]
fn test_stamped_sets_frame_id_and_keeps_stamp() {
    let input = PoseStamped {
        header: header("map"),
        pose: sample_pose(),
    };
    let stamp = input.header.stamp;

    let output = transform_stamped(input, &FrameTransform::flu_to_frd(), "base_link");
    assert_eq!(output.header.frame_id, "base_link");
    assert_eq!(output.header.stamp, stamp);

    // The configured identifier is written verbatim, even when empty.
    let twist = transform_stamped(
        TwistStamped {
            header: header("odom"),
            twist: sample_twist(),
        },
        &FrameTransform::identity(),
        "",
    );
    assert_eq!(twist.header.frame_id, "");
    assert_eq!(twist.twist, sample_twist());

    let wrench = transform_stamped(
        WrenchStamped::default(),
        &FrameTransform::identity(),
        "ft_sensor",
    );
    assert_eq!(wrench.header.frame_id, "ft_sensor");

    let accel = transform_stamped(
        AccelStamped::default(),
        &FrameTransform::identity(),
        "imu_link",
    );
    assert_eq!(accel.header.frame_id, "imu_link");
}

#[test]
fn test_parent_and_child_ids_are_written_independently() {
    let odometry = transform_stamped_with_child(
        sample_odometry(),
        &FrameTransform::flu_to_frd(),
        "odom_ned",
        "base_link_frd",
    );
    assert_eq!(odometry.header.frame_id, "odom_ned");
    assert_eq!(odometry.child_frame_id, "base_link_frd");
    assert_eq!(odometry.header.stamp, header("odom").stamp);

    let transform = transform_stamped_with_child(
        TransformStamped {
            header: header("world"),
            child_frame_id: "camera".to_string(),
            transform: Transform {
                translation: Vector3::new(0.0, 1.0, 2.0),
                rotation: Quaternion::identity(),
            },
        },
        &FrameTransform::flu_to_frd(),
        "world_frd",
        "camera_frd",
    );
    assert_eq!(transform.header.frame_id, "world_frd");
    assert_eq!(transform.child_frame_id, "camera_frd");
    assert_vector_eq(transform.transform.translation, Vector3::new(0.0, -1.0, -2.0));
}

#[test]
fn test_non_finite_values_pass_through() {
    let pose = Pose {
        position: Point::new(f64::NAN, 0.0, 0.0),
        orientation: Quaternion::new(f64::NAN, 0.0, 0.0, 1.0),
    };
    assert!(!pose.is_finite());

    let output = transform_plain(pose, &FrameTransform::flu_to_frd());
    assert!(output.position.x.is_nan());
    assert!(output.orientation.w.is_nan());
    assert!(!output.is_finite());
}

#[test]
fn test_non_unit_orientation_is_normalized() {
    let pose = Pose {
        position: Point::default(),
        orientation: Quaternion::new(0.0, 0.0, 0.0, 2.0),
    };

    let output = transform_plain(pose, &FrameTransform::identity());
    assert_quat_eq(output.orientation, Quaternion::identity());
}

#[test]
fn test_unstamped_keeps_transformed_payload_only() {
    let tf = FrameTransform::flu_to_frd();

    let twist = transform_unstamped(
        TwistStamped {
            header: header("base_link"),
            twist: sample_twist(),
        },
        &tf,
    );
    assert_eq!(twist, transform_plain(sample_twist(), &tf));

    let pose = transform_unstamped(
        PoseStamped {
            header: header("map"),
            pose: sample_pose(),
        },
        &tf,
    );
    assert_point_eq(pose.position, Point::new(1.5, 2.0, -0.25));

    let wrench = transform_unstamped(
        WrenchStamped {
            header: header("ft_sensor"),
            wrench: Wrench {
                force: Vector3::new(0.0, 1.0, 0.0),
                torque: Vector3::default(),
            },
        },
        &tf,
    );
    assert_vector_eq(wrench.force, Vector3::new(0.0, -1.0, 0.0));

    let accel = transform_unstamped(AccelStamped::default(), &tf);
    assert_eq!(accel, Accel::default());
}
