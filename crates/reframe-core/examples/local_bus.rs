use reframe_core::{
    FrameTransform, LocalBus, TransformSpec, bring_up,
    msgs::{Header, Odometry, Point, Pose, Quaternion, Twist, Vector3},
};
use tracing_subscriber::EnvFilter;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let bus = LocalBus::new();

    // Relay mobile-robot (FLU) topics into maritime (FRD) topics.
    let specs = [
        TransformSpec::new("geometry_msgs/msg/Twist", "/mobile/cmd_vel", "/maritime/cmd_vel"),
        TransformSpec::new("geometry_msgs/msg/Pose", "/mobile/pose", "/maritime/pose"),
        TransformSpec::new("nav_msgs/msg/Odometry", "/mobile/odom", "/maritime/odom")
            .with_frame_id("odom_ned")
            .with_child_frame_id("base_link_frd"),
        // Rejected: odometry needs both frame identifiers.
        TransformSpec::new("nav_msgs/msg/Odometry", "/mobile/odom2", "/maritime/odom2"),
    ];

    let (pipeline, failures) = bring_up(bus.clone(), FrameTransform::flu_to_frd(), &specs);
    for failure in &failures {
        println!("spec #{} rejected: {}", failure.index, failure.error);
    }
    println!("{} bindings live", pipeline.len());

    let (_cmd_tap, cmd_rx) = bus.tap::<Twist>("/maritime/cmd_vel")?;
    let (_pose_tap, pose_rx) = bus.tap::<Pose>("/maritime/pose")?;
    let (_odom_tap, odom_rx) = bus.tap::<Odometry>("/maritime/odom")?;

    bus.publish(
        "/mobile/cmd_vel",
        Twist {
            linear: Vector3::new(1.0, 0.5, 0.0),
            angular: Vector3::new(0.0, 0.0, 0.2),
        },
    );
    bus.publish(
        "/mobile/pose",
        Pose {
            position: Point::new(1.0, 2.0, 3.0),
            orientation: Quaternion::identity(),
        },
    );
    bus.publish(
        "/mobile/odom",
        Odometry {
            header: Header {
                frame_id: "odom".to_string(),
                ..Header::default()
            },
            child_frame_id: "base_link".to_string(),
            ..Odometry::default()
        },
    );

    println!("{:#?}", cmd_rx.try_recv()?);
    println!("{:#?}", pose_rx.try_recv()?);
    println!("{:#?}", odom_rx.try_recv()?);

    Ok(())
}
