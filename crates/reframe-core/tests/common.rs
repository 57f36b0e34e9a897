use eyre::bail;
use reframe_core::{
    DeliveryConfig, LocalBus, Message, SubscriptionHandle, Transport,
    bus::LocalPublication,
    msgs::{
        Header, Odometry, Point, Pose, PoseWithCovariance, Quaternion, Time, Twist,
        TwistWithCovariance, Vector3,
    },
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

pub const EPSILON: f64 = 1e-9;

pub fn assert_approx_eq(actual: f64, expected: f64, message: &str) {
    assert!(
        (actual - expected).abs() < EPSILON || (actual.is_nan() && expected.is_nan()),
        "{message}: expected {expected}, got {actual}"
    );
}

pub fn assert_vector_eq(actual: Vector3, expected: Vector3) {
    assert_approx_eq(actual.x, expected.x, "x");
    assert_approx_eq(actual.y, expected.y, "y");
    assert_approx_eq(actual.z, expected.z, "z");
}

#[allow(dead_code)]
pub fn assert_point_eq(actual: Point, expected: Point) {
    assert_approx_eq(actual.x, expected.x, "x");
    assert_approx_eq(actual.y, expected.y, "y");
    assert_approx_eq(actual.z, expected.z, "z");
}

/// Quaternions `q` and `-q` describe the same rotation.
#[allow(dead_code)]
pub fn assert_quat_eq(actual: Quaternion, expected: Quaternion) {
    let same = [
        actual.x - expected.x,
        actual.y - expected.y,
        actual.z - expected.z,
        actual.w - expected.w,
    ];
    let opposite = [
        actual.x + expected.x,
        actual.y + expected.y,
        actual.z + expected.z,
        actual.w + expected.w,
    ];
    let close = |d: [f64; 4]| d.iter().all(|c| c.abs() < EPSILON);

    assert!(
        close(same) || close(opposite),
        "expected {expected:?}, got {actual:?}"
    );
}

#[allow(dead_code)]
pub fn header(frame_id: &str) -> Header {
    Header {
        stamp: Time {
            sec: 1_700_000_000,
            nanosec: 500,
        },
        frame_id: frame_id.to_string(),
    }
}

#[allow(dead_code)]
pub fn sample_pose() -> Pose {
    let norm = 30f64.sqrt();
    Pose {
        position: Point::new(1.5, -2.0, 0.25),
        orientation: Quaternion::new(1.0 / norm, 2.0 / norm, 3.0 / norm, 4.0 / norm),
    }
}

#[allow(dead_code)]
pub fn sample_twist() -> Twist {
    Twist {
        linear: Vector3::new(0.5, 0.1, -0.2),
        angular: Vector3::new(0.0, 0.05, 0.3),
    }
}

#[allow(dead_code)]
pub fn sample_covariance() -> [f64; 36] {
    let mut covariance = [0.0; 36];
    for row in 0..6 {
        for col in 0..6 {
            // Symmetric, with a dominant diagonal.
            covariance[row * 6 + col] = if row == col {
                1.0 + row as f64
            } else {
                0.01 * (row + col) as f64
            };
        }
    }
    covariance
}

#[allow(dead_code)]
pub fn sample_odometry() -> Odometry {
    Odometry {
        header: header("odom"),
        child_frame_id: "base_link".to_string(),
        pose: PoseWithCovariance {
            pose: sample_pose(),
            covariance: sample_covariance(),
        },
        twist: TwistWithCovariance {
            twist: sample_twist(),
            covariance: sample_covariance(),
        },
    }
}

/// A [`LocalBus`] wrapper counting what the dispatcher creates, optionally
/// failing on one topic.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct CountingTransport {
    pub bus: LocalBus,
    publications: Arc<AtomicUsize>,
    subscriptions: Arc<AtomicUsize>,
    fail_topic: Option<String>,
}

#[allow(dead_code)]
impl CountingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(topic: &str) -> Self {
        Self {
            fail_topic: Some(topic.to_string()),
            ..Self::default()
        }
    }

    pub fn publications(&self) -> usize {
        self.publications.load(Ordering::SeqCst)
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

impl<M> Transport<M> for CountingTransport
where
    M: Message,
{
    type Publication = LocalPublication<M>;

    fn create_publication(
        &self,
        topic: &str,
        delivery: &DeliveryConfig,
    ) -> eyre::Result<Self::Publication> {
        if self.fail_topic.as_deref() == Some(topic) {
            bail!("Refusing to publish on {}", topic);
        }
        self.publications.fetch_add(1, Ordering::SeqCst);
        Transport::<M>::create_publication(&self.bus, topic, delivery)
    }

    fn subscribe<F>(
        &self,
        topic: &str,
        delivery: &DeliveryConfig,
        callback: F,
    ) -> eyre::Result<SubscriptionHandle>
    where
        F: Fn(M) + Send + Sync + 'static,
    {
        if self.fail_topic.as_deref() == Some(topic) {
            bail!("Refusing to subscribe to {}", topic);
        }
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        Transport::<M>::subscribe(&self.bus, topic, delivery, callback)
    }
}
