//! Message values handled by the relay.
//!
//! The layouts mirror the ROS2 `std_msgs`, `geometry_msgs` and `nav_msgs`
//! definitions so that transport adapters can convert field by field.
//! See <https://github.com/ros2/common_interfaces>.

use nalgebra as na;

/// Number of entries in a row-major 6x6 covariance.
pub const COVARIANCE_LEN: usize = 36;

/// A ROS time stamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Time {
    pub sec: i32,
    pub nanosec: u32,
}

/// Standard metadata for higher-level stamped data types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub stamp: Time,
    pub frame_id: String,
}

/// A vector in free space.
///
/// A vector is always anchored at the origin: when a transform is applied
/// to it, only the rotational component is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vector3> for na::Vector3<f64> {
    fn from(v: Vector3) -> Self {
        na::Vector3::new(v.x, v.y, v.z)
    }
}

impl From<na::Vector3<f64>> for Vector3 {
    fn from(v: na::Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// The position of a point in free space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Point> for na::Vector3<f64> {
    fn from(p: Point) -> Self {
        na::Vector3::new(p.x, p.y, p.z)
    }
}

impl From<na::Vector3<f64>> for Point {
    fn from(v: na::Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// An orientation in free space in quaternion form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Quaternion> for na::Quaternion<f64> {
    fn from(q: Quaternion) -> Self {
        na::Quaternion::new(q.w, q.x, q.y, q.z)
    }
}

impl From<na::Quaternion<f64>> for Quaternion {
    fn from(q: na::Quaternion<f64>) -> Self {
        // `coords` is stored as [x, y, z, w].
        Self::new(q.coords[0], q.coords[1], q.coords[2], q.coords[3])
    }
}

/// A pose in free space, composed of position and orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

/// Velocity in free space broken into its linear and angular parts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

/// Force in free space, separated into its linear and angular parts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Wrench {
    pub force: Vector3,
    pub torque: Vector3,
}

/// Acceleration in free space broken into its linear and angular parts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accel {
    pub linear: Vector3,
    pub angular: Vector3,
}

/// The transform between two coordinate frames in free space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Quaternion,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: Pose,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TwistStamped {
    pub header: Header,
    pub twist: Twist,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WrenchStamped {
    pub header: Header,
    pub wrench: Wrench,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccelStamped {
    pub header: Header,
    pub accel: Accel,
}

/// A transform from `header.frame_id` to `child_frame_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformStamped {
    pub header: Header,
    pub child_frame_id: String,
    pub transform: Transform,
}

/// A pose with a row-major 6x6 covariance over (x, y, z, rot x, rot y, rot z).
#[derive(Debug, Clone, PartialEq)]
pub struct PoseWithCovariance {
    pub pose: Pose,
    pub covariance: [f64; COVARIANCE_LEN],
}

impl Default for PoseWithCovariance {
    fn default() -> Self {
        Self {
            pose: Pose::default(),
            covariance: [0.0; COVARIANCE_LEN],
        }
    }
}

/// A twist with a row-major 6x6 covariance over (x, y, z, rot x, rot y, rot z).
#[derive(Debug, Clone, PartialEq)]
pub struct TwistWithCovariance {
    pub twist: Twist,
    pub covariance: [f64; COVARIANCE_LEN],
}

impl Default for TwistWithCovariance {
    fn default() -> Self {
        Self {
            twist: Twist::default(),
            covariance: [0.0; COVARIANCE_LEN],
        }
    }
}

/// An estimate of a position and velocity in free space.
///
/// The pose is expressed in `header.frame_id` and the twist in
/// `child_frame_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Odometry {
    pub header: Header,
    pub child_frame_id: String,
    pub pose: PoseWithCovariance,
    pub twist: TwistWithCovariance,
}
