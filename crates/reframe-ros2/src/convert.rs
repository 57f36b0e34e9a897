//! Conversions between generated ROS2 message types and the relay's message
//! structs.

use geometry_msgs::msg as geo;
use nav_msgs::msg as nav;
use reframe_core::{Message, msgs};

/// A relay message with a ROS2 wire counterpart.
pub trait RosMessage: Message {
    /// The generated ROS2 type.
    type Ros: rclrs::MessageIDL;

    fn from_ros(msg: Self::Ros) -> Self;

    fn into_ros(self) -> Self::Ros;
}

fn header_from_ros(header: std_msgs::msg::Header) -> msgs::Header {
    msgs::Header {
        stamp: msgs::Time {
            sec: header.stamp.sec,
            nanosec: header.stamp.nanosec,
        },
        frame_id: header.frame_id,
    }
}

fn header_into_ros(header: msgs::Header) -> std_msgs::msg::Header {
    std_msgs::msg::Header {
        stamp: builtin_interfaces::msg::Time {
            sec: header.stamp.sec,
            nanosec: header.stamp.nanosec,
        },
        frame_id: header.frame_id,
    }
}

fn vector_from_ros(v: geo::Vector3) -> msgs::Vector3 {
    msgs::Vector3::new(v.x, v.y, v.z)
}

fn vector_into_ros(v: msgs::Vector3) -> geo::Vector3 {
    geo::Vector3 {
        x: v.x,
        y: v.y,
        z: v.z,
    }
}

fn point_from_ros(p: geo::Point) -> msgs::Point {
    msgs::Point::new(p.x, p.y, p.z)
}

fn point_into_ros(p: msgs::Point) -> geo::Point {
    geo::Point {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

fn quaternion_from_ros(q: geo::Quaternion) -> msgs::Quaternion {
    msgs::Quaternion::new(q.x, q.y, q.z, q.w)
}

fn quaternion_into_ros(q: msgs::Quaternion) -> geo::Quaternion {
    geo::Quaternion {
        x: q.x,
        y: q.y,
        z: q.z,
        w: q.w,
    }
}

impl RosMessage for msgs::Pose {
    type Ros = geo::Pose;

    fn from_ros(msg: geo::Pose) -> Self {
        Self {
            position: point_from_ros(msg.position),
            orientation: quaternion_from_ros(msg.orientation),
        }
    }

    fn into_ros(self) -> geo::Pose {
        geo::Pose {
            position: point_into_ros(self.position),
            orientation: quaternion_into_ros(self.orientation),
        }
    }
}

impl RosMessage for msgs::Twist {
    type Ros = geo::Twist;

    fn from_ros(msg: geo::Twist) -> Self {
        Self {
            linear: vector_from_ros(msg.linear),
            angular: vector_from_ros(msg.angular),
        }
    }

    fn into_ros(self) -> geo::Twist {
        geo::Twist {
            linear: vector_into_ros(self.linear),
            angular: vector_into_ros(self.angular),
        }
    }
}

impl RosMessage for msgs::Wrench {
    type Ros = geo::Wrench;

    fn from_ros(msg: geo::Wrench) -> Self {
        Self {
            force: vector_from_ros(msg.force),
            torque: vector_from_ros(msg.torque),
        }
    }

    fn into_ros(self) -> geo::Wrench {
        geo::Wrench {
            force: vector_into_ros(self.force),
            torque: vector_into_ros(self.torque),
        }
    }
}

impl RosMessage for msgs::Accel {
    type Ros = geo::Accel;

    fn from_ros(msg: geo::Accel) -> Self {
        Self {
            linear: vector_from_ros(msg.linear),
            angular: vector_from_ros(msg.angular),
        }
    }

    fn into_ros(self) -> geo::Accel {
        geo::Accel {
            linear: vector_into_ros(self.linear),
            angular: vector_into_ros(self.angular),
        }
    }
}

impl RosMessage for msgs::Transform {
    type Ros = geo::Transform;

    fn from_ros(msg: geo::Transform) -> Self {
        Self {
            translation: vector_from_ros(msg.translation),
            rotation: quaternion_from_ros(msg.rotation),
        }
    }

    fn into_ros(self) -> geo::Transform {
        geo::Transform {
            translation: vector_into_ros(self.translation),
            rotation: quaternion_into_ros(self.rotation),
        }
    }
}

/// Implement [`RosMessage`] for a `{ header, <inner> }` stamped wrapper.
macro_rules! impl_stamped {
    ($msg_type:ident, $field:ident) => {
        impl RosMessage for msgs::$msg_type {
            type Ros = geo::$msg_type;

            fn from_ros(msg: geo::$msg_type) -> Self {
                Self {
                    header: header_from_ros(msg.header),
                    $field: RosMessage::from_ros(msg.$field),
                }
            }

            fn into_ros(self) -> geo::$msg_type {
                geo::$msg_type {
                    header: header_into_ros(self.header),
                    $field: self.$field.into_ros(),
                }
            }
        }
    };
}

impl_stamped!(PoseStamped, pose);
impl_stamped!(TwistStamped, twist);
impl_stamped!(WrenchStamped, wrench);
impl_stamped!(AccelStamped, accel);

impl RosMessage for msgs::TransformStamped {
    type Ros = geo::TransformStamped;

    fn from_ros(msg: geo::TransformStamped) -> Self {
        Self {
            header: header_from_ros(msg.header),
            child_frame_id: msg.child_frame_id,
            transform: RosMessage::from_ros(msg.transform),
        }
    }

    fn into_ros(self) -> geo::TransformStamped {
        geo::TransformStamped {
            header: header_into_ros(self.header),
            child_frame_id: self.child_frame_id,
            transform: self.transform.into_ros(),
        }
    }
}

impl RosMessage for msgs::Odometry {
    type Ros = nav::Odometry;

    fn from_ros(msg: nav::Odometry) -> Self {
        Self {
            header: header_from_ros(msg.header),
            child_frame_id: msg.child_frame_id,
            pose: msgs::PoseWithCovariance {
                pose: RosMessage::from_ros(msg.pose.pose),
                covariance: msg.pose.covariance,
            },
            twist: msgs::TwistWithCovariance {
                twist: RosMessage::from_ros(msg.twist.twist),
                covariance: msg.twist.covariance,
            },
        }
    }

    fn into_ros(self) -> nav::Odometry {
        nav::Odometry {
            header: header_into_ros(self.header),
            child_frame_id: self.child_frame_id,
            pose: geo::PoseWithCovariance {
                pose: self.pose.pose.into_ros(),
                covariance: self.pose.covariance,
            },
            twist: geo::TwistWithCovariance {
                twist: self.twist.twist.into_ros(),
                covariance: self.twist.covariance,
            },
        }
    }
}
