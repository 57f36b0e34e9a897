use serde::Deserialize;
use std::fmt;

/// The structural category of a message type: which identifier fields the
/// relay rewrites besides the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageShape {
    /// Geometry only, no frame identifiers.
    Plain,
    /// Geometry plus `header.frame_id`.
    StampedWithFrame,
    /// Geometry plus `header.frame_id` and `child_frame_id`.
    StampedWithFrameAndChild,
}

impl MessageShape {
    /// Shapes in registration lookup order.
    pub const LOOKUP_ORDER: [MessageShape; 3] = [
        MessageShape::Plain,
        MessageShape::StampedWithFrame,
        MessageShape::StampedWithFrameAndChild,
    ];

    /// The number of frame identifiers the shape requires.
    pub fn arity(self) -> usize {
        match self {
            MessageShape::Plain => 0,
            MessageShape::StampedWithFrame => 1,
            MessageShape::StampedWithFrameAndChild => 2,
        }
    }
}

/// Every message type the relay supports.
///
/// Each kind maps to exactly one [`MessageShape`]. Matches over kinds are
/// exhaustive, so a new kind cannot be added without its dispatch arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Pose,
    Twist,
    Wrench,
    Accel,
    Transform,
    PoseStamped,
    TwistStamped,
    WrenchStamped,
    AccelStamped,
    Odometry,
    TransformStamped,
}

impl MessageKind {
    pub const ALL: [MessageKind; 11] = [
        MessageKind::Pose,
        MessageKind::Twist,
        MessageKind::Wrench,
        MessageKind::Accel,
        MessageKind::Transform,
        MessageKind::PoseStamped,
        MessageKind::TwistStamped,
        MessageKind::WrenchStamped,
        MessageKind::AccelStamped,
        MessageKind::Odometry,
        MessageKind::TransformStamped,
    ];

    /// The fully qualified ROS2 type name, e.g. `geometry_msgs/msg/Pose`.
    pub fn type_name(self) -> &'static str {
        match self {
            MessageKind::Pose => "geometry_msgs/msg/Pose",
            MessageKind::Twist => "geometry_msgs/msg/Twist",
            MessageKind::Wrench => "geometry_msgs/msg/Wrench",
            MessageKind::Accel => "geometry_msgs/msg/Accel",
            MessageKind::Transform => "geometry_msgs/msg/Transform",
            MessageKind::PoseStamped => "geometry_msgs/msg/PoseStamped",
            MessageKind::TwistStamped => "geometry_msgs/msg/TwistStamped",
            MessageKind::WrenchStamped => "geometry_msgs/msg/WrenchStamped",
            MessageKind::AccelStamped => "geometry_msgs/msg/AccelStamped",
            MessageKind::Odometry => "nav_msgs/msg/Odometry",
            MessageKind::TransformStamped => "geometry_msgs/msg/TransformStamped",
        }
    }

    pub fn shape(self) -> MessageShape {
        match self {
            MessageKind::Pose
            | MessageKind::Twist
            | MessageKind::Wrench
            | MessageKind::Accel
            | MessageKind::Transform => MessageShape::Plain,
            MessageKind::PoseStamped
            | MessageKind::TwistStamped
            | MessageKind::WrenchStamped
            | MessageKind::AccelStamped => MessageShape::StampedWithFrame,
            MessageKind::Odometry | MessageKind::TransformStamped => {
                MessageShape::StampedWithFrameAndChild
            }
        }
    }

    /// The plain kind wrapped by a header-only stamped kind.
    pub fn payload(self) -> Option<MessageKind> {
        match self {
            MessageKind::PoseStamped => Some(MessageKind::Pose),
            MessageKind::TwistStamped => Some(MessageKind::Twist),
            MessageKind::WrenchStamped => Some(MessageKind::Wrench),
            MessageKind::AccelStamped => Some(MessageKind::Accel),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Which messages the transport keeps around for late or slow readers.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum History {
    /// Keep the last `depth` messages.
    #[default]
    KeepLast,
    /// Keep everything, bounded only by the transport's resource limits.
    KeepAll,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    #[default]
    Reliable,
    BestEffort,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    #[default]
    Volatile,
    TransientLocal,
}

/// Delivery options for one subscription/publication pair.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub history: History,

    /// Queue depth, used with [`History::KeepLast`].
    #[serde(default = "default_depth")]
    pub depth: u32,

    #[serde(default)]
    pub reliability: Reliability,

    #[serde(default)]
    pub durability: Durability,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            history: History::default(),
            depth: default_depth(),
            reliability: Reliability::default(),
            durability: Durability::default(),
        }
    }
}

fn default_depth() -> u32 {
    10
}

/// One configured relay: where messages come from, where they go, and the
/// frame identifiers written into them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSpec {
    /// The message type name, e.g. `geometry_msgs/msg/PoseStamped`.
    pub message_type: String,
    pub input_topic: String,
    pub output_topic: String,
    pub frame_id: Option<String>,
    pub child_frame_id: Option<String>,
    /// Publish a different type than the one read, e.g. the plain payload of
    /// a stamped input. `None` publishes the input type.
    pub output_type: Option<String>,
    pub delivery: DeliveryConfig,
}

impl TransformSpec {
    pub fn new(
        message_type: impl Into<String>,
        input_topic: impl Into<String>,
        output_topic: impl Into<String>,
    ) -> Self {
        Self {
            message_type: message_type.into(),
            input_topic: input_topic.into(),
            output_topic: output_topic.into(),
            frame_id: None,
            child_frame_id: None,
            output_type: None,
            delivery: DeliveryConfig::default(),
        }
    }

    pub fn with_frame_id(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = Some(frame_id.into());
        self
    }

    pub fn with_child_frame_id(mut self, child_frame_id: impl Into<String>) -> Self {
        self.child_frame_id = Some(child_frame_id.into());
        self
    }

    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = Some(output_type.into());
        self
    }

    pub fn with_delivery(mut self, delivery: DeliveryConfig) -> Self {
        self.delivery = delivery;
        self
    }
}

/// Normalize message type to the full form (package/msg/Type).
///
/// This accepts both short form (`geometry_msgs/Pose`) and full form
/// (`geometry_msgs/msg/Pose`) and returns the full form.
///
/// # Example
///
/// ```
/// use reframe_core::normalize_msg_type;
///
/// assert_eq!(normalize_msg_type("nav_msgs/Odometry"), "nav_msgs/msg/Odometry");
/// assert_eq!(normalize_msg_type("nav_msgs/msg/Odometry"), "nav_msgs/msg/Odometry");
/// ```
pub fn normalize_msg_type(msg_type: &str) -> String {
    // If already in full form, return as-is
    if msg_type.contains("/msg/") {
        return msg_type.to_string();
    }

    if let Some((package, type_name)) = msg_type.split_once('/') {
        format!("{}/msg/{}", package, type_name)
    } else {
        msg_type.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_msg_type() {
        assert_eq!(
            normalize_msg_type("geometry_msgs/msg/Pose"),
            "geometry_msgs/msg/Pose"
        );
        assert_eq!(
            normalize_msg_type("geometry_msgs/Pose"),
            "geometry_msgs/msg/Pose"
        );
        assert_eq!(normalize_msg_type("Pose"), "Pose");
    }

    #[test]
    fn test_shape_arity() {
        assert_eq!(MessageKind::Wrench.shape().arity(), 0);
        assert_eq!(MessageKind::WrenchStamped.shape().arity(), 1);
        assert_eq!(MessageKind::Odometry.shape().arity(), 2);
    }

    #[test]
    fn test_payload_of_stamped_kinds() {
        assert_eq!(MessageKind::TwistStamped.payload(), Some(MessageKind::Twist));
        assert_eq!(MessageKind::AccelStamped.payload(), Some(MessageKind::Accel));
        assert_eq!(MessageKind::Twist.payload(), None);
        assert_eq!(MessageKind::Odometry.payload(), None);
        assert_eq!(MessageKind::TransformStamped.payload(), None);
    }

    #[test]
    fn test_type_names_are_unique() {
        let mut names: Vec<_> = MessageKind::ALL.iter().map(|k| k.type_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), MessageKind::ALL.len());
    }

    #[test]
    fn test_default_delivery() {
        let delivery: DeliveryConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(delivery, DeliveryConfig::default());
        assert_eq!(delivery.depth, 10);
        assert_eq!(delivery.reliability, Reliability::Reliable);
    }

    #[test]
    fn test_depth_out_of_range_is_rejected() {
        let result = serde_yaml::from_str::<DeliveryConfig>("depth: 4294967296");
        assert!(result.is_err());

        let delivery: DeliveryConfig = serde_yaml::from_str("depth: 4294967295").unwrap();
        assert_eq!(delivery.depth, u32::MAX);
    }
}
