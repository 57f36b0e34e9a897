//! Pure transforms applied to each message shape.
//!
//! Every supported message implements [`Geometry`], which maps the fields it
//! actually has through a [`FrameTransform`]. Stamped messages additionally
//! implement [`HasFrameId`], and messages relating a parent and a child frame
//! implement [`HasChildFrameId`]. The three `transform_*` functions are the
//! per-shape operations; none of them can fail.

use crate::{
    geometry::FrameTransform,
    msgs::{
        Accel, AccelStamped, Odometry, Point, Pose, PoseStamped, PoseWithCovariance, Quaternion,
        Transform, TransformStamped, Twist, TwistStamped, TwistWithCovariance, Vector3, Wrench,
        WrenchStamped,
    },
    types::MessageKind,
};

/// Geometric content that can be mapped between frame conventions.
pub trait Geometry {
    /// Map every geometric field present in `self` through `tf`.
    fn transform(&mut self, tf: &FrameTransform);

    /// Whether every geometric field holds finite numbers.
    fn is_finite(&self) -> bool;
}

/// A message type the relay can carry.
///
/// `KIND` ties the Rust type to its registration entry at compile time.
pub trait Message: Geometry + Clone + Send + Sync + 'static {
    const KIND: MessageKind;
}

/// Messages carrying a single frame identifier in their header.
pub trait HasFrameId: Message {
    fn frame_id(&self) -> &str;

    fn set_frame_id(&mut self, frame_id: &str);
}

/// Messages relating a parent frame to a child frame.
pub trait HasChildFrameId: HasFrameId {
    fn child_frame_id(&self) -> &str;

    fn set_child_frame_id(&mut self, child_frame_id: &str);
}

/// Stamped messages that are a header around one plain geometry value.
pub trait HasPayload: HasFrameId {
    type Payload: Message;

    fn into_payload(self) -> Self::Payload;
}

/// Map the geometry of a message with no frame identifiers.
pub fn transform_plain<M>(mut value: M, tf: &FrameTransform) -> M
where
    M: Geometry,
{
    value.transform(tf);
    value
}

/// Map the geometry of a stamped message and overwrite its frame identifier.
///
/// `frame_id` is written verbatim. The header stamp is preserved.
pub fn transform_stamped<M>(value: M, tf: &FrameTransform, frame_id: &str) -> M
where
    M: HasFrameId,
{
    let mut value = transform_plain(value, tf);
    value.set_frame_id(frame_id);
    value
}

/// Map the geometry of a parent/child message and overwrite both frame
/// identifiers independently.
pub fn transform_stamped_with_child<M>(
    value: M,
    tf: &FrameTransform,
    frame_id: &str,
    child_frame_id: &str,
) -> M
where
    M: HasChildFrameId,
{
    let mut value = transform_stamped(value, tf, frame_id);
    value.set_child_frame_id(child_frame_id);
    value
}

/// Map the payload of a stamped message and discard its header.
pub fn transform_unstamped<M>(value: M, tf: &FrameTransform) -> M::Payload
where
    M: HasPayload,
{
    transform_plain(value.into_payload(), tf)
}

fn rotate(vector: &mut Vector3, tf: &FrameTransform) {
    *vector = tf.rotate_vector((*vector).into()).into();
}

fn orient(orientation: &mut Quaternion, tf: &FrameTransform) {
    *orientation = tf.map_orientation((*orientation).into()).into();
}

impl Geometry for Pose {
    fn transform(&mut self, tf: &FrameTransform) {
        self.position = Point::from(tf.map_position(self.position.into()));
        orient(&mut self.orientation, tf);
    }

    fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}

impl Geometry for Twist {
    fn transform(&mut self, tf: &FrameTransform) {
        rotate(&mut self.linear, tf);
        rotate(&mut self.angular, tf);
    }

    fn is_finite(&self) -> bool {
        self.linear.is_finite() && self.angular.is_finite()
    }
}

impl Geometry for Wrench {
    fn transform(&mut self, tf: &FrameTransform) {
        rotate(&mut self.force, tf);
        rotate(&mut self.torque, tf);
    }

    fn is_finite(&self) -> bool {
        self.force.is_finite() && self.torque.is_finite()
    }
}

impl Geometry for Accel {
    fn transform(&mut self, tf: &FrameTransform) {
        rotate(&mut self.linear, tf);
        rotate(&mut self.angular, tf);
    }

    fn is_finite(&self) -> bool {
        self.linear.is_finite() && self.angular.is_finite()
    }
}

impl Geometry for Transform {
    fn transform(&mut self, tf: &FrameTransform) {
        // The translation of a transform is a position, not a rate.
        self.translation = tf.map_position(self.translation.into()).into();
        orient(&mut self.rotation, tf);
    }

    fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite()
    }
}

impl Geometry for PoseWithCovariance {
    fn transform(&mut self, tf: &FrameTransform) {
        self.pose.transform(tf);
        self.covariance = tf.map_covariance(&self.covariance);
    }

    fn is_finite(&self) -> bool {
        self.pose.is_finite() && self.covariance.iter().all(|c| c.is_finite())
    }
}

impl Geometry for TwistWithCovariance {
    fn transform(&mut self, tf: &FrameTransform) {
        self.twist.transform(tf);
        self.covariance = tf.map_covariance(&self.covariance);
    }

    fn is_finite(&self) -> bool {
        self.twist.is_finite() && self.covariance.iter().all(|c| c.is_finite())
    }
}

impl Geometry for Odometry {
    fn transform(&mut self, tf: &FrameTransform) {
        self.pose.transform(tf);
        self.twist.transform(tf);
    }

    fn is_finite(&self) -> bool {
        self.pose.is_finite() && self.twist.is_finite()
    }
}

/// Implement [`Message`] for plain geometry types.
macro_rules! impl_plain {
    ($($msg_type:ident),* $(,)?) => {
        $(
            impl Message for $msg_type {
                const KIND: MessageKind = MessageKind::$msg_type;
            }
        )*
    };
}

/// Implement [`Geometry`], [`Message`], [`HasFrameId`] and [`HasPayload`]
/// for a message wrapping a plain geometry type in a header.
macro_rules! impl_stamped {
    ($msg_type:ident, $field:ident, $payload:ident) => {
        impl Geometry for $msg_type {
            fn transform(&mut self, tf: &FrameTransform) {
                self.$field.transform(tf);
            }

            fn is_finite(&self) -> bool {
                self.$field.is_finite()
            }
        }

        impl Message for $msg_type {
            const KIND: MessageKind = MessageKind::$msg_type;
        }

        impl_frame_id!($msg_type);

        impl HasPayload for $msg_type {
            type Payload = $payload;

            fn into_payload(self) -> $payload {
                self.$field
            }
        }
    };
}

macro_rules! impl_frame_id {
    ($msg_type:ident) => {
        impl HasFrameId for $msg_type {
            fn frame_id(&self) -> &str {
                &self.header.frame_id
            }

            fn set_frame_id(&mut self, frame_id: &str) {
                self.header.frame_id.clear();
                self.header.frame_id.push_str(frame_id);
            }
        }
    };
}

macro_rules! impl_child_frame_id {
    ($msg_type:ident) => {
        impl Message for $msg_type {
            const KIND: MessageKind = MessageKind::$msg_type;
        }

        impl_frame_id!($msg_type);

        impl HasChildFrameId for $msg_type {
            fn child_frame_id(&self) -> &str {
                &self.child_frame_id
            }

            fn set_child_frame_id(&mut self, child_frame_id: &str) {
                self.child_frame_id.clear();
                self.child_frame_id.push_str(child_frame_id);
            }
        }
    };
}

impl_plain!(Pose, Twist, Wrench, Accel, Transform);

impl_stamped!(PoseStamped, pose, Pose);
impl_stamped!(TwistStamped, twist, Twist);
impl_stamped!(WrenchStamped, wrench, Wrench);
impl_stamped!(AccelStamped, accel, Accel);

impl Geometry for TransformStamped {
    fn transform(&mut self, tf: &FrameTransform) {
        self.transform.transform(tf);
    }

    fn is_finite(&self) -> bool {
        self.transform.is_finite()
    }
}

impl_child_frame_id!(Odometry);
impl_child_frame_id!(TransformStamped);
