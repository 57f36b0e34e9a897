//! The pub/sub capability the dispatcher needs from the outside world.
//!
//! A transport implements [`Transport<M>`] for every message type it can
//! carry. [`MessageTransport`] bundles all of them into one bound so the
//! dispatcher can wire any [`MessageKind`](crate::MessageKind) it looks up.

use crate::{
    engine::Message,
    msgs::{
        Accel, AccelStamped, Odometry, Pose, PoseStamped, Transform, TransformStamped, Twist,
        TwistStamped, Wrench, WrenchStamped,
    },
    types::DeliveryConfig,
};
use eyre::Result;
use std::{any::Any, fmt};

/// A bound output topic.
pub trait Publication<M>: Send + Sync + 'static {
    /// Hand one value to the transport. Back-pressure, if any, is the
    /// transport's concern.
    fn publish(&self, value: M) -> Result<()>;
}

/// Create publications and callback subscriptions for message type `M`.
pub trait Transport<M>
where
    M: Message,
{
    type Publication: Publication<M>;

    fn create_publication(
        &self,
        topic: &str,
        delivery: &DeliveryConfig,
    ) -> Result<Self::Publication>;

    /// Subscribe to `topic`. The callback runs on whatever context the
    /// transport dispatches on and receives an owned copy of each message.
    fn subscribe<F>(
        &self,
        topic: &str,
        delivery: &DeliveryConfig,
        callback: F,
    ) -> Result<SubscriptionHandle>
    where
        F: Fn(M) + Send + Sync + 'static;
}

/// A transport that carries every supported message type.
pub trait MessageTransport:
    Transport<Pose>
    + Transport<Twist>
    + Transport<Wrench>
    + Transport<Accel>
    + Transport<Transform>
    + Transport<PoseStamped>
    + Transport<TwistStamped>
    + Transport<WrenchStamped>
    + Transport<AccelStamped>
    + Transport<Odometry>
    + Transport<TransformStamped>
{
}

impl<T> MessageTransport for T where
    T: Transport<Pose>
        + Transport<Twist>
        + Transport<Wrench>
        + Transport<Accel>
        + Transport<Transform>
        + Transport<PoseStamped>
        + Transport<TwistStamped>
        + Transport<WrenchStamped>
        + Transport<AccelStamped>
        + Transport<Odometry>
        + Transport<TransformStamped>
{
}

/// A type-erased subscription.
///
/// The transport-specific subscription object is kept alive by this handle
/// and released when the handle is dropped.
pub struct SubscriptionHandle {
    topic: String,
    _inner: Box<dyn Any + Send + Sync>,
}

impl SubscriptionHandle {
    pub fn new<S>(topic: impl Into<String>, inner: S) -> Self
    where
        S: Any + Send + Sync,
    {
        Self {
            topic: topic.into(),
            _inner: Box::new(inner),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}
