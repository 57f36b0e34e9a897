//! This library relays robot state and command messages between two frame
//! conventions, e.g. forward-left-up to forward-right-down body axes or
//! east-north-up to north-east-down world axes.
//!
//! Each configured [`TransformSpec`] binds an input topic to an output topic.
//! Every message arriving on the input is mapped through a shared
//! [`FrameTransform`], its frame identifiers are rewritten as configured,
//! and the result is published on the output. Which identifiers are
//! rewritten depends on the message's [`MessageShape`].
//!
//! # Usage
//!
//! ```rust
//! use reframe_core::{
//!     FrameTransform, LocalBus, TransformSpec, bring_up,
//!     msgs::{Point, Pose, Quaternion},
//! };
//!
//! // Any transport implementing `Transport<M>` for every message type
//! // works. The in-process bus is the simplest one.
//! let bus = LocalBus::new();
//!
//! let specs = [TransformSpec::new("geometry_msgs/msg/Pose", "/in", "/out")];
//! let (pipeline, failures) = bring_up(bus.clone(), FrameTransform::flu_to_frd(), &specs);
//! assert!(failures.is_empty());
//! assert_eq!(pipeline.len(), 1);
//!
//! // Collect what the relay publishes.
//! let (_tap, rx) = bus.tap::<Pose>("/out")?;
//!
//! bus.publish(
//!     "/in",
//!     Pose {
//!         position: Point::new(1.0, 2.0, 3.0),
//!         orientation: Quaternion::identity(),
//!     },
//! );
//!
//! let pose = rx.try_recv()?;
//! assert!((pose.position.y + 2.0).abs() < 1e-9);
//! assert!((pose.position.z + 3.0).abs() < 1e-9);
//! # Ok::<(), eyre::Report>(())
//! ```

pub mod bus;
pub mod config;
pub mod dispatch;
pub mod engine;
mod geometry;
pub mod msgs;
pub mod registry;
pub mod transport;
mod types;

pub use bus::LocalBus;
pub use config::Config;
pub use dispatch::{Binding, Dispatcher, Pipeline, RegistrationFailure, bring_up};
pub use engine::{
    Geometry, HasChildFrameId, HasFrameId, HasPayload, Message, transform_plain,
    transform_stamped, transform_stamped_with_child, transform_unstamped,
};
pub use geometry::FrameTransform;
pub use registry::{DispatchError, FrameField, RegistrationTable};
pub use transport::{MessageTransport, Publication, SubscriptionHandle, Transport};
pub use types::*;
