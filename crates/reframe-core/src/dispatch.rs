//! Wire configured specs to live subscription/publication pairs.
//!
//! For each [`TransformSpec`], the [`Dispatcher`] looks up the message kind,
//! checks that the spec supplies the frame identifiers its shape needs,
//! creates the output publication, and only then subscribes to the input
//! topic with a [`Relay`] as the callback. Live pairs are collected in a
//! [`Pipeline`] that releases them when dropped.
//!
//! A spec may name an `output_type`. The only conversion supported is a
//! header-only stamped input published as its plain payload, e.g.
//! `TwistStamped` in, `Twist` out.

use crate::{
    engine::{
        HasChildFrameId, HasFrameId, HasPayload, Message, transform_plain, transform_stamped,
        transform_stamped_with_child, transform_unstamped,
    },
    geometry::FrameTransform,
    msgs::{
        Accel, AccelStamped, Odometry, Pose, PoseStamped, Transform, TransformStamped, Twist,
        TwistStamped, Wrench, WrenchStamped,
    },
    registry::{DispatchError, FrameField, RegistrationTable},
    transport::{MessageTransport, Publication, SubscriptionHandle, Transport},
    types::{MessageKind, TransformSpec},
};
use std::{marker::PhantomData, sync::Arc};
use tracing::{debug, info, trace, warn};

/// The frame identifiers written into each relayed message.
pub trait Relabel<M>: Send + Sync + 'static {
    /// The message type published after relabeling.
    type Output: Message;

    /// Transform `value` and relabel its frame fields.
    fn apply(&self, value: M, tf: &FrameTransform) -> Self::Output;
}

/// No identifiers to write.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlabeled;

impl<M> Relabel<M> for Unlabeled
where
    M: Message,
{
    type Output = M;

    fn apply(&self, value: M, tf: &FrameTransform) -> M {
        transform_plain(value, tf)
    }
}

/// Overwrites `header.frame_id`.
#[derive(Debug, Clone)]
pub struct FrameLabel {
    pub frame_id: String,
}

impl FrameLabel {
    fn from_spec(spec: &TransformSpec, kind: MessageKind) -> Result<Self, DispatchError> {
        Ok(Self {
            frame_id: required(spec.frame_id.as_deref(), kind, FrameField::FrameId)?,
        })
    }
}

impl<M> Relabel<M> for FrameLabel
where
    M: HasFrameId,
{
    type Output = M;

    fn apply(&self, value: M, tf: &FrameTransform) -> M {
        transform_stamped(value, tf, &self.frame_id)
    }
}

/// Overwrites `header.frame_id` and `child_frame_id`.
#[derive(Debug, Clone)]
pub struct FrameAndChildLabel {
    pub frame_id: String,
    pub child_frame_id: String,
}

impl FrameAndChildLabel {
    fn from_spec(spec: &TransformSpec, kind: MessageKind) -> Result<Self, DispatchError> {
        Ok(Self {
            frame_id: required(spec.frame_id.as_deref(), kind, FrameField::FrameId)?,
            child_frame_id: required(
                spec.child_frame_id.as_deref(),
                kind,
                FrameField::ChildFrameId,
            )?,
        })
    }
}

impl<M> Relabel<M> for FrameAndChildLabel
where
    M: HasChildFrameId,
{
    type Output = M;

    fn apply(&self, value: M, tf: &FrameTransform) -> M {
        transform_stamped_with_child(value, tf, &self.frame_id, &self.child_frame_id)
    }
}

/// Drops the header and publishes the plain payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropHeader;

impl<M> Relabel<M> for DropHeader
where
    M: HasPayload,
{
    type Output = M::Payload;

    fn apply(&self, value: M, tf: &FrameTransform) -> M::Payload {
        transform_unstamped(value, tf)
    }
}

fn required(
    value: Option<&str>,
    kind: MessageKind,
    field: FrameField,
) -> Result<String, DispatchError> {
    value
        .map(str::to_string)
        .ok_or(DispatchError::MissingFrameMetadata {
            message_type: kind,
            field,
        })
}

/// The per-spec callback: transform each inbound message and forward it to
/// the bound publication.
///
/// A relay is built once at registration and owns everything it needs; it
/// holds no mutable state, so concurrent invocations are independent.
pub struct Relay<M, L, P> {
    output_topic: String,
    publication: P,
    label: L,
    transform: Arc<FrameTransform>,
    _marker: PhantomData<fn(M)>,
}

impl<M, L, P> Relay<M, L, P>
where
    M: Message,
    L: Relabel<M>,
    P: Publication<L::Output>,
{
    pub fn new(
        output_topic: impl Into<String>,
        publication: P,
        label: L,
        transform: Arc<FrameTransform>,
    ) -> Self {
        Self {
            output_topic: output_topic.into(),
            publication,
            label,
            transform,
            _marker: PhantomData,
        }
    }

    /// Transform one message and publish the result.
    pub fn handle(&self, value: M) {
        if !value.is_finite() {
            warn!(
                topic = %self.output_topic,
                msg_type = %M::KIND,
                "Relaying message with non-finite geometry"
            );
        }

        let value = self.label.apply(value, &self.transform);

        match self.publication.publish(value) {
            Ok(()) => trace!(topic = %self.output_topic, "Relayed message"),
            Err(e) => warn!(
                topic = %self.output_topic,
                msg_type = %M::KIND,
                error = %e,
                "Failed to publish transformed message"
            ),
        }
    }
}

/// One live subscription/publication pair.
///
/// The publication is owned by the relay inside the subscription callback,
/// so releasing the subscription releases both.
#[derive(Debug)]
pub struct Binding {
    pub kind: MessageKind,
    pub output_kind: MessageKind,
    pub input_topic: String,
    pub output_topic: String,
    subscription: SubscriptionHandle,
}

impl Binding {
    pub fn subscription(&self) -> &SubscriptionHandle {
        &self.subscription
    }
}

/// The live bindings produced by bring-up.
///
/// Dropping the pipeline releases every binding.
#[derive(Debug, Default)]
pub struct Pipeline {
    bindings: Vec<Binding>,
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// Release every binding reading from `input_topic`. Returns the number
    /// of bindings released.
    pub fn release(&mut self, input_topic: &str) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.input_topic != input_topic);
        let released = before - self.bindings.len();

        if released > 0 {
            info!(input_topic = %input_topic, released, "Released bindings");
        }
        released
    }

    /// Release the binding relaying `input_topic` to `output_topic`, leaving
    /// other outputs of the same input live. Returns whether one was found.
    pub fn release_route(&mut self, input_topic: &str, output_topic: &str) -> bool {
        let Some(position) = self
            .bindings
            .iter()
            .position(|b| b.input_topic == input_topic && b.output_topic == output_topic)
        else {
            return false;
        };

        self.bindings.remove(position);
        info!(
            input_topic = %input_topic,
            output_topic = %output_topic,
            "Released binding"
        );
        true
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if !self.bindings.is_empty() {
            debug!(num_bindings = self.bindings.len(), "Releasing pipeline");
        }
    }
}

/// A spec that could not be registered, with its position in the batch.
#[derive(Debug)]
pub struct RegistrationFailure {
    pub index: usize,
    pub spec: TransformSpec,
    pub error: DispatchError,
}

/// Turns specs into bindings on a transport.
pub struct Dispatcher<T> {
    transport: T,
    table: RegistrationTable,
    transform: Arc<FrameTransform>,
    pipeline: Pipeline,
}

impl<T> Dispatcher<T>
where
    T: MessageTransport,
{
    pub fn new(transport: T, transform: FrameTransform) -> Self {
        Self {
            transport,
            table: RegistrationTable::new(),
            transform: Arc::new(transform),
            pipeline: Pipeline::default(),
        }
    }

    pub fn table(&self) -> &RegistrationTable {
        &self.table
    }

    pub fn transform(&self) -> &FrameTransform {
        &self.transform
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Register one spec. On error nothing has been added to the pipeline.
    pub fn register(&mut self, spec: &TransformSpec) -> Result<(), DispatchError> {
        let kind = self.table.lookup(&spec.message_type)?;
        let output_kind = match &spec.output_type {
            Some(name) => self.table.lookup(name)?,
            None => kind,
        };

        let subscription = if output_kind == kind {
            self.bind_same_type(spec, kind)?
        } else {
            self.bind_payload(spec, kind, output_kind)?
        };

        info!(
            msg_type = %kind,
            output_type = %output_kind,
            input_topic = %spec.input_topic,
            output_topic = %spec.output_topic,
            frame_id = ?spec.frame_id,
            child_frame_id = ?spec.child_frame_id,
            "Registered transform"
        );

        self.pipeline.bindings.push(Binding {
            kind,
            output_kind,
            input_topic: spec.input_topic.clone(),
            output_topic: spec.output_topic.clone(),
            subscription,
        });

        Ok(())
    }

    fn bind_same_type(
        &self,
        spec: &TransformSpec,
        kind: MessageKind,
    ) -> Result<SubscriptionHandle, DispatchError> {
        match kind {
            MessageKind::Pose => self.bind::<Pose, _>(spec, Unlabeled),
            MessageKind::Twist => self.bind::<Twist, _>(spec, Unlabeled),
            MessageKind::Wrench => self.bind::<Wrench, _>(spec, Unlabeled),
            MessageKind::Accel => self.bind::<Accel, _>(spec, Unlabeled),
            MessageKind::Transform => self.bind::<Transform, _>(spec, Unlabeled),
            MessageKind::PoseStamped => {
                self.bind::<PoseStamped, _>(spec, FrameLabel::from_spec(spec, kind)?)
            }
            MessageKind::TwistStamped => {
                self.bind::<TwistStamped, _>(spec, FrameLabel::from_spec(spec, kind)?)
            }
            MessageKind::WrenchStamped => {
                self.bind::<WrenchStamped, _>(spec, FrameLabel::from_spec(spec, kind)?)
            }
            MessageKind::AccelStamped => {
                self.bind::<AccelStamped, _>(spec, FrameLabel::from_spec(spec, kind)?)
            }
            MessageKind::Odometry => {
                self.bind::<Odometry, _>(spec, FrameAndChildLabel::from_spec(spec, kind)?)
            }
            MessageKind::TransformStamped => self
                .bind::<TransformStamped, _>(spec, FrameAndChildLabel::from_spec(spec, kind)?),
        }
    }

    /// Bind a stamped input to a publication of its plain payload. No frame
    /// identifiers are needed since the header is not published.
    fn bind_payload(
        &self,
        spec: &TransformSpec,
        kind: MessageKind,
        output_kind: MessageKind,
    ) -> Result<SubscriptionHandle, DispatchError> {
        if kind.payload() != Some(output_kind) {
            return Err(DispatchError::UnsupportedConversion {
                input: kind,
                output: output_kind,
            });
        }

        match kind {
            MessageKind::PoseStamped => self.bind::<PoseStamped, _>(spec, DropHeader),
            MessageKind::TwistStamped => self.bind::<TwistStamped, _>(spec, DropHeader),
            MessageKind::WrenchStamped => self.bind::<WrenchStamped, _>(spec, DropHeader),
            MessageKind::AccelStamped => self.bind::<AccelStamped, _>(spec, DropHeader),
            _ => Err(DispatchError::UnsupportedConversion {
                input: kind,
                output: output_kind,
            }),
        }
    }

    /// Register every spec, collecting failures instead of stopping at the
    /// first one.
    pub fn register_all<'a, I>(&mut self, specs: I) -> Vec<RegistrationFailure>
    where
        I: IntoIterator<Item = &'a TransformSpec>,
    {
        let mut failures = Vec::new();

        for (index, spec) in specs.into_iter().enumerate() {
            if let Err(error) = self.register(spec) {
                warn!(
                    index,
                    msg_type = %spec.message_type,
                    input_topic = %spec.input_topic,
                    error = %error,
                    "Skipping transform"
                );
                failures.push(RegistrationFailure {
                    index,
                    spec: spec.clone(),
                    error,
                });
            }
        }

        failures
    }

    /// Hand over the bindings created so far.
    pub fn into_pipeline(mut self) -> Pipeline {
        std::mem::take(&mut self.pipeline)
    }

    /// Create the publication first, then subscribe with a relay bound to it.
    fn bind<M, L>(
        &self,
        spec: &TransformSpec,
        label: L,
    ) -> Result<SubscriptionHandle, DispatchError>
    where
        M: Message,
        L: Relabel<M>,
        T: Transport<M> + Transport<L::Output>,
    {
        let publication = <T as Transport<L::Output>>::create_publication(
            &self.transport,
            &spec.output_topic,
            &spec.delivery,
        )
        .map_err(|e| DispatchError::transport(&spec.output_topic, e))?;

        let relay = Relay::<M, L, _>::new(
            spec.output_topic.clone(),
            publication,
            label,
            self.transform.clone(),
        );

        <T as Transport<M>>::subscribe(
            &self.transport,
            &spec.input_topic,
            &spec.delivery,
            move |value: M| relay.handle(value),
        )
        .map_err(|e| DispatchError::transport(&spec.input_topic, e))
    }
}

/// Register `specs` on `transport` and return the live pipeline together
/// with the specs that failed.
pub fn bring_up<'a, T, I>(
    transport: T,
    transform: FrameTransform,
    specs: I,
) -> (Pipeline, Vec<RegistrationFailure>)
where
    T: MessageTransport,
    I: IntoIterator<Item = &'a TransformSpec>,
{
    let mut dispatcher = Dispatcher::new(transport, transform);
    let failures = dispatcher.register_all(specs);
    let pipeline = dispatcher.into_pipeline();

    info!(
        num_bindings = pipeline.len(),
        num_failures = failures.len(),
        "Pipeline brought up"
    );

    (pipeline, failures)
}
