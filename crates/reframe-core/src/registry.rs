//! Message type lookup by name, grouped by frame-identifier arity.

use crate::types::{MessageKind, MessageShape, normalize_msg_type};
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// The frame identifier a shape requires but a spec did not supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameField {
    FrameId,
    ChildFrameId,
}

impl fmt::Display for FrameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameField::FrameId => f.write_str("frame_id"),
            FrameField::ChildFrameId => f.write_str("child_frame_id"),
        }
    }
}

/// Why one spec could not be registered. Each error is fatal to its own
/// spec only.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown message type '{0}'")]
    UnknownMessageType(String),

    #[error("message type '{message_type}' requires a {field} but none is configured")]
    MissingFrameMetadata {
        message_type: MessageKind,
        field: FrameField,
    },

    #[error("cannot relay '{input}' as '{output}'")]
    UnsupportedConversion {
        input: MessageKind,
        output: MessageKind,
    },

    #[error("transport failed on topic '{topic}': {reason}")]
    Transport { topic: String, reason: String },
}

impl DispatchError {
    pub(crate) fn transport(topic: &str, err: eyre::Report) -> Self {
        DispatchError::Transport {
            topic: topic.to_string(),
            reason: format!("{err:#}"),
        }
    }
}

/// Three name-to-kind tables, one per shape.
///
/// The tables are derived from [`MessageKind::ALL`], so every kind is
/// registered under exactly one shape.
#[derive(Debug, Clone)]
pub struct RegistrationTable {
    plain: IndexMap<&'static str, MessageKind>,
    stamped: IndexMap<&'static str, MessageKind>,
    stamped_with_child: IndexMap<&'static str, MessageKind>,
}

impl RegistrationTable {
    pub fn new() -> Self {
        let mut table = Self {
            plain: IndexMap::new(),
            stamped: IndexMap::new(),
            stamped_with_child: IndexMap::new(),
        };

        for kind in MessageKind::ALL {
            let entries = match kind.shape() {
                MessageShape::Plain => &mut table.plain,
                MessageShape::StampedWithFrame => &mut table.stamped,
                MessageShape::StampedWithFrameAndChild => &mut table.stamped_with_child,
            };
            entries.insert(kind.type_name(), kind);
        }

        table
    }

    /// The entries registered for one shape.
    pub fn entries(&self, shape: MessageShape) -> &IndexMap<&'static str, MessageKind> {
        match shape {
            MessageShape::Plain => &self.plain,
            MessageShape::StampedWithFrame => &self.stamped,
            MessageShape::StampedWithFrameAndChild => &self.stamped_with_child,
        }
    }

    /// Find the kind registered under `type_name`, trying the plain table,
    /// then the stamped table, then the parent/child table.
    ///
    /// Short names such as `geometry_msgs/Pose` are accepted.
    pub fn lookup(&self, type_name: &str) -> Result<MessageKind, DispatchError> {
        let normalized = normalize_msg_type(type_name);

        MessageShape::LOOKUP_ORDER
            .iter()
            .find_map(|&shape| self.entries(shape).get(normalized.as_str()).copied())
            .ok_or_else(|| DispatchError::UnknownMessageType(type_name.to_string()))
    }

    /// Every registered type name, in lookup order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        MessageShape::LOOKUP_ORDER
            .iter()
            .flat_map(|&shape| self.entries(shape).keys().copied())
    }
}

impl Default for RegistrationTable {
    fn default() -> Self {
        Self::new()
    }
}
