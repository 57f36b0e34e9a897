//! Configuration parsing and validation for the relay.

use crate::{
    geometry::FrameTransform,
    types::{DeliveryConfig, Durability, History, Reliability, TransformSpec, normalize_msg_type},
};
use eyre::{Result, WrapErr, bail, ensure};
use itertools::Itertools;
use nalgebra::Vector3;
use serde::Deserialize;
use std::{fs, path::Path};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The frame convention change applied to every relayed message.
    #[serde(default)]
    pub convention: Convention,

    /// Rotation and translation used when `convention` is `custom`.
    #[serde(default)]
    pub custom: Option<CustomTransformConfig>,

    /// Apply the inverse of the selected convention change, e.g. to relay
    /// maritime messages back into mobile-robot conventions.
    #[serde(default)]
    pub invert: bool,

    /// Default delivery options for every transform.
    #[serde(default)]
    pub qos: DeliveryConfig,

    /// The topics to relay.
    pub transforms: Vec<TransformConfig>,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        ensure!(
            !self.transforms.is_empty(),
            "At least one transform is required"
        );

        validate_delivery(&self.qos, "qos")?;

        match (self.convention, &self.custom) {
            (Convention::Custom, None) => {
                bail!("convention 'custom' requires a 'custom' section")
            }
            (Convention::Custom, Some(custom)) => custom.validate()?,
            (_, Some(_)) => {
                bail!("A 'custom' section is only allowed with convention 'custom'")
            }
            (_, None) => {}
        }

        for (i, entry) in self.transforms.iter().enumerate() {
            ensure!(
                !entry.msg_type.is_empty(),
                "Transform type at index {} cannot be empty",
                i
            );
            ensure!(
                !entry.input.is_empty(),
                "Input topic at index {} cannot be empty",
                i
            );
            ensure!(
                !entry.output.is_empty(),
                "Output topic at index {} cannot be empty",
                i
            );
            ensure!(
                entry.input != entry.output,
                "Transform at index {} reads and writes the same topic: {}",
                i,
                entry.input
            );

            if let Some(output_type) = &entry.output_type {
                ensure!(
                    !output_type.is_empty(),
                    "Output type at index {} cannot be empty",
                    i
                );
            }

            if let Some(qos) = &entry.qos {
                validate_delivery(&qos.merge(self.qos), &format!("transforms[{}].qos", i))?;
            }
        }

        // An input topic carries exactly one message type.
        let types_by_input = self
            .transforms
            .iter()
            .map(|entry| (entry.input.as_str(), normalize_msg_type(&entry.msg_type)))
            .into_group_map();

        for (input, types) in types_by_input {
            let distinct: Vec<_> = types.into_iter().unique().collect();
            if distinct.len() > 1 {
                bail!(
                    "Input topic {} is listed with conflicting message types: {}",
                    input,
                    distinct.join(", ")
                );
            }
        }

        Ok(())
    }

    /// Build the frame transform selected by this configuration.
    pub fn frame_transform(&self) -> Result<FrameTransform> {
        let transform = match self.convention {
            Convention::Identity => FrameTransform::identity(),
            Convention::FluToFrd => FrameTransform::flu_to_frd(),
            Convention::EnuToNed => FrameTransform::enu_to_ned(),
            Convention::Custom => {
                let Some(custom) = &self.custom else {
                    bail!("convention 'custom' requires a 'custom' section");
                };
                custom.to_frame_transform()
            }
        };

        Ok(if self.invert {
            transform.inverse()
        } else {
            transform
        })
    }

    /// Convert the transform entries to dispatcher specs, in file order.
    pub fn specs(&self) -> Vec<TransformSpec> {
        self.transforms
            .iter()
            .map(|entry| TransformSpec {
                message_type: entry.msg_type.clone(),
                input_topic: entry.input.clone(),
                output_topic: entry.output.clone(),
                frame_id: entry.frame_id.clone(),
                child_frame_id: entry.child_frame_id.clone(),
                output_type: entry.output_type.clone(),
                delivery: entry
                    .qos
                    .map_or(self.qos, |overrides| overrides.merge(self.qos)),
            })
            .collect()
    }
}

fn validate_delivery(delivery: &DeliveryConfig, section: &str) -> Result<()> {
    if delivery.history == History::KeepLast {
        ensure!(
            delivery.depth > 0,
            "{}.depth must be greater than zero with keep_last history",
            section
        );
    }
    Ok(())
}

/// The frame convention change to apply.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Convention {
    /// Relay without changing geometry; only frame identifiers are rewritten.
    Identity,
    /// Forward-left-up body axes to forward-right-down.
    #[default]
    FluToFrd,
    /// East-north-up world axes to north-east-down.
    EnuToNed,
    /// Rotation and translation from the `custom` section.
    Custom,
}

/// A user-supplied rigid transform.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomTransformConfig {
    pub rotation: RotationConfig,

    /// Translation applied to position-like fields, `[x, y, z]`.
    #[serde(default)]
    pub translation: [f64; 3],
}

impl CustomTransformConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.translation.iter().all(|t| t.is_finite()),
            "custom.translation must be finite"
        );

        match self.rotation {
            RotationConfig::Euler { roll, pitch, yaw } => {
                ensure!(
                    roll.is_finite() && pitch.is_finite() && yaw.is_finite(),
                    "custom.rotation angles must be finite"
                );
            }
            RotationConfig::Quaternion { x, y, z, w } => {
                let norm = (x * x + y * y + z * z + w * w).sqrt();
                ensure!(
                    norm.is_finite() && norm > 0.0,
                    "custom.rotation quaternion must have a finite, non-zero norm"
                );
            }
        }

        Ok(())
    }

    fn to_frame_transform(&self) -> FrameTransform {
        let rotation = match self.rotation {
            RotationConfig::Euler { roll, pitch, yaw } => FrameTransform::from_rpy(roll, pitch, yaw),
            RotationConfig::Quaternion { x, y, z, w } => FrameTransform::from_quaternion(x, y, z, w),
        };
        let [x, y, z] = self.translation;
        rotation.with_translation(Vector3::new(x, y, z))
    }
}

/// A rotation given either as roll/pitch/yaw in radians or as a quaternion.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RotationConfig {
    Euler { roll: f64, pitch: f64, yaw: f64 },
    Quaternion { x: f64, y: f64, z: f64, w: f64 },
}

/// Configuration for one relayed topic.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    /// The message type (e.g., "geometry_msgs/msg/PoseStamped").
    #[serde(rename = "type")]
    pub msg_type: String,

    /// The topic to read from.
    pub input: String,

    /// The topic to write the transformed messages to.
    pub output: String,

    /// Frame identifier written into stamped messages.
    #[serde(default)]
    pub frame_id: Option<String>,

    /// Child frame identifier written into parent/child messages.
    #[serde(default)]
    pub child_frame_id: Option<String>,

    /// Publish this type instead of `type`, e.g. `geometry_msgs/msg/Twist`
    /// for a `TwistStamped` input.
    #[serde(default)]
    pub output_type: Option<String>,

    /// Delivery options overriding the top-level `qos`.
    #[serde(default)]
    pub qos: Option<DeliveryOverride>,
}

/// Per-transform delivery options. Fields left out keep the top-level value.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct DeliveryOverride {
    #[serde(default)]
    pub history: Option<History>,
    #[serde(default)]
    pub depth: Option<u32>,
    #[serde(default)]
    pub reliability: Option<Reliability>,
    #[serde(default)]
    pub durability: Option<Durability>,
}

impl DeliveryOverride {
    /// Apply the set fields on top of `base`.
    pub fn merge(self, base: DeliveryConfig) -> DeliveryConfig {
        DeliveryConfig {
            history: self.history.unwrap_or(base.history),
            depth: self.depth.unwrap_or(base.depth),
            reliability: self.reliability.unwrap_or(base.reliability),
            durability: self.durability.unwrap_or(base.durability),
        }
    }
}
