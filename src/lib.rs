#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod angles;
mod barrier;
mod builder;
mod errors;
mod forces;
mod geometry;
mod params;
pub mod resolver;
mod topology;

pub use barrier::{Anchor, BarrierConfig, Cable, CableKind, Support, RETENTION_ANCHOR_PREFIX};
pub use builder::{build, build_with, Layout, SlopeSide};
pub use errors::{BarrierEditError, BuildError, ConfigError, UnknownFieldError};
pub use forces::{aggregate, ForceResult};
pub use geometry::{point, Point};
pub use params::{BarrierParameters, Field, Limits};
pub use resolver::{
    apply, recalculate, validate, ChangeReason, FieldValidation, ParameterChange, Resolution,
};
pub use topology::{Element, ElementKind, Topology};
