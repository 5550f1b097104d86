//! Wire-level description of the remote scene
//!
//! The remote authority describes its scene either as a full
//! [`NodeDescriptor`] tree or as an ordered stream of [`Op`]s. Both carry
//! untyped [`PropValue`] envelopes that are validated exactly once, at the
//! [`Prop::decode`] boundary, into a closed set of typed properties.

mod kind;
mod value;
mod prop;
mod op;
mod issue;

pub use kind::{Kind, Category};
pub use value::PropValue;
pub use prop::{Prop, UniversalProp, CameraProp, GeometryProp, MaterialProp, ACTIVE_KEY};
pub use op::{Op, NodeDescriptor, NodeId};
pub use issue::ApplyIssue;
