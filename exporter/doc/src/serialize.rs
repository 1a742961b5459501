//! Serialization of document trees.
//!
//! Unguarded nodes serialize as plain values. A guarded node serializes as a mapping with an
//! `if` key holding the rendered condition and a `then` key holding the node, which a template
//! engine turns into a conditional block.

use crate::node::{Mapping, Node, Scalar};
use serde::ser::{Serialize, SerializeMap, Serializer};

pub(crate) const GUARD_CONDITION_KEY: &str = "if";
pub(crate) const GUARD_NODE_KEY: &str = "then";

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(s) => s.serialize(serializer),
            Self::Mapping(m) => m.serialize(serializer),
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Guarded { condition, node } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(GUARD_CONDITION_KEY, &condition.to_string())?;
                map.serialize_entry(GUARD_NODE_KEY, node)?;
                map.end()
            }
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Ref(_) | Self::Fail(_) => serializer.collect_str(self),
        }
    }
}
