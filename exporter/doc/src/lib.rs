//! Document trees for exported manifests.
//!
//! A [`Node`] is an ordered key/value tree. Any node may be wrapped in a guard: a [`Condition`]
//! that a downstream template engine evaluates at render time to decide whether the node is
//! emitted at all. Documents without guards are plain manifests; the same tree type serves both
//! static and templated output.
//!
//! Conditions are data. They render into the template language with `Display` and may be
//! evaluated directly against a [`RenderContext`], which is how their coverage is checked.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod condition;
mod node;
mod serialize;

pub use self::{
    condition::{Cmp, Condition, EvalError, Operand, RenderContext, ValuePath},
    node::{Mapping, Node, Scalar},
};
