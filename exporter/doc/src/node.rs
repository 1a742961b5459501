use crate::condition::{Condition, ValuePath};
use std::fmt;

/// A document tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Mapping(Mapping),
    Sequence(Vec<Node>),

    /// A node that is only emitted when `condition` holds at render time.
    Guarded {
        condition: Condition,
        node: Box<Node>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),

    /// A reference to a render-time value, substituted by the template engine.
    Ref(ValuePath),

    /// Aborts rendering with the given message when emitted.
    Fail(String),
}

/// An ordered mapping with string keys and an optional comment.
///
/// Keys are unique: adding an existing key replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
    comment: Option<String>,
}

// === impl Node ===

impl Node {
    /// Converts any serializable value into a tree.
    pub fn from_serializable<T: serde::Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    /// Wraps this node in a guard. A node that is already guarded has its condition replaced.
    #[must_use]
    pub fn guarded(self, condition: Condition) -> Self {
        let node = match self {
            Self::Guarded { node, .. } => node,
            node => Box::new(node),
        };
        Self::Guarded { condition, node }
    }

    /// Guards this node in place.
    pub fn guard(&mut self, condition: Condition) {
        let node = std::mem::replace(self, Self::Scalar(Scalar::Null));
        *self = node.guarded(condition);
    }

    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Self::Guarded { condition, .. } => Some(condition),
            _ => None,
        }
    }

    /// Returns the node with any guard removed.
    pub fn unguarded(&self) -> &Self {
        match self {
            Self::Guarded { node, .. } => node.unguarded(),
            node => node,
        }
    }

    fn unguarded_mut(&mut self) -> &mut Self {
        match self {
            Self::Guarded { node, .. } => node.unguarded_mut(),
            node => node,
        }
    }

    /// Returns the mapping held by this node, looking through guards.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self.unguarded() {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the mapping held by this node, looking through guards.
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self.unguarded_mut() {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self.unguarded() {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self.unguarded() {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Scalar> for Node {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<Mapping> for Node {
    fn from(m: Mapping) -> Self {
        Self::Mapping(m)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Self::Sequence(items)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::Str(s.to_string()))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::Str(s))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Self::Scalar(Scalar::Int(n))
    }
}

impl From<u32> for Node {
    fn from(n: u32) -> Self {
        Self::Scalar(Scalar::Int(n.into()))
    }
}

impl From<u16> for Node {
    fn from(n: u16) -> Self {
        Self::Scalar(Scalar::Int(n.into()))
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Scalar::Null.into(),
            Value::Bool(b) => b.into(),
            Value::Number(n) => match n.as_i64() {
                Some(i) => i.into(),
                None => Scalar::Float(n.as_f64().unwrap_or_default()).into(),
            },
            Value::String(s) => s.into(),
            Value::Array(items) => items.into_iter().map(Self::from).collect::<Vec<_>>().into(),
            Value::Object(map) => map.into_iter().collect::<Mapping>().into(),
        }
    }
}

// === impl Scalar ===

/// Scalars are rendered as they appear in a template. References and failures become template
/// directives.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Str(s) => f.write_str(s),
            Self::Ref(path) => write!(f, "{{{{ .Values.{} }}}}", path),
            Self::Fail(message) => write!(f, "{{{{ fail {:?} }}}}", message),
        }
    }
}

// === impl Mapping ===

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment(comment: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            comment: Some(comment.into()),
        }
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Appends an entry, or replaces the value of an existing key without moving it.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Node>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Adds an entry that is only emitted when `condition` holds.
    pub fn add_guarded(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Node>,
        condition: Condition,
    ) -> &mut Self {
        self.add(key, value.into().guarded(condition))
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Follows a path of keys through nested mappings.
    pub fn get_path(&self, path: &[&str]) -> Option<&Node> {
        let (last, parents) = path.split_last()?;
        let mut mapping = self;
        for key in parents {
            mapping = mapping.get(key)?.as_mapping()?;
        }
        mapping.get(last)
    }

    /// Follows a path of keys to a nested mapping. An empty path returns this mapping.
    pub fn get_mapping_mut(&mut self, path: &[&str]) -> Option<&mut Mapping> {
        let mut mapping = self;
        for key in path {
            mapping = mapping.get_mut(key)?.as_mapping_mut()?;
        }
        Some(mapping)
    }

    /// Returns the mapping held at `key`, first storing an empty mapping there if the key is
    /// absent or holds something else. New keys are appended. A guard on an existing entry is
    /// kept.
    pub fn mapping_entry(&mut self, key: impl Into<String>) -> &mut Mapping {
        let key = key.into();
        let idx = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key, Mapping::new().into()));
                self.entries.len() - 1
            }
        };

        let node = self.entries[idx].1.unguarded_mut();
        if !matches!(node, Node::Mapping(_)) {
            *node = Mapping::new().into();
        }
        match node {
            Node::Mapping(m) => m,
            _ => unreachable!("entry was just set to a mapping"),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Orders entries by key. Nested mappings are not affected.
    pub fn sort(&mut self) {
        self.entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    }

    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.sort();
        self
    }
}

impl<K: Into<String>, V: Into<Node>> std::iter::FromIterator<(K, V)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut mapping = Self::new();
        for (k, v) in iter {
            mapping.add(k, v);
        }
        mapping
    }
}
