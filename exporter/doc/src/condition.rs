use std::{collections::BTreeMap, fmt};

/// A dotted path into the values supplied to the template engine at render time, e.g.
/// `sizing.api.count`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValuePath(Vec<String>);

/// An integer-valued term of a condition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Int(i64),

    /// A render-time value, looked up by path.
    Value(ValuePath),

    /// The target orchestrator's major version.
    KubeMajor,

    /// The target orchestrator's minor version.
    KubeMinor,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cmp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A boolean render-time expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Compare { op: Cmp, lhs: Operand, rhs: Operand },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

/// The render-time inputs a condition is evaluated against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub kube_major: i64,
    pub kube_minor: i64,
    pub values: BTreeMap<ValuePath, i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("no value for {0}")]
    MissingValue(ValuePath),
}

// === impl ValuePath ===

impl ValuePath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for ValuePath {
    fn from(path: &str) -> Self {
        Self::new(path.split('.'))
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

// === impl Operand ===

impl Operand {
    fn resolve(&self, ctx: &RenderContext) -> Result<i64, EvalError> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Value(path) => ctx
                .values
                .get(path)
                .copied()
                .ok_or_else(|| EvalError::MissingValue(path.clone())),
            Self::KubeMajor => Ok(ctx.kube_major),
            Self::KubeMinor => Ok(ctx.kube_minor),
        }
    }
}

impl From<i64> for Operand {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for Operand {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl From<ValuePath> for Operand {
    fn from(path: ValuePath) -> Self {
        Self::Value(path)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Value(path) => write!(f, "(int .Values.{})", path),
            Self::KubeMajor => f.write_str("(int .Capabilities.KubeVersion.Major)"),
            Self::KubeMinor => f.write_str("(int .Capabilities.KubeVersion.Minor)"),
        }
    }
}

// === impl Cmp ===

impl Cmp {
    fn apply(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => f.write_str("eq"),
            Self::Lt => f.write_str("lt"),
            Self::Le => f.write_str("le"),
            Self::Gt => f.write_str("gt"),
            Self::Ge => f.write_str("ge"),
        }
    }
}

// === impl Condition ===

impl Condition {
    pub fn compare(op: Cmp, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Self {
        Self::Compare {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    pub fn eq(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Self {
        Self::compare(Cmp::Eq, lhs, rhs)
    }

    pub fn lt(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Self {
        Self::compare(Cmp::Lt, lhs, rhs)
    }

    pub fn le(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Self {
        Self::compare(Cmp::Le, lhs, rhs)
    }

    pub fn gt(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Self {
        Self::compare(Cmp::Gt, lhs, rhs)
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Evaluates the condition the way the template engine would.
    ///
    /// `and`/`or` stop at the first operand that decides the result, so a missing value on the
    /// right-hand side is only reported when it is reached.
    pub fn evaluate(&self, ctx: &RenderContext) -> Result<bool, EvalError> {
        match self {
            Self::Compare { op, lhs, rhs } => Ok(op.apply(lhs.resolve(ctx)?, rhs.resolve(ctx)?)),
            Self::And(a, b) => Ok(a.evaluate(ctx)? && b.evaluate(ctx)?),
            Self::Or(a, b) => Ok(a.evaluate(ctx)? || b.evaluate(ctx)?),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { op, lhs, rhs } => write!(f, "{} {} {}", op, lhs, rhs),
            Self::And(a, b) => write!(f, "and ({}) ({})", a, b),
            Self::Or(a, b) => write!(f, "or ({}) ({})", a, b),
        }
    }
}

// === impl RenderContext ===

impl RenderContext {
    pub fn new(kube_major: i64, kube_minor: i64) -> Self {
        Self {
            kube_major,
            kube_minor,
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, path: impl Into<ValuePath>, value: i64) -> Self {
        self.values.insert(path.into(), value);
        self
    }
}
