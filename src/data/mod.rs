//! # Data Context
//!
//! Dot-path lookup and predicate evaluation over a JSON data payload, used by
//! the data-driven nodes (Template, Conditional, Each) and by `when`
//! visibility predicates and `{path}` text interpolation.
//!
//! Evaluation is side-effect-free and total: a missing path is `None`, never
//! an error. Conditions are evaluated once, during measurement; the layout
//! pass never sees the context.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Evaluation context holding the data payload and scoped bindings
/// (introduced by `Each` iteration and `Template` rebinding).
#[derive(Debug, Clone, Default)]
pub struct DataContext {
    data: Value,
    scope: HashMap<String, Value>,
}

impl DataContext {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            scope: HashMap::new(),
        }
    }

    /// An empty context for documents without dynamic content.
    pub fn empty() -> Self {
        Self::new(Value::Null)
    }

    /// Resolve a dot-separated path, checking scope bindings first, then the
    /// root data. Array elements are addressed by numeric segments.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.is_empty() {
            return None;
        }
        if let Some(scoped) = self.scope.get(parts[0]) {
            return traverse(scoped, &parts[1..]);
        }
        traverse(&self.data, &parts)
    }

    /// Child context with an additional scope binding.
    pub fn with_binding(&self, key: &str, value: Value) -> DataContext {
        let mut scope = self.scope.clone();
        scope.insert(key.to_string(), value);
        DataContext {
            data: self.data.clone(),
            scope,
        }
    }

    /// Child context whose root data is replaced (Template rebinding).
    /// Scope bindings carry through.
    pub fn with_root(&self, data: Value) -> DataContext {
        DataContext {
            data,
            scope: self.scope.clone(),
        }
    }
}

/// Traverse a JSON value by dot-path segments.
fn traverse<'a>(value: &'a Value, parts: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in parts {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            Value::Array(arr) => {
                let idx: usize = part.parse().ok()?;
                current = arr.get(idx)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Snapshot handed to opaque predicates: the data context plus the space the
/// node is being measured into.
pub struct PredicateScope<'a> {
    pub ctx: &'a DataContext,
    pub available_width: i32,
    pub available_height: i32,
}

/// An opaque host-supplied predicate.
#[derive(Clone)]
pub struct Predicate(pub Arc<dyn Fn(&PredicateScope<'_>) -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&PredicateScope<'_>) -> bool + Send + Sync + 'static,
    {
        Predicate(Arc::new(f))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A visibility/branch condition: a path-and-operator form, a combinator, or
/// an opaque predicate function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Condition {
    /// The path resolves to any value (including null).
    Exists { path: String },
    /// The path resolves to a truthy value.
    Truthy { path: String },
    Eq { path: String, value: Value },
    Ne { path: String, value: Value },
    Gt { path: String, value: f64 },
    Lt { path: String, value: f64 },
    Gte { path: String, value: f64 },
    Lte { path: String, value: f64 },
    Not { condition: Box<Condition> },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    /// Host-supplied predicate; not representable in JSON documents.
    #[serde(skip)]
    Custom(Predicate),
}

impl Condition {
    /// Evaluate against the context and the available space. Total: missing
    /// paths compare as absent, never raise.
    pub fn evaluate(&self, scope: &PredicateScope<'_>) -> bool {
        match self {
            Condition::Exists { path } => scope.ctx.lookup(path).is_some(),
            Condition::Truthy { path } => scope.ctx.lookup(path).is_some_and(is_truthy),
            Condition::Eq { path, value } => scope
                .ctx
                .lookup(path)
                .is_some_and(|v| values_equal(v, value)),
            Condition::Ne { path, value } => !scope
                .ctx
                .lookup(path)
                .is_some_and(|v| values_equal(v, value)),
            Condition::Gt { path, value } => compare(scope.ctx, path, |n| n > *value),
            Condition::Lt { path, value } => compare(scope.ctx, path, |n| n < *value),
            Condition::Gte { path, value } => compare(scope.ctx, path, |n| n >= *value),
            Condition::Lte { path, value } => compare(scope.ctx, path, |n| n <= *value),
            Condition::Not { condition } => !condition.evaluate(scope),
            Condition::All { conditions } => conditions.iter().all(|c| c.evaluate(scope)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.evaluate(scope)),
            Condition::Custom(pred) => (pred.0)(scope),
        }
    }
}

/// Value equality with numeric coercion: JSON `3` and `3.0` compare equal,
/// everything else uses structural equality.
fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Value::Number(x), Value::Number(y)) = (a, b) {
        return x.as_f64() == y.as_f64();
    }
    a == b
}

fn compare(ctx: &DataContext, path: &str, op: impl Fn(f64) -> bool) -> bool {
    ctx.lookup(path)
        .and_then(Value::as_f64)
        .is_some_and(op)
}

/// Truthiness of a JSON value: null, false, 0, "", and [] are falsy.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// Render a JSON value for text interpolation.
pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Expand `{path}` placeholders in text against the context. Unresolvable
/// placeholders expand to the empty string. A brace without a closing match
/// passes through verbatim.
pub fn interpolate(text: &str, ctx: &DataContext) -> String {
    if !text.contains('{') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        match rest[open + 1..].find('}') {
            Some(close) => {
                let path = &rest[open + 1..open + 1 + close];
                if let Some(value) = ctx.lookup(path) {
                    out.push_str(&value_to_string(value));
                }
                rest = &rest[open + close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
