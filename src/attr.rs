//! Dynamic attribute graph over which representations, arrays, and CRS objects
//! are addressed.
//!
//! Interchange packages hand us deeply nested, schema-typed objects. Rather
//! than guessing getters per schema variant, everything is modelled as a
//! [`Value`] tree with an explicit dot-path [`get`](Value::get) and a
//! transitive [`find_attributes`](Value::find_attributes) query. Attribute
//! names are matched case-insensitively everywhere.

use crate::float_types::Real;

/// A node in the attribute graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(Real),
    Text(String),
    List(Vec<Value>),
    Object(ObjectNode),
}

/// A typed object: its schema type name plus ordered attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    pub type_name: String,
    pub attrs: Vec<(String, Value)>,
}

impl ObjectNode {
    pub fn new(type_name: impl Into<String>) -> Self {
        ObjectNode {
            type_name: type_name.into(),
            attrs: Vec::new(),
        }
    }

    /// Builder-style attribute append, preserving insertion order.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Immediate attribute lookup, case-insensitive.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

impl Value {
    /// Resolve a `.`-separated path of attribute names and list indices.
    ///
    /// Names are matched case-insensitively; a segment that parses as an
    /// unsigned integer indexes into a list. The empty path resolves to
    /// `self`.
    pub fn get(&self, dot_path: &str) -> Option<&Value> {
        let mut current = self;
        for segment in dot_path.split('.') {
            if segment.is_empty() {
                continue;
            }
            current = match current {
                Value::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                Value::Object(obj) => obj.attr(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Collect every attribute, transitively, whose name satisfies `pred`,
    /// paired with its full dot path from `self`.
    ///
    /// List elements contribute their index as a path segment but are not
    /// themselves name-matched.
    pub fn find_attributes<F>(&self, pred: F) -> Vec<(String, &Value)>
    where
        F: Fn(&str) -> bool,
    {
        let mut found = Vec::new();
        self.walk(String::new(), &pred, &mut found);
        found
    }

    /// All attributes whose name equals `name`, ignoring case.
    pub fn find_named(&self, name: &str) -> Vec<(String, &Value)> {
        self.find_attributes(|n| n.eq_ignore_ascii_case(name))
    }

    fn walk<'a, F>(&'a self, path: String, pred: &F, found: &mut Vec<(String, &'a Value)>)
    where
        F: Fn(&str) -> bool,
    {
        match self {
            Value::Object(obj) => {
                for (name, value) in &obj.attrs {
                    let child_path = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}.{name}")
                    };
                    if pred(name) {
                        found.push((child_path.clone(), value));
                    }
                    value.walk(child_path, pred, found);
                }
            },
            Value::List(items) => {
                for (index, value) in items.iter().enumerate() {
                    let child_path = if path.is_empty() {
                        index.to_string()
                    } else {
                        format!("{path}.{index}")
                    };
                    value.walk(child_path, pred, found);
                }
            },
            _ => {},
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric read with Int → Double coercion.
    pub fn as_f64(&self) -> Option<Real> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(*i as Real),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub const fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

/// The dot path of the enclosing node, or `None` at the root.
///
/// `"a.b.c"` → `"a.b"`, `"a"` → `""`, `""` → `None`.
pub fn parent_path(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(match path.rfind('.') {
        Some(split) => &path[..split],
        None => "",
    })
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    #[allow(clippy::unnecessary_cast)]
    fn from(v: f64) -> Self {
        Value::Double(v as Real)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<ObjectNode> for Value {
    fn from(v: ObjectNode) -> Self {
        Value::Object(v)
    }
}
