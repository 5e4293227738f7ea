//! Property projection for node inspection.
//!
//! The projector turns the own fields of a node into a display tree of
//! key/kind/type/value entries. It knows nothing about languages: anything
//! implementing [`Inspect`] can be projected, and adapters expose native nodes
//! through [`Inspected`].
//!
//! ## Rules
//!
//! - Keys on the blacklist (back-references such as `parent`) are skipped, so
//!   cyclic structures terminate without identity tracking.
//! - Nodes and objects recurse; non-empty lists are labelled `Array(n)`.
//! - An entry under a numeric key that holds a node takes that node's kind.
//! - Primitives carry their runtime type; strings are shown quoted.
//! - A key named like a kind field (`type`, `kind`) shows its display value
//!   (quoted, for strings) as the entry kind.
//! - Falsy primitives (empty string, zero, `false`, null) are omitted.

use serde::Serialize;

use crate::languages::LanguageAdapter;
use crate::native::NativeNode;

/// Keys skipped by default: parent back-references.
pub const DEFAULT_BLACKLIST: &[&str] = &["parent", "_children"];

/// Field names that conventionally carry a node's kind.
pub const KIND_KEYS: &[&str] = &["type", "kind"];

/// The value of one field of an inspected node.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue<N> {
    /// Absent value
    Null,
    /// Boolean flag
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// String value
    String(String),
    /// Another inspectable node
    Node(N),
    /// Ordered list of values
    List(Vec<PropertyValue<N>>),
    /// Nested record of named values
    Object(Vec<(String, PropertyValue<N>)>),
}

impl<N> PropertyValue<N> {
    /// Convert every node in the value with `f`, keeping the structure.
    pub fn map_nodes<M, F>(self, f: &F) -> PropertyValue<M>
    where
        F: Fn(N) -> M,
    {
        match self {
            Self::Null => PropertyValue::Null,
            Self::Bool(b) => PropertyValue::Bool(b),
            Self::Number(n) => PropertyValue::Number(n),
            Self::String(s) => PropertyValue::String(s),
            Self::Node(node) => PropertyValue::Node(f(node)),
            Self::List(items) => {
                PropertyValue::List(items.into_iter().map(|item| item.map_nodes(f)).collect())
            }
            Self::Object(fields) => PropertyValue::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value.map_nodes(f)))
                    .collect(),
            ),
        }
    }

    fn is_falsy(&self) -> bool {
        match self {
            Self::Null | Self::Bool(false) => true,
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// A value whose own fields can be projected.
pub trait Inspect: Sized {
    /// Kind label of the value.
    fn kind_label(&self) -> String;

    /// Own fields, in declaration order, including back-references.
    fn fields(&self) -> Vec<(String, PropertyValue<Self>)>;
}

/// A native node inspected through its adapter.
#[derive(Clone, Copy)]
pub struct Inspected<'a> {
    adapter: &'a dyn LanguageAdapter,
    node: NativeNode<'a>,
}

impl<'a> Inspected<'a> {
    /// Pair a node with the adapter that knows its fields.
    #[must_use]
    pub fn new(adapter: &'a dyn LanguageAdapter, node: NativeNode<'a>) -> Self {
        Self { adapter, node }
    }
}

impl Inspect for Inspected<'_> {
    fn kind_label(&self) -> String {
        self.adapter.kind(self.node).to_string()
    }

    fn fields(&self) -> Vec<(String, PropertyValue<Self>)> {
        let adapter = self.adapter;
        self.adapter
            .properties(self.node)
            .into_iter()
            .map(|(key, value)| (key, value.map_nodes(&|node| Inspected::new(adapter, node))))
            .collect()
    }
}

/// One row of the property display tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayEntry {
    /// Field name, or list index
    pub key: String,
    /// Kind label, when one applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Runtime type of the value (`string`, `number`, `boolean`, `array`)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Display form of a primitive value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Nested entries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DisplayEntry>,
}

/// Projects inspectable values into display entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projector {
    blacklist: Vec<String>,
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(DEFAULT_BLACKLIST.iter().copied())
    }
}

impl Projector {
    /// Create a projector that skips the given keys at every depth.
    pub fn new<I, S>(blacklist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blacklist: blacklist.into_iter().map(Into::into).collect(),
        }
    }

    /// Keys this projector skips.
    #[must_use]
    pub fn blacklist(&self) -> &[String] {
        &self.blacklist
    }

    /// Entries for the own fields of `node`.
    pub fn project<N: Inspect>(&self, node: &N) -> Vec<DisplayEntry> {
        self.project_fields(node.fields())
    }

    /// A root entry keyed by the node's kind, holding its projected fields.
    pub fn project_root<N: Inspect>(&self, node: &N) -> DisplayEntry {
        DisplayEntry {
            key: node.kind_label(),
            children: self.project(node),
            ..DisplayEntry::default()
        }
    }

    /// Project a field list. Entries still collecting fields wait on an
    /// explicit stack, so deep node chains do not grow the call stack.
    fn project_fields<N: Inspect>(
        &self,
        fields: Vec<(String, PropertyValue<N>)>,
    ) -> Vec<DisplayEntry> {
        let mut stack = vec![Open {
            entry: DisplayEntry::default(),
            pending: fields.into_iter(),
        }];
        while let Some(open) = stack.last_mut() {
            let Some((key, value)) = open.pending.next() else {
                let Some(done) = stack.pop() else { break };
                match stack.last_mut() {
                    Some(parent) => parent.entry.children.push(done.entry),
                    None => return done.entry.children,
                }
                continue;
            };
            if self.blacklist.iter().any(|skipped| *skipped == key) {
                continue;
            }
            match self.step(key, value) {
                Step::Leaf(Some(entry)) => open.entry.children.push(entry),
                Step::Leaf(None) => {}
                Step::Nested(entry, fields) => stack.push(Open {
                    entry,
                    pending: fields.into_iter(),
                }),
            }
        }
        Vec::new()
    }

    fn step<N: Inspect>(&self, key: String, value: PropertyValue<N>) -> Step<N> {
        let numeric_key = key.parse::<usize>().is_ok();
        match value {
            PropertyValue::Node(node) => Step::Nested(
                DisplayEntry {
                    kind: numeric_key.then(|| node.kind_label()),
                    key,
                    ..DisplayEntry::default()
                },
                node.fields(),
            ),
            PropertyValue::List(items) => {
                let (kind, value_type) = if items.is_empty() {
                    (None, None)
                } else {
                    (Some(format!("Array({})", items.len())), Some("array".to_string()))
                };
                let indexed = items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item))
                    .collect();
                Step::Nested(
                    DisplayEntry {
                        key,
                        kind,
                        value_type,
                        ..DisplayEntry::default()
                    },
                    indexed,
                )
            }
            PropertyValue::Object(fields) => Step::Nested(
                DisplayEntry {
                    key,
                    ..DisplayEntry::default()
                },
                fields,
            ),
            primitive => Step::Leaf(primitive_entry(key, &primitive)),
        }
    }
}

/// An entry whose fields are still being projected.
struct Open<N> {
    entry: DisplayEntry,
    pending: std::vec::IntoIter<(String, PropertyValue<N>)>,
}

enum Step<N> {
    Leaf(Option<DisplayEntry>),
    Nested(DisplayEntry, Vec<(String, PropertyValue<N>)>),
}

/// Entry for a primitive value, or `None` when the value is falsy.
fn primitive_entry<N>(key: String, value: &PropertyValue<N>) -> Option<DisplayEntry> {
    if value.is_falsy() {
        return None;
    }
    let (value_type, display) = match value {
        PropertyValue::Bool(b) => ("boolean", b.to_string()),
        PropertyValue::Number(n) => ("number", format_number(*n)),
        PropertyValue::String(s) => ("string", format!("'{s}'")),
        _ => return None,
    };
    Some(DisplayEntry {
        kind: KIND_KEYS.contains(&key.as_str()).then(|| display.clone()),
        key,
        value_type: Some(value_type.to_string()),
        value: Some(display),
        children: Vec::new(),
    })
}

/// Integral numbers print without a fractional part.
#[allow(clippy::cast_possible_truncation)]
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
