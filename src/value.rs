//! Values, mapping nodes and the mapping capability.
//!
//! A [`Value`] is either an opaque [`Scalar`] or a [`Node`], a shared handle
//! to anything implementing [`Mapping`]. Only the `Mapping` variant is ever
//! traversed into; strings and lists are scalars even though they iterate.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::Error;

/// The default mapping node.
pub type Table = BTreeMap<String, Value>;

/// Zero-argument constructor for empty mapping nodes.
pub type NodeFactory = Rc<dyn Fn() -> Node>;

/// Returns a factory producing empty [`Table`] nodes.
pub fn table_factory() -> NodeFactory {
    Rc::new(|| Node::new(Table::new()))
}

/// Opaque payload stored at a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(toml::value::Datetime),
    List(Vec<Value>),
}

/// A stored value: a scalar or a mapping.
///
/// Cloning never deep-copies. Scalars are reference counted and mappings are
/// handles, so a cloned mapping is the same mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Rc<Scalar>),
    Mapping(Node),
}

impl Value {
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    pub fn as_mapping(&self) -> Option<&Node> {
        match self {
            Value::Mapping(node) => Some(node),
            Value::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            Value::Mapping(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.as_scalar()? {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.as_scalar()? {
            Scalar::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_scalar()? {
            Scalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Identity comparison: the same scalar allocation or the same node.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Rc::ptr_eq(a, b),
            (Value::Mapping(a), Value::Mapping(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Converts to a TOML value, recursing through mappings and lists.
    pub fn to_toml(&self) -> toml::Value {
        match self {
            Value::Mapping(node) => toml::Value::Table(node.to_toml()),
            Value::Scalar(scalar) => match scalar.as_ref() {
                Scalar::String(s) => toml::Value::String(s.clone()),
                Scalar::Integer(i) => toml::Value::Integer(*i),
                Scalar::Float(f) => toml::Value::Float(*f),
                Scalar::Boolean(b) => toml::Value::Boolean(*b),
                Scalar::Datetime(dt) => toml::Value::Datetime(*dt),
                Scalar::List(items) => {
                    toml::Value::Array(items.iter().map(Value::to_toml).collect())
                }
            },
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(Rc::new(scalar))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string()).into()
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Scalar::String(s).into()
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Scalar::Integer(i).into()
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Scalar::Integer(i64::from(i)).into()
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Scalar::Float(f).into()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b).into()
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Scalar::List(items).into()
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Mapping(node)
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Scalar::String(s).into(),
            toml::Value::Integer(i) => Scalar::Integer(i).into(),
            toml::Value::Float(f) => Scalar::Float(f).into(),
            toml::Value::Boolean(b) => Scalar::Boolean(b).into(),
            toml::Value::Datetime(dt) => Scalar::Datetime(dt).into(),
            toml::Value::Array(items) => {
                Scalar::List(items.into_iter().map(Value::from).collect()).into()
            }
            toml::Value::Table(table) => Value::Mapping(Node::from(table)),
        }
    }
}

/// The mapping capability: insert, lookup, delete, membership and keys.
///
/// Implementations decide how a key is interpreted. Plain maps treat every
/// key atomically; [`PathDict`](crate::PathDict) splits delimited paths.
pub trait Mapping: fmt::Debug {
    /// Looks up `key`, failing with [`Error::MissingKey`] if it is absent.
    fn get(&self, key: &str) -> Result<Value, Error>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), Error>;

    /// Removes `key` and returns the value it held.
    fn delete(&mut self, key: &str) -> Result<Value, Error>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    /// Direct keys of this node, one level only.
    fn keys(&self) -> Vec<String>;

    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Mapping for BTreeMap<String, Value> {
    fn get(&self, key: &str) -> Result<Value, Error> {
        BTreeMap::get(self, key)
            .cloned()
            .ok_or_else(|| Error::missing(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), Error> {
        self.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<Value, Error> {
        self.remove(key).ok_or_else(|| Error::missing(key))
    }

    fn contains(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

impl Mapping for HashMap<String, Value> {
    fn get(&self, key: &str) -> Result<Value, Error> {
        HashMap::get(self, key)
            .cloned()
            .ok_or_else(|| Error::missing(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), Error> {
        self.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<Value, Error> {
        self.remove(key).ok_or_else(|| Error::missing(key))
    }

    fn contains(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        HashMap::keys(self).cloned().collect()
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

/// Shared handle to a mapping.
///
/// Clones refer to the same mapping. Use [`ptr_eq`](Self::ptr_eq) for
/// identity; `==` compares contents.
#[derive(Clone)]
pub struct Node(Rc<RefCell<dyn Mapping>>);

impl Node {
    pub fn new<M: Mapping + 'static>(mapping: M) -> Self {
        Node(Rc::new(RefCell::new(mapping)))
    }

    pub fn get(&self, key: &str) -> Result<Value, Error> {
        self.0.borrow().get(key)
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), Error> {
        self.0.borrow_mut().set(key, value.into())
    }

    pub fn delete(&self, key: &str) -> Result<Value, Error> {
        self.0.borrow_mut().delete(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.borrow().contains(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Copies this mapping into a TOML table.
    pub fn to_toml(&self) -> toml::Table {
        let mut table = toml::Table::new();
        for key in self.keys() {
            if let Ok(value) = self.get(&key) {
                table.insert(key, value.to_toml());
            }
        }
        table
    }

    /// Deserializes this mapping into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, Error> {
        toml::Value::Table(self.to_toml())
            .try_into()
            .map_err(Error::Deserialize)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(mapping) => fmt::Debug::fmt(&*mapping, f),
            Err(_) => f.write_str("Node(<borrowed>)"),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let mut keys = self.keys();
        let mut other_keys = other.keys();
        keys.sort();
        other_keys.sort();
        keys == other_keys
            && keys
                .iter()
                .all(|key| match (self.get(key), other.get(key)) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                })
    }
}

impl From<toml::Table> for Node {
    fn from(table: toml::Table) -> Self {
        let converted: Table = table
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect();
        Node::new(converted)
    }
}
