//! Concrete value models for the two bridged object models.
//!
//! Both sides are reference counted ([`Rc`]): cloning a handle aliases the
//! underlying object, it never deep-copies. A handle pairs a dynamic class
//! with a representation:
//!
//! - [`NativeHandle`] — a host object. Its class is a [`NativeClassId`] into
//!   the [`Env`](crate::env::Env) class graph, so is-instance-of matching is
//!   inheritance aware.
//! - [`ManagedHandle`] — a managed-runtime object. Its class identity is a
//!   fully-qualified name string; matching on this side is exact.
//!
//! Handles compare and hash structurally so they can serve as map keys and
//! set members. Float payloads use `OrderedFloat` to stay `Eq + Hash`.
//!
//! Native lists are internally mutable ([`RefCell`]) so the host model can
//! express aliased and even self-referential object graphs. A handle that is
//! a map key or set member must not be mutated afterwards, and comparing,
//! hashing, or displaying a self-referential graph recurses without bound.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use ordered_float::OrderedFloat;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};

use crate::env::NativeClassId;
use crate::error::HandleError;

// ============================================================================
// Numeric kinds
// ============================================================================

/// A boxed host number, tagged with its exact width.
///
/// The host model boxes every numeric kind the underlying platform has,
/// including the unsigned widths the managed model lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeNumber {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(OrderedFloat<f32>),
    F64(OrderedFloat<f64>),
}

/// A boxed managed number, tagged with its boxed class kind.
///
/// The managed model has only signed integer widths; see the number coercion
/// for how unsigned host kinds widen into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagedNumber {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(OrderedFloat<f32>),
    Double(OrderedFloat<f64>),
}

macro_rules! impl_number_from {
    ($enum:ident { $($ty:ty => $variant:ident),* $(,)? }) => {
        $(
            impl From<$ty> for $enum {
                fn from(value: $ty) -> Self {
                    $enum::$variant(value)
                }
            }
        )*
    };
}

impl_number_from!(NativeNumber {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
});

impl From<f32> for NativeNumber {
    fn from(value: f32) -> Self {
        NativeNumber::F32(OrderedFloat(value))
    }
}

impl From<f64> for NativeNumber {
    fn from(value: f64) -> Self {
        NativeNumber::F64(OrderedFloat(value))
    }
}

impl_number_from!(ManagedNumber {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
});

impl From<f32> for ManagedNumber {
    fn from(value: f32) -> Self {
        ManagedNumber::Float(OrderedFloat(value))
    }
}

impl From<f64> for ManagedNumber {
    fn from(value: f64) -> Self {
        ManagedNumber::Double(OrderedFloat(value))
    }
}

impl fmt::Display for NativeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeNumber::Bool(v) => write!(f, "{v}"),
            NativeNumber::I8(v) => write!(f, "{v}"),
            NativeNumber::I16(v) => write!(f, "{v}"),
            NativeNumber::I32(v) => write!(f, "{v}"),
            NativeNumber::I64(v) => write!(f, "{v}"),
            NativeNumber::U8(v) => write!(f, "{v}"),
            NativeNumber::U16(v) => write!(f, "{v}"),
            NativeNumber::U32(v) => write!(f, "{v}"),
            NativeNumber::U64(v) => write!(f, "{v}"),
            NativeNumber::F32(v) => write!(f, "{v}"),
            NativeNumber::F64(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for ManagedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagedNumber::Bool(v) => write!(f, "{v}"),
            ManagedNumber::Byte(v) => write!(f, "{v}"),
            ManagedNumber::Short(v) => write!(f, "{v}"),
            ManagedNumber::Int(v) => write!(f, "{v}"),
            ManagedNumber::Long(v) => write!(f, "{v}"),
            ManagedNumber::Float(v) => write!(f, "{v}"),
            ManagedNumber::Double(v) => write!(f, "{v}"),
        }
    }
}

// ============================================================================
// Native representation
// ============================================================================

/// The content of a native host object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeRepr {
    /// The host null singleton value.
    Null,
    /// String content.
    Str(String),
    /// A boxed number.
    Number(NativeNumber),
    /// Seconds relative to the host reference date (2001-01-01T00:00:00Z).
    Date(OrderedFloat<f64>),
    /// An ordered sequence. Internally mutable so object graphs can alias.
    List(RefCell<Vec<NativeHandle>>),
    /// A key-to-value mapping.
    Map(FxHashMap<NativeHandle, NativeHandle>),
    /// An unordered unique collection.
    Set(FxHashSet<NativeHandle>),
}

impl NativeRepr {
    /// A human-readable name for this representation.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NativeRepr::Null => "null",
            NativeRepr::Str(_) => "string",
            NativeRepr::Number(_) => "number",
            NativeRepr::Date(_) => "date",
            NativeRepr::List(_) => "list",
            NativeRepr::Map(_) => "map",
            NativeRepr::Set(_) => "set",
        }
    }
}

impl Hash for NativeRepr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            NativeRepr::Null => {}
            NativeRepr::Str(s) => s.hash(state),
            NativeRepr::Number(n) => n.hash(state),
            NativeRepr::Date(t) => t.hash(state),
            NativeRepr::List(items) => {
                for item in items.borrow().iter() {
                    item.hash(state);
                }
            }
            NativeRepr::Map(entries) => state.write_u64(unordered_hash(entries.iter())),
            NativeRepr::Set(members) => state.write_u64(unordered_hash(members.iter())),
        }
    }
}

// ============================================================================
// Managed representation
// ============================================================================

/// The content of a managed-runtime object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagedRepr {
    /// The managed null value.
    Null,
    /// String content.
    Str(String),
    /// A boxed number.
    Number(ManagedNumber),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    /// An ordered sequence.
    List(Vec<ManagedHandle>),
    /// A key-to-value mapping.
    Map(FxHashMap<ManagedHandle, ManagedHandle>),
    /// An unordered unique collection.
    Set(FxHashSet<ManagedHandle>),
}

impl ManagedRepr {
    /// A human-readable name for this representation.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ManagedRepr::Null => "null",
            ManagedRepr::Str(_) => "string",
            ManagedRepr::Number(_) => "number",
            ManagedRepr::Date(_) => "date",
            ManagedRepr::List(_) => "list",
            ManagedRepr::Map(_) => "map",
            ManagedRepr::Set(_) => "set",
        }
    }
}

impl Hash for ManagedRepr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ManagedRepr::Null => {}
            ManagedRepr::Str(s) => s.hash(state),
            ManagedRepr::Number(n) => n.hash(state),
            ManagedRepr::Date(t) => t.hash(state),
            ManagedRepr::List(items) => {
                for item in items {
                    item.hash(state);
                }
            }
            ManagedRepr::Map(entries) => state.write_u64(unordered_hash(entries.iter())),
            ManagedRepr::Set(members) => state.write_u64(unordered_hash(members.iter())),
        }
    }
}

/// Order-independent combined hash for map entries and set members.
fn unordered_hash<T: Hash>(items: impl Iterator<Item = T>) -> u64 {
    items.fold(0u64, |acc, item| {
        let mut hasher = FxHasher::default();
        item.hash(&mut hasher);
        acc ^ hasher.finish()
    })
}

// ============================================================================
// Handles
// ============================================================================

#[derive(Debug, PartialEq, Eq, Hash)]
struct NativeObject {
    class: NativeClassId,
    repr: NativeRepr,
}

/// A reference-counted handle to a native host object.
///
/// Cloning aliases the object. The coercion machinery never retains a handle
/// past the call it was passed into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeHandle(Rc<NativeObject>);

impl NativeHandle {
    pub(crate) fn new(class: NativeClassId, repr: NativeRepr) -> Self {
        NativeHandle(Rc::new(NativeObject { class, repr }))
    }

    /// The dynamic class of this object.
    pub fn class(&self) -> NativeClassId {
        self.0.class
    }

    /// The underlying representation.
    pub fn repr(&self) -> &NativeRepr {
        &self.0.repr
    }

    /// Check whether this is the host null value.
    pub fn is_null(&self) -> bool {
        matches!(self.0.repr, NativeRepr::Null)
    }

    /// Read the string content of this handle.
    pub fn string_value(&self) -> Result<&str, HandleError> {
        match &self.0.repr {
            NativeRepr::Str(s) => Ok(s),
            other => Err(wrong_native_repr("string", other.kind_name())),
        }
    }

    /// Read the boxed number held by this handle.
    pub fn number_value(&self) -> Result<NativeNumber, HandleError> {
        match &self.0.repr {
            NativeRepr::Number(n) => Ok(*n),
            other => Err(wrong_native_repr("number", other.kind_name())),
        }
    }

    /// Read the date instant as seconds relative to the host reference date.
    pub fn date_value(&self) -> Result<f64, HandleError> {
        match &self.0.repr {
            NativeRepr::Date(t) => Ok(t.0),
            other => Err(wrong_native_repr("date", other.kind_name())),
        }
    }

    /// Borrow the elements of this list.
    pub fn list_value(&self) -> Result<Ref<'_, Vec<NativeHandle>>, HandleError> {
        match &self.0.repr {
            NativeRepr::List(items) => Ok(items.borrow()),
            other => Err(wrong_native_repr("list", other.kind_name())),
        }
    }

    /// Read the entries of this map.
    pub fn map_value(&self) -> Result<&FxHashMap<NativeHandle, NativeHandle>, HandleError> {
        match &self.0.repr {
            NativeRepr::Map(entries) => Ok(entries),
            other => Err(wrong_native_repr("map", other.kind_name())),
        }
    }

    /// Read the members of this set.
    pub fn set_value(&self) -> Result<&FxHashSet<NativeHandle>, HandleError> {
        match &self.0.repr {
            NativeRepr::Set(members) => Ok(members),
            other => Err(wrong_native_repr("set", other.kind_name())),
        }
    }

    /// Append an element to this list.
    ///
    /// Appending a list to itself is allowed and creates a self-referential
    /// graph; see the module docs for the consequences.
    pub fn append(&self, item: NativeHandle) -> Result<(), HandleError> {
        match &self.0.repr {
            NativeRepr::List(items) => {
                items.borrow_mut().push(item);
                Ok(())
            }
            other => Err(wrong_native_repr("list", other.kind_name())),
        }
    }
}

fn wrong_native_repr(expected: &'static str, found: &'static str) -> HandleError {
    HandleError::WrongRepr {
        model: "native",
        expected,
        found,
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.repr {
            NativeRepr::Null => write!(f, "null"),
            NativeRepr::Str(s) => write!(f, "{s}"),
            NativeRepr::Number(n) => write!(f, "{n}"),
            NativeRepr::Date(t) => write!(f, "date({})", t.0),
            NativeRepr::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            NativeRepr::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            NativeRepr::Set(members) => {
                write!(f, "{{")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ManagedObject {
    class_name: String,
    repr: ManagedRepr,
}

/// A reference-counted handle to a managed-runtime object.
///
/// Class identity is carried as a fully-qualified name string; lookups on the
/// managed side match that name exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManagedHandle(Rc<ManagedObject>);

impl ManagedHandle {
    pub(crate) fn new(class_name: impl Into<String>, repr: ManagedRepr) -> Self {
        ManagedHandle(Rc::new(ManagedObject {
            class_name: class_name.into(),
            repr,
        }))
    }

    /// The fully-qualified class name of this object.
    pub fn class_name(&self) -> &str {
        &self.0.class_name
    }

    /// The underlying representation.
    pub fn repr(&self) -> &ManagedRepr {
        &self.0.repr
    }

    /// Check whether this is the managed null value.
    pub fn is_null(&self) -> bool {
        matches!(self.0.repr, ManagedRepr::Null)
    }

    /// Read the string content of this handle.
    pub fn string_value(&self) -> Result<&str, HandleError> {
        match &self.0.repr {
            ManagedRepr::Str(s) => Ok(s),
            other => Err(wrong_managed_repr("string", other.kind_name())),
        }
    }

    /// Read the boxed number held by this handle.
    pub fn number_value(&self) -> Result<ManagedNumber, HandleError> {
        match &self.0.repr {
            ManagedRepr::Number(n) => Ok(*n),
            other => Err(wrong_managed_repr("number", other.kind_name())),
        }
    }

    /// Read the date instant as milliseconds since the Unix epoch.
    pub fn date_millis(&self) -> Result<i64, HandleError> {
        match &self.0.repr {
            ManagedRepr::Date(millis) => Ok(*millis),
            other => Err(wrong_managed_repr("date", other.kind_name())),
        }
    }

    /// Read the elements of this list.
    pub fn list_value(&self) -> Result<&[ManagedHandle], HandleError> {
        match &self.0.repr {
            ManagedRepr::List(items) => Ok(items),
            other => Err(wrong_managed_repr("list", other.kind_name())),
        }
    }

    /// Read the entries of this map.
    pub fn map_value(&self) -> Result<&FxHashMap<ManagedHandle, ManagedHandle>, HandleError> {
        match &self.0.repr {
            ManagedRepr::Map(entries) => Ok(entries),
            other => Err(wrong_managed_repr("map", other.kind_name())),
        }
    }

    /// Read the members of this set.
    pub fn set_value(&self) -> Result<&FxHashSet<ManagedHandle>, HandleError> {
        match &self.0.repr {
            ManagedRepr::Set(members) => Ok(members),
            other => Err(wrong_managed_repr("set", other.kind_name())),
        }
    }
}

fn wrong_managed_repr(expected: &'static str, found: &'static str) -> HandleError {
    HandleError::WrongRepr {
        model: "managed",
        expected,
        found,
    }
}

impl fmt::Display for ManagedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.repr {
            ManagedRepr::Null => write!(f, "null"),
            ManagedRepr::Str(s) => write!(f, "{s}"),
            ManagedRepr::Number(n) => write!(f, "{n}"),
            ManagedRepr::Date(millis) => write!(f, "date({millis})"),
            ManagedRepr::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ManagedRepr::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            ManagedRepr::Set(members) => {
                write!(f, "{{")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;

    #[test]
    fn wrong_repr_accessor_errors() {
        let env = Env::new();
        let number = env.native_number(42i32);
        let err = number.string_value().unwrap_err();
        assert_eq!(
            err,
            HandleError::WrongRepr {
                model: "native",
                expected: "string",
                found: "number",
            }
        );

        let managed = env.managed_string("abc");
        let err = managed.number_value().unwrap_err();
        assert_eq!(
            err,
            HandleError::WrongRepr {
                model: "managed",
                expected: "number",
                found: "string",
            }
        );
    }

    #[test]
    fn handles_compare_structurally() {
        let env = Env::new();
        let a = env.native_list(vec![env.native_string("x"), env.native_number(1i32)]);
        let b = env.native_list(vec![env.native_string("x"), env.native_number(1i32)]);
        assert_eq!(a, b);

        let c = env.native_list(vec![env.native_number(1i32), env.native_string("x")]);
        assert_ne!(a, c);
    }

    #[test]
    fn sets_dedupe_equal_handles() {
        let env = Env::new();
        let set = env.native_set(vec![
            env.native_string("dup"),
            env.native_string("dup"),
            env.native_string("other"),
        ]);
        assert_eq!(set.set_value().unwrap().len(), 2);
    }

    #[test]
    fn equal_collections_hash_equal_regardless_of_order() {
        let env = Env::new();
        let a = env.native_map(vec![
            (env.native_string("k1"), env.native_number(1i32)),
            (env.native_string("k2"), env.native_number(2i32)),
        ]);
        let b = env.native_map(vec![
            (env.native_string("k2"), env.native_number(2i32)),
            (env.native_string("k1"), env.native_number(1i32)),
        ]);
        assert_eq!(a, b);

        let mut outer = FxHashSet::default();
        outer.insert(a);
        assert!(!outer.insert(b));
    }

    #[test]
    fn list_append_aliases() {
        let env = Env::new();
        let list = env.native_list(vec![]);
        let alias = list.clone();
        alias.append(env.native_string("via alias")).unwrap();
        assert_eq!(list.list_value().unwrap().len(), 1);
    }

    #[test]
    fn append_to_non_list_errors() {
        let env = Env::new();
        let s = env.native_string("not a list");
        assert!(s.append(env.native_null()).is_err());
    }

    #[test]
    fn number_from_impls_tag_the_kind() {
        assert_eq!(NativeNumber::from(true), NativeNumber::Bool(true));
        assert_eq!(NativeNumber::from(-5i8), NativeNumber::I8(-5));
        assert_eq!(NativeNumber::from(7u64), NativeNumber::U64(7));
        assert!(matches!(NativeNumber::from(1.5f32), NativeNumber::F32(_)));

        assert_eq!(ManagedNumber::from(-5i8), ManagedNumber::Byte(-5));
        assert_eq!(ManagedNumber::from(9i64), ManagedNumber::Long(9));
        assert!(matches!(ManagedNumber::from(1.5f64), ManagedNumber::Double(_)));
    }

    #[test]
    fn display_renders_nested_structure() {
        let env = Env::new();
        let list = env.native_list(vec![
            env.native_string("a"),
            env.native_number(2i32),
            env.native_null(),
        ]);
        assert_eq!(format!("{list}"), "[a, 2, null]");
    }
}
