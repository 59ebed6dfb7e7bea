//! The executing environment: host class graph and value constructors.
//!
//! [`Env`] is the concrete form of the facilities the coercion layer assumes
//! from its surroundings: obtaining the dynamic class of a handle, testing
//! class/subclass relationships, and creating or reading primitive content.
//! It stands in for the pair of runtimes an embedding would supply.
//!
//! The host side carries a real inheritance hierarchy: classes are interned
//! into a parent-linked table and matched by [`Env::is_subclass`]. The
//! managed side carries class identity as a fully-qualified name string and
//! needs no table.
//!
//! A single `Env` must be used consistently for a given coercion topology;
//! class ids from one `Env` are meaningless in another.

use rustc_hash::FxHashMap;

use crate::value::{
    ManagedHandle, ManagedNumber, ManagedRepr, NativeHandle, NativeNumber, NativeRepr,
};

/// Well-known host class names, pre-defined by [`Env::new`].
pub mod host_class {
    pub const OBJECT: &str = "host.Object";
    pub const NULL: &str = "host.Null";
    pub const STRING: &str = "host.String";
    pub const NUMBER: &str = "host.Number";
    pub const DATE: &str = "host.Date";
    pub const LIST: &str = "host.List";
    pub const MAP: &str = "host.Map";
    pub const SET: &str = "host.Set";
}

/// Well-known managed class names, assigned by the [`Env`] constructors.
pub mod managed_class {
    pub const OBJECT: &str = "lang.Object";
    pub const NULL: &str = "lang.Null";
    pub const STRING: &str = "lang.String";
    pub const NUMBER: &str = "lang.Number";
    pub const DATE: &str = "util.Date";
    pub const LIST: &str = "util.List";
    pub const MAP: &str = "util.Map";
    pub const SET: &str = "util.Set";
}

/// An interned identifier for a host class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeClassId(u32);

#[derive(Debug)]
struct ClassInfo {
    name: String,
    parent: Option<NativeClassId>,
}

/// Class ids for the built-in host classes.
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    /// Root of the host hierarchy; every class descends from it.
    pub object: NativeClassId,
    pub null: NativeClassId,
    pub string: NativeClassId,
    pub number: NativeClassId,
    pub date: NativeClassId,
    pub list: NativeClassId,
    pub map: NativeClassId,
    pub set: NativeClassId,
}

/// Host class graph plus value constructors for both object models.
#[derive(Debug)]
pub struct Env {
    classes: Vec<ClassInfo>,
    by_name: FxHashMap<String, NativeClassId>,
    builtins: Builtins,
}

impl Env {
    /// Create an environment with the built-in host classes defined.
    pub fn new() -> Self {
        let mut env = Env {
            classes: Vec::new(),
            by_name: FxHashMap::default(),
            builtins: Builtins {
                object: NativeClassId(0),
                null: NativeClassId(0),
                string: NativeClassId(0),
                number: NativeClassId(0),
                date: NativeClassId(0),
                list: NativeClassId(0),
                map: NativeClassId(0),
                set: NativeClassId(0),
            },
        };
        let object = env.define_class(host_class::OBJECT, None);
        env.builtins = Builtins {
            object,
            null: env.define_class(host_class::NULL, Some(object)),
            string: env.define_class(host_class::STRING, Some(object)),
            number: env.define_class(host_class::NUMBER, Some(object)),
            date: env.define_class(host_class::DATE, Some(object)),
            list: env.define_class(host_class::LIST, Some(object)),
            map: env.define_class(host_class::MAP, Some(object)),
            set: env.define_class(host_class::SET, Some(object)),
        };
        env
    }

    /// Ids of the built-in host classes.
    pub fn builtins(&self) -> Builtins {
        self.builtins
    }

    // ==========================================================================
    // Class graph
    // ==========================================================================

    /// Define a host class, optionally under a parent class.
    ///
    /// Defining an already-defined name returns the existing id unchanged.
    pub fn define_class(&mut self, name: &str, parent: Option<NativeClassId>) -> NativeClassId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = NativeClassId(self.classes.len() as u32);
        self.classes.push(ClassInfo {
            name: name.to_string(),
            parent,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Look up a host class id by name.
    pub fn class_id(&self, name: &str) -> Option<NativeClassId> {
        self.by_name.get(name).copied()
    }

    /// The name of a host class.
    pub fn class_name(&self, class: NativeClassId) -> &str {
        &self.classes[class.0 as usize].name
    }

    /// Is-instance-of test: true when `class` equals `ancestor` or descends
    /// from it.
    pub fn is_subclass(&self, class: NativeClassId, ancestor: NativeClassId) -> bool {
        let mut current = Some(class);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.classes[id.0 as usize].parent;
        }
        false
    }

    // ==========================================================================
    // Native constructors
    // ==========================================================================

    /// The host null value.
    pub fn native_null(&self) -> NativeHandle {
        NativeHandle::new(self.builtins.null, NativeRepr::Null)
    }

    /// A host string.
    pub fn native_string(&self, content: impl Into<String>) -> NativeHandle {
        NativeHandle::new(self.builtins.string, NativeRepr::Str(content.into()))
    }

    /// A boxed host number.
    pub fn native_number(&self, value: impl Into<NativeNumber>) -> NativeHandle {
        NativeHandle::new(self.builtins.number, NativeRepr::Number(value.into()))
    }

    /// A host date, in seconds relative to the host reference date.
    pub fn native_date(&self, seconds_since_reference: f64) -> NativeHandle {
        NativeHandle::new(
            self.builtins.date,
            NativeRepr::Date(seconds_since_reference.into()),
        )
    }

    /// A host list.
    pub fn native_list(&self, items: Vec<NativeHandle>) -> NativeHandle {
        NativeHandle::new(self.builtins.list, NativeRepr::List(items.into()))
    }

    /// A host map.
    pub fn native_map(
        &self,
        entries: impl IntoIterator<Item = (NativeHandle, NativeHandle)>,
    ) -> NativeHandle {
        NativeHandle::new(
            self.builtins.map,
            NativeRepr::Map(entries.into_iter().collect()),
        )
    }

    /// A host set. Duplicate members collapse.
    pub fn native_set(&self, members: impl IntoIterator<Item = NativeHandle>) -> NativeHandle {
        NativeHandle::new(
            self.builtins.set,
            NativeRepr::Set(members.into_iter().collect()),
        )
    }

    /// A host object with an explicit dynamic class.
    ///
    /// This is how instances of embedder-defined classes (including
    /// subclasses of the built-ins) are created.
    pub fn native_with_class(&self, class: NativeClassId, repr: NativeRepr) -> NativeHandle {
        NativeHandle::new(class, repr)
    }

    // ==========================================================================
    // Managed constructors
    // ==========================================================================

    /// The managed null value.
    pub fn managed_null(&self) -> ManagedHandle {
        ManagedHandle::new(managed_class::NULL, ManagedRepr::Null)
    }

    /// A managed string.
    pub fn managed_string(&self, content: impl Into<String>) -> ManagedHandle {
        ManagedHandle::new(managed_class::STRING, ManagedRepr::Str(content.into()))
    }

    /// A boxed managed number.
    pub fn managed_number(&self, value: impl Into<ManagedNumber>) -> ManagedHandle {
        ManagedHandle::new(managed_class::NUMBER, ManagedRepr::Number(value.into()))
    }

    /// A managed date, in milliseconds since the Unix epoch.
    pub fn managed_date_millis(&self, millis: i64) -> ManagedHandle {
        ManagedHandle::new(managed_class::DATE, ManagedRepr::Date(millis))
    }

    /// A managed list.
    pub fn managed_list(&self, items: Vec<ManagedHandle>) -> ManagedHandle {
        ManagedHandle::new(managed_class::LIST, ManagedRepr::List(items))
    }

    /// A managed map.
    pub fn managed_map(
        &self,
        entries: impl IntoIterator<Item = (ManagedHandle, ManagedHandle)>,
    ) -> ManagedHandle {
        ManagedHandle::new(
            managed_class::MAP,
            ManagedRepr::Map(entries.into_iter().collect()),
        )
    }

    /// A managed set. Duplicate members collapse.
    pub fn managed_set(&self, members: impl IntoIterator<Item = ManagedHandle>) -> ManagedHandle {
        ManagedHandle::new(
            managed_class::SET,
            ManagedRepr::Set(members.into_iter().collect()),
        )
    }

    /// A managed object with an explicit class name.
    pub fn managed_with_class(&self, class_name: &str, repr: ManagedRepr) -> ManagedHandle {
        ManagedHandle::new(class_name, repr)
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
