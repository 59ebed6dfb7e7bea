//! Bidirectional type coercion between a managed runtime object model and a
//! native host object model.
//!
//! Values from either side are opaque, reference-counted handles; neither
//! model knows the other's concrete representation. [`Coercion`] strategies
//! are registered into [`Coercer`] registries, which can be chained with
//! [`Coercer::derive`] or [`Coercer::with_parent`]: when a registry's own
//! strategies cannot convert an object, it delegates the lookup up to its
//! parent.
//!
//! Strategies are keyed by host class and managed class name. A native value
//! matches a registration when it is an instance of the registered class
//! (exact or subclass); a managed value matches when its class name is equal.
//! More specific coercions should be registered after more generic ones —
//! within a registry the most recent matching entry wins, and a child's
//! entries always win over its parent's.
//!
//! Strategies receive the registry the top-level call was made on, so the
//! composite strategies (list, map, set) convert nested elements with the
//! caller's full chain and policy. They do no cycle detection: a
//! self-referential container recurses until the stack is exhausted.
//!
//! An empty result is a perfectly valid conversion outcome and does not
//! indicate failure; calls return `Result<Option<_>, CoercionError>` so that
//! "converted to nothing" and "no coercion found" stay distinct. Registries
//! are not thread safe.
//!
//! # Example
//!
//! ```
//! use bridge_coercion::{Env, defaults};
//!
//! let env = Env::new();
//! let coercer = defaults::default_coercer(&env);
//!
//! let native = env.native_list(vec![
//!     env.native_string("answer"),
//!     env.native_number(42i32),
//! ]);
//!
//! let managed = coercer
//!     .coerce_native_to_managed(&native, &env)
//!     .unwrap()
//!     .unwrap();
//! let items = managed.list_value().unwrap();
//! assert_eq!(items[0].string_value().unwrap(), "answer");
//!
//! let back = coercer.coerce_managed_to_native(&managed, &env).unwrap().unwrap();
//! assert_eq!(back, native);
//! ```

pub mod coercer;
pub mod coercion;
pub mod defaults;
pub mod env;
pub mod error;
pub mod value;

pub use coercer::Coercer;
pub use coercion::{Coercion, CoercionResult};
pub use defaults::{default_coercer, install_defaults};
pub use env::{Builtins, Env, NativeClassId, host_class, managed_class};
pub use error::{CoercionError, HandleError};
pub use value::{
    ManagedHandle, ManagedNumber, ManagedRepr, NativeHandle, NativeNumber, NativeRepr,
};
