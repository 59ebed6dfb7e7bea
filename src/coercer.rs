//! The coercion registry and its delegation chain.
//!
//! A [`Coercer`] owns an ordered table of
//! (native class, managed class name) → strategy registrations and may
//! delegate to a parent registry when nothing local matches. Chains are
//! built top-down: a long-lived, default-populated parent and short-lived
//! derived children that override or extend it per call site.
//!
//! # Dispatch
//!
//! Lookups scan the local table most-recently-registered first. On the
//! native side an entry matches when the value's dynamic class *is an
//! instance of* the registered class (exact or subclass); on the managed
//! side the class name must match exactly. The first match wins and its
//! result is final — a strategy that returns `Ok(None)` does not fall
//! through to older entries or to the parent. Specificity is therefore a
//! function of registration order alone: register generic classes first and
//! specific classes after them.
//!
//! # Threading the originating registry
//!
//! The registry a top-level call was made on is passed to every strategy and
//! re-used for nested element coercions, even when the matching entry was
//! found in a parent. A child that overrides, say, the string strategy will
//! see that override applied to string elements inside a list handled by its
//! parent's list strategy.
//!
//! # Concurrency
//!
//! Registries are not thread-safe and provide no locking. Registration takes
//! `&mut self`, lookups take `&self`; the borrow checker already rules out
//! registering while a call is in flight on the same instance or on a child
//! borrowing it.

use crate::coercion::{Coercion, CoercionResult};
use crate::env::{Env, NativeClassId};
use crate::error::CoercionError;
use crate::value::{ManagedHandle, NativeHandle};

struct Registration {
    native_class: NativeClassId,
    managed_class: String,
    coercion: Box<dyn Coercion>,
}

/// A chainable registry mapping class pairs to coercion strategies.
///
/// The parent reference is non-owning; the borrow checker enforces that a
/// parent outlives every child derived from it.
#[derive(Default)]
pub struct Coercer<'p> {
    entries: Vec<Registration>,
    parent: Option<&'p Coercer<'p>>,
}

impl<'p> Coercer<'p> {
    /// Create an empty registry with no parent.
    pub fn new() -> Self {
        Coercer {
            entries: Vec::new(),
            parent: None,
        }
    }

    /// Create an empty registry that delegates unmatched lookups to `parent`.
    pub fn with_parent(parent: &'p Coercer<'p>) -> Self {
        Coercer {
            entries: Vec::new(),
            parent: Some(parent),
        }
    }

    /// Derive an empty child registry delegating to `self`.
    pub fn derive(&self) -> Coercer<'_> {
        Coercer::with_parent(self)
    }

    /// Append a registration to the local table.
    ///
    /// `coercion` will be invoked for native values that are instances of
    /// `native_class` (or a subclass) and for managed values whose class name
    /// equals `managed_class` exactly. Later registrations take precedence
    /// over earlier ones, so register the more specific class *after* the
    /// more generic one.
    pub fn register(
        &mut self,
        coercion: impl Coercion + 'static,
        native_class: NativeClassId,
        managed_class: impl Into<String>,
    ) {
        self.entries.push(Registration {
            native_class,
            managed_class: managed_class.into(),
            coercion: Box::new(coercion),
        });
    }

    /// Coerce a native host value into its managed equivalent.
    ///
    /// Fails with [`CoercionError::NoNativeCoercion`] when the delegation
    /// chain is exhausted without a match.
    pub fn coerce_native_to_managed(
        &self,
        obj: &NativeHandle,
        env: &Env,
    ) -> CoercionResult<ManagedHandle> {
        self.native_to_managed_via(obj, env, self)
    }

    /// Coerce a managed value into its native host equivalent.
    ///
    /// Fails with [`CoercionError::NoManagedCoercion`] when the delegation
    /// chain is exhausted without a match.
    pub fn coerce_managed_to_native(
        &self,
        obj: &ManagedHandle,
        env: &Env,
    ) -> CoercionResult<NativeHandle> {
        self.managed_to_native_via(obj, env, self)
    }

    fn native_to_managed_via(
        &self,
        obj: &NativeHandle,
        env: &Env,
        origin: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle> {
        for entry in self.entries.iter().rev() {
            if env.is_subclass(obj.class(), entry.native_class) {
                return entry.coercion.native_to_managed(obj, env, origin);
            }
        }
        match self.parent {
            Some(parent) => parent.native_to_managed_via(obj, env, origin),
            None => Err(CoercionError::NoNativeCoercion(
                env.class_name(obj.class()).to_string(),
            )),
        }
    }

    fn managed_to_native_via(
        &self,
        obj: &ManagedHandle,
        env: &Env,
        origin: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle> {
        for entry in self.entries.iter().rev() {
            if entry.managed_class == obj.class_name() {
                return entry.coercion.managed_to_native(obj, env, origin);
            }
        }
        match self.parent {
            Some(parent) => parent.managed_to_native_via(obj, env, origin),
            None => Err(CoercionError::NoManagedCoercion(
                obj.class_name().to_string(),
            )),
        }
    }
}
