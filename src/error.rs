//! Error types for the coercion layer.
//!
//! Two outcomes that are *not* errors must stay expressible: a coercion that
//! ran and produced an empty value (`Ok(None)`), and a coercion that produced
//! a value (`Ok(Some(_))`). The error channel is reserved for the single
//! dispatch failure — no registration anywhere in the chain matched — plus
//! handle-content errors propagated unchanged from the host facade.

use thiserror::Error;

/// Errors raised by the handle content accessors.
///
/// These belong to the host/runtime facade, not to the coercion layer itself;
/// the coercion layer propagates them without remapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    /// A content accessor was applied to a handle holding a different
    /// representation, e.g. reading string content out of a number.
    #[error("{model} handle holds {found}, expected {expected}")]
    WrongRepr {
        /// Which object model the handle belongs to ("native" or "managed").
        model: &'static str,
        /// The representation the accessor expected.
        expected: &'static str,
        /// The representation the handle actually holds.
        found: &'static str,
    },
}

/// The unified error type for coercion calls.
///
/// `NoNativeCoercion` and `NoManagedCoercion` are the only failure kinds
/// defined at this layer: the delegation chain was exhausted without any
/// registration matching the value's dynamic class. A strategy that matched
/// but produced no value is *not* an error (see [`CoercionResult`]).
///
/// [`CoercionResult`]: crate::coercion::CoercionResult
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// No registration in the chain matched the native value's dynamic class.
    #[error("no coercion registered for native class '{0}'")]
    NoNativeCoercion(String),

    /// No registration in the chain matched the managed value's class name.
    #[error("no coercion registered for managed class '{0}'")]
    NoManagedCoercion(String),

    /// A handle accessor error, propagated unchanged.
    #[error(transparent)]
    Handle(#[from] HandleError),
}

impl CoercionError {
    /// Check if this is a "no coercion found" failure (either direction).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoercionError::NoNativeCoercion(_) | CoercionError::NoManagedCoercion(_)
        )
    }
}
