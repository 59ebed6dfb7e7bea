//! The coercion strategy protocol.

use crate::coercer::Coercer;
use crate::env::Env;
use crate::error::CoercionError;
use crate::value::{ManagedHandle, NativeHandle};

/// Outcome of a coercion step.
///
/// `Ok(Some(_))` is a converted value. `Ok(None)` is a successful *empty*
/// result — the null-equivalent of the destination model — and is never a
/// dispatch failure. `Err(_)` means no strategy matched anywhere in the
/// chain, or a handle accessor error surfaced from below.
pub type CoercionResult<T> = Result<Option<T>, CoercionError>;

/// A single unit of conversion logic for one conceptual type.
///
/// Strategies are stateless or minimally stateful and never own the handles
/// they process. `coercer` is the *originating* registry — the one the
/// top-level call was made on — passed through unchanged on every recursive
/// step. A strategy converting a composite value must coerce nested elements
/// through `coercer`, not through any registry it happens to know about, so
/// that nested elements see the caller's full chain and policy.
pub trait Coercion {
    /// Convert a native host value into its managed equivalent.
    fn native_to_managed(
        &self,
        obj: &NativeHandle,
        env: &Env,
        coercer: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle>;

    /// Convert a managed value into its native host equivalent.
    fn managed_to_native(
        &self,
        obj: &ManagedHandle,
        env: &Env,
        coercer: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle>;
}
