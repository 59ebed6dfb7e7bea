//! The built-in strategy library and its installers.
//!
//! Each strategy converts exactly one conceptual type and can be installed
//! independently of the others. [`install_defaults`] wires the whole set
//! into a registry in one call; [`default_coercer`] returns a freshly
//! populated, non-shared registry. The [`DescriptionCoercion`] catch-all is
//! deliberately *not* part of the default set — install it explicitly under
//! the root classes when a chain should never fail on unknown objects.
//!
//! The composite strategies (list, map, set) coerce their elements through
//! the originating registry and perform **no cycle detection**: a
//! self-referential container recurses until the stack is exhausted. That is
//! accepted, documented behavior.

use crate::coercer::Coercer;
use crate::coercion::{Coercion, CoercionResult};
use crate::env::{Env, managed_class};
use crate::value::{ManagedHandle, ManagedNumber, NativeHandle, NativeNumber};

/// Milliseconds between the Unix epoch and the host reference date
/// (2001-01-01T00:00:00Z). Both date models are projected onto the same
/// absolute instant through this offset.
const HOST_REFERENCE_DELTA_MS: i64 = 978_307_200_000;

// ============================================================================
// Primitive strategies
// ============================================================================

/// Null ↔ null. Either side's null coerces to the empty result; composite
/// strategies materialize the empty result back into the destination model's
/// null value.
pub struct NullCoercion;

impl Coercion for NullCoercion {
    fn native_to_managed(
        &self,
        _obj: &NativeHandle,
        _env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle> {
        Ok(None)
    }

    fn managed_to_native(
        &self,
        _obj: &ManagedHandle,
        _env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle> {
        Ok(None)
    }
}

/// Host string ↔ managed string. Direct content transfer, no locale
/// transformation.
pub struct StringCoercion;

impl Coercion for StringCoercion {
    fn native_to_managed(
        &self,
        obj: &NativeHandle,
        env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle> {
        Ok(Some(env.managed_string(obj.string_value()?)))
    }

    fn managed_to_native(
        &self,
        obj: &ManagedHandle,
        env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle> {
        Ok(Some(env.native_string(obj.string_value()?)))
    }
}

/// Boxed host number ↔ boxed managed number.
///
/// The exact kind is preserved wherever both models have it. Unsigned host
/// kinds have no managed counterpart and widen to the next signed width;
/// `U64` is carried into `Long` by bit reinterpretation, which preserves the
/// full range through the signed view.
pub struct NumberCoercion;

impl Coercion for NumberCoercion {
    fn native_to_managed(
        &self,
        obj: &NativeHandle,
        env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle> {
        let number = match obj.number_value()? {
            NativeNumber::Bool(v) => ManagedNumber::Bool(v),
            NativeNumber::I8(v) => ManagedNumber::Byte(v),
            NativeNumber::I16(v) => ManagedNumber::Short(v),
            NativeNumber::I32(v) => ManagedNumber::Int(v),
            NativeNumber::I64(v) => ManagedNumber::Long(v),
            NativeNumber::U8(v) => ManagedNumber::Short(v as i16),
            NativeNumber::U16(v) => ManagedNumber::Int(v as i32),
            NativeNumber::U32(v) => ManagedNumber::Long(v as i64),
            NativeNumber::U64(v) => ManagedNumber::Long(v as i64),
            NativeNumber::F32(v) => ManagedNumber::Float(v),
            NativeNumber::F64(v) => ManagedNumber::Double(v),
        };
        Ok(Some(env.managed_number(number)))
    }

    fn managed_to_native(
        &self,
        obj: &ManagedHandle,
        env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle> {
        let number = match obj.number_value()? {
            ManagedNumber::Bool(v) => NativeNumber::Bool(v),
            ManagedNumber::Byte(v) => NativeNumber::I8(v),
            ManagedNumber::Short(v) => NativeNumber::I16(v),
            ManagedNumber::Int(v) => NativeNumber::I32(v),
            ManagedNumber::Long(v) => NativeNumber::I64(v),
            ManagedNumber::Float(v) => NativeNumber::F32(v),
            ManagedNumber::Double(v) => NativeNumber::F64(v),
        };
        Ok(Some(env.native_number(number)))
    }
}

/// Host date ↔ managed date, through the shared absolute instant.
///
/// Round-tripping preserves the instant, never wall-clock fields: the host
/// side counts seconds from its reference date, the managed side counts
/// milliseconds from the Unix epoch, and conversion is pure offset
/// arithmetic.
pub struct DateCoercion;

impl Coercion for DateCoercion {
    fn native_to_managed(
        &self,
        obj: &NativeHandle,
        env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle> {
        let seconds = obj.date_value()?;
        let millis = (seconds * 1000.0).round() as i64 + HOST_REFERENCE_DELTA_MS;
        Ok(Some(env.managed_date_millis(millis)))
    }

    fn managed_to_native(
        &self,
        obj: &ManagedHandle,
        env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle> {
        let millis = obj.date_millis()?;
        let seconds = (millis - HOST_REFERENCE_DELTA_MS) as f64 / 1000.0;
        Ok(Some(env.native_date(seconds)))
    }
}

// ============================================================================
// Composite strategies
// ============================================================================

/// Ordered sequence ↔ ordered sequence, element-wise through the originating
/// registry. No cycle detection.
pub struct ListCoercion;

impl Coercion for ListCoercion {
    fn native_to_managed(
        &self,
        obj: &NativeHandle,
        env: &Env,
        coercer: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle> {
        let items = obj.list_value()?;
        let mut converted = Vec::with_capacity(items.len());
        for item in items.iter() {
            let element = coercer.coerce_native_to_managed(item, env)?;
            converted.push(element.unwrap_or_else(|| env.managed_null()));
        }
        Ok(Some(env.managed_list(converted)))
    }

    fn managed_to_native(
        &self,
        obj: &ManagedHandle,
        env: &Env,
        coercer: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle> {
        let items = obj.list_value()?;
        let mut converted = Vec::with_capacity(items.len());
        for item in items {
            let element = coercer.coerce_managed_to_native(item, env)?;
            converted.push(element.unwrap_or_else(|| env.native_null()));
        }
        Ok(Some(env.native_list(converted)))
    }
}

/// Key→value mapping ↔ key→value mapping; keys and values each recursively
/// coerced through the originating registry. No cycle detection.
pub struct MapCoercion;

impl Coercion for MapCoercion {
    fn native_to_managed(
        &self,
        obj: &NativeHandle,
        env: &Env,
        coercer: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle> {
        let entries = obj.map_value()?;
        let mut converted = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let key = coercer
                .coerce_native_to_managed(key, env)?
                .unwrap_or_else(|| env.managed_null());
            let value = coercer
                .coerce_native_to_managed(value, env)?
                .unwrap_or_else(|| env.managed_null());
            converted.push((key, value));
        }
        Ok(Some(env.managed_map(converted)))
    }

    fn managed_to_native(
        &self,
        obj: &ManagedHandle,
        env: &Env,
        coercer: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle> {
        let entries = obj.map_value()?;
        let mut converted = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let key = coercer
                .coerce_managed_to_native(key, env)?
                .unwrap_or_else(|| env.native_null());
            let value = coercer
                .coerce_managed_to_native(value, env)?
                .unwrap_or_else(|| env.native_null());
            converted.push((key, value));
        }
        Ok(Some(env.native_map(converted)))
    }
}

/// Unordered unique collection ↔ unordered unique collection, element-wise
/// through the originating registry. No cycle detection.
pub struct SetCoercion;

impl Coercion for SetCoercion {
    fn native_to_managed(
        &self,
        obj: &NativeHandle,
        env: &Env,
        coercer: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle> {
        let members = obj.set_value()?;
        let mut converted = Vec::with_capacity(members.len());
        for member in members {
            let element = coercer.coerce_native_to_managed(member, env)?;
            converted.push(element.unwrap_or_else(|| env.managed_null()));
        }
        Ok(Some(env.managed_set(converted)))
    }

    fn managed_to_native(
        &self,
        obj: &ManagedHandle,
        env: &Env,
        coercer: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle> {
        let members = obj.set_value()?;
        let mut converted = Vec::with_capacity(members.len());
        for member in members {
            let element = coercer.coerce_managed_to_native(member, env)?;
            converted.push(element.unwrap_or_else(|| env.native_null()));
        }
        Ok(Some(env.native_set(converted)))
    }
}

// ============================================================================
// Catch-all
// ============================================================================

/// Renders any value into the other model's string via its description.
///
/// Intended as the lowest entry of a chain, registered under the root
/// classes, for embeddings that prefer a lossy string over a dispatch
/// failure. Note that managed-side matching is exact, so on that side the
/// catch-all only fires for objects whose class name is the registered root
/// name itself.
pub struct DescriptionCoercion;

impl Coercion for DescriptionCoercion {
    fn native_to_managed(
        &self,
        obj: &NativeHandle,
        env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle> {
        Ok(Some(env.managed_string(obj.to_string())))
    }

    fn managed_to_native(
        &self,
        obj: &ManagedHandle,
        env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle> {
        Ok(Some(env.native_string(obj.to_string())))
    }
}

// ============================================================================
// Installers
// ============================================================================

/// Install the null strategy.
pub fn add_null_coercion(coercer: &mut Coercer<'_>, env: &Env) {
    coercer.register(NullCoercion, env.builtins().null, managed_class::NULL);
}

/// Install the string strategy.
pub fn add_string_coercion(coercer: &mut Coercer<'_>, env: &Env) {
    coercer.register(StringCoercion, env.builtins().string, managed_class::STRING);
}

/// Install the number strategy.
pub fn add_number_coercion(coercer: &mut Coercer<'_>, env: &Env) {
    coercer.register(NumberCoercion, env.builtins().number, managed_class::NUMBER);
}

/// Install the date strategy.
pub fn add_date_coercion(coercer: &mut Coercer<'_>, env: &Env) {
    coercer.register(DateCoercion, env.builtins().date, managed_class::DATE);
}

/// Install the list strategy.
pub fn add_list_coercion(coercer: &mut Coercer<'_>, env: &Env) {
    coercer.register(ListCoercion, env.builtins().list, managed_class::LIST);
}

/// Install the map strategy.
pub fn add_map_coercion(coercer: &mut Coercer<'_>, env: &Env) {
    coercer.register(MapCoercion, env.builtins().map, managed_class::MAP);
}

/// Install the set strategy.
pub fn add_set_coercion(coercer: &mut Coercer<'_>, env: &Env) {
    coercer.register(SetCoercion, env.builtins().set, managed_class::SET);
}

/// Install the catch-all description strategy under the root classes.
pub fn add_description_coercion(coercer: &mut Coercer<'_>, env: &Env) {
    coercer.register(
        DescriptionCoercion,
        env.builtins().object,
        managed_class::OBJECT,
    );
}

/// Install the whole default strategy set into `coercer`.
pub fn install_defaults(coercer: &mut Coercer<'_>, env: &Env) {
    add_null_coercion(coercer, env);
    add_string_coercion(coercer, env);
    add_number_coercion(coercer, env);
    add_date_coercion(coercer, env);
    add_list_coercion(coercer, env);
    add_map_coercion(coercer, env);
    add_set_coercion(coercer, env);
}

/// A freshly populated, non-shared registry with the default strategy set.
pub fn default_coercer(env: &Env) -> Coercer<'static> {
    let mut coercer = Coercer::new();
    install_defaults(&mut coercer, env);
    coercer
}
