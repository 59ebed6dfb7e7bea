//! End-to-end tests for coercion chain topologies: a shared default parent
//! with per-call-site children specializing it.

use bridge_coercion::{
    Coercer, Coercion, CoercionError, CoercionResult, Env, ManagedHandle, ManagedRepr,
    NativeHandle, NativeRepr, defaults, managed_class,
};

const MANAGED_UUID: &str = "util.Uuid";

/// Converts host uuid objects (a string subclass) into a dedicated managed
/// class instead of a plain string.
struct UuidCoercion;

impl Coercion for UuidCoercion {
    fn native_to_managed(
        &self,
        obj: &NativeHandle,
        env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<ManagedHandle> {
        let content = obj.string_value()?;
        Ok(Some(env.managed_with_class(
            MANAGED_UUID,
            ManagedRepr::Str(content.to_string()),
        )))
    }

    fn managed_to_native(
        &self,
        obj: &ManagedHandle,
        env: &Env,
        _coercer: &Coercer<'_>,
    ) -> CoercionResult<NativeHandle> {
        let uuid_class = env.class_id("host.Uuid").unwrap();
        Ok(Some(env.native_with_class(
            uuid_class,
            NativeRepr::Str(obj.string_value()?.to_string()),
        )))
    }
}

#[test]
fn derived_child_specializes_a_shared_parent() {
    let mut env = Env::new();
    let uuid_class = env.define_class("host.Uuid", Some(env.builtins().string));

    let parent = defaults::default_coercer(&env);
    let mut child = parent.derive();
    child.register(UuidCoercion, uuid_class, MANAGED_UUID);

    let uuid = env.native_with_class(uuid_class, NativeRepr::Str("a1b2-c3d4".into()));

    // Through the parent alone, the uuid is just a string subclass.
    let plain = parent
        .coerce_native_to_managed(&uuid, &env)
        .unwrap()
        .unwrap();
    assert_eq!(plain.class_name(), managed_class::STRING);

    // Through the child, the specialized strategy takes over.
    let typed = child
        .coerce_native_to_managed(&uuid, &env)
        .unwrap()
        .unwrap();
    assert_eq!(typed.class_name(), MANAGED_UUID);
    assert_eq!(typed.string_value().unwrap(), "a1b2-c3d4");

    // And back, with the dynamic class restored.
    let back = child
        .coerce_managed_to_native(&typed, &env)
        .unwrap()
        .unwrap();
    assert_eq!(back.class(), uuid_class);
}

#[test]
fn parent_composites_recurse_through_the_child() {
    let mut env = Env::new();
    let uuid_class = env.define_class("host.Uuid", Some(env.builtins().string));

    let parent = defaults::default_coercer(&env);
    let mut child = parent.derive();
    child.register(UuidCoercion, uuid_class, MANAGED_UUID);

    // The list strategy lives only in the parent, but the uuid elements must
    // still be converted by the child's strategy.
    let list = env.native_list(vec![
        env.native_with_class(uuid_class, NativeRepr::Str("id-1".into())),
        env.native_string("not a uuid"),
    ]);
    let managed = child
        .coerce_native_to_managed(&list, &env)
        .unwrap()
        .unwrap();
    let items = managed.list_value().unwrap();
    assert_eq!(items[0].class_name(), MANAGED_UUID);
    assert_eq!(items[1].class_name(), managed_class::STRING);
}

#[test]
fn deeply_nested_structures_round_trip() {
    let env = Env::new();
    let coercer = defaults::default_coercer(&env);

    let native = env.native_map(vec![
        (
            env.native_string("names"),
            env.native_list(vec![
                env.native_string("ada"),
                env.native_string("grace"),
                env.native_null(),
            ]),
        ),
        (
            env.native_string("tags"),
            env.native_set(vec![env.native_number(1i32), env.native_number(2i32)]),
        ),
        (env.native_string("when"), env.native_date(86_400.0)),
    ]);

    let managed = coercer
        .coerce_native_to_managed(&native, &env)
        .unwrap()
        .unwrap();
    assert_eq!(managed.class_name(), managed_class::MAP);
    assert_eq!(managed.map_value().unwrap().len(), 3);

    let back = coercer
        .coerce_managed_to_native(&managed, &env)
        .unwrap()
        .unwrap();
    assert_eq!(back, native);
}

#[test]
fn unregistered_class_fails_without_disturbing_the_chain() {
    let mut env = Env::new();
    let opaque = env.define_class("host.Opaque", Some(env.builtins().object));

    let parent = defaults::default_coercer(&env);
    let child = parent.derive();

    let value = env.native_with_class(opaque, NativeRepr::Null);
    let err = child.coerce_native_to_managed(&value, &env).unwrap_err();
    assert_eq!(
        err,
        CoercionError::NoNativeCoercion("host.Opaque".to_string())
    );

    // The chain still works for everything else afterwards.
    let ok = child
        .coerce_native_to_managed(&env.native_string("fine"), &env)
        .unwrap()
        .unwrap();
    assert_eq!(ok.string_value().unwrap(), "fine");
}

#[test]
fn siblings_share_a_parent_without_interference() {
    let env = Env::new();
    let parent = defaults::default_coercer(&env);

    let mut left = parent.derive();
    left.register(UuidCoercion, env.builtins().string, MANAGED_UUID);
    let right = parent.derive();

    let native = env.native_string("value");
    let via_left = left
        .coerce_native_to_managed(&native, &env)
        .unwrap()
        .unwrap();
    let via_right = right
        .coerce_native_to_managed(&native, &env)
        .unwrap()
        .unwrap();

    assert_eq!(via_left.class_name(), MANAGED_UUID);
    assert_eq!(via_right.class_name(), managed_class::STRING);
}
