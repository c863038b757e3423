use std::sync::atomic::Ordering;

use rayon::prelude::*;

use super::*;
use crate::expression::{expression_fn, CompileError, CompiledExpression};
use crate::test_utils::{Address, Member, Node, Pair, PathCompiler, Person, Team};
use crate::value::Value;

type Compiled = std::result::Result<Arc<dyn CompiledExpression>, CompileError>;

fn registry() -> (Registry, Arc<PathCompiler>) {
    let compiler = Arc::new(PathCompiler::new());
    let registry = Registry::with_shared_compiler(RegistryConfig::default(), compiler.clone());
    (registry, compiler)
}

#[test]
fn test_register_builds_descriptor() {
    let (registry, _) = registry();
    let descriptor = registry.register(Person::record_type()).unwrap();

    assert_eq!(descriptor.type_name(), std::any::type_name::<Person>());
    assert_eq!(
        descriptor.selectors(),
        [
            "name@",
            "age@",
            "age@limit",
            "active@",
            "scores@first",
            "scores@missing",
            "home.city@",
            "home.zip@",
            "home.zip@code",
            "work.city@",
            "work.zip@",
            "work.zip@code",
        ]
    );
    assert!(registry.is_registered(std::any::type_name::<Address>()));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_fields_are_flattened_after_their_record_field() {
    let (registry, _) = registry();
    let descriptor = registry.register(Person::record_type()).unwrap();

    let names: Vec<_> = descriptor.fields().iter().map(|f| f.name()).collect();
    let home = names.iter().position(|n| *n == "home").unwrap();
    assert_eq!(&names[home..home + 3], ["home", "home.city", "home.zip"]);

    let home = descriptor.field("home").unwrap();
    assert!(!home.has_getter());

    let city = descriptor.field("home.city").unwrap();
    assert_eq!(city.declared_name(), "city");
    assert_eq!(city.index(), 0);
    assert_eq!(city.host(), std::any::type_name::<Address>());
    assert_eq!(city.kind(), FieldKind::Text);

    let zip = descriptor.field("work.zip").unwrap();
    assert_eq!(zip.depth(), 0);
    assert!(zip.has_getter());
}

#[test]
fn test_register_is_idempotent() {
    let (registry, compiler) = registry();
    let first = registry.register(Address::record_type()).unwrap();
    let compiled = compiler.compiled();
    let second = registry.get_or_register(Address::record_type()).unwrap();
    let third = registry.register(Address::record_type()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &third));
    assert_eq!(compiler.compiled(), compiled);
    assert_eq!(compiled, 3);
}

#[test]
fn test_concurrent_registration_builds_once() {
    let (registry, compiler) = registry();

    let descriptors: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| registry.get_or_register(Person::record_type()).unwrap())
        .collect();

    assert!(descriptors.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    // Person has 6 own expressions and Address 3, compiled once each.
    assert_eq!(compiler.compiled(), 9);
}

#[test]
fn test_duplicate_selector_fails_without_caching() {
    let (registry, _) = registry();
    let err = registry.register(Pair::record_type()).unwrap_err();

    assert!(matches!(
        err,
        FieldExprError::DuplicateExpressionName { ref selector } if selector == "left@"
    ));
    assert!(registry.is_empty());
}

#[test]
fn test_compile_error_is_surfaced() {
    let registry = Registry::new(|source: &str| -> Compiled {
        Err(format!("cannot compile {source}").into())
    });
    let err = registry.register(Address::record_type()).unwrap_err();

    match &err {
        FieldExprError::ExpressionCompile { selector, .. } => assert_eq!(selector, "city@"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "cannot compile $");
    assert!(registry.descriptor(std::any::type_name::<Address>()).is_none());
}

#[test]
fn test_failed_host_keeps_nested_descriptors() {
    let compiler = |source: &str| -> Compiled {
        if source == "120" {
            return Err("no literals".into());
        }
        Ok(expression_fn(|_, _| Value::Nil))
    };
    let registry = Registry::new(compiler);

    assert!(registry.register(Person::record_type()).is_err());
    assert!(!registry.is_registered(std::any::type_name::<Person>()));
    assert!(!registry.is_registered(std::any::type_name::<Address>()));

    // Address registers fine on its own and stays cached.
    registry.register(Address::record_type()).unwrap();
    assert!(registry.register(Person::record_type()).is_err());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_register_shape_resolves_pointers() {
    let (registry, _) = registry();

    let descriptor = registry
        .register_reflect::<Option<Box<Address>>>()
        .unwrap();
    assert_eq!(descriptor.type_name(), std::any::type_name::<Address>());

    let err = registry.register_reflect::<Vec<i32>>().unwrap_err();
    assert!(matches!(err, FieldExprError::InvalidInput(_)));

    let err = registry.register_shape(FieldShape::of::<Option<u8>>()).unwrap_err();
    assert!(matches!(err, FieldExprError::InvalidInput(_)));
}

#[test]
fn test_warm_up_registers_all_or_reports_first_error() {
    let (registry, _) = registry();
    registry
        .warm_up([Address::record_type(), Node::record_type()])
        .unwrap();
    assert_eq!(registry.len(), 2);

    let err = registry
        .warm_up([Pair::record_type(), Person::record_type()])
        .unwrap_err();
    assert!(matches!(err, FieldExprError::DuplicateExpressionName { .. }));
    assert!(!registry.is_registered(std::any::type_name::<Person>()));
}

#[test]
fn test_self_reference_is_opaque_by_default() {
    let (registry, _) = registry();
    let descriptor = registry.register(Node::record_type()).unwrap();

    let next = descriptor.field("next").unwrap();
    assert!(next.has_getter());
    assert_eq!(next.depth(), 2);
    assert!(descriptor.field("next.value").is_none());
    assert_eq!(descriptor.selectors(), ["value@"]);
}

fn field_names(descriptor: &TypeDescriptor) -> Vec<&str> {
    descriptor.fields().iter().map(|f| f.name()).collect()
}

#[test]
fn test_mutual_recursion_is_order_independent() {
    let (team_first, _) = registry();
    let team = team_first.register(Team::record_type()).unwrap();
    let member = team_first.register(Member::record_type()).unwrap();

    let (member_first, _) = registry();
    let alone = member_first.register(Member::record_type()).unwrap();

    assert_eq!(member.selectors(), ["age@", "team.size@"]);
    assert_eq!(member.selectors(), alone.selectors());
    assert_eq!(field_names(&member), field_names(&alone));
    assert_eq!(field_names(&member), ["age", "team", "team.size", "team.lead"]);
    assert_eq!(team.selectors(), ["size@", "lead.age@"]);
    assert!(member.field("team.lead.age").is_none());
}

#[test]
fn test_member_unrolled_inside_team_is_not_cached() {
    let (registry, _) = registry();
    registry.register(Team::record_type()).unwrap();

    assert_eq!(registry.len(), 1);
    assert!(!registry.is_registered(std::any::type_name::<Member>()));

    let member_value = Member {
        age: 30,
        team: Some(Box::new(Team { size: 4, lead: None })),
    };
    let member = registry.bind(&member_value).unwrap();
    assert_eq!(member.eval("team.size@"), Value::Number(4.0));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_self_referential_descriptor_is_cached() {
    let (registry, compiler) = registry();
    let first = registry.register(Node::record_type()).unwrap();
    let compiled = compiler.compiled();
    let again = registry.get_or_register(Node::record_type()).unwrap();

    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(compiler.compiled(), compiled);
}

#[test]
fn test_self_reference_rejected_by_policy() {
    let config = RegistryConfig::default().with_self_reference(SelfReferencePolicy::Reject);
    let registry = Registry::with_config(config, PathCompiler::new());
    let err = registry.register(Node::record_type()).unwrap_err();

    assert!(matches!(
        err,
        FieldExprError::RecursiveRecord { ref type_name } if type_name.ends_with("Node")
    ));
    assert!(registry.is_empty());
}

#[test]
fn test_custom_tag_name() {
    let config = RegistryConfig::default().with_tag_name("check");
    let registry = Registry::with_config(config, PathCompiler::new());
    let descriptor = registry.register(Person::record_type()).unwrap();

    assert_eq!(descriptor.selectors(), ["age@"]);
}

#[test]
fn test_bind_registers_lazily() {
    let (registry, _) = registry();
    let person = Person::sample();

    assert!(registry.is_empty());
    let ctx = registry.bind(&person).unwrap();
    assert_eq!(ctx.eval("name@"), Value::from("Ada"));
    assert!(registry.is_registered(std::any::type_name::<Person>()));
}

#[test]
fn test_bind_ptr_rejects_none() {
    let (registry, _) = registry();
    let err = registry.bind_ptr::<Person>(None).unwrap_err();
    assert!(matches!(err, FieldExprError::InvalidInput(_)));

    let person = Person::sample();
    assert!(registry.bind_ptr(Some(&person)).is_ok());
}

#[test]
fn test_bind_dyn_requires_registered_record() {
    let (registry, _) = registry();
    let address = Address::new("Oslo", 150);

    let err = registry.bind_dyn(None).unwrap_err();
    assert!(matches!(err, FieldExprError::InvalidInput(_)));

    let err = registry.bind_dyn(Some(&address)).unwrap_err();
    assert!(matches!(err, FieldExprError::InvalidInput(_)));

    let number = 5_u32;
    assert!(registry.bind_dyn(Some(&number)).is_err());

    registry.warm_up([Address::record_type()]).unwrap();
    let ctx = registry.bind_dyn(Some(&address)).unwrap();
    assert_eq!(ctx.eval_text("city@"), "Oslo");
}

#[test]
fn test_evaluations_do_not_recompile() {
    let (registry, compiler) = registry();
    let evaluations = compiler.evaluations();
    let person = Person::sample();

    for _ in 0..3 {
        let ctx = registry.bind(&person).unwrap();
        assert_eq!(ctx.eval_number("age@"), -5.0);
    }
    assert_eq!(evaluations.load(Ordering::SeqCst), 3);
    assert_eq!(compiler.compiled(), 9);
}
