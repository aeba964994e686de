//! Integration tests for the container: registration, resolution,
//! scopes, autowiring, injections, and failure semantics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wirebox::constants::LOGGER_SERVICE;
use wirebox::{
    downcast, value, Binding, Container, CtorParam, Definition, Error, ObjectDefinition, Predicate,
    ResolveObserver, Result, Scope, StaticMetadataProvider, TypeMetadata, Value,
};

/// Test type holding a connection string
struct Repo {
    dsn: String,
}

/// Test type exercising setter, method, and aware injection
struct Service {
    repo: Arc<Repo>,
    label: Mutex<Option<String>>,
    container: Mutex<Option<Container>>,
}

/// Wraps whatever single dependency it was constructed with
struct Holder(Value);

/// Exercises logger-aware injection
struct Audit {
    logger: Mutex<Option<String>>,
}

fn arg<T: Send + Sync + 'static>(args: &[Value], index: usize) -> Result<Arc<T>> {
    args.get(index)
        .and_then(downcast::<T>)
        .ok_or_else(|| Error::definition(format!("bad constructor argument {index}")))
}

fn test_metadata() -> Arc<StaticMetadataProvider> {
    let provider = StaticMetadataProvider::new()
        .with_type(
            TypeMetadata::new("test.Repo", |args| {
                let dsn = arg::<String>(&args, 0)?;
                Ok(value(Repo {
                    dsn: (*dsn).clone(),
                }))
            })
            .with_ctor_param(CtorParam::typed("dsn", "test.Dsn")),
        )
        .with_type(
            TypeMetadata::new("test.Service", |args| {
                let repo = arg::<Repo>(&args, 0)?;
                Ok(value(Service {
                    repo,
                    label: Mutex::new(None),
                    container: Mutex::new(None),
                }))
            })
            .with_ctor_param(CtorParam::typed("repo", "test.Repo"))
            .with_setter("set_label", |instance, args| {
                let service = downcast::<Service>(instance)
                    .ok_or_else(|| Error::definition("set_label on a non-service"))?;
                let label = arg::<String>(&args, 0)?;
                *service.label.lock().unwrap() = Some((*label).clone());
                Ok(())
            })
            .with_aware("container", |instance, args| {
                let service = downcast::<Service>(instance)
                    .ok_or_else(|| Error::definition("aware on a non-service"))?;
                let container = arg::<Container>(&args, 0)?;
                *service.container.lock().unwrap() = Some((*container).clone());
                Ok(())
            }),
        )
        .with_type(
            TypeMetadata::new("test.Holder", |args| {
                Ok(value(Holder(args[0].clone())))
            })
            .with_ctor_param(CtorParam::untyped("dep")),
        )
        .with_type(
            TypeMetadata::new("test.Audit", |_args| {
                Ok(value(Audit {
                    logger: Mutex::new(None),
                }))
            })
            .with_aware(LOGGER_SERVICE, |instance, args| {
                let audit = downcast::<Audit>(instance)
                    .ok_or_else(|| Error::definition("aware on a non-audit"))?;
                let logger = arg::<String>(&args, 0)?;
                *audit.logger.lock().unwrap() = Some((*logger).clone());
                Ok(())
            }),
        );
    Arc::new(provider)
}

fn container_with_metadata() -> Container {
    Container::builder()
        .with_metadata_provider(test_metadata())
        .build()
}

#[test]
fn literal_value_round_trip() {
    let container = Container::new();
    container
        .register("greeting", Definition::value(String::from("hi")))
        .unwrap();
    let v = container.get("greeting").unwrap();
    assert_eq!(*downcast::<String>(&v).unwrap(), "hi");
}

#[test]
fn alias_chain_resolves_to_final_value() {
    let container = Container::new();
    container.register("a", Definition::alias("b")).unwrap();
    container.register("b", Definition::alias("c")).unwrap();
    container.register("c", Definition::value(42_i64)).unwrap();
    assert_eq!(*downcast::<i64>(&container.get("a").unwrap()).unwrap(), 42);
}

#[test]
fn circular_object_graph_names_every_node() {
    let provider = StaticMetadataProvider::new()
        .with_type(
            TypeMetadata::new("Foo", |args| Ok(value(Holder(args[0].clone()))))
                .with_ctor_param(CtorParam::typed("bar", "Bar")),
        )
        .with_type(
            TypeMetadata::new("Bar", |args| Ok(value(Holder(args[0].clone()))))
                .with_ctor_param(CtorParam::typed("foo", "Foo")),
        );
    let container = Container::builder()
        .with_metadata_provider(Arc::new(provider))
        .build();
    container
        .register("Foo", Definition::object(ObjectDefinition::new("Foo")))
        .unwrap();
    container
        .register("Bar", Definition::object(ObjectDefinition::new("Bar")))
        .unwrap();

    let err = container.get("Foo").unwrap_err();
    let Error::CircularDependency { chain } = err else {
        panic!("expected circular dependency, got {err}");
    };
    assert!(chain.contains(&"Foo".to_string()));
    assert!(chain.contains(&"Bar".to_string()));
    assert_eq!(chain.first(), chain.last());
}

#[test]
fn singleton_identity_and_make_distinctness() {
    let container = container_with_metadata();
    container.register("test.Dsn", Definition::value(String::from("db://x"))).unwrap();
    container
        .register("svc", Definition::object(ObjectDefinition::new("test.Repo")))
        .unwrap();

    let first = container.get("svc").unwrap();
    let second = container.get("svc").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let made_one = container.make("svc", HashMap::new()).unwrap();
    let made_two = container.make("svc", HashMap::new()).unwrap();
    assert!(!Arc::ptr_eq(&made_one, &made_two));
    // The cached singleton is untouched.
    assert!(Arc::ptr_eq(&first, &container.get("svc").unwrap()));
}

#[test]
fn diamond_dependency_shares_prototype_instance() {
    let container = container_with_metadata();
    container
        .register(
            "c",
            Definition::object(
                ObjectDefinition::new("test.Holder")
                    .with_scope(Scope::Prototype)
                    .with_ctor_arg("dep", Binding::value(0_i64)),
            ),
        )
        .unwrap();
    container
        .register(
            "a",
            Definition::object(
                ObjectDefinition::new("test.Holder").with_ctor_arg("dep", Binding::reference("c")),
            ),
        )
        .unwrap();
    container
        .register(
            "b",
            Definition::object(
                ObjectDefinition::new("test.Holder").with_ctor_arg("dep", Binding::reference("c")),
            ),
        )
        .unwrap();
    container
        .register(
            "x",
            Definition::array(vec![Definition::alias("a"), Definition::alias("b")]),
        )
        .unwrap();

    let x = container.get("x").unwrap();
    let pair = downcast::<Vec<Value>>(&x).unwrap();
    let a = downcast::<Holder>(&pair[0]).unwrap();
    let b = downcast::<Holder>(&pair[1]).unwrap();
    // Same traversal: both branches see the same prototype instance.
    assert!(Arc::ptr_eq(&a.0, &b.0));

    // A separate call builds a fresh prototype.
    let y = container.get("c").unwrap();
    assert!(!Arc::ptr_eq(&a.0, &y));
}

#[test]
fn autowiring_constructs_the_dependency_graph() {
    let container = container_with_metadata();
    container
        .register("test.Dsn", Definition::value(String::from("db://prod")))
        .unwrap();
    container
        .register("test.Repo", Definition::object(ObjectDefinition::new("test.Repo")))
        .unwrap();
    container
        .register(
            "test.Service",
            Definition::object(
                ObjectDefinition::new("test.Service")
                    .with_method("set_label", vec![Binding::value(String::from("primary"))]),
            ),
        )
        .unwrap();

    let v = container.get("test.Service").unwrap();
    let service = downcast::<Service>(&v).unwrap();
    assert_eq!(service.repo.dsn, "db://prod");
    assert_eq!(service.label.lock().unwrap().as_deref(), Some("primary"));
    // Container-aware injection used the self-registered handle.
    assert!(service.container.lock().unwrap().is_some());
}

#[test]
fn autowire_without_candidate_or_default_fails() {
    let container = container_with_metadata();
    // test.Dsn is not registered and the parameter has no default.
    container
        .register("repo", Definition::object(ObjectDefinition::new("test.Repo")))
        .unwrap();
    assert!(matches!(
        container.get("repo").unwrap_err(),
        Error::Definition { .. }
    ));
}

#[test]
fn make_overrides_apply_to_the_requested_name_only() {
    let container = container_with_metadata();
    container
        .register("test.Dsn", Definition::value(String::from("db://prod")))
        .unwrap();
    container
        .register("repo", Definition::object(ObjectDefinition::new("test.Repo")))
        .unwrap();

    let cached = container.get("repo").unwrap();
    assert_eq!(downcast::<Repo>(&cached).unwrap().dsn, "db://prod");

    let mut overrides = HashMap::new();
    overrides.insert(
        "dsn".to_string(),
        Binding::value(String::from("db://replica")),
    );
    let made = container.make("repo", overrides).unwrap();
    assert_eq!(downcast::<Repo>(&made).unwrap().dsn, "db://replica");

    // Cache untouched by the override.
    assert!(Arc::ptr_eq(&cached, &container.get("repo").unwrap()));

    let mut bogus = HashMap::new();
    bogus.insert("nope".to_string(), Binding::value(1_i64));
    assert!(matches!(
        container.make("repo", bogus).unwrap_err(),
        Error::Definition { .. }
    ));
}

#[test]
fn make_shares_cached_dependents() {
    let counter = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&counter);
    let container = Container::new();
    container
        .register(
            "dep",
            Definition::factory(
                move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(value(String::from("dep")))
                },
                Vec::new(),
            ),
        )
        .unwrap();
    container
        .register(
            "svc",
            Definition::factory(
                |params| Ok(value(params[0].clone())),
                vec![Binding::reference("dep")],
            ),
        )
        .unwrap();

    container.make("svc", HashMap::new()).unwrap();
    container.make("svc", HashMap::new()).unwrap();
    // The dependency was a singleton; only the requested name bypassed it.
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn conditional_fallback_applies_while_unmatched() {
    let container = Container::new();
    let feature = std::env::var("WIREBOX_TEST_FEATURE_SURELY_UNSET").is_ok();
    let predicate: Predicate = Arc::new(move |_| Ok(feature));
    container
        .register_conditional("x", predicate, Definition::value(1_i64))
        .unwrap();
    container.register("x", Definition::value(0_i64)).unwrap();

    assert_eq!(*downcast::<i64>(&container.get("x").unwrap()).unwrap(), 0);
}

#[test]
fn conditional_match_is_permanent() {
    let container = Container::new();
    let flag = Arc::new(AtomicBool::new(true));
    let f = Arc::clone(&flag);
    let predicate: Predicate = Arc::new(move |_| Ok(f.load(Ordering::SeqCst)));
    container
        .register_conditional("x", predicate, Definition::value(1_i64))
        .unwrap();
    container.register("x", Definition::value(0_i64)).unwrap();

    assert_eq!(*downcast::<i64>(&container.get("x").unwrap()).unwrap(), 1);
    flag.store(false, Ordering::SeqCst);
    // Memoized match plus singleton cache: the binding cannot move.
    assert_eq!(*downcast::<i64>(&container.get("x").unwrap()).unwrap(), 1);
}

#[test]
fn predicates_may_inspect_the_container() {
    let container = Container::new();
    container
        .register("flagged", Definition::value(true))
        .unwrap();
    let predicate: Predicate = Arc::new(|c: &Container| Ok(c.has("flagged")));
    container
        .register_conditional("x", predicate, Definition::value(1_i64))
        .unwrap();
    assert_eq!(*downcast::<i64>(&container.get("x").unwrap()).unwrap(), 1);
}

#[test]
fn failed_sibling_does_not_roll_back_cached_singletons() {
    let counter = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&counter);
    let container = Container::new();
    container
        .register(
            "d",
            Definition::factory(
                move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(value(String::from("d")))
                },
                Vec::new(),
            ),
        )
        .unwrap();
    container
        .register(
            "parent",
            Definition::array(vec![Definition::alias("d"), Definition::alias("missing")]),
        )
        .unwrap();

    assert!(matches!(
        container.get("parent").unwrap_err(),
        Error::NotFound { .. }
    ));
    // `d` stayed cached from the failed traversal; no reconstruction.
    container.get("d").unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_resolution_does_not_poison_later_calls() {
    let container = Container::new();
    container.register("a", Definition::alias("b")).unwrap();
    container.register("b", Definition::alias("a")).unwrap();
    container.register("ok", Definition::value(1_i64)).unwrap();

    assert!(container.get("a").is_err());
    // Independent calls resolve normally, and the cycle reports again.
    assert!(container.get("ok").is_ok());
    assert!(matches!(
        container.get("a").unwrap_err(),
        Error::CircularDependency { .. }
    ));
}

#[test]
fn observers_see_every_resolution_without_altering_it() {
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, bool)>>,
    }
    impl ResolveObserver for Recorder {
        fn after_resolve(&self, name: &str, ok: bool) {
            self.seen.lock().unwrap().push((name.to_string(), ok));
        }
    }

    let recorder = Arc::new(Recorder::default());
    let container = Container::builder()
        .with_observer(Arc::clone(&recorder) as Arc<dyn ResolveObserver>)
        .build();
    container.register("a", Definition::alias("b")).unwrap();
    container.register("b", Definition::value(5_i64)).unwrap();

    assert_eq!(*downcast::<i64>(&container.get("a").unwrap()).unwrap(), 5);
    assert!(container.get("missing").is_err());

    let seen = recorder.seen.lock().unwrap();
    assert!(seen.contains(&("a".to_string(), true)));
    assert!(seen.contains(&("b".to_string(), true)));
    assert!(seen.contains(&("missing".to_string(), false)));
}

#[test]
fn logger_aware_types_receive_the_registered_logger() {
    let container = container_with_metadata();
    container
        .register(LOGGER_SERVICE, Definition::value(String::from("audit-log")))
        .unwrap();
    container
        .register("audit", Definition::object(ObjectDefinition::new("test.Audit")))
        .unwrap();

    let v = container.get("audit").unwrap();
    let audit = downcast::<Audit>(&v).unwrap();
    assert_eq!(audit.logger.lock().unwrap().as_deref(), Some("audit-log"));
}

#[test]
fn aware_injection_is_skipped_when_the_service_is_absent() {
    let container = container_with_metadata();
    container
        .register("audit", Definition::object(ObjectDefinition::new("test.Audit")))
        .unwrap();

    // No `logger` registered: construction succeeds, the setter never runs.
    let v = container.get("audit").unwrap();
    let audit = downcast::<Audit>(&v).unwrap();
    assert!(audit.logger.lock().unwrap().is_none());
}

#[test]
fn template_placeholder_must_render_as_a_string() {
    struct Opaque;

    let container = Container::new();
    container.register("blob", Definition::value(Opaque)).unwrap();
    container
        .register("msg", Definition::template("value: {blob}"))
        .unwrap();

    assert!(matches!(
        container.get("msg").unwrap_err(),
        Error::Definition { .. }
    ));
}

#[test]
fn make_overrides_are_rejected_for_factory_definitions() {
    let container = Container::new();
    container
        .register(
            "made",
            Definition::factory(|_| Ok(value(1_i64)), Vec::new()),
        )
        .unwrap();

    let mut overrides = HashMap::new();
    overrides.insert("param".to_string(), Binding::value(2_i64));
    assert!(matches!(
        container.make("made", overrides).unwrap_err(),
        Error::Definition { .. }
    ));
}
