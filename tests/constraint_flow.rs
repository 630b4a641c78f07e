//! Dependency constraint enforcement during install.

mod common;

use common::{DebBuilder, TestEnv};
use runepkg_lib::core::RunepkgError;
use runepkg_lib::engine;

#[test]
fn version_constraint_failure_aborts_install() {
    let env = TestEnv::new();
    let b_old = DebBuilder::new("b", "0.9")
        .file("usr/share/b/data", b"b", 0o644)
        .write_to(&env.debs_dir());

    // `a` wants b >= 1.0 and no sibling b_1.0 exists.
    let a_dir = env.debs_dir().join("apart");
    std::fs::create_dir_all(&a_dir).unwrap();
    let a = DebBuilder::new("a", "1.0")
        .depends("b (>= 1.0)")
        .file("usr/share/a/data", b"a", 0o644)
        .write_to(&a_dir);

    let ctx = env.context(false);
    engine::install(&ctx, b_old.to_str().unwrap()).unwrap();

    match engine::install(&ctx, a.to_str().unwrap()) {
        Err(RunepkgError::ConstraintUnsatisfied(missing)) => {
            assert_eq!(missing, vec!["b (>= 1.0)"]);
        }
        other => panic!("expected ConstraintUnsatisfied, got {other:?}"),
    }

    // Nothing new landed in the database.
    assert!(!env.db_root().join("a-1.0").exists());
    assert!(!ctx.installed.contains("a"));
}

#[test]
fn force_overrides_unsatisfied_dependencies() {
    let env = TestEnv::new();
    let a_dir = env.debs_dir().join("apart");
    std::fs::create_dir_all(&a_dir).unwrap();
    let a = DebBuilder::new("a", "1.0")
        .depends("missing (>= 1.0)")
        .file("usr/share/a/data", b"a", 0o644)
        .write_to(&a_dir);

    let forced = env.context(true);
    engine::install(&forced, a.to_str().unwrap()).unwrap();
    assert!(forced.installed.contains("a"));
}

#[test]
fn satisfied_constraint_needs_no_sibling() {
    let env = TestEnv::new();
    let b = DebBuilder::new("b", "2.0")
        .file("usr/share/b/data", b"b", 0o644)
        .write_to(&env.debs_dir());

    let a_dir = env.debs_dir().join("apart");
    std::fs::create_dir_all(&a_dir).unwrap();
    let a = DebBuilder::new("a", "1.0")
        .depends("b (>= 1.0)")
        .file("usr/share/a/data", b"a", 0o644)
        .write_to(&a_dir);

    let ctx = env.context(false);
    engine::install(&ctx, b.to_str().unwrap()).unwrap();
    engine::install(&ctx, a.to_str().unwrap()).unwrap();
    assert!(ctx.installed.contains("a"));
}

#[test]
fn sibling_upgrade_satisfies_constraint() {
    let env = TestEnv::new();
    // b_1.0 sits next to a; a wants it and it is not installed yet.
    DebBuilder::new("b", "1.0")
        .file("usr/share/b/data", b"b", 0o644)
        .write_to(&env.debs_dir());
    let a = DebBuilder::new("a", "1.0")
        .depends("b (>= 1.0)")
        .file("usr/share/a/data", b"a", 0o644)
        .write_to(&env.debs_dir());

    let ctx = env.context(false);
    engine::install(&ctx, a.to_str().unwrap()).unwrap();
    assert!(ctx.installed.contains("a"));
    assert_eq!(ctx.installed.get("b").unwrap().version, "1.0");
}

#[test]
fn opaque_alternative_counts_as_unsatisfied() {
    let env = TestEnv::new();
    let a_dir = env.debs_dir().join("apart");
    std::fs::create_dir_all(&a_dir).unwrap();
    let a = DebBuilder::new("a", "1.0")
        .depends("mta | exim4")
        .file("usr/share/a/data", b"a", 0o644)
        .write_to(&a_dir);

    let ctx = env.context(false);
    let err = engine::install(&ctx, a.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, RunepkgError::ConstraintUnsatisfied(_)));
}
