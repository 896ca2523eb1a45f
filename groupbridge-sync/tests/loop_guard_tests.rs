use groupbridge_sync::LoopGuard;
use groupbridge_types::System;

#[test]
fn fresh_guard_suppresses_nothing() {
    let guard = LoopGuard::new();
    assert!(!guard.is_suppressed(System::Social));
    assert!(!guard.is_suppressed(System::Course));
}

#[test]
fn scope_suppresses_only_its_target() {
    let guard = LoopGuard::new();
    let scope = guard.enter(System::Social);
    assert_eq!(scope.target(), System::Social);
    assert!(guard.is_suppressed(System::Social));
    assert!(!guard.is_suppressed(System::Course));
    drop(scope);
    assert!(!guard.is_suppressed(System::Social));
}

#[test]
fn nested_scopes_release_in_order() {
    let guard = LoopGuard::new();
    let outer = guard.enter(System::Course);
    {
        let _inner = guard.enter(System::Course);
        assert!(guard.is_suppressed(System::Course));
    }
    assert!(guard.is_suppressed(System::Course), "inner release must not lift outer scope");
    drop(outer);
    assert!(!guard.is_suppressed(System::Course));
}

#[test]
fn clones_share_flags() {
    let guard = LoopGuard::new();
    let other = guard.clone();
    let _scope = guard.enter(System::Social);
    assert!(other.is_suppressed(System::Social));
}

#[test]
fn scope_released_on_error_path() {
    fn failing(guard: &LoopGuard) -> Result<(), String> {
        let _scope = guard.enter(System::Social);
        Err::<(), String>("counterpart rejected".to_string())?;
        Ok(())
    }

    let guard = LoopGuard::new();
    assert!(failing(&guard).is_err());
    assert!(!guard.is_suppressed(System::Social));
}

#[test]
fn scope_released_on_panic() {
    let guard = LoopGuard::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _scope = guard.enter(System::Course);
        panic!("mutator blew up");
    }));
    assert!(result.is_err());
    assert!(!guard.is_suppressed(System::Course));
}
