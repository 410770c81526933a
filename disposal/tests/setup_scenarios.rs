//! End-to-end scenarios for leak-free setup.

use disposal::prelude::*;
use disposal::{setup_safely_with, InvalidArgument, ResourceLabel, SetupOptions};
use disposal_testing::{
    configure, fail_with, CleanupProbe, FixtureError, StepCounter, TrackedResource,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

fn tracked() -> (TrackedResource, Arc<CleanupProbe>) {
    let resource = TrackedResource::new().abandon_on_drop();
    let probe = resource.probe();
    (resource, probe)
}

#[test]
fn failing_step_releases_the_resource_and_surfaces_boom() {
    let (resource, probe) = tracked();

    let error = setup_safely(Some(resource), Some(fail_with("boom")))
        .map(|_| ())
        .unwrap_err();

    assert_eq!(error, FixtureError::injected("boom"));
    assert_eq!(error.to_string(), "boom");
    assert_eq!(probe.cleanups(), 1);
    assert_eq!(probe.kinds(), vec![CleanupKind::Explicit]);
}

#[test]
fn successful_step_hands_back_the_same_live_resource() {
    let (resource, probe) = tracked();

    let resource = setup_safely(Some(resource), Some(configure("bind"))).unwrap();

    assert_eq!(resource.setup_steps(), ["bind".to_string()]);
    assert!(!resource.is_disposed());
    assert_eq!(probe.cleanups(), 0);

    resource.release().unwrap();
    assert_eq!(probe.cleanups(), 1);
}

#[test]
fn caller_keeps_ownership_after_successful_setup() {
    let (resource, probe) = tracked();

    let resource = setup_safely(Some(resource), Some(configure("bind"))).unwrap();
    let resource = resource.set_up_with(configure("listen")).unwrap();

    assert_eq!(
        resource.setup_steps(),
        ["bind".to_string(), "listen".to_string()]
    );
    drop(resource);

    // Dropped without release, so only abandonment cleanup ran.
    assert_eq!(probe.kinds(), vec![CleanupKind::Abandoned]);
}

#[test]
fn absent_resource_is_rejected_and_the_step_never_runs() {
    let counter = StepCounter::new();

    let result =
        setup_safely::<TrackedResource, _, FixtureError>(None, Some(counter.step(Ok(()))));

    assert_eq!(
        result.map(|_| ()),
        Err(FixtureError::InvalidArgument(InvalidArgument::new(
            "resource"
        )))
    );
    assert_eq!(counter.calls(), 0);
}

#[test]
fn absent_step_is_rejected_and_nothing_is_released() {
    let probe = Arc::new(CleanupProbe::new());
    let resource = TrackedResource::with_probe(Arc::clone(&probe));

    let result = setup_safely(
        Some(resource),
        None::<fn(&mut TrackedResource) -> Result<(), FixtureError>>,
    );

    let error = result.map(|_| ()).unwrap_err();
    assert_eq!(
        error,
        FixtureError::InvalidArgument(InvalidArgument::new("setup"))
    );
    assert_eq!(error.to_string(), "invalid argument: `setup` must be present");
    assert_eq!(probe.cleanups(), 0);
}

#[test]
fn both_inputs_absent_reports_the_resource_first() {
    type Step = fn(&mut TrackedResource) -> Result<(), FixtureError>;

    let result = setup_safely::<TrackedResource, Step, FixtureError>(None, None);

    assert_eq!(
        result.map(|_| ()),
        Err(FixtureError::InvalidArgument(InvalidArgument::new(
            "resource"
        )))
    );
}

#[test]
fn step_runs_exactly_once_whatever_its_outcome() {
    let counter = StepCounter::new();
    let (resource, _) = tracked();
    let _ = setup_safely(Some(resource), Some(counter.step(Ok(())))).unwrap();

    let (resource, _) = tracked();
    let _ = setup_safely(
        Some(resource),
        Some(counter.step(Err(FixtureError::injected("late failure")))),
    );

    assert_eq!(counter.calls(), 2);
}

#[test]
fn failing_cleanup_does_not_mask_the_setup_error() {
    let resource = TrackedResource::new().failing_cleanup("release failed");
    let probe = resource.probe();

    let error = setup_safely(Some(resource), Some(fail_with("boom")))
        .map(|_| ())
        .unwrap_err();

    assert_eq!(error.to_string(), "boom");
    assert_eq!(probe.cleanups(), 1);
}

#[test]
fn try_setup_returns_both_errors() {
    let resource = TrackedResource::new().failing_cleanup("release failed");
    let probe = resource.probe();

    let failure = try_setup(resource, fail_with("boom")).map(|_| ()).unwrap_err();

    assert!(failure.cleanup_failed());
    assert_eq!(failure.error(), &FixtureError::injected("boom"));
    assert_eq!(
        failure.cleanup_error(),
        Some(&FixtureError::injected("release failed"))
    );
    assert_eq!(
        failure.to_string(),
        "boom (releasing the resource also failed: release failed)"
    );
    assert_eq!(probe.cleanups(), 1);
}

#[test]
fn try_setup_success_leaves_the_resource_unreleased() {
    let (resource, probe) = tracked();

    let resource = try_setup(resource, configure("open")).unwrap();

    assert!(!resource.is_disposed());
    assert_eq!(probe.cleanups(), 0);
}

#[test]
fn labelled_setup_behaves_like_plain_setup() {
    let options = SetupOptions::new().with_label(ResourceLabel::try_new("socket").unwrap());
    let (resource, probe) = tracked();

    let error = setup_safely_with(&options, Some(resource), Some(fail_with("boom")))
        .map(|_| ())
        .unwrap_err();

    assert_eq!(error.to_string(), "boom");
    assert_eq!(probe.kinds(), vec![CleanupKind::Explicit]);
}

#[test]
fn setup_of_a_shared_handle_releases_the_shared_resource() {
    let resource = Arc::new(TrackedResource::new());
    let probe = resource.probe();

    let result = setup_safely(
        Some(Arc::clone(&resource)),
        Some(|_: &mut Arc<TrackedResource>| Err(FixtureError::injected("boom"))),
    );

    assert!(result.is_err());
    assert!(resource.is_disposed());
    assert_eq!(probe.cleanups(), 1);
}

#[test]
fn panicking_step_releases_the_resource_before_the_panic_escapes() {
    let resource = TrackedResource::new();
    let probe = resource.probe();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        setup_safely(
            Some(resource),
            Some(|_: &mut TrackedResource| -> Result<(), FixtureError> {
                panic!("boom")
            }),
        )
    }));

    let payload = outcome.map(|_| ()).unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
    assert_eq!(probe.cleanups(), 1);
    assert_eq!(probe.kinds(), vec![CleanupKind::Explicit]);
}

#[test]
fn panicking_step_is_not_followed_by_abandonment_cleanup() {
    let (resource, probe) = tracked();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = resource.set_up_with(|_| -> Result<(), FixtureError> { panic!("boom") });
    }));

    assert!(outcome.is_err());
    assert_eq!(probe.kinds(), vec![CleanupKind::Explicit]);
}
