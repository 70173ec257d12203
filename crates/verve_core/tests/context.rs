//! Context tests that drive shared values with `verve_animation` drivers.
//!
//! These live in the integration test target rather than in
//! `src/context.rs`: as in-file unit tests the dev-dependency cycle links a
//! second copy of `verve_core` whose `Driver` trait the animation drivers do
//! not implement.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;
use std::sync::Arc;

use verve_animation::{Timing, TimingConfig};
use verve_core::contexts;

#[test]
fn test_driver_commits_flow_back_through_pump() {
    let (control, mut render) = contexts();
    let x = control.shared_value(0.0f64);
    x.animate(Timing::new(100.0, TimingConfig::new(200.0)).unwrap());
    render.on_tick(0.0);
    render.on_tick(100.0);
    control.pump();
    let midway = x.get();
    assert!(midway > 0.0 && midway < 100.0);
    render.on_tick(200.0);
    control.pump();
    assert_eq!(x.get(), 100.0);
    assert!(!render.wants_frames());
}

#[test]
fn test_overwrite_detaches_driver_without_completion() {
    let (control, mut render) = contexts();
    let x = control.shared_value(0.0f64);
    let finished = Arc::new(AtomicUsize::new(0));
    {
        let finished = finished.clone();
        x.animate(
            Timing::new(100.0, TimingConfig::new(200.0))
                .unwrap()
                .on_done(move || {
                    finished.fetch_add(1, SeqCst);
                }),
        );
    }
    render.on_tick(0.0);
    render.on_tick(50.0);
    x.set(42.0);
    render.on_tick(100.0);
    assert_eq!(render.store().read::<f64>(x.id()), Some(42.0));
    render.on_tick(400.0);
    assert_eq!(render.store().read::<f64>(x.id()), Some(42.0));
    control.pump();
    assert_eq!(finished.load(SeqCst), 0);
    assert!(!render.wants_frames());
}

#[test]
fn test_explicit_cancel_keeps_current_value() {
    let (control, mut render) = contexts();
    let x = control.shared_value(0.0f64);
    x.animate(Timing::new(100.0, TimingConfig::new(100.0)).unwrap());
    render.on_tick(0.0);
    render.on_tick(50.0);
    let midway = render.store().read::<f64>(x.id()).unwrap();
    x.cancel();
    render.on_tick(60.0);
    render.on_tick(200.0);
    assert_eq!(render.store().read::<f64>(x.id()), Some(midway));
    assert!(!render.wants_frames());
}

#[test]
fn test_control_survives_render_teardown() {
    let (control, render) = contexts();
    let x = control.shared_value(1.0f64);
    drop(render);
    // Commands are silently dropped; the mirror keeps program order.
    x.set(9.0);
    x.animate(Timing::new(4.0, TimingConfig::default()).unwrap());
    assert_eq!(x.get(), 9.0);
    assert_eq!(control.pump(), 0);
}
