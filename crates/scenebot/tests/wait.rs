use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use scenebot::{
    Error, RobotConfig, Waits, Windows, not_showing, showing,
    test_support::{NodeSpec, TestRig},
};
use ui_bridge::UiExecutor;

fn fast_rig(retries: u32) -> TestRig {
    logging::init_for_tests();
    TestRig::with_config(RobotConfig {
        wait_until_interval_ms: 10,
        wait_until_retries: retries,
        ..RobotConfig::default()
    })
}

#[test]
fn waits_for_a_node_to_show() {
    let rig = fast_rig(80);
    let (_w, root) = rig.focused_window();
    let toolkit = rig.toolkit.clone();
    rig.executor()
        .post_delayed(
            Duration::from_millis(100),
            Box::new(move || {
                toolkit.add_node(root, NodeSpec::new("Dialog").id("done"));
            }),
        )
        .unwrap();
    let start = Instant::now();
    rig.robot.wait_until(showing(&rig.robot.lookup("#done"))).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(90));
    assert!(rig.toolkit.off_thread_calls().is_empty());
}

#[test]
fn waits_for_a_node_to_go_away() {
    let rig = fast_rig(80);
    let (_w, root) = rig.focused_window();
    let spinner = rig.toolkit.add_node(root, NodeSpec::new("Spinner"));
    let toolkit = rig.toolkit.clone();
    rig.executor()
        .post_delayed(
            Duration::from_millis(60),
            Box::new(move || toolkit.remove_node(spinner)),
        )
        .unwrap();
    rig.robot
        .wait_until(not_showing(&rig.robot.lookup("Spinner")))
        .unwrap();
    assert!(!rig.robot.lookup("Spinner").exists().unwrap());
}

#[test]
fn gives_up_after_the_configured_checks() {
    let rig = fast_rig(4);
    let checks = Arc::new(AtomicUsize::new(0));
    let counter = checks.clone();
    let start = Instant::now();
    let result = rig.robot.wait_until(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        false
    });
    assert!(matches!(result, Err(Error::Timeout { what: "wait_until condition", .. })));
    assert_eq!(checks.load(Ordering::SeqCst), 5);
    assert!(start.elapsed() >= Duration::from_millis(40));
}

#[test]
fn checks_once_inline_on_the_ui_thread() {
    let rig = fast_rig(80);
    let robot = rig.robot.clone();
    let checks = Arc::new(AtomicUsize::new(0));
    let counter = checks.clone();
    let outcome = rig
        .robot
        .bridge()
        .run_blocking(move || {
            let ok = robot.wait_until(|_| true).is_ok();
            let failed = robot
                .wait_until(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    false
                })
                .is_err();
            ok && failed
        })
        .unwrap();
    assert!(outcome);
    assert_eq!(checks.load(Ordering::SeqCst), 1);
}

#[test]
fn sleep_blocks_the_caller() {
    let rig = fast_rig(0);
    let start = Instant::now();
    rig.robot.sleep(Duration::from_millis(30));
    let slept = start.elapsed();
    assert!(slept >= Duration::from_millis(30), "{slept:?}");
    assert!(slept < Duration::from_secs(1), "{slept:?}");
}
