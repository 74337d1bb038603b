use std::time::{Duration, Instant};

use scenebot::{
    Matcher, Rect, RobotConfig, SceneGraph, Windows,
    test_support::{NodeSpec, TestRig},
};
use ui_bridge::UiExecutor;

fn rig() -> TestRig {
    logging::init_for_tests();
    TestRig::with_config(RobotConfig {
        query_retry_interval_ms: 20,
        query_retry_timeout_ms: 3_000,
        ..RobotConfig::default()
    })
}

fn button(id: &str) -> NodeSpec {
    NodeSpec::new("Button")
        .id(id)
        .bounds(Rect::new(0.0, 0.0, 80.0, 24.0))
}

#[test]
fn no_match_is_empty_not_absent() {
    let rig = rig();
    let (_w, root) = rig.focused_window();
    rig.toolkit.add_node(root, button("ok"));
    let q = rig.robot.lookup("#missing");
    for _ in 0..3 {
        assert!(q.query_all().unwrap().is_empty());
        assert_eq!(q.query().unwrap(), None);
        assert_eq!(q.count().unwrap(), 0);
        assert!(!q.exists().unwrap());
    }
}

#[test]
fn lookup_includes_root_and_walks_depth_first() {
    let rig = rig();
    let (_w, root) = rig.focused_window();
    let form = rig.toolkit.add_node(root, NodeSpec::new("Pane").class("form"));
    let ok = rig.toolkit.add_node(form, button("ok"));
    let cancel = rig.toolkit.add_node(form, button("cancel"));
    let help = rig.toolkit.add_node(root, button("help"));

    assert_eq!(rig.robot.lookup("Button").query_all().unwrap(), vec![ok, cancel, help]);
    assert_eq!(rig.robot.lookup("Pane").query_all().unwrap(), vec![root, form]);
    assert_eq!(rig.robot.lookup("Button").query().unwrap(), Some(ok));
}

#[test]
fn query_with_retry_sees_late_nodes() {
    let rig = rig();
    let (_w, root) = rig.focused_window();
    let toolkit = rig.toolkit.clone();
    rig.executor()
        .post_delayed(
            Duration::from_millis(200),
            Box::new(move || {
                toolkit.add_node(root, button("late"));
            }),
        )
        .unwrap();

    let q = rig.robot.lookup("#late");
    let start = Instant::now();
    assert_eq!(q.query().unwrap(), None);
    let found = q.query_with_retry().unwrap();
    assert!(found.is_some());
    assert!(start.elapsed() >= Duration::from_millis(150));
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[test]
fn query_with_retry_gives_up_after_timeout() {
    logging::init_for_tests();
    let rig = TestRig::with_config(RobotConfig {
        query_retry_interval_ms: 10,
        query_retry_timeout_ms: 120,
        ..RobotConfig::default()
    });
    rig.focused_window();
    let start = Instant::now();
    assert_eq!(rig.robot.lookup("#never").query_with_retry().unwrap(), None);
    assert!(rig.robot.lookup("#never").query_all_with_retry().unwrap().is_empty());
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[test]
fn chained_lookups_track_the_live_tree() {
    let rig = rig();
    let (_w, root) = rig.focused_window();
    let old_form = rig.toolkit.add_node(root, NodeSpec::new("Pane").class("form"));
    let old_ok = rig.toolkit.add_node(old_form, button("ok"));

    // Built before the tree changes.
    let q = rig.robot.lookup(".form").lookup("#ok");
    assert_eq!(q.query_all().unwrap(), vec![old_ok]);

    rig.toolkit.remove_node(old_form);
    assert_eq!(q.query().unwrap(), None);

    let form = rig.toolkit.add_node(root, NodeSpec::new("Pane").class("form"));
    let ok = rig.toolkit.add_node(form, button("ok"));
    rig.toolkit.add_node(root, button("ok"));
    assert_eq!(q.query_all().unwrap(), vec![ok]);
}

#[test]
fn lookup_follows_window_focus() {
    let rig = rig();
    let (w1, r1) = rig.toolkit.add_window("Pane");
    let (w2, r2) = rig.toolkit.add_window("Pane");
    let a = rig.toolkit.add_node(r1, button("a"));
    let b = rig.toolkit.add_node(r2, button("b"));

    let q = rig.robot.lookup("Button");
    assert!(q.query_all().unwrap().is_empty());
    rig.toolkit.focus_window(w1);
    assert_eq!(q.query_all().unwrap(), vec![a]);
    rig.toolkit.focus_window(w2);
    assert_eq!(q.query_all().unwrap(), vec![b]);
    assert_eq!(rig.robot.focused_window().unwrap(), Some(w2));
    assert_eq!(rig.robot.target_window().unwrap(), Some(w2));
    assert_eq!(rig.robot.list_windows().unwrap(), vec![w1, w2]);

    assert_eq!(
        rig.robot.from_all_windows().lookup("Button").query_all().unwrap(),
        vec![a, b]
    );
}

#[test]
fn from_yields_live_roots_in_order() {
    let rig = rig();
    let (_w, root) = rig.focused_window();
    let a = rig.toolkit.add_node(root, button("a"));
    let b = rig.toolkit.add_node(root, button("b"));
    let c = rig.toolkit.add_node(root, button("c"));

    let q = rig.robot.from(&[c, a, b]);
    assert_eq!(q.query_all().unwrap(), vec![c, a, b]);
    rig.toolkit.remove_node(a);
    assert_eq!(q.query_all().unwrap(), vec![c, b]);
    assert_eq!(q.lookup("#b").query().unwrap(), Some(b));
}

#[test]
fn predicates_can_read_the_scene() {
    let rig = rig();
    let (_w, root) = rig.focused_window();
    let form = rig.toolkit.add_node(root, NodeSpec::new("Pane"));
    let leaf = rig.toolkit.add_node(form, button("leaf"));
    let leaf2 = rig.toolkit.add_node(root, button("leaf2"));

    let leaves = rig
        .robot
        .lookup_by(|scene: &dyn SceneGraph, n| scene.children(n).is_some_and(|c| c.is_empty()));
    assert_eq!(leaves.query_all().unwrap(), vec![leaf, leaf2]);

    let wide = rig.robot.lookup(Matcher::predicate(|scene, n| {
        scene.bounds_in_local(n).is_some_and(|b| b.w > 50.0)
    }));
    assert_eq!(wide.count().unwrap(), 2);
}

#[test]
fn queries_evaluate_on_the_ui_thread() {
    let rig = rig();
    let (_w, root) = rig.focused_window();
    rig.toolkit.add_node(root, button("ok"));
    rig.robot.lookup(".x").lookup("#ok").query_all().unwrap();
    rig.robot.lookup("#ok").query_with_retry().unwrap();
    assert!(rig.toolkit.off_thread_calls().is_empty());
}

#[test]
fn retry_on_ui_thread_evaluates_once() {
    let rig = rig();
    rig.focused_window();
    let q = rig.robot.lookup("#never");
    let start = Instant::now();
    let found = rig
        .robot
        .bridge()
        .run_blocking(move || q.query_with_retry())
        .unwrap()
        .unwrap();
    assert_eq!(found, None);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn describes_itself_for_errors() {
    let rig = rig();
    let q = rig.robot.lookup(".form").lookup("#ok");
    assert_eq!(q.to_string(), "focused scene > \".form\" > \"#ok\"");
}
