use std::time::{Duration, Instant};

use proptest::prelude::*;
use scenebot::{
    Chord, Error, InjectError, Key, KeyEventKind, KeyTarget, Keyboard, Modifier,
    test_support::{NodeSpec, Recorded, TestRig},
};

fn rig() -> TestRig {
    logging::init_for_tests();
    TestRig::new()
}

fn key_ups(log: &[Recorded]) -> Vec<Key> {
    log.iter()
        .filter_map(|r| match r {
            Recorded::KeyUp(k) => Some(*k),
            _ => None,
        })
        .collect()
}

fn any_key() -> impl Strategy<Value = Key> {
    prop::sample::select(vec![
        Key::A,
        Key::B,
        Key::Z,
        Key::Digit1,
        Key::Shift,
        Key::Control,
        Key::Alt,
        Key::Meta,
        Key::Enter,
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn release_all_releases_exactly_what_is_held(
        batches in prop::collection::vec(prop::collection::vec(any_key(), 0..4), 1..4),
        early in prop::collection::vec(any_key(), 0..3),
    ) {
        let rig = rig();
        let robot = &rig.robot;
        let mut expected: Vec<Key> = Vec::new();
        for batch in &batches {
            robot.press(batch).unwrap();
            for k in batch {
                if !expected.contains(k) {
                    expected.push(*k);
                }
            }
        }
        robot.release(&early).unwrap();
        expected.retain(|k| !early.contains(k));
        prop_assert_eq!(robot.engine().held_keys().unwrap(), expected.clone());

        rig.toolkit.take_log();
        robot.release(&[]).unwrap();
        prop_assert_eq!(key_ups(&rig.toolkit.log()), expected);
        prop_assert!(robot.engine().held_keys().unwrap().is_empty());
    }

    #[test]
    fn push_presses_in_order_and_releases_in_reverse(
        keys in prop::collection::vec(any_key(), 1..5),
    ) {
        let rig = rig();
        rig.robot.push(&keys).unwrap();
        let mut expected: Vec<Recorded> = keys.iter().map(|k| Recorded::KeyDown(*k)).collect();
        expected.extend(keys.iter().rev().map(|k| Recorded::KeyUp(*k)));
        prop_assert_eq!(rig.toolkit.log(), expected);
        prop_assert!(rig.robot.engine().held_keys().unwrap().is_empty());
    }
}

#[test]
fn push_two_keys_exact_sequence() {
    let rig = rig();
    rig.robot.push(&[Key::Shift, Key::A]).unwrap();
    assert_eq!(
        rig.toolkit.log(),
        vec![
            Recorded::KeyDown(Key::Shift),
            Recorded::KeyDown(Key::A),
            Recorded::KeyUp(Key::A),
            Recorded::KeyUp(Key::Shift),
        ]
    );
}

#[test]
fn release_all_snapshot_is_taken_at_call_time() {
    let rig = rig();
    let robot = &rig.robot;
    robot.press(&[Key::A]).unwrap().press(&[Key::B]).unwrap();
    robot.release(&[Key::A]).unwrap();
    robot.press(&[Key::C]).unwrap();
    rig.toolkit.take_log();
    robot.release(&[]).unwrap();
    assert_eq!(key_ups(&rig.toolkit.log()), vec![Key::B, Key::C]);

    // Nothing held: release-all posts nothing.
    rig.toolkit.take_log();
    robot.release(&[]).unwrap();
    assert!(rig.toolkit.log().is_empty());
}

#[test]
fn releasing_a_key_that_is_not_held_still_posts_key_up() {
    let rig = rig();
    rig.robot.release(&[Key::Q]).unwrap();
    assert_eq!(rig.toolkit.log(), vec![Recorded::KeyUp(Key::Q)]);
}

#[test]
fn write_emits_press_typed_release_per_character() {
    let rig = rig();
    let (window, _root) = rig.focused_window();
    rig.robot.write("ab").unwrap();

    let events = rig.toolkit.key_events();
    assert_eq!(events.len(), 6);
    let kinds: Vec<_> = events.iter().map(|(_, e)| e.kind).collect();
    assert_eq!(
        kinds,
        [
            KeyEventKind::Pressed,
            KeyEventKind::Typed,
            KeyEventKind::Released,
            KeyEventKind::Pressed,
            KeyEventKind::Typed,
            KeyEventKind::Released,
        ]
    );
    let chars: Vec<_> = events.iter().map(|(_, e)| e.character).collect();
    assert_eq!(chars, [None, Some('a'), None, None, Some('b'), None]);
    for (target, event) in &events {
        assert_eq!(*target, KeyTarget::Scene(window));
        assert_eq!(event.key, Key::Undefined);
        match event.kind {
            KeyEventKind::Typed => assert!(event.text.is_empty()),
            _ => assert_eq!(event.text, "Undefined"),
        }
    }
}

#[test]
fn write_targets_the_focus_owner_when_there_is_one() {
    let rig = rig();
    let (window, root) = rig.focused_window();
    let field = rig.toolkit.add_node(root, NodeSpec::new("TextField").id("name"));
    rig.toolkit.set_focus_owner(window, Some(field));
    rig.robot.write_char('x').unwrap();
    let targets: Vec<_> = rig.toolkit.key_events().into_iter().map(|(t, _)| t).collect();
    assert_eq!(targets, vec![KeyTarget::Node(field); 3]);
}

#[test]
fn write_without_focused_window_fails() {
    let rig = rig();
    rig.toolkit.add_window("Pane");
    assert!(matches!(rig.robot.write("a"), Err(Error::NoFocusedWindow)));
    assert!(rig.toolkit.key_events().is_empty());
}

#[test]
fn held_modifiers_stamp_typed_events() {
    let rig = rig();
    rig.focused_window();
    rig.robot.press(&[Key::Shift]).unwrap().write("a").unwrap();
    let flags = rig.robot.engine().modifiers().unwrap();
    assert!(flags.contains(Modifier::Shift));
    assert!(rig
        .toolkit
        .key_events()
        .iter()
        .all(|(_, e)| e.modifiers.shift && !e.modifiers.control));

    rig.robot.release(&[]).unwrap();
    rig.toolkit.take_log();
    rig.robot.write("a").unwrap();
    assert!(rig.toolkit.key_events().iter().all(|(_, e)| e.modifiers.is_empty()));
}

#[test]
fn write_with_delay_paces_characters() {
    let rig = rig();
    rig.focused_window();
    let start = Instant::now();
    rig.robot
        .write_with_delay("abc", Duration::from_millis(20))
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(55));
    assert_eq!(rig.toolkit.key_events().len(), 9);
}

#[test]
fn push_chord_uses_modifier_order() {
    let rig = rig();
    let chord = Chord::parse("ctrl+shift+s").unwrap();
    rig.robot.push_chord(&chord).unwrap();
    assert_eq!(
        rig.toolkit.log(),
        vec![
            Recorded::KeyDown(Key::Control),
            Recorded::KeyDown(Key::Shift),
            Recorded::KeyDown(Key::S),
            Recorded::KeyUp(Key::S),
            Recorded::KeyUp(Key::Shift),
            Recorded::KeyUp(Key::Control),
        ]
    );
}

#[test]
fn injection_failures_surface_after_the_drain() {
    let rig = rig();
    rig.toolkit.set_unavailable(Some("no display"));
    match rig.robot.press(&[Key::A, Key::B]) {
        Err(Error::Inject(InjectError::Unavailable(reason))) => assert_eq!(reason, "no display"),
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
    assert!(rig.robot.engine().held_keys().unwrap().is_empty());

    rig.toolkit.set_unavailable(None);
    rig.robot.press(&[Key::A]).unwrap();
    assert_eq!(rig.robot.engine().held_keys().unwrap(), vec![Key::A]);
}

#[test]
fn keyboard_works_from_the_ui_thread() {
    let rig = rig();
    rig.focused_window();
    let robot = rig.robot.clone();
    rig.robot
        .bridge()
        .run_blocking(move || {
            robot.press(&[Key::Alt])?;
            robot.write("z")?;
            robot.release(&[]).map(|_| ())
        })
        .unwrap()
        .unwrap();
    assert_eq!(key_ups(&rig.toolkit.log()), vec![Key::Alt]);
    assert_eq!(rig.toolkit.key_events().len(), 3);
    assert!(rig.toolkit.key_events().iter().all(|(_, e)| e.modifiers.alt));
}

#[test]
fn toolkit_is_only_touched_on_the_ui_thread() {
    let rig = rig();
    rig.focused_window();
    rig.robot
        .push(&[Key::Control, Key::C])
        .unwrap()
        .write("hi")
        .unwrap();
    assert!(rig.toolkit.off_thread_calls().is_empty());
}
