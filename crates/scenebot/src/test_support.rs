//! In-memory toolkit for exercising the robot without a real UI.
//!
//! [`MockToolkit`] implements both [`SceneGraph`] and [`InputInjector`] over
//! a small node tree, records every primitive call in order, and counts
//! calls that arrive off the UI thread. [`TestRig`] wires it to an
//! [`EventLoop`] and a [`Robot`].

use std::{
    collections::BTreeMap,
    fmt, mem,
    sync::{Arc, OnceLock},
};

use parking_lot::{Mutex, MutexGuard};
use scene_keycode::Key;
use tracing::warn;
use ui_bridge::{EventLoop, ThreadBridge, UiExecutor};

use crate::{
    config::RobotConfig,
    geom::{Point, Rect},
    robot::Robot,
    toolkit::{
        InjectError, InputInjector, KeyEvent, KeyTarget, MouseButton, NodeId, SceneGraph,
        WindowId,
    },
};

/// One recorded primitive call.
#[derive(Clone, Debug, PartialEq)]
pub enum Recorded {
    /// `key_down`.
    KeyDown(Key),
    /// `key_up`.
    KeyUp(Key),
    /// `mouse_move`.
    MouseMove(Point),
    /// `mouse_click`.
    Click(Vec<MouseButton>),
    /// `dispatch_key`.
    Dispatch(KeyTarget, KeyEvent),
}

/// Builder for a mock node.
#[derive(Clone, Debug)]
pub struct NodeSpec {
    /// Type name, matched by bare selectors (`Button`).
    kind: String,
    /// Matched by `#id`.
    id: Option<String>,
    /// Matched by `.class`.
    classes: Vec<String>,
    /// Screen rectangle; local bounds are `(0, 0, w, h)`.
    bounds: Rect,
}

impl NodeSpec {
    /// A node of type `kind` with no id, classes or size.
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: None,
            classes: Vec::new(),
            bounds: Rect::default(),
        }
    }

    /// Set the `#id`.
    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Add a style class.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Set the screen rectangle.
    #[must_use]
    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }
}

#[derive(Debug)]
struct MockNode {
    /// How the node was built.
    spec: NodeSpec,
    /// `None` for scene roots.
    parent: Option<NodeId>,
    /// Child order as the toolkit keeps it.
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct MockWindow {
    /// Scene root.
    root: NodeId,
    /// Window focus.
    focused: bool,
    /// Focus owner inside the scene.
    focus_owner: Option<NodeId>,
}

#[derive(Debug, Default)]
struct State {
    /// Last id handed out; windows and nodes share the counter.
    next_id: u64,
    /// Live nodes.
    nodes: BTreeMap<NodeId, MockNode>,
    /// Open windows, in creation order.
    windows: BTreeMap<WindowId, MockWindow>,
    /// Pointer position.
    pointer: Point,
    /// Primitive calls in order.
    log: Vec<Recorded>,
    /// Injection failure reason, when set.
    unavailable: Option<String>,
    /// Toolkit calls that arrived off the UI thread.
    off_thread_calls: Vec<&'static str>,
}

impl State {
    /// Allocate an id.
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Unlink `node` from its parent and drop its subtree.
    fn detach(&mut self, node: NodeId) {
        let Some(n) = self.nodes.remove(&node) else {
            return;
        };
        if let Some(parent) = n.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
        for w in self.windows.values_mut() {
            if w.focus_owner == Some(node) {
                w.focus_owner = None;
            }
        }
        for child in n.children {
            self.detach(child);
        }
    }
}

/// A scriptable in-memory toolkit.
#[derive(Default)]
pub struct MockToolkit {
    /// Scene, pointer and call log.
    state: Mutex<State>,
    /// Set by [`bind`](Self::bind); enables the off-thread check.
    ui: OnceLock<Arc<dyn UiExecutor>>,
}

impl fmt::Debug for MockToolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockToolkit")
            .field("state", &*self.state.lock())
            .field("bound", &self.ui.get().is_some())
            .finish()
    }
}

impl MockToolkit {
    /// An empty toolkit: no windows, pointer at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start checking that toolkit calls happen on `executor`'s UI thread.
    pub fn bind(&self, executor: Arc<dyn UiExecutor>) {
        if self.ui.set(executor).is_err() {
            warn!("mock_toolkit_already_bound");
        }
    }

    /// Lock the state, noting calls made off the UI thread.
    fn enter(&self, op: &'static str) -> MutexGuard<'_, State> {
        let mut st = self.state.lock();
        if self.ui.get().is_some_and(|ui| !ui.is_ui_thread()) {
            st.off_thread_calls.push(op);
        }
        st
    }

    /// Open an unfocused window whose scene root has type `root_kind`.
    pub fn add_window(&self, root_kind: &str) -> (WindowId, NodeId) {
        let mut st = self.state.lock();
        let window = WindowId(st.next());
        let root = NodeId(st.next());
        st.nodes.insert(
            root,
            MockNode {
                spec: NodeSpec::new(root_kind),
                parent: None,
                children: Vec::new(),
            },
        );
        st.windows.insert(
            window,
            MockWindow {
                root,
                focused: false,
                focus_owner: None,
            },
        );
        (window, root)
    }

    /// Close a window and drop its scene.
    pub fn close_window(&self, window: WindowId) {
        let mut st = self.state.lock();
        if let Some(w) = st.windows.remove(&window) {
            st.detach(w.root);
        }
    }

    /// Append a child under `parent`.
    pub fn add_node(&self, parent: NodeId, spec: NodeSpec) -> NodeId {
        let mut st = self.state.lock();
        let node = NodeId(st.next());
        st.nodes.insert(
            node,
            MockNode {
                spec,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        if let Some(p) = st.nodes.get_mut(&parent) {
            p.children.push(node);
        }
        node
    }

    /// Detach `node` and its subtree; their ids go stale.
    pub fn remove_node(&self, node: NodeId) {
        self.state.lock().detach(node);
    }

    /// Give `window` focus, taking it from every other window.
    pub fn focus_window(&self, window: WindowId) {
        let mut st = self.state.lock();
        for (id, w) in &mut st.windows {
            w.focused = *id == window;
        }
    }

    /// Set or clear the focus owner inside `window`.
    pub fn set_focus_owner(&self, window: WindowId, node: Option<NodeId>) {
        if let Some(w) = self.state.lock().windows.get_mut(&window) {
            w.focus_owner = node;
        }
    }

    /// Make every injector call fail with [`InjectError::Unavailable`].
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.state.lock().unavailable = reason.map(str::to_string);
    }

    /// Place the pointer without recording a move.
    pub fn warp_pointer(&self, to: Point) {
        self.state.lock().pointer = to;
    }

    /// Current pointer position.
    pub fn pointer(&self) -> Point {
        self.state.lock().pointer
    }

    /// Everything recorded so far, in call order.
    pub fn log(&self) -> Vec<Recorded> {
        self.state.lock().log.clone()
    }

    /// Return and clear the log.
    pub fn take_log(&self) -> Vec<Recorded> {
        mem::take(&mut self.state.lock().log)
    }

    /// Dispatched key events only.
    pub fn key_events(&self) -> Vec<(KeyTarget, KeyEvent)> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Dispatch(t, e) => Some((t, e)),
                _ => None,
            })
            .collect()
    }

    /// Pointer positions passed to `mouse_move`, in order.
    pub fn moves(&self) -> Vec<Point> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::MouseMove(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Names of toolkit calls made off the UI thread.
    pub fn off_thread_calls(&self) -> Vec<&'static str> {
        self.state.lock().off_thread_calls.clone()
    }

    /// Record an input primitive, or fail if injection is disabled.
    fn inject(&self, op: &'static str, record: Recorded) -> Result<(), InjectError> {
        let mut st = self.enter(op);
        if let Some(reason) = &st.unavailable {
            return Err(InjectError::Unavailable(reason.clone()));
        }
        if let Recorded::MouseMove(p) = record {
            st.pointer = p;
        }
        st.log.push(record);
        Ok(())
    }
}

/// Simple selectors: `Type`, `#id`, `.class`, or a compound like
/// `Button#ok.primary`.
fn selector_matches(spec: &NodeSpec, selector: &str) -> bool {
    let selector = selector.trim();
    if selector.is_empty() {
        return false;
    }
    let kind_end = selector.find(['#', '.']).unwrap_or(selector.len());
    let kind = &selector[..kind_end];
    if !kind.is_empty() && kind != spec.kind {
        return false;
    }
    let mut rest = &selector[kind_end..];
    while let Some(sigil) = rest.chars().next() {
        let body = &rest[1..];
        let end = body.find(['#', '.']).unwrap_or(body.len());
        let name = &body[..end];
        let ok = match sigil {
            '#' => spec.id.as_deref() == Some(name),
            _ => spec.classes.iter().any(|c| c == name),
        };
        if !ok || name.is_empty() {
            return false;
        }
        rest = &body[end..];
    }
    true
}

impl SceneGraph for MockToolkit {
    fn windows(&self) -> Vec<WindowId> {
        self.enter("windows").windows.keys().copied().collect()
    }

    fn is_focused(&self, window: WindowId) -> bool {
        self.enter("is_focused")
            .windows
            .get(&window)
            .is_some_and(|w| w.focused)
    }

    fn scene_root(&self, window: WindowId) -> Option<NodeId> {
        self.enter("scene_root").windows.get(&window).map(|w| w.root)
    }

    fn focus_owner(&self, window: WindowId) -> Option<NodeId> {
        self.enter("focus_owner")
            .windows
            .get(&window)
            .and_then(|w| w.focus_owner)
    }

    fn children(&self, node: NodeId) -> Option<Vec<NodeId>> {
        self.enter("children")
            .nodes
            .get(&node)
            .map(|n| n.children.clone())
    }

    fn bounds_in_local(&self, node: NodeId) -> Option<Rect> {
        self.enter("bounds_in_local")
            .nodes
            .get(&node)
            .map(|n| Rect::new(0.0, 0.0, n.spec.bounds.w, n.spec.bounds.h))
    }

    fn local_to_screen(&self, node: NodeId, point: Point) -> Option<Point> {
        self.enter("local_to_screen")
            .nodes
            .get(&node)
            .map(|n| point.offset(n.spec.bounds.x, n.spec.bounds.y))
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        self.enter("matches")
            .nodes
            .get(&node)
            .is_some_and(|n| selector_matches(&n.spec, selector))
    }

    fn dispatch_key(&self, target: KeyTarget, event: &KeyEvent) {
        self.enter("dispatch_key")
            .log
            .push(Recorded::Dispatch(target, event.clone()));
    }
}

impl InputInjector for MockToolkit {
    fn key_down(&self, key: Key) -> Result<(), InjectError> {
        self.inject("key_down", Recorded::KeyDown(key))
    }

    fn key_up(&self, key: Key) -> Result<(), InjectError> {
        self.inject("key_up", Recorded::KeyUp(key))
    }

    fn mouse_move(&self, to: Point) -> Result<(), InjectError> {
        self.inject("mouse_move", Recorded::MouseMove(to))
    }

    fn mouse_click(&self, buttons: &[MouseButton]) -> Result<(), InjectError> {
        self.inject("mouse_click", Recorded::Click(buttons.to_vec()))
    }

    fn mouse_position(&self) -> Result<Point, InjectError> {
        let st = self.enter("mouse_position");
        match &st.unavailable {
            Some(reason) => Err(InjectError::Unavailable(reason.clone())),
            None => Ok(st.pointer),
        }
    }
}

/// An event loop, a mock toolkit bound to it, and a robot driving both.
pub struct TestRig {
    /// The fake UI.
    pub toolkit: Arc<MockToolkit>,
    /// Robot under test.
    pub robot: Robot,
    /// Keeps the UI thread alive; declared last so it stops after the robot.
    event_loop: EventLoop,
}

impl TestRig {
    /// A rig with default timings.
    pub fn new() -> Self {
        Self::with_config(RobotConfig::default())
    }

    /// A rig with custom timings.
    pub fn with_config(config: RobotConfig) -> Self {
        let event_loop = EventLoop::builder()
            .name("scenebot-ui")
            .spawn()
            .expect("spawn UI event loop");
        let executor: Arc<dyn UiExecutor> = Arc::new(event_loop.handle());
        let toolkit = Arc::new(MockToolkit::new());
        toolkit.bind(executor.clone());
        let robot = Robot::new(
            ThreadBridge::new(executor),
            toolkit.clone(),
            toolkit.clone(),
            config,
        );
        Self {
            toolkit,
            robot,
            event_loop,
        }
    }

    /// The UI thread's executor, for scheduling scene changes.
    pub fn executor(&self) -> Arc<dyn UiExecutor> {
        Arc::new(self.event_loop.handle())
    }

    /// Open a focused window and return it with its root.
    pub fn focused_window(&self) -> (WindowId, NodeId) {
        let (w, root) = self.toolkit.add_window("Pane");
        self.toolkit.focus_window(w);
        (w, root)
    }
}

impl Default for TestRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_cover_type_id_and_class() {
        let spec = NodeSpec::new("Button").id("ok").class("primary").class("wide");
        assert!(selector_matches(&spec, "Button"));
        assert!(selector_matches(&spec, "#ok"));
        assert!(selector_matches(&spec, ".wide"));
        assert!(selector_matches(&spec, "Button#ok.primary"));
        assert!(!selector_matches(&spec, "Label"));
        assert!(!selector_matches(&spec, "#cancel"));
        assert!(!selector_matches(&spec, "Button.narrow"));
        assert!(!selector_matches(&spec, ""));
        assert!(!selector_matches(&spec, "#"));
    }

    #[test]
    fn removing_a_node_stales_its_subtree() {
        let tk = MockToolkit::new();
        let (w, root) = tk.add_window("Pane");
        let a = tk.add_node(root, NodeSpec::new("Box"));
        let b = tk.add_node(a, NodeSpec::new("Label"));
        tk.set_focus_owner(w, Some(b));
        tk.remove_node(a);
        assert_eq!(tk.children(root), Some(vec![]));
        assert_eq!(tk.children(b), None);
        assert_eq!(tk.focus_owner(w), None);
    }

    #[test]
    fn unavailable_injector_fails_without_recording() {
        let tk = MockToolkit::new();
        tk.set_unavailable(Some("headless"));
        assert_eq!(
            tk.key_down(Key::A),
            Err(InjectError::Unavailable("headless".into()))
        );
        assert!(tk.log().is_empty());
    }
}
