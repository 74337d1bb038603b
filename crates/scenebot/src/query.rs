//! Lazy node queries over the live scene graph.
//!
//! A [`NodeQuery`] is a description, not a result: a root source plus a
//! chain of matchers. Every evaluation walks the scene as it is at that
//! moment, on the UI thread. Refinement with [`NodeQuery::lookup`] re-runs
//! the parent query first, so a chain built early still sees later changes.

use std::{
    collections::HashSet,
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, trace};
use ui_bridge::ThreadBridge;

use crate::{
    config::RobotConfig,
    error::Result,
    input::pause,
    toolkit::{NodeId, SceneGraph},
};

/// Predicate form of a matcher.
pub type NodePredicate = Arc<dyn Fn(&dyn SceneGraph, NodeId) -> bool + Send + Sync>;

/// One refinement step.
#[derive(Clone)]
pub enum Matcher {
    /// Evaluated by the toolkit's selector engine.
    Selector(String),
    /// Arbitrary test over a node.
    Predicate(NodePredicate),
}

impl Matcher {
    /// Wrap a closure as a predicate matcher.
    pub fn predicate(
        f: impl Fn(&dyn SceneGraph, NodeId) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Predicate(Arc::new(f))
    }

    /// Test one node.
    fn matches(&self, scene: &dyn SceneGraph, node: NodeId) -> bool {
        match self {
            Self::Selector(s) => scene.matches(node, s),
            Self::Predicate(p) => p(scene, node),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(s) => f.debug_tuple("Selector").field(s).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(s) => write!(f, "{s:?}"),
            Self::Predicate(_) => f.write_str("<predicate>"),
        }
    }
}

impl From<&str> for Matcher {
    fn from(s: &str) -> Self {
        Self::Selector(s.to_string())
    }
}

impl From<String> for Matcher {
    fn from(s: String) -> Self {
        Self::Selector(s)
    }
}

/// Where a query's roots come from.
#[derive(Clone, Debug)]
pub enum Source {
    /// A fixed set of nodes, which evaluate to themselves while live.
    Fixed(Vec<NodeId>),
    /// The scene root of the focused window at evaluation time.
    FocusedScene,
    /// The scene roots of every open window, in window order.
    AllWindows,
    /// Matches of `parent`'s result subtrees against `matcher`.
    Refine {
        /// Query whose matches become the roots.
        parent: Arc<Source>,
        /// Test applied to every node under those roots.
        matcher: Matcher,
    },
}

impl Source {
    /// Evaluate against the scene as it is now. Must run on the UI thread.
    pub fn evaluate(&self, scene: &dyn SceneGraph) -> Vec<NodeId> {
        match self {
            Self::Fixed(roots) => {
                let mut seen = HashSet::new();
                roots
                    .iter()
                    .copied()
                    .filter(|n| scene.is_live(*n) && seen.insert(*n))
                    .collect()
            }
            Self::FocusedScene => scene
                .focused_window()
                .and_then(|w| scene.scene_root(w))
                .filter(|n| scene.is_live(*n))
                .into_iter()
                .collect(),
            Self::AllWindows => scene
                .windows()
                .into_iter()
                .filter_map(|w| scene.scene_root(w))
                .filter(|n| scene.is_live(*n))
                .collect(),
            Self::Refine { parent, matcher } => {
                collect_matches(scene, &parent.evaluate(scene), matcher)
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(roots) => write!(f, "from({} roots)", roots.len()),
            Self::FocusedScene => f.write_str("focused scene"),
            Self::AllWindows => f.write_str("all windows"),
            Self::Refine { parent, matcher } => write!(f, "{parent} > {matcher}"),
        }
    }
}

/// Pre-order walk of every root's subtree, roots in order.
///
/// Each root is tested as well as its descendants. Dead nodes and their
/// subtrees are skipped, and a node reachable from several roots is
/// reported once, at its first position.
fn collect_matches(scene: &dyn SceneGraph, roots: &[NodeId], matcher: &Matcher) -> Vec<NodeId> {
    let mut visited = HashSet::new();
    let mut out = Vec::new();
    for &root in roots {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            let Some(children) = scene.children(node) else {
                trace!(%node, "query_skip_dead_node");
                continue;
            };
            if matcher.matches(scene, node) {
                out.push(node);
            }
            stack.extend(children.into_iter().rev());
        }
    }
    out
}

/// Shared context every query in a chain evaluates with.
struct Context {
    /// Route to the UI thread.
    bridge: ThreadBridge,
    /// The live scene.
    scene: Arc<dyn SceneGraph>,
    /// Retry timings.
    config: Arc<RobotConfig>,
}

/// A lazily evaluated, composable node search.
#[derive(Clone)]
pub struct NodeQuery {
    /// Evaluation context.
    ctx: Arc<Context>,
    /// What to evaluate.
    source: Arc<Source>,
}

impl fmt::Debug for NodeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeQuery")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for NodeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl NodeQuery {
    /// A query over `source`, evaluated through `bridge` against `scene`.
    pub fn new(
        bridge: ThreadBridge,
        scene: Arc<dyn SceneGraph>,
        config: Arc<RobotConfig>,
        source: Source,
    ) -> Self {
        Self {
            ctx: Arc::new(Context {
                bridge,
                scene,
                config,
            }),
            source: Arc::new(source),
        }
    }

    /// The root source this query evaluates.
    pub fn source(&self) -> &Source {
        &self.source
    }

    pub(crate) fn shared_source(&self) -> Arc<Source> {
        self.source.clone()
    }

    /// Refine: nodes under this query's matches (inclusive) matching `selector`.
    #[must_use]
    pub fn lookup(&self, selector: impl Into<Matcher>) -> Self {
        Self {
            ctx: self.ctx.clone(),
            source: Arc::new(Source::Refine {
                parent: self.source.clone(),
                matcher: selector.into(),
            }),
        }
    }

    /// Refine with a predicate over the scene and node.
    #[must_use]
    pub fn lookup_by(
        &self,
        predicate: impl Fn(&dyn SceneGraph, NodeId) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.lookup(Matcher::predicate(predicate))
    }

    /// Every match, in traversal order. Empty when nothing matches.
    pub fn query_all(&self) -> Result<Vec<NodeId>> {
        let source = self.source.clone();
        let scene = self.ctx.scene.clone();
        let found = self
            .ctx
            .bridge
            .run_blocking(move || source.evaluate(scene.as_ref()))?;
        trace!(query = %self, matches = found.len(), "query_all");
        Ok(found)
    }

    /// The first match, if any.
    pub fn query(&self) -> Result<Option<NodeId>> {
        Ok(self.query_all()?.into_iter().next())
    }

    /// Number of matches right now.
    pub fn count(&self) -> Result<usize> {
        Ok(self.query_all()?.len())
    }

    /// True if anything matches right now.
    pub fn exists(&self) -> Result<bool> {
        Ok(self.query()?.is_some())
    }

    /// Like [`query`](Self::query), but poll until something matches or the
    /// retry timeout elapses.
    pub fn query_with_retry(&self) -> Result<Option<NodeId>> {
        Ok(self.query_all_with_retry()?.into_iter().next())
    }

    /// Like [`query_all`](Self::query_all), but poll while the result is
    /// empty, up to the retry timeout. On the UI thread this evaluates once.
    pub fn query_all_with_retry(&self) -> Result<Vec<NodeId>> {
        let interval = self.ctx.config.query_retry_interval();
        let timeout = self.ctx.config.query_retry_timeout();
        self.poll(interval, timeout)
    }

    /// Evaluate until something matches or `timeout` passes.
    fn poll(&self, interval: Duration, timeout: Duration) -> Result<Vec<NodeId>> {
        let start = Instant::now();
        let mut attempts = 1_u32;
        loop {
            let found = self.query_all()?;
            if !found.is_empty() || self.ctx.bridge.is_ui_thread() {
                return Ok(found);
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                debug!(
                    query = %self,
                    attempts,
                    elapsed_ms = elapsed.as_millis(),
                    "query_retry_exhausted"
                );
                return Ok(found);
            }
            pause(interval.min(timeout - elapsed));
            attempts += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::Rect,
        test_support::{MockToolkit, NodeSpec},
    };

    fn label(id: &str) -> NodeSpec {
        NodeSpec::new("Label").id(id).bounds(Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn traversal_is_preorder_and_includes_roots() {
        let tk = MockToolkit::new();
        let (_w, root) = tk.add_window("Pane");
        let a = tk.add_node(root, NodeSpec::new("Box").class("hit"));
        let a1 = tk.add_node(a, label("a1").class("hit"));
        let b = tk.add_node(root, label("b").class("hit"));
        tk.add_node(root, label("c"));

        let hits = Source::Refine {
            parent: Arc::new(Source::Fixed(vec![root])),
            matcher: ".hit".into(),
        };
        assert_eq!(hits.evaluate(&tk), vec![a, a1, b]);

        let all = Source::Refine {
            parent: Arc::new(Source::Fixed(vec![a])),
            matcher: Matcher::predicate(|_, _| true),
        };
        assert_eq!(all.evaluate(&tk), vec![a, a1]);
    }

    #[test]
    fn overlapping_roots_report_nodes_once() {
        let tk = MockToolkit::new();
        let (_w, root) = tk.add_window("Pane");
        let a = tk.add_node(root, label("a"));
        let any = Matcher::predicate(|_, _| true);
        let q = Source::Refine {
            parent: Arc::new(Source::Fixed(vec![a, root, a])),
            matcher: any,
        };
        assert_eq!(q.evaluate(&tk), vec![a, root]);
    }

    #[test]
    fn dead_roots_are_skipped() {
        let tk = MockToolkit::new();
        let (_w, root) = tk.add_window("Pane");
        let a = tk.add_node(root, label("a"));
        let b = tk.add_node(root, label("b"));
        tk.remove_node(a);
        assert_eq!(Source::Fixed(vec![a, b]).evaluate(&tk), vec![b]);
        let q = Source::Refine {
            parent: Arc::new(Source::Fixed(vec![a, b])),
            matcher: "Label".into(),
        };
        assert_eq!(q.evaluate(&tk), vec![b]);
    }

    #[test]
    fn focused_scene_follows_focus() {
        let tk = MockToolkit::new();
        let (w1, r1) = tk.add_window("Pane");
        let (w2, r2) = tk.add_window("Pane");
        assert!(Source::FocusedScene.evaluate(&tk).is_empty());
        tk.focus_window(w1);
        assert_eq!(Source::FocusedScene.evaluate(&tk), vec![r1]);
        tk.focus_window(w2);
        assert_eq!(Source::FocusedScene.evaluate(&tk), vec![r2]);
        assert_eq!(Source::AllWindows.evaluate(&tk), vec![r1, r2]);
    }

    #[test]
    fn display_describes_the_chain() {
        let q = Source::Refine {
            parent: Arc::new(Source::Refine {
                parent: Arc::new(Source::FocusedScene),
                matcher: "#form".into(),
            }),
            matcher: Matcher::predicate(|_, _| false),
        };
        assert_eq!(q.to_string(), "focused scene > \"#form\" > <predicate>");
    }
}
