use super::Robot;
use crate::{
    error::Result,
    query::{Matcher, NodeQuery, Source},
    toolkit::{NodeId, SceneGraph, WindowId},
};

/// Window enumeration and query roots.
pub trait Windows {
    /// Every open top-level window.
    fn list_windows(&self) -> Result<Vec<WindowId>>;

    /// The first focused window, if any.
    fn focused_window(&self) -> Result<Option<WindowId>>;

    /// Window that keyboard input goes to: the focused one.
    fn target_window(&self) -> Result<Option<WindowId>> {
        self.focused_window()
    }

    /// Nodes in the focused window's scene (root included) matching
    /// `selector`. The focused window is resolved at each evaluation.
    fn lookup(&self, selector: impl Into<Matcher>) -> NodeQuery;

    /// Like [`lookup`](Self::lookup) with a predicate.
    fn lookup_by(
        &self,
        predicate: impl Fn(&dyn SceneGraph, NodeId) -> bool + Send + Sync + 'static,
    ) -> NodeQuery;

    /// A query whose results are `roots` themselves, while they are live.
    fn from(&self, roots: &[NodeId]) -> NodeQuery;

    /// A query whose results are the scene roots of every open window.
    fn from_all_windows(&self) -> NodeQuery;
}

impl Windows for Robot {
    fn list_windows(&self) -> Result<Vec<WindowId>> {
        let scene = self.scene.clone();
        Ok(self.bridge.run_blocking(move || scene.windows())?)
    }

    fn focused_window(&self) -> Result<Option<WindowId>> {
        let scene = self.scene.clone();
        Ok(self.bridge.run_blocking(move || scene.focused_window())?)
    }

    fn lookup(&self, selector: impl Into<Matcher>) -> NodeQuery {
        self.query(Source::FocusedScene).lookup(selector)
    }

    fn lookup_by(
        &self,
        predicate: impl Fn(&dyn SceneGraph, NodeId) -> bool + Send + Sync + 'static,
    ) -> NodeQuery {
        self.query(Source::FocusedScene).lookup_by(predicate)
    }

    fn from(&self, roots: &[NodeId]) -> NodeQuery {
        self.query(Source::Fixed(roots.to_vec()))
    }

    fn from_all_windows(&self) -> NodeQuery {
        self.query(Source::AllWindows)
    }
}
