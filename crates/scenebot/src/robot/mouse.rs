use tracing::debug;

use super::{IntoQuery, Robot};
use crate::{
    error::{Error, Result},
    geom::Point,
    toolkit::{Motion, MouseButton, NodeId},
};

/// Pointer operations.
pub trait Mouse {
    /// Move the pointer to a screen point.
    fn move_to(&self, to: Point, motion: Motion) -> Result<&Self>;

    /// Move the pointer to the center of the first match of `target`.
    /// Fails with [`Error::NotFound`] if nothing matches.
    fn move_to_query(&self, target: impl IntoQuery, motion: Motion) -> Result<&Self>;

    /// Move the pointer relative to where it is now.
    fn move_by(&self, dx: f64, dy: f64, motion: Motion) -> Result<&Self>;

    /// Click at the current position; no buttons means the primary button.
    fn click(&self, buttons: &[MouseButton]) -> Result<&Self>;

    /// Wait for `target` to match, move to its center, then click.
    /// Fails with [`Error::NotFound`] if the retried query finds nothing.
    fn click_on(&self, target: impl IntoQuery, buttons: &[MouseButton]) -> Result<&Self>;

    /// Screen position of the center of `node`.
    fn point_of(&self, node: NodeId) -> Result<Point>;

    /// Center of the first match of `target`, if anything matches.
    fn point(&self, target: impl IntoQuery) -> Result<Option<Point>>;

    /// Current pointer position.
    fn mouse_position(&self) -> Result<Point>;
}

impl Mouse for Robot {
    fn move_to(&self, to: Point, motion: Motion) -> Result<&Self> {
        self.engine.move_to(to, motion)?;
        Ok(self)
    }

    fn move_to_query(&self, target: impl IntoQuery, motion: Motion) -> Result<&Self> {
        let query = target.into_query(self);
        let to = self
            .point(&query)?
            .ok_or_else(|| Error::not_found(query.to_string()))?;
        self.move_to(to, motion)
    }

    fn move_by(&self, dx: f64, dy: f64, motion: Motion) -> Result<&Self> {
        let from = self.engine.mouse_position()?;
        self.move_to(from.offset(dx, dy), motion)
    }

    fn click(&self, buttons: &[MouseButton]) -> Result<&Self> {
        self.engine.click(buttons)?;
        Ok(self)
    }

    fn click_on(&self, target: impl IntoQuery, buttons: &[MouseButton]) -> Result<&Self> {
        let query = target.into_query(self);
        let node = query
            .query_with_retry()?
            .ok_or_else(|| Error::not_found(query.to_string()))?;
        let at = self.point_of(node)?;
        debug!(%node, ?at, ?buttons, "click_on");
        self.move_to(at, Motion::default())?.click(buttons)
    }

    fn point_of(&self, node: NodeId) -> Result<Point> {
        let scene = self.scene.clone();
        self.bridge
            .run_blocking(move || {
                let bounds = scene.bounds_in_local(node)?;
                scene.local_to_screen(node, bounds.center())
            })?
            .ok_or(Error::NodeUnavailable(node))
    }

    fn point(&self, target: impl IntoQuery) -> Result<Option<Point>> {
        let Some(node) = target.into_query(self).query()? else {
            return Ok(None);
        };
        match self.point_of(node) {
            Ok(p) => Ok(Some(p)),
            Err(Error::NodeUnavailable(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn mouse_position(&self) -> Result<Point> {
        self.engine.mouse_position()
    }
}
