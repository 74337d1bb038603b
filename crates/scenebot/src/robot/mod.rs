//! The chainable automation facade.
//!
//! [`Robot`] owns the bridge, the input engine and the query context, and
//! exposes them through three capability traits: [`Keyboard`], [`Mouse`]
//! and [`Windows`]. Operations that act on the UI return `Result<&Self>`
//! after the UI has settled:
//!
//! ```ignore
//! robot.click_on("#name", &[])?.write("Ada")?.push(&[Key::Enter])?;
//! ```

mod keyboard;
mod mouse;
mod window;

use std::sync::Arc;

use tracing::info;
use ui_bridge::ThreadBridge;

pub use self::{keyboard::Keyboard, mouse::Mouse, window::Windows};
use crate::{
    config::RobotConfig,
    input::InputEngine,
    query::{Matcher, NodeQuery, Source},
    toolkit::{InputInjector, SceneGraph},
};

/// Drives a UI from any thread.
#[derive(Clone)]
pub struct Robot {
    /// Route to the UI thread.
    pub(crate) bridge: ThreadBridge,
    /// Live scene.
    pub(crate) scene: Arc<dyn SceneGraph>,
    /// Keyboard and pointer state machine.
    pub(crate) engine: InputEngine,
    /// Timings.
    pub(crate) config: Arc<RobotConfig>,
}

impl Robot {
    /// Build a robot over a toolkit's scene and input primitive.
    pub fn new(
        bridge: ThreadBridge,
        scene: Arc<dyn SceneGraph>,
        injector: Arc<dyn InputInjector>,
        config: RobotConfig,
    ) -> Self {
        let config = Arc::new(config);
        info!(?config, "robot_created");
        let engine = InputEngine::new(bridge.clone(), scene.clone(), injector, config.clone());
        Self {
            bridge,
            scene,
            engine,
            config,
        }
    }

    /// The bridge to the UI thread.
    pub fn bridge(&self) -> &ThreadBridge {
        &self.bridge
    }

    /// Direct access to key and pointer state.
    pub fn engine(&self) -> &InputEngine {
        &self.engine
    }

    /// Timings in effect.
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// A query over `source` sharing this robot's context.
    pub fn query(&self, source: Source) -> NodeQuery {
        NodeQuery::new(
            self.bridge.clone(),
            self.scene.clone(),
            self.config.clone(),
            source,
        )
    }
}

/// Anything a robot can resolve to a [`NodeQuery`].
pub trait IntoQuery {
    /// Build the query, rooting selectors at the focused scene.
    fn into_query(self, robot: &Robot) -> NodeQuery;
}

impl IntoQuery for NodeQuery {
    fn into_query(self, _robot: &Robot) -> NodeQuery {
        self
    }
}

impl IntoQuery for &NodeQuery {
    fn into_query(self, _robot: &Robot) -> NodeQuery {
        self.clone()
    }
}

impl IntoQuery for &str {
    fn into_query(self, robot: &Robot) -> NodeQuery {
        robot.lookup(self)
    }
}

impl IntoQuery for String {
    fn into_query(self, robot: &Robot) -> NodeQuery {
        robot.lookup(self)
    }
}

impl IntoQuery for Matcher {
    fn into_query(self, robot: &Robot) -> NodeQuery {
        robot.lookup(self)
    }
}
