mod config;
mod system;

pub use config::Config;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};

#[derive(Clone)]
pub struct SessionsContext {
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

impl SessionsContext {
    fn create() -> Self {
        Self {
            config: Config::new(),
            sys: Arc::new(RealSys {}),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> SessionsContext {
    SessionsContext::create()
}
