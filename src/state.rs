use std::sync::Arc;

use crate::{
    config::Config,
    services::SessionLifecycle,
    store::{DataStore, SharedStore},
    utils::clock::Clock,
};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub clock: Clock,
    pub config: Config,
}

impl AppState {
    pub fn new(store: impl DataStore + 'static, clock: Clock, config: Config) -> Self {
        Self {
            store: Arc::new(store),
            clock,
            config,
        }
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for SessionLifecycle {
    fn from_ref(state: &AppState) -> Self {
        SessionLifecycle::new(state.store.clone(), state.clock)
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
