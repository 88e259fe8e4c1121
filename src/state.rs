use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        generator::ItineraryGenerator, planner::Planner, supabase::AuthService, trips::TripStore,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub trips: TripStore,
    pub auth: Arc<dyn AuthService>,
    pub planner: Planner,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DbPool,
        auth: Arc<dyn AuthService>,
        generator: Arc<dyn ItineraryGenerator>,
    ) -> Self {
        let digest = Sha512::digest(config.cookie_secret.as_bytes());
        let cookie_key = Key::from(&digest[..]);
        Self {
            config,
            trips: TripStore::new(db),
            auth,
            planner: Planner::new(generator),
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
