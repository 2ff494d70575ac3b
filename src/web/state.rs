use std::sync::Arc;

use crate::{coach::Coach, model::ModelManager};

#[derive(Clone)]
pub struct AppState {
    mm: ModelManager,
    coach: Coach,
    jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(mm: ModelManager, coach: Coach, jwt_secret: &str) -> Self {
        Self {
            mm,
            coach,
            jwt_secret: Arc::from(jwt_secret),
        }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn coach(&self) -> &Coach {
        &self.coach
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}
