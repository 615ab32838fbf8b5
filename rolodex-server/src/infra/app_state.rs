use std::{fmt, sync::Arc};

use rolodex_config::Config;
use rolodex_core::application::unit_of_work::AppUnitOfWork;
use rolodex_core::auth::CredentialSealer;
use rolodex_core::controller::ResourceController;
use rolodex_core::Result;

#[derive(Clone)]
pub struct AppState {
    pub unit_of_work: Arc<AppUnitOfWork>,
    pub controller: Arc<ResourceController>,
    pub sealer: Arc<CredentialSealer>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("unit_of_work", &self.unit_of_work)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        unit_of_work: Arc<AppUnitOfWork>,
        sealer: Arc<CredentialSealer>,
    ) -> Result<Self> {
        let controller = ResourceController::new(
            Arc::clone(&unit_of_work.identities),
            Arc::clone(&sealer),
        )?;

        Ok(Self {
            unit_of_work,
            controller: Arc::new(controller),
            sealer,
            config,
        })
    }

    pub fn unit_of_work(&self) -> &AppUnitOfWork {
        &self.unit_of_work
    }

    pub fn controller(&self) -> &ResourceController {
        &self.controller
    }

    pub fn sealer(&self) -> &CredentialSealer {
        &self.sealer
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
