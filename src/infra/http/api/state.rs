use std::sync::Arc;

use crate::application::AppServices;
use crate::application::repos::DocumentStore;

#[derive(Clone)]
pub struct ApiState {
    pub services: AppServices,
}

impl ApiState {
    pub fn new(services: AppServices) -> Self {
        Self { services }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        self.services.backends.documents.store()
    }
}
