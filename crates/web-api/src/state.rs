use std::sync::Arc;

use application::{IdentityVerifier, MessageRouter};

#[derive(Clone)]
pub struct AppState {
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    pub message_router: Arc<MessageRouter>,
}

impl AppState {
    pub fn new(
        identity_verifier: Arc<dyn IdentityVerifier>,
        message_router: Arc<MessageRouter>,
    ) -> Self {
        Self {
            identity_verifier,
            message_router,
        }
    }
}
