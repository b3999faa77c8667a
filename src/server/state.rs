use axum::extract::FromRef;

use crate::catalog::Catalog;
use crate::mailer::Mailer;
use crate::membership::TierTokens;
use crate::payments::PaymentGateway;
use crate::storage::ObjectStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCatalog = Arc<Catalog>;
pub type GuardedObjectStore = Arc<dyn ObjectStore>;
pub type GuardedPaymentGateway = Arc<dyn PaymentGateway>;
pub type GuardedMailer = Arc<dyn Mailer>;
pub type GuardedTierTokens = Arc<TierTokens>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog: GuardedCatalog,
    pub store: GuardedObjectStore,
    pub payments: GuardedPaymentGateway,
    pub mailer: GuardedMailer,
    pub tier_tokens: GuardedTierTokens,
    pub albums_prefix: String,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedCatalog {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for GuardedObjectStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for GuardedPaymentGateway {
    fn from_ref(input: &ServerState) -> Self {
        input.payments.clone()
    }
}

impl FromRef<ServerState> for GuardedMailer {
    fn from_ref(input: &ServerState) -> Self {
        input.mailer.clone()
    }
}

impl FromRef<ServerState> for GuardedTierTokens {
    fn from_ref(input: &ServerState) -> Self {
        input.tier_tokens.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
