//! Services module
//!
//! This module contains business logic services

pub mod broadcast;
pub mod notification;
pub mod permission;
pub mod ports;
pub mod relay;
pub mod translation;

// Re-export commonly used services
pub use broadcast::{BroadcastDispatcher, DeliveryOutcome, DeliveryTransport, DispatchSettings, TelegramTransport};
pub use notification::{NotificationService, NotificationStats};
pub use permission::{PermissionResolver, PermissionStore};
pub use ports::{AuditStore, GroupRegistry, OwnerNotifier};
pub use relay::{GroupReply, GroupTranslation, RelayService, RelaySettings};
pub use translation::{ChainSettings, DeeplProvider, LlmProvider, TranslationProvider, TranslatorChain};

use std::sync::Arc;
use teloxide::Bot;
use tracing::info;
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::middleware::rate_limit::{BroadcastRateLimiter, RateLimitConfig};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub database: DatabaseService,
    pub notification_service: NotificationService,
    pub permissions: PermissionResolver,
    pub relay: Arc<RelayService>,
}

impl ServiceFactory {
    /// Wire the relay core to the Bot API and the database
    pub fn new(bot: Bot, settings: &Settings, database: DatabaseService, store: Arc<PermissionStore>) -> Result<Self> {
        let notification_service = NotificationService::new(bot.clone(), settings.bot.owner_id);
        let notifier: Arc<dyn OwnerNotifier> = Arc::new(notification_service.clone());

        let providers: Vec<Arc<dyn TranslationProvider>> = vec![
            Arc::new(DeeplProvider::new(&settings.translation.primary)?),
            Arc::new(LlmProvider::new(&settings.translation.llm)?),
        ];
        let chain = Arc::new(TranslatorChain::new(
            providers,
            notifier,
            ChainSettings::from(&settings.translation),
        ));

        let registry: Arc<dyn GroupRegistry> = Arc::new(database.groups.clone());
        let audit: Arc<dyn AuditStore> = Arc::new(database.broadcasts.clone());
        let transport: Arc<dyn DeliveryTransport> = Arc::new(TelegramTransport::new(bot));
        let dispatcher = BroadcastDispatcher::new(
            transport,
            registry.clone(),
            DispatchSettings::from(&settings.broadcast),
        );

        let permissions = PermissionResolver::new(settings.bot.owner_id, store);
        let rate_limiter = Arc::new(BroadcastRateLimiter::new(RateLimitConfig::from(&settings.broadcast)));

        let relay = Arc::new(RelayService::new(
            chain,
            dispatcher,
            permissions.clone(),
            rate_limiter,
            registry,
            audit,
            RelaySettings::from(settings),
        ));

        info!(owner_configured = settings.bot.owner_id.is_some(), "Services initialized");

        Ok(Self {
            database,
            notification_service,
            permissions,
            relay,
        })
    }
}
