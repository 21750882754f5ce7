//! Multi-tenant chatbot builder API - Library exports for the binary and tests

pub mod api;
pub mod core;
pub mod infrastructure;

use crate::core::credentials::JwtCredentialService;
use crate::core::documents::TextDocumentProcessor;
use crate::core::email::SmtpEmailSender;
use crate::core::services::{
    MyAnalyticsService, MyAuthService, MyBotService, MyConversationResponder,
    MyConversationService, MyDocumentService, MyIntegrationService, MyLeadService,
    MyNotificationService, MySubscriptionService,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::repositories::{
    DbAnalyticsRepository, DbBotRepository, DbConversationRepository, DbDocumentRepository,
    DbIntegrationRepository, DbLeadRepository, DbNotificationRepository,
    DbSubscriptionRepository, DbUserRepository,
};
use di::{Injectable, ServiceCollection};

/// Registers every service of the application.
///
/// The connection pool and configuration are shared, everything else lives for one request.
pub fn services() -> ServiceCollection {
    let mut services = ServiceCollection::new();
    services
        .add(AppConfig::singleton())
        .add(DatabaseConnection::singleton())
        .add(JwtCredentialService::singleton())
        .add(SmtpEmailSender::singleton())
        .add(TextDocumentProcessor::singleton())
        .add(DbUserRepository::scoped())
        .add(DbBotRepository::scoped())
        .add(DbConversationRepository::scoped())
        .add(DbDocumentRepository::scoped())
        .add(DbLeadRepository::scoped())
        .add(DbIntegrationRepository::scoped())
        .add(DbSubscriptionRepository::scoped())
        .add(DbNotificationRepository::scoped())
        .add(DbAnalyticsRepository::scoped())
        .add(MyAuthService::scoped())
        .add(MyBotService::scoped())
        .add(MyConversationResponder::scoped())
        .add(MyConversationService::scoped())
        .add(MyDocumentService::scoped())
        .add(MyLeadService::scoped())
        .add(MySubscriptionService::scoped())
        .add(MyNotificationService::scoped())
        .add(MyIntegrationService::scoped())
        .add(MyAnalyticsService::scoped());
    services
}

/// The HTTP application without the outer middleware layers.
pub fn app() -> axum::Router {
    axum::Router::new()
        .nest("/api/v1", api::router())
        .merge(api::health::router())
}
