//! LinguaRelay Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use anyhow::Context;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn, error};

use LinguaRelay::{
    config::Settings,
    utils::logging,
    database::{DatabaseService, DatabaseConfig, create_pool, run_migrations},
    services::{PermissionStore, ServiceFactory},
    handlers::{Command, handle_command, handle_message, handle_my_chat_member},
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", LinguaRelay::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&DatabaseConfig::from(&settings.database)).await?;
    run_migrations(&db_pool).await?;

    let database_service = DatabaseService::new(db_pool);
    let permission_store = Arc::new(PermissionStore::load(&database_service.roles).await?);

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);

    info!("Initializing services...");
    let services = ServiceFactory::new(bot.clone(), &settings, database_service, permission_store)?;

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![Arc::new(services)])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build();

    info!("LinguaRelay bot is ready, starting polling...");
    dispatcher.dispatch().await;

    info!("LinguaRelay bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    // Handle commands
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_commands),
                )
                .branch(
                    // Handle regular messages
                    dptree::endpoint(handle_messages),
                ),
        )
        .branch(
            // Handle my chat member updates (bot removed from groups)
            Update::filter_my_chat_member().endpoint(handle_chat_member_updates),
        )
}

/// Handle bot commands
async fn handle_commands(bot: Bot, msg: Message, cmd: Command, services: Arc<ServiceFactory>) -> HandlerResult {
    if let Err(e) = handle_command(bot, msg, cmd, (*services).clone()).await {
        error!(error = %e, severity = %e.severity(), "Error handling command");
        return Err(e.into());
    }
    Ok(())
}

/// Handle regular messages
async fn handle_messages(bot: Bot, msg: Message, services: Arc<ServiceFactory>) -> HandlerResult {
    if let Err(e) = handle_message(bot, msg, (*services).clone()).await {
        error!(error = %e, severity = %e.severity(), "Error handling message");
        return Err(e.into());
    }
    Ok(())
}

/// Handle chat member updates of the bot itself
async fn handle_chat_member_updates(update: ChatMemberUpdated, services: Arc<ServiceFactory>) -> HandlerResult {
    if let Err(e) = handle_my_chat_member(update, (*services).clone()).await {
        error!(error = %e, "Error handling chat member update");
        return Err(e.into());
    }
    Ok(())
}
