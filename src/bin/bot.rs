use anyhow::{Context as _, Result};
use dotenvy::dotenv;
use log::{debug, error, info};
use serenity::async_trait;
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::channel::{Channel, Message};
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::model::permissions::Permissions;
use serenity::prelude::*;
use std::sync::Arc;

use gatekeeper::commands::handlers;
use gatekeeper::{
    CategoryConfig, CategoryRegistry, CommandRegistry, Config, Dispatcher, InboundMessage,
    MemorySettingsProvider, MiddlewareRegistry, Platform,
};

/// Platform adapter over serenity's HTTP client and cache
struct SerenityPlatform {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

#[async_trait]
impl Platform for SerenityPlatform {
    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        channel_id.say(&self.http, content).await?;
        Ok(())
    }

    fn bot_user_id(&self) -> UserId {
        self.cache.current_user_id()
    }

    async fn member_permissions(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<Permissions> {
        let guild = self
            .cache
            .guild(guild_id)
            .with_context(|| format!("Guild {guild_id} is not cached"))?;

        let member = guild
            .member((&self.cache, self.http.as_ref()), user_id)
            .await
            .with_context(|| format!("Failed to fetch member {user_id} of guild {guild_id}"))?;

        let permissions = match guild.channels.get(&channel_id) {
            Some(Channel::Guild(channel)) => guild.user_permissions_in(channel, &member)?,
            _ => guild
                .member_permissions((&self.cache, self.http.as_ref()), user_id)
                .await?,
        };
        Ok(permissions)
    }
}

struct Handler {
    dispatcher: Dispatcher,
}

impl Handler {
    fn new(dispatcher: Dispatcher) -> Self {
        Handler { dispatcher }
    }

    /// Convert a Serenity message to the dispatcher's message type
    fn to_inbound_message(msg: &Message) -> InboundMessage {
        let mut inbound = InboundMessage::new(msg.content.clone(), msg.channel_id, msg.author.id);
        inbound.guild_id = msg.guild_id;
        inbound.author_is_bot = msg.author.bot;
        inbound.mentions = msg.mentions.iter().map(|user| user.id).collect();
        inbound
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let platform: Arc<dyn Platform> = Arc::new(SerenityPlatform {
            http: Arc::clone(&ctx.http),
            cache: Arc::clone(&ctx.cache),
        });

        let outcome = self
            .dispatcher
            .dispatch(platform, Self::to_inbound_message(&msg))
            .await;
        debug!("Message {} in channel {}: {outcome:?}", msg.id, msg.channel_id);
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        let registry = self.dispatcher.registry();
        info!("📋 {} commands available", registry.len());
        for container in registry.commands().iter() {
            debug!(
                "   - {} ({})",
                container.generate_command_trigger(None),
                container.name()
            );
        }
    }
}

fn load_categories(config: &Config) -> Result<CategoryRegistry> {
    let Some(path) = &config.categories_path else {
        info!("📄 No CATEGORIES_PATH set - using the built-in categories");
        return Ok(CategoryRegistry::defaults());
    };

    let categories = CategoryConfig::load(path)
        .with_context(|| format!("Failed to load categories from {path}"))?;
    info!("📄 Loaded {} categories from {path}", categories.categories.len());
    Ok(CategoryRegistry::new(categories.into_categories()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Gatekeeper Discord Bot...");

    let categories = load_categories(&config)?;
    let registry = Arc::new(
        CommandRegistry::new(
            Arc::new(categories),
            Arc::new(MiddlewareRegistry::with_defaults()),
        )
        .with_source_uri_template(config.source_uri_template.clone()),
    );

    // Registration errors are programming mistakes, refuse to boot
    if let Err(e) = handlers::register_all(&registry) {
        error!("❌ Failed to register commands: {e}");
        return Err(e.into());
    }
    info!("✅ Registered {} commands", registry.len());

    let settings = Arc::new(MemorySettingsProvider::load(&config.guild_settings_path)?);
    info!("📄 Guild settings backed by {}", config.guild_settings_path);

    let token = config.discord_token.clone();
    let handler = Handler::new(Dispatcher::new(registry, settings, Arc::new(config)));

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
