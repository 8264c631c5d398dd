//! Test doubles shared by the unit tests

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::model::permissions::Permissions;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::category::CategoryRegistry;
use crate::commands::command::Command;
use crate::commands::context::CommandContext;
use crate::commands::priority::Priority;
use crate::commands::registry::CommandRegistry;
use crate::core::Config;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::middleware::{Middleware, MiddlewareRegistry, MiddlewareStack};
use crate::platform::{InboundMessage, Platform};
use crate::settings::{GuildSettings, MemorySettingsProvider, SettingsProvider};

pub const BOT_ID: UserId = UserId(999);
pub const TEST_GUILD: GuildId = GuildId(500);
pub const TEST_CHANNEL: ChannelId = ChannelId(600);

/// Records outbound messages, permissions are empty unless granted
#[derive(Default)]
pub struct RecordingPlatform {
    sent: Mutex<Vec<(ChannelId, String)>>,
    permissions: Mutex<HashMap<UserId, Permissions>>,
    fail_sends: bool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails after being recorded
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn grant(&self, user_id: UserId, permissions: Permissions) {
        self.permissions.lock().insert(user_id, permissions);
    }

    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, content)| content.clone()).collect()
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        self.sent.lock().push((channel_id, content.to_string()));
        if self.fail_sends {
            bail!("send failed");
        }
        Ok(())
    }

    fn bot_user_id(&self) -> UserId {
        BOT_ID
    }

    async fn member_permissions(
        &self,
        _guild_id: GuildId,
        _channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<Permissions> {
        Ok(self
            .permissions
            .lock()
            .get(&user_id)
            .copied()
            .unwrap_or_else(Permissions::empty))
    }
}

#[derive(Default)]
struct ScriptState {
    calls: usize,
    last_arguments: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScriptOutcome {
    Succeed,
    Fail,
    Error,
}

/// Configurable command, each `N` is a distinct command type
///
/// Clones share their call log.
#[derive(Clone)]
pub struct ScriptedCommand<const N: usize> {
    name: String,
    description: String,
    triggers: Vec<&'static str>,
    category: String,
    prefix: Option<String>,
    priority: Priority,
    usage: Vec<String>,
    middleware: Vec<&'static str>,
    source_uri: Option<String>,
    reply: Option<String>,
    outcome: ScriptOutcome,
    state: Arc<Mutex<ScriptState>>,
}

impl<const N: usize> ScriptedCommand<N> {
    pub fn new(name: &str, triggers: &[&'static str], category: &str) -> Self {
        Self {
            name: name.to_string(),
            description: format!("{name} for tests."),
            triggers: triggers.to_vec(),
            category: category.to_string(),
            prefix: None,
            priority: Priority::Normal,
            usage: vec!["`:command`".to_string()],
            middleware: Vec::new(),
            source_uri: None,
            reply: None,
            outcome: ScriptOutcome::Succeed,
            state: Arc::new(Mutex::new(ScriptState::default())),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_usage(mut self, usage: &[&str]) -> Self {
        self.usage = usage.iter().map(|line| line.to_string()).collect();
        self
    }

    pub fn with_middleware(mut self, middleware: &[&'static str]) -> Self {
        self.middleware = middleware.to_vec();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_source_uri(mut self, uri: &str) -> Self {
        self.source_uri = Some(uri.to_string());
        self
    }

    /// Reply with `content` every time the body runs
    pub fn with_reply(mut self, content: &str) -> Self {
        self.reply = Some(content.to_string());
        self
    }

    pub fn with_result(mut self, result: bool) -> Self {
        self.outcome = if result {
            ScriptOutcome::Succeed
        } else {
            ScriptOutcome::Fail
        };
        self
    }

    /// Body returns an error
    pub fn with_error(mut self) -> Self {
        self.outcome = ScriptOutcome::Error;
        self
    }

    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }

    pub fn last_arguments(&self) -> Vec<String> {
        self.state.lock().last_arguments.clone()
    }
}

#[async_trait]
impl<const N: usize> Command for ScriptedCommand<N> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn usage_instructions(&self) -> Vec<String> {
        self.usage.clone()
    }

    fn triggers(&self) -> &[&'static str] {
        &self.triggers
    }

    fn middleware(&self) -> &[&'static str] {
        &self.middleware
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn source_uri(&self) -> Option<&str> {
        self.source_uri.as_deref()
    }

    async fn execute(&self, ctx: &CommandContext, args: &[String]) -> Result<bool> {
        {
            let mut state = self.state.lock();
            state.calls += 1;
            state.last_arguments = args.to_vec();
        }

        if let Some(reply) = &self.reply {
            ctx.reply(reply).await?;
        }

        match self.outcome {
            ScriptOutcome::Succeed => Ok(true),
            ScriptOutcome::Fail => Ok(false),
            ScriptOutcome::Error => bail!("{} blew up", self.name),
        }
    }
}

/// Logs its name, then continues or stops the chain
pub struct RecordingMiddleware {
    name: &'static str,
    proceed: bool,
    required_arguments: usize,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingMiddleware {
    pub fn new(name: &'static str, proceed: bool, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            proceed,
            required_arguments: 0,
            log,
        }
    }

    pub fn with_required_arguments(mut self, required: usize) -> Self {
        self.required_arguments = required;
        self
    }
}

#[async_trait]
impl Middleware for RecordingMiddleware {
    fn required_arguments(&self) -> usize {
        self.required_arguments
    }

    async fn handle(
        &self,
        _ctx: &CommandContext,
        stack: MiddlewareStack<'_>,
        _args: &[String],
    ) -> Result<bool> {
        self.log.lock().push(self.name.to_string());
        if self.proceed {
            stack.next().await
        } else {
            Ok(false)
        }
    }
}

struct PassMiddleware;

#[async_trait]
impl Middleware for PassMiddleware {
    async fn handle(
        &self,
        _ctx: &CommandContext,
        stack: MiddlewareStack<'_>,
        _args: &[String],
    ) -> Result<bool> {
        stack.next().await
    }
}

/// Default categories and middleware plus a no-op `pass` middleware
pub fn test_registry() -> CommandRegistry {
    let mut middleware = MiddlewareRegistry::with_defaults();
    middleware.register("pass", Arc::new(PassMiddleware));
    CommandRegistry::new(Arc::new(CategoryRegistry::defaults()), Arc::new(middleware))
}

pub fn context_for(
    message: InboundMessage,
    settings: Option<GuildSettings>,
    platform: Arc<RecordingPlatform>,
) -> CommandContext {
    CommandContext {
        message,
        settings,
        platform,
        settings_provider: Arc::new(MemorySettingsProvider::new()),
        registry: Arc::new(test_registry()),
        config: Arc::new(Config::default()),
        request_id: Uuid::new_v4(),
    }
}

/// Settings provider whose reads and writes always fail
pub struct FailingSettingsProvider;

#[async_trait]
impl SettingsProvider for FailingSettingsProvider {
    async fn fetch_guild_settings(&self, guild_id: GuildId) -> Result<Option<GuildSettings>> {
        bail!("settings store unavailable for guild {guild_id}")
    }

    async fn save_guild_settings(&self, guild_id: GuildId, _settings: &GuildSettings) -> Result<()> {
        bail!("settings store unavailable for guild {guild_id}")
    }
}

/// A dispatcher wired to in-memory collaborators
pub struct DispatchFixture {
    pub registry: Arc<CommandRegistry>,
    pub settings: Arc<MemorySettingsProvider>,
    pub platform: Arc<RecordingPlatform>,
    pub dispatcher: Dispatcher,
}

impl DispatchFixture {
    pub fn set_guild_settings(&self, settings: GuildSettings) {
        self.settings.insert(TEST_GUILD, settings);
    }

    pub async fn dispatch(&self, message: InboundMessage) -> DispatchOutcome {
        let platform: Arc<dyn Platform> = self.platform.clone();
        self.dispatcher.dispatch(platform, message).await
    }

    pub async fn dispatch_in_guild(&self, content: &str, author: UserId) -> DispatchOutcome {
        self.dispatch(InboundMessage::new(content, TEST_CHANNEL, author).in_guild(TEST_GUILD))
            .await
    }

    pub async fn dispatch_direct(&self, content: &str, author: UserId) -> DispatchOutcome {
        self.dispatch(InboundMessage::new(content, TEST_CHANNEL, author))
            .await
    }
}

pub fn dispatch_fixture() -> DispatchFixture {
    dispatch_fixture_with_admins(&[])
}

pub fn dispatch_fixture_with_admins(admins: &[u64]) -> DispatchFixture {
    let config = Config {
        bot_admins: admins.iter().copied().collect(),
        ..Config::default()
    };

    let registry = Arc::new(test_registry());
    let settings = Arc::new(MemorySettingsProvider::new());
    let provider: Arc<dyn SettingsProvider> = settings.clone();

    DispatchFixture {
        dispatcher: Dispatcher::new(Arc::clone(&registry), provider, Arc::new(config)),
        registry,
        settings,
        platform: Arc::new(RecordingPlatform::new()),
    }
}
