//! Command registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Prefix + trigger matching with priority tie-breaking, collision checks
//! - 1.0.0: Initial implementation for handler dispatch

use log::{debug, info};
use parking_lot::RwLock;
use std::any::TypeId;
use std::sync::Arc;

use super::category::CategoryRegistry;
use super::command::{simple_type_name, Command};
use super::container::{eq_ignore_case, CommandContainer};
use super::handlers;
use super::metrics::ExecutionCounters;
use super::priority::Priority;
use crate::core::ConfigurationError;
use crate::middleware::{MiddlewareBinding, MiddlewareRegistry, MAX_MIDDLEWARE_CHAIN};
use crate::settings::GuildSettings;

type Snapshot = Arc<Vec<Arc<CommandContainer>>>;

/// The set of registered commands
///
/// Membership is copy-on-write: lookups work on a snapshot of the container
/// list and never observe a half-registered command, while register and
/// unregister swap in a new list under a short write lock.
///
/// # Example
///
/// ```ignore
/// let registry = CommandRegistry::new(categories, middleware);
/// registry.register(Arc::new(GoodbyeCommand))?;
///
/// if let Some(container) = registry.get_command("!goodbye on", settings) {
///     // build a middleware stack for `container`
/// }
/// ```
pub struct CommandRegistry {
    containers: RwLock<Snapshot>,
    categories: Arc<CategoryRegistry>,
    middleware: Arc<MiddlewareRegistry>,
    counters: ExecutionCounters,
    source_uri_template: Option<String>,
}

impl CommandRegistry {
    pub fn new(categories: Arc<CategoryRegistry>, middleware: Arc<MiddlewareRegistry>) -> Self {
        Self {
            containers: RwLock::new(Arc::new(Vec::new())),
            categories,
            middleware,
            counters: ExecutionCounters::new(),
            source_uri_template: None,
        }
    }

    /// Template for derived source links, `{module}` and `{command}` are replaced
    pub fn with_source_uri_template(mut self, template: Option<String>) -> Self {
        self.source_uri_template = template;
        self
    }

    pub fn categories(&self) -> &Arc<CategoryRegistry> {
        &self.categories
    }

    pub fn middleware_registry(&self) -> &Arc<MiddlewareRegistry> {
        &self.middleware
    }

    pub fn counters(&self) -> &ExecutionCounters {
        &self.counters
    }

    /// Snapshot of every registered container in registration order
    pub fn commands(&self) -> Snapshot {
        Arc::clone(&self.containers.read())
    }

    pub fn len(&self) -> usize {
        self.containers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.read().is_empty()
    }

    /// Register a command
    ///
    /// Fails if the category is unknown, the description or trigger list is
    /// empty, any trigger collides with another command under the same prefix,
    /// or a middleware name is not registered. Nothing is changed on failure.
    /// Registering a command type that is already present returns the
    /// existing container.
    pub fn register(&self, command: Arc<dyn Command>) -> Result<Arc<CommandContainer>, ConfigurationError> {
        let name = command.name().to_string();

        let category = self.categories.from_command(command.as_ref()).ok_or_else(|| {
            ConfigurationError::MissingCategory {
                command: name.clone(),
                category: command.category().to_string(),
            }
        })?;

        if command.description().trim().is_empty() {
            return Err(ConfigurationError::MissingDescription { command: name });
        }

        if command.triggers().is_empty() {
            return Err(ConfigurationError::MissingTriggers { command: name });
        }

        let specifiers = command.middleware();
        if specifiers.len() > MAX_MIDDLEWARE_CHAIN {
            return Err(ConfigurationError::MiddlewareChainTooLong {
                command: name,
                count: specifiers.len(),
                max: MAX_MIDDLEWARE_CHAIN,
            });
        }

        let mut bindings = Vec::with_capacity(specifiers.len());
        for specifier in specifiers {
            let binding = self.middleware.bind(specifier).ok_or_else(|| {
                ConfigurationError::UnknownMiddleware {
                    command: name.clone(),
                    middleware: MiddlewareBinding::split_specifier(specifier).0,
                }
            })?;
            bindings.push(binding);
        }

        let prefix = command
            .prefix()
            .unwrap_or_else(|| category.prefix())
            .to_string();

        let mut guard = self.containers.write();

        for trigger in command.triggers() {
            let key = format!("{prefix}{trigger}");
            for container in guard.iter() {
                if container.is_same(command.as_ref()) {
                    continue;
                }

                let default_prefix = container.default_prefix();
                let collides = container
                    .triggers()
                    .iter()
                    .any(|other| eq_ignore_case(&key, &format!("{default_prefix}{other}")));

                if collides {
                    return Err(ConfigurationError::DuplicateTrigger {
                        trigger: key,
                        command: name,
                        existing: container.name().to_string(),
                    });
                }
            }
        }

        if let Some(existing) = guard.iter().find(|container| container.is_same(command.as_ref())) {
            debug!("Command {name} is already registered");
            return Ok(Arc::clone(existing));
        }

        let source_uri = self.derive_source_uri(command.as_ref());
        self.counters.register(simple_type_name(command.type_name()));

        let container = Arc::new(CommandContainer::new(command, category, source_uri, bindings));

        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(Arc::clone(&container));
        *guard = Arc::new(next);

        info!(
            "Registered command {} ({}) with triggers {:?}",
            container.name(),
            container.category().name(),
            container.triggers()
        );
        Ok(container)
    }

    /// Remove the first command whose name matches, ignoring case
    ///
    /// Unregistering a command that is not present does nothing.
    pub fn unregister(&self, command: &dyn Command) -> Option<Arc<CommandContainer>> {
        let mut guard = self.containers.write();

        let position = guard
            .iter()
            .position(|container| container.name().eq_ignore_ascii_case(command.name()))?;

        let mut next: Vec<Arc<CommandContainer>> = (**guard).clone();
        let removed = next.remove(position);
        *guard = Arc::new(next);

        info!("Unregistered command {}", removed.name());
        Some(removed)
    }

    /// Identity lookup by command instance
    pub fn get_command_for(&self, command: &dyn Command) -> Option<Arc<CommandContainer>> {
        self.get_command_by_id(command.command_id())
    }

    /// Identity lookup by command type id, see [`super::command::relation`]
    pub fn get_command_by_id(&self, id: TypeId) -> Option<Arc<CommandContainer>> {
        self.commands()
            .iter()
            .find(|container| container.command_id() == id)
            .cloned()
    }

    pub fn get_command_by_type<T: Command>(&self) -> Option<Arc<CommandContainer>> {
        self.get_command_by_id(TypeId::of::<T>())
    }

    /// Match the first token of `raw` against `prefix + trigger`
    ///
    /// The prefix is the guild's override for the command's category when
    /// `settings` carries one, else the command's default prefix.
    pub fn get_command(&self, raw: &str, settings: Option<&GuildSettings>) -> Option<Arc<CommandContainer>> {
        let candidate = raw.split_whitespace().next()?;
        let snapshot = self.commands();

        highest_priority(
            snapshot
                .iter()
                .filter(|container| container.matches(candidate, container.prefix_for(settings))),
        )
    }

    /// Match against `default prefix + trigger`, ignoring any guild override
    pub fn get_raw_command(&self, candidate: &str) -> Option<Arc<CommandContainer>> {
        let candidate = candidate.trim();
        let snapshot = self.commands();

        highest_priority(
            snapshot
                .iter()
                .filter(|container| container.matches(candidate, container.default_prefix())),
        )
    }

    /// Match on the trigger alone, skipping ignored commands
    pub fn get_lazy_command(&self, trigger: &str) -> Option<Arc<CommandContainer>> {
        let trigger = trigger.trim();
        let snapshot = self.commands();

        highest_priority(snapshot.iter().filter(|container| {
            container.priority() != Priority::Ignored && container.matches_trigger(trigger)
        }))
    }

    fn derive_source_uri(&self, command: &dyn Command) -> Option<String> {
        if let Some(uri) = command.source_uri().map(str::trim).filter(|uri| !uri.is_empty()) {
            return Some(uri.to_string());
        }

        let template = self.source_uri_template.as_ref()?;
        let path = command
            .type_name()
            .strip_prefix(handlers::MODULE_PATH)?
            .strip_prefix("::")?;

        let mut segments = path.rsplit("::");
        let type_name = segments.next()?;
        let module = segments.next()?;

        Some(
            template
                .replace("{module}", module)
                .replace("{command}", type_name),
        )
    }
}

/// Highest priority container, the earliest one wins a tie
fn highest_priority<'a>(
    matches: impl Iterator<Item = &'a Arc<CommandContainer>>,
) -> Option<Arc<CommandContainer>> {
    matches
        .fold(None, |best: Option<&'a Arc<CommandContainer>>, candidate| match best {
            Some(current) if !candidate.priority().is_greater_than(current.priority()) => {
                Some(current)
            }
            _ => Some(candidate),
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::category::Category;
    use crate::testing::{test_registry, ScriptedCommand};

    #[test]
    fn test_registry_new_is_empty() {
        let registry = test_registry();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_and_identity_lookup() {
        let registry = test_registry();
        let command = Arc::new(ScriptedCommand::<0>::new("Goodbye", &["goodbye", "bye"], "Administration"));
        registry.register(command.clone()).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get_command_for(command.as_ref()).is_some());
        assert!(registry.get_command_by_type::<ScriptedCommand<0>>().is_some());
        assert!(registry.get_command_by_type::<ScriptedCommand<1>>().is_none());
    }

    #[test]
    fn test_register_duplicate_trigger_fails_without_mutation() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Goodbye", &["goodbye", "bye"], "Administration")))
            .unwrap();

        let err = registry
            .register(Arc::new(ScriptedCommand::<1>::new("Farewell", &["farewell", "bye"], "Utility")))
            .unwrap_err();

        match err {
            ConfigurationError::DuplicateTrigger {
                trigger,
                command,
                existing,
            } => {
                assert_eq!(trigger, "!bye");
                assert_eq!(command, "Farewell");
                assert_eq!(existing, "Goodbye");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(registry.len(), 1);
        assert!(registry.get_command_by_type::<ScriptedCommand<1>>().is_none());
        assert!(registry.get_raw_command("!farewell").is_none());
    }

    #[test]
    fn test_collision_is_case_insensitive() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Ping", &["ping"], "Utility")))
            .unwrap();
        assert!(registry
            .register(Arc::new(ScriptedCommand::<1>::new("Loud Ping", &["PING"], "Utility")))
            .is_err());
    }

    #[test]
    fn test_non_ascii_triggers_match_ignoring_case() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Listen", &["écoute"], "Music")))
            .unwrap();

        assert!(registry.get_command("!ÉCOUTE", None).is_some());
        assert!(registry.get_lazy_command("Écoute").is_some());
        assert!(registry
            .register(Arc::new(ScriptedCommand::<1>::new("Loud Listen", &["ÉCOUTE"], "Music")))
            .is_err());
    }

    #[test]
    fn test_same_trigger_under_different_prefixes_is_allowed() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Stats", &["stats"], "Utility")))
            .unwrap();
        registry
            .register(Arc::new(ScriptedCommand::<1>::new("System Stats", &["stats"], "System")))
            .unwrap();

        assert_eq!(registry.get_raw_command("!stats").unwrap().name(), "Stats");
        assert_eq!(registry.get_raw_command(";stats").unwrap().name(), "System Stats");
    }

    #[test]
    fn test_prefix_override_participates_in_collisions() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Eval", &["eval"], "System")))
            .unwrap();
        assert!(registry
            .register(Arc::new(
                ScriptedCommand::<1>::new("Utility Eval", &["eval"], "Utility").with_prefix(";")
            ))
            .is_err());
    }

    #[test]
    fn test_unknown_middleware_fails_fast() {
        let registry = test_registry();
        let err = registry
            .register(Arc::new(
                ScriptedCommand::<0>::new("Goodbye", &["goodbye"], "Administration")
                    .with_middleware(&["throttle:user,1,5", "doesNotExist:foo"]),
            ))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::UnknownMiddleware { ref middleware, .. } if middleware == "doesNotExist"
        ));
        assert!(registry.is_empty());
        assert!(registry.get_raw_command("!goodbye").is_none());
        assert!(registry.get_lazy_command("goodbye").is_none());
    }

    #[test]
    fn test_missing_category_description_and_triggers() {
        let registry = test_registry();

        assert!(matches!(
            registry.register(Arc::new(ScriptedCommand::<0>::new("A", &["a"], "Nope"))),
            Err(ConfigurationError::MissingCategory { .. })
        ));
        assert!(matches!(
            registry.register(Arc::new(ScriptedCommand::<1>::new("B", &["b"], "Utility").with_description(" "))),
            Err(ConfigurationError::MissingDescription { .. })
        ));
        assert!(matches!(
            registry.register(Arc::new(ScriptedCommand::<2>::new("C", &[], "Utility"))),
            Err(ConfigurationError::MissingTriggers { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_chain_length_is_capped() {
        let registry = test_registry();
        let specifiers: Vec<&'static str> = vec!["pass"; MAX_MIDDLEWARE_CHAIN + 1];
        let command = ScriptedCommand::<0>::new("Long", &["long"], "Utility").with_middleware(&specifiers);

        assert!(matches!(
            registry.register(Arc::new(command)),
            Err(ConfigurationError::MiddlewareChainTooLong { .. })
        ));
    }

    #[test]
    fn test_reregister_is_noop() {
        let registry = test_registry();
        let command = Arc::new(ScriptedCommand::<0>::new("Ping", &["ping"], "Utility"));

        let first = registry.register(command.clone()).unwrap();
        let second = registry.register(command).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reregister_still_validates_middleware() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Ping", &["ping"], "Utility")))
            .unwrap();

        let changed = ScriptedCommand::<0>::new("Ping", &["ping"], "Utility").with_middleware(&["missing"]);
        assert!(registry.register(Arc::new(changed)).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_guild_lookup_prefers_highest_priority() {
        let registry = test_registry_with_categories(vec![
            Category::new("Low Stuff", "?", false),
            Category::new("Normal Stuff", "$", false),
            Category::new("System Stuff", "!", false),
        ]);
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Hidden Ping", &["ping"], "Low Stuff").with_priority(Priority::Hidden)))
            .unwrap();
        registry
            .register(Arc::new(ScriptedCommand::<1>::new("Normal Ping", &["ping"], "Normal Stuff")))
            .unwrap();
        registry
            .register(Arc::new(ScriptedCommand::<2>::new("System Ping", &["ping"], "System Stuff").with_priority(Priority::System)))
            .unwrap();

        let mut settings = GuildSettings::default();
        settings.prefixes.insert("low stuff".to_string(), "!".to_string());
        settings.prefixes.insert("normal stuff".to_string(), "!".to_string());

        let matched = registry.get_command("!ping", Some(&settings)).unwrap();
        assert_eq!(matched.name(), "System Ping");

        assert_eq!(registry.get_lazy_command("ping").unwrap().name(), "System Ping");
        assert_eq!(registry.get_command("?ping", None).unwrap().name(), "Hidden Ping");
    }

    #[test]
    fn test_equal_priority_tie_goes_to_earliest_registration() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("First", &["stats"], "Utility")))
            .unwrap();
        registry
            .register(Arc::new(ScriptedCommand::<1>::new("Second", &["stats"], "System")))
            .unwrap();

        for _ in 0..10 {
            assert_eq!(registry.get_lazy_command("stats").unwrap().name(), "First");
        }
    }

    #[test]
    fn test_guild_override_replaces_default_prefix() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Play", &["play"], "Music")))
            .unwrap();

        let mut settings = GuildSettings::default();
        settings.prefixes.insert("music".to_string(), "?".to_string());

        assert!(registry.get_command("?play now", Some(&settings)).is_some());
        assert!(registry.get_command("!play", Some(&settings)).is_none());
        assert!(registry.get_command("!play", None).is_some());
        assert!(registry.get_raw_command("!play").is_some());
        assert!(registry.get_raw_command("?play").is_none());
    }

    #[test]
    fn test_get_command_uses_first_token_only() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Play", &["play"], "Music")))
            .unwrap();

        assert!(registry.get_command("!PLAY some song", None).is_some());
        assert!(registry.get_command("", None).is_none());
        assert!(registry.get_command("play", None).is_none());
    }

    #[test]
    fn test_ignored_commands_are_skipped_by_lazy_lookup() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Secret", &["secret"], "Utility").with_priority(Priority::Ignored)))
            .unwrap();

        assert!(registry.get_lazy_command("secret").is_none());
        assert!(registry.get_raw_command("!secret").is_some());
    }

    #[test]
    fn test_unregister_missing_is_noop() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Ping", &["ping"], "Utility")))
            .unwrap();

        let absent = ScriptedCommand::<1>::new("Pong", &["pong"], "Utility");
        assert!(registry.unregister(&absent).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_removes_by_name_ignoring_case() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Ping Command", &["ping", "p"], "Utility")))
            .unwrap();

        let same_name = ScriptedCommand::<1>::new("ping command", &["other"], "Utility");
        assert!(registry.unregister(&same_name).is_some());

        assert!(registry.is_empty());
        assert!(registry.get_raw_command("!ping").is_none());
        assert!(registry.get_raw_command("!p").is_none());
        assert!(registry.get_lazy_command("ping").is_none());
    }

    #[test]
    fn test_snapshot_survives_unregister() {
        let registry = test_registry();
        let command = ScriptedCommand::<0>::new("Ping", &["ping"], "Utility");
        registry.register(Arc::new(command.clone())).unwrap();

        let snapshot = registry.commands();
        registry.unregister(&command);

        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_creates_zero_counter() {
        let registry = test_registry();
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Ping", &["ping"], "Utility")))
            .unwrap();

        assert_eq!(registry.counters().get("ScriptedCommand"), Some(0));
    }

    #[test]
    fn test_explicit_source_uri() {
        let registry = test_registry().with_source_uri_template(Some("https://src/{module}/{command}".into()));
        let container = registry
            .register(Arc::new(
                ScriptedCommand::<0>::new("Ping", &["ping"], "Utility").with_source_uri("https://example.test/ping"),
            ))
            .unwrap();
        assert_eq!(container.source_uri(), Some("https://example.test/ping"));

        let container = registry
            .register(Arc::new(ScriptedCommand::<1>::new("Pong", &["pong"], "Utility")))
            .unwrap();
        assert_eq!(container.source_uri(), None);
    }

    #[test]
    fn test_derived_source_uri_for_bundled_commands() {
        let registry = test_registry().with_source_uri_template(Some("https://src/{module}/{command}".into()));
        let container = registry
            .register(Arc::new(handlers::goodbye::GoodbyeCommand))
            .unwrap();
        assert_eq!(container.source_uri(), Some("https://src/goodbye/GoodbyeCommand"));
    }

    #[test]
    fn test_concurrent_lookups_during_registration() {
        let registry = Arc::new(test_registry());
        registry
            .register(Arc::new(ScriptedCommand::<0>::new("Ping", &["ping"], "Utility")))
            .unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let registry = Arc::clone(&registry);
                scope.spawn(move || {
                    for _ in 0..500 {
                        assert!(registry.get_raw_command("!ping").is_some());
                    }
                });
            }

            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                registry
                    .register(Arc::new(ScriptedCommand::<1>::new("Pong", &["pong"], "Utility")))
                    .unwrap();
            });
        });

        assert_eq!(registry.len(), 2);
    }

    fn test_registry_with_categories(categories: Vec<Category>) -> CommandRegistry {
        CommandRegistry::new(
            Arc::new(CategoryRegistry::new(categories)),
            Arc::clone(test_registry().middleware_registry()),
        )
    }
}
