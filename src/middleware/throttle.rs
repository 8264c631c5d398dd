//! # Throttle middleware
//!
//! Sliding window limit on how often a command can be used. Specifier:
//! `throttle:<user|channel|guild>,<max uses>,<window seconds>`.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: Expired windows are swept so idle users and channels are forgotten
//! - 1.1.0: Windows are tracked per command so one command cannot exhaust another
//! - 1.0.0: Per-user sliding window limit

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, warn};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use super::{Middleware, MiddlewareStack};
use crate::commands::context::CommandContext;

/// What a throttle window is shared between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrottleScope {
    User,
    Channel,
    Guild,
}

impl ThrottleScope {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "user" => Some(ThrottleScope::User),
            "channel" => Some(ThrottleScope::Channel),
            "guild" => Some(ThrottleScope::Guild),
            _ => None,
        }
    }

    /// Outside a guild the guild scope falls back to the channel
    fn key_id(self, ctx: &CommandContext) -> u64 {
        match self {
            ThrottleScope::User => ctx.message.author_id.0,
            ThrottleScope::Channel => ctx.message.channel_id.0,
            ThrottleScope::Guild => ctx
                .message
                .guild_id
                .map_or(ctx.message.channel_id.0, |guild| guild.0),
        }
    }
}

/// Composite key: (command, scope, scoped id)
type ThrottleKey = (String, ThrottleScope, u64);

/// How often [`ThrottleMiddleware::check_rate_limit`] sweeps expired windows
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Uses inside one key's window, oldest first
#[derive(Debug, Default)]
struct ThrottleWindow {
    hits: Vec<Instant>,
    span: Duration,
}

impl ThrottleWindow {
    fn is_expired(&self, now: Instant) -> bool {
        self.hits
            .last()
            .map_or(true, |&latest| now.duration_since(latest) >= self.span)
    }
}

/// Parsed `scope,max,seconds` arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleRule {
    pub scope: ThrottleScope,
    pub max_requests: usize,
    pub time_window: Duration,
}

impl ThrottleRule {
    pub fn parse(args: &[String]) -> Option<Self> {
        let scope = ThrottleScope::from_name(args.first()?)?;
        let max_requests = args.get(1)?.parse::<usize>().ok().filter(|max| *max > 0)?;
        let seconds = args.get(2)?.parse::<u64>().ok().filter(|seconds| *seconds > 0)?;

        Some(Self {
            scope,
            max_requests,
            time_window: Duration::from_secs(seconds),
        })
    }
}

#[derive(Default)]
pub struct ThrottleMiddleware {
    requests: DashMap<ThrottleKey, ThrottleWindow>,
    last_sweep: Mutex<Option<Instant>>,
}

impl ThrottleMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use of `command` under `id`, false if the window is full
    pub fn check_rate_limit(&self, command: &str, rule: &ThrottleRule, id: u64) -> bool {
        let now = Instant::now();
        self.sweep_if_due(now);

        let key = (command.to_string(), rule.scope, id);
        let mut window = self.requests.entry(key).or_default();
        window.span = rule.time_window;
        window
            .hits
            .retain(|&time| now.duration_since(time) < rule.time_window);

        if window.hits.len() >= rule.max_requests {
            false
        } else {
            window.hits.push(now);
            true
        }
    }

    /// Forget every key whose window holds no live uses
    pub fn prune_expired(&self) {
        let now = Instant::now();
        self.requests.retain(|_, window| !window.is_expired(now));
    }

    /// Number of keys currently holding a window
    pub fn tracked_windows(&self) -> usize {
        self.requests.len()
    }

    // Must not be called while holding a map entry, the sweep locks every shard
    fn sweep_if_due(&self, now: Instant) {
        let mut last_sweep = self.last_sweep.lock();
        match *last_sweep {
            Some(at) if now.duration_since(at) < SWEEP_INTERVAL => {}
            Some(_) => {
                *last_sweep = Some(now);
                drop(last_sweep);
                self.prune_expired();
            }
            None => *last_sweep = Some(now),
        }
    }

    /// Time until the oldest use in the window expires
    fn retry_after(&self, command: &str, rule: &ThrottleRule, id: u64) -> Duration {
        let key = (command.to_string(), rule.scope, id);
        self.requests
            .get(&key)
            .and_then(|window| window.hits.first().copied())
            .map_or(Duration::ZERO, |oldest| {
                rule.time_window.saturating_sub(oldest.elapsed())
            })
    }
}

#[async_trait]
impl Middleware for ThrottleMiddleware {
    fn required_arguments(&self) -> usize {
        3
    }

    fn describe(&self, args: &[String]) -> Option<String> {
        let rule = ThrottleRule::parse(args)?;
        let scope = match rule.scope {
            ThrottleScope::User => "user",
            ThrottleScope::Channel => "channel",
            ThrottleScope::Guild => "server",
        };
        Some(format!(
            "Can be used {} time(s) every {} second(s) per {scope}",
            rule.max_requests,
            rule.time_window.as_secs()
        ))
    }

    async fn handle(
        &self,
        ctx: &CommandContext,
        stack: MiddlewareStack<'_>,
        args: &[String],
    ) -> Result<bool> {
        let command = stack.container().simple_name();
        let Some(rule) = ThrottleRule::parse(args) else {
            warn!(
                "[{}] \"{}\" has an invalid throttle binding: {}",
                ctx.request_id,
                stack.container().name(),
                args.join(",")
            );
            return stack.next().await;
        };

        let id = rule.scope.key_id(ctx);
        if self.check_rate_limit(command, &rule, id) {
            return stack.next().await;
        }

        let wait = self.retry_after(command, &rule, id);
        debug!(
            "[{}] Throttled {command} for {:?} {id}, retry in {}s",
            ctx.request_id,
            rule.scope,
            wait.as_secs()
        );
        ctx.make_error(&format!(
            "Too many requests, try again in {} second(s).",
            wait.as_secs().max(1)
        ))
        .await?;
        Ok(false)
    }
}
