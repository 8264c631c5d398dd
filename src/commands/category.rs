//! Command categories
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use rand::seq::IndexedRandom;
use rand::Rng;
use std::sync::Arc;

use super::command::Command;

/// A named group of commands sharing a default prefix
///
/// Global categories are exempt from per-channel disabling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    prefix: String,
    global: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, global: bool) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            global,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_global(&self) -> bool {
        self.global
    }
}

/// The fixed set of categories known to the bot
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Arc<Category>>,
}

impl CategoryRegistry {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: categories.into_iter().map(Arc::new).collect(),
        }
    }

    /// Built-in category table used when no category file is configured
    pub fn defaults() -> Self {
        Self::new(vec![
            Category::new("Administration", "!", false),
            Category::new("Help", "!", true),
            Category::new("Utility", "!", false),
            Category::new("Music", "!", false),
            Category::new("System", ";", true),
        ])
    }

    pub fn values(&self) -> &[Arc<Category>] {
        &self.categories
    }

    /// Case-insensitive lookup by exact name
    pub fn from_name(&self, name: &str) -> Option<Arc<Category>> {
        self.categories
            .iter()
            .find(|category| category.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Lookup by exact name, falling back to the first category whose name starts with `name`
    pub fn from_lazy_name(&self, name: &str, include_global: bool) -> Option<Arc<Category>> {
        if name.is_empty() {
            return None;
        }

        let needle = name.to_lowercase();
        let candidates = || {
            self.categories
                .iter()
                .filter(move |category| include_global || !category.global)
        };

        candidates()
            .find(|category| category.name.to_lowercase() == needle)
            .or_else(|| candidates().find(|category| category.name.to_lowercase().starts_with(&needle)))
            .cloned()
    }

    /// Resolve the category a command declares
    pub fn from_command(&self, command: &dyn Command) -> Option<Arc<Category>> {
        self.from_name(command.category())
    }

    /// Pick a random category, used for hints like "try `!help music`"
    pub fn random<R: Rng + ?Sized>(&self, include_global: bool, rng: &mut R) -> Option<Arc<Category>> {
        let candidates: Vec<&Arc<Category>> = self
            .categories
            .iter()
            .filter(|category| include_global || !category.global)
            .collect();

        candidates.choose(rng).map(|category| Arc::clone(category))
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}
