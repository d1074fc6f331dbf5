use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/easydialogs_i18n_generated.rs"));
}

/// Keys of the built-in strings shown by dialogs.
pub mod keys {
    pub const OK: &str = "common.ok";
    pub const CANCEL: &str = "common.cancel";
    pub const YES: &str = "common.yes";
    pub const NO: &str = "common.no";
    pub const DONE: &str = "common.done";
    pub const ABORT: &str = "common.abort";
    pub const FIELD_ERROR: &str = "form.field_error";
    pub const VALUE_FIELD: &str = "ask.value_field";
    pub const PROGRESS_MESSAGE: &str = "progress.default_message";
    pub const LIST_CREATE: &str = "list.create";
    pub const LIST_PICK: &str = "list.pick";
    pub const LIST_EDIT: &str = "list.edit";
    pub const LIST_REMOVE: &str = "list.remove";
    pub const LIST_MOVE_UP: &str = "list.move_up";
    pub const LIST_MOVE_DOWN: &str = "list.move_down";
    pub const LIST_PICK_ITEMS: &str = "list.pick_items";
    pub const LIST_VALUE_COLUMN: &str = "list.value_column";
}

static CATALOG: LazyLock<Arc<Catalog>> = LazyLock::new(|| Arc::new(Catalog::load()));
static GLOBAL: LazyLock<I18nManager> = LazyLock::new(I18nManager::new);

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub enum Locale {
    #[default]
    System,
    Tag(String),
}

impl From<&str> for Locale {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("system") {
            Self::System
        } else {
            Self::Tag(trimmed.to_string())
        }
    }
}

impl From<String> for Locale {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

/// Resolves built-in dialog strings against the compiled locale catalog.
///
/// Clones share the selected locale.
#[derive(Clone)]
pub struct I18nManager {
    catalog: Arc<Catalog>,
    locale: Arc<RwLock<Locale>>,
}

impl Default for I18nManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for I18nManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18nManager")
            .field("locale", &self.locale())
            .field("resolved", &self.resolved_locale())
            .finish()
    }
}

impl I18nManager {
    pub fn new() -> Self {
        Self {
            catalog: CATALOG.clone(),
            locale: Arc::new(RwLock::new(Locale::System)),
        }
    }

    /// Process-wide manager used when no explicit manager is configured.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    pub fn locale(&self) -> Locale {
        match self.locale.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_locale(&self, locale: impl Into<Locale>) {
        let mut guard = match self.locale.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = locale.into();
    }

    pub fn default_locale(&self) -> &'static str {
        self.catalog.default_locale
    }

    pub fn resolved_locale(&self) -> &'static str {
        self.catalog.resolve(self.requested_locale().as_deref())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Missing keys render as the key itself.
    pub fn text(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }

    pub fn text_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = self.lookup(key).unwrap_or(key);
        if params.is_empty() {
            return template.to_string();
        }
        interpolate(template, params)
    }

    pub fn field_error(&self, field: &str) -> String {
        self.text_with(keys::FIELD_ERROR, &[("name", field)])
    }

    fn requested_locale(&self) -> Option<String> {
        match self.locale() {
            Locale::System => system_locale(),
            Locale::Tag(tag) => Some(tag),
        }
    }

    fn lookup(&self, key: &str) -> Option<&'static str> {
        let resolved = self.resolved_locale();
        self.catalog
            .lookup(resolved, key)
            .or_else(|| self.catalog.lookup(self.catalog.default_locale, key))
    }
}

#[cfg(feature = "i18n")]
fn system_locale() -> Option<String> {
    sys_locale::get_locale()
}

#[cfg(not(feature = "i18n"))]
fn system_locale() -> Option<String> {
    None
}

struct Catalog {
    default_locale: &'static str,
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
    by_tag: HashMap<String, &'static str>,
    by_language: HashMap<String, &'static str>,
}

impl Catalog {
    fn load() -> Self {
        let mut messages = HashMap::new();
        let mut by_tag = HashMap::new();
        let mut by_language: HashMap<String, Option<&'static str>> = HashMap::new();

        for (locale, entries) in generated::LOCALES.iter().copied() {
            let normalized = normalize_tag(locale);
            by_language
                .entry(language_of(&normalized).to_string())
                .and_modify(|existing| {
                    if *existing != Some(locale) {
                        *existing = None;
                    }
                })
                .or_insert(Some(locale));
            by_tag.insert(normalized, locale);
            messages.insert(locale, entries.iter().copied().collect::<HashMap<_, _>>());
        }

        let default_locale = generated::DEFAULT_LOCALE;
        if !messages.contains_key(default_locale) {
            messages.insert(default_locale, HashMap::new());
            let normalized = normalize_tag(default_locale);
            by_language
                .entry(language_of(&normalized).to_string())
                .or_insert(Some(default_locale));
            by_tag.insert(normalized, default_locale);
        }

        Self {
            default_locale,
            messages,
            by_tag,
            // Languages shared by several regional catalogs are ambiguous.
            by_language: by_language
                .into_iter()
                .filter_map(|(language, locale)| locale.map(|locale| (language, locale)))
                .collect(),
        }
    }

    fn resolve(&self, requested: Option<&str>) -> &'static str {
        let Some(requested) = requested else {
            return self.default_locale;
        };
        let normalized = normalize_tag(requested);
        if let Some(locale) = self.by_tag.get(&normalized) {
            return locale;
        }
        self.by_language
            .get(language_of(&normalized))
            .copied()
            .unwrap_or(self.default_locale)
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&'static str> {
        self.messages
            .get(locale)
            .and_then(|entries| entries.get(key).copied())
    }
}

fn language_of(normalized: &str) -> &str {
    normalized.split('-').next().unwrap_or_default()
}

/// `de_DE.UTF-8@euro` -> `de-de`
fn normalize_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    let without_encoding = trimmed.split('.').next().unwrap_or(trimmed);
    let without_modifier = without_encoding
        .split('@')
        .next()
        .unwrap_or(without_encoding);
    without_modifier
        .split(['-', '_'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Replaces `{name}` placeholders; unknown placeholders are kept verbatim.
fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };
        let token = &after_open[..close];
        match params.iter().find(|(name, _)| *name == token) {
            Some((_, value)) => output.push_str(value),
            None => output.push_str(&rest[open..open + close + 2]),
        }
        rest = &after_open[close + 1..];
    }
    output.push_str(rest);
    output
}
