//! Localization support.
//!
//! The editor ships translation catalogs for ten display languages. A
//! [`TranslationManager`] holds the registered providers plus the active
//! culture; `MachineDefault` resolves against the desktop environment the
//! first time the language settings are applied.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::RwLock;

/// Display languages the editor can be switched to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportedLanguage {
    /// Follow the desktop environment.
    #[default]
    MachineDefault,
    English,
    French,
    Japanese,
    Russian,
    German,
    Spanish,
    ChineseSimplified,
    Italian,
    Korean,
}

impl SupportedLanguage {
    /// Culture identifier for the language; `None` for `MachineDefault`.
    pub fn culture(self) -> Option<&'static str> {
        match self {
            SupportedLanguage::MachineDefault => None,
            SupportedLanguage::English => Some("en-US"),
            SupportedLanguage::French => Some("fr-FR"),
            SupportedLanguage::Japanese => Some("ja-JP"),
            SupportedLanguage::Russian => Some("ru-RU"),
            SupportedLanguage::German => Some("de-DE"),
            SupportedLanguage::Spanish => Some("es-ES"),
            SupportedLanguage::ChineseSimplified => Some("zh-Hans"),
            SupportedLanguage::Italian => Some("it-IT"),
            SupportedLanguage::Korean => Some("ko-KR"),
        }
    }

    /// Resolve to a concrete culture, consulting the environment for
    /// `MachineDefault`.
    pub fn resolve_culture(self) -> String {
        match self.culture() {
            Some(culture) => culture.to_string(),
            None => machine_culture(),
        }
    }
}

/// Environment variables consulted for the machine-default culture, in order.
const LOCALE_ENV_VARS: [&str; 3] = ["MERIDIAN_STUDIO_LOCALE", "LC_ALL", "LANG"];

/// Detect the desktop's culture from the environment.
pub fn machine_culture() -> String {
    for var in LOCALE_ENV_VARS {
        if let Ok(value) = env::var(var) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return normalize_culture(trimmed);
            }
        }
    }
    "en-US".to_string()
}

/// Normalize a raw locale string such as `fr_FR.UTF-8` to a supported
/// culture. Unrecognized languages fall back to `en-US`.
pub fn normalize_culture(raw: &str) -> String {
    let lower = raw.to_lowercase().replace('_', "-");
    let language = lower.split(['-', '.', '@']).next().unwrap_or("");

    let culture = match language {
        "en" => "en-US",
        "fr" => "fr-FR",
        "ja" => "ja-JP",
        "ru" => "ru-RU",
        "de" => "de-DE",
        "es" => "es-ES",
        "zh" => "zh-Hans",
        "it" => "it-IT",
        "ko" => "ko-KR",
        _ => "en-US",
    };
    culture.to_string()
}

/// Source of translated strings for one or more cultures.
///
/// Providers are the extension point plugins can use to contribute their own
/// catalogs; the built-in strings come from [`CatalogProvider::builtin`].
#[cfg_attr(test, mockall::automock)]
pub trait TranslationProvider: Send + Sync {
    /// Look up `key` for `culture`; `None` when this provider has no entry.
    fn translate(&self, culture: &str, key: &str) -> Option<String>;
}

/// Provider backed by in-memory catalogs, keyed culture then key.
pub struct CatalogProvider {
    catalogs: IndexMap<String, IndexMap<String, String>>,
}

impl CatalogProvider {
    pub fn new() -> Self {
        Self {
            catalogs: IndexMap::new(),
        }
    }

    /// Insert or replace one entry.
    pub fn insert(&mut self, culture: &str, key: &str, text: &str) {
        self.catalogs
            .entry(culture.to_string())
            .or_default()
            .insert(key.to_string(), text.to_string());
    }

    /// The strings the startup shell needs, with English as the complete
    /// reference catalog.
    pub fn builtin() -> Self {
        let mut provider = Self::new();

        let english = [
            ("picker.heading", "New project"),
            ("picker.browse.title", "Open a Meridian project"),
            (
                "toolchain.missing.title",
                "Build tools not found",
            ),
            (
                "toolchain.missing.body",
                "Meridian Studio compiles project code with cargo and cannot \
                 work without it. Install a current Rust toolchain from \
                 https://rustup.rs, or point $CARGO at an existing \
                 installation, then start the editor again.",
            ),
            ("upgrade.title", "Upgrade project?"),
            (
                "upgrade.question",
                "Upgrade it to this version of the engine? The project file \
                 will be rewritten and may stop opening in older editors.",
            ),
            ("replace.title", "Folder already exists"),
            (
                "replace.question",
                "Create the project there anyway? Existing files may be \
                 overwritten.",
            ),
        ];
        for (key, text) in english {
            provider.insert("en-US", key, text);
        }

        // Translated shell strings. The full catalogs live with the UI
        // assets; these cover the dialogs startup can show before any
        // plugin has loaded.
        provider.insert("fr-FR", "picker.heading", "Nouveau projet");
        provider.insert("fr-FR", "upgrade.title", "Mettre le projet à niveau ?");
        provider.insert("de-DE", "picker.heading", "Neues Projekt");
        provider.insert("de-DE", "upgrade.title", "Projekt aktualisieren?");
        provider.insert("es-ES", "picker.heading", "Nuevo proyecto");
        provider.insert("it-IT", "picker.heading", "Nuovo progetto");
        provider.insert("ru-RU", "picker.heading", "Новый проект");
        provider.insert("ja-JP", "picker.heading", "新規プロジェクト");
        provider.insert("zh-Hans", "picker.heading", "新建项目");
        provider.insert("ko-KR", "picker.heading", "새 프로젝트");

        provider
    }
}

impl Default for CatalogProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationProvider for CatalogProvider {
    fn translate(&self, culture: &str, key: &str) -> Option<String> {
        self.catalogs.get(culture)?.get(key).cloned()
    }
}

/// Registry of translation providers plus the process-wide current culture.
pub struct TranslationManager {
    providers: RwLock<Vec<Box<dyn TranslationProvider>>>,
    current_culture: RwLock<String>,
}

impl TranslationManager {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(Vec::new()),
            current_culture: RwLock::new("en-US".to_string()),
        }
    }

    /// Register a provider. Providers are consulted in registration order.
    pub fn register_provider(&self, provider: Box<dyn TranslationProvider>) {
        self.providers.write().unwrap().push(provider);
    }

    /// Switch the active culture; takes effect for subsequent lookups.
    pub fn set_current_culture(&self, culture: &str) {
        let mut current = self.current_culture.write().unwrap();
        if *current != culture {
            tracing::info!("Culture changed: {} -> {}", *current, culture);
            *current = culture.to_string();
        }
    }

    pub fn current_culture(&self) -> String {
        self.current_culture.read().unwrap().clone()
    }

    /// Translate `key` for the current culture, falling back to `en-US` and
    /// finally to the key itself.
    pub fn tr(&self, key: &str) -> String {
        let culture = self.current_culture();
        let providers = self.providers.read().unwrap();

        for provider in providers.iter() {
            if let Some(text) = provider.translate(&culture, key) {
                return text;
            }
        }
        if culture != "en-US" {
            for provider in providers.iter() {
                if let Some(text) = provider.translate("en-US", key) {
                    return text;
                }
            }
        }

        tracing::debug!("No translation for key {} in culture {}", key, culture);
        key.to_string()
    }
}

impl Default for TranslationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the built-in catalogs and apply the configured language.
pub fn initialize(manager: &TranslationManager, language: SupportedLanguage) {
    manager.register_provider(Box::new(CatalogProvider::builtin()));
    let culture = language.resolve_culture();
    manager.set_current_culture(&culture);
    tracing::info!(
        "Localization initialized: language={:?}, culture={}",
        language,
        culture
    );
}
