//! Localized message templates.
//!
//! Templates are JSON objects mapping keys to a string or a list of
//! strings. English and Indonesian ship embedded in the binary; files in
//! the locales directory (`<lang>.json`) override them key by key.
//!
//! Lookup falls back from the requested language to the default language,
//! then to embedded English, then to the key itself.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::placeholders::substitute;

const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en.json")),
    ("id", include_str!("../locales/id.json")),
];

const BASE_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Template {
    Text(String),
    List(Vec<String>),
}

type Table = HashMap<String, Template>;

/// Message catalogue for every known language.
#[derive(Debug, Clone)]
pub struct Localizer {
    default_language: String,
    tables: HashMap<String, Table>,
    base: Table,
}

impl Localizer {
    /// Catalogue with only the embedded languages.
    pub fn builtin(default_language: &str) -> Self {
        let mut tables = HashMap::new();
        for (lang, raw) in EMBEDDED {
            match serde_json::from_str::<Table>(raw) {
                Ok(table) => {
                    tables.insert(lang.to_string(), table);
                }
                Err(e) => warn!(lang, error = %e, "Embedded locale is malformed"),
            }
        }
        let base = tables.get(BASE_LANGUAGE).cloned().unwrap_or_default();

        Self {
            default_language: normalize(default_language),
            tables,
            base,
        }
    }

    /// Embedded languages overlaid with every `*.json` file in `dir`.
    ///
    /// A missing directory is not an error.
    ///
    /// # Errors
    /// Fails when a file exists but cannot be read or parsed.
    pub fn load(dir: &Path, default_language: &str) -> Result<Self, ConfigError> {
        let mut localizer = Self::builtin(default_language);
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "No locale directory, using embedded templates");
            return Ok(localizer);
        }

        let entries = std::fs::read_dir(dir).map_err(|e| locale_error(dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| locale_error(dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(lang) = path.file_stem().and_then(|s| s.to_str()).map(normalize) else {
                continue;
            };

            let raw = std::fs::read_to_string(&path).map_err(|e| locale_error(&path, e))?;
            let table: Table = serde_json::from_str(&raw).map_err(|e| locale_error(&path, e))?;
            debug!(lang = %lang, keys = table.len(), "Loaded locale file");
            localizer.tables.entry(lang).or_default().extend(table);
        }

        Ok(localizer)
    }

    fn find(&self, lang: Option<&str>, key: &str) -> Option<&Template> {
        let requested = lang.map(normalize);
        requested
            .iter()
            .filter_map(|l| self.tables.get(l.as_str()))
            .chain(self.tables.get(&self.default_language))
            .find_map(|table| table.get(key))
            .or_else(|| self.base.get(key))
    }

    /// Template text for `key`. Lists are joined with newlines; unknown
    /// keys come back as the key.
    pub fn lookup(&self, lang: Option<&str>, key: &str) -> String {
        match self.find(lang, key) {
            Some(Template::Text(text)) => text.clone(),
            Some(Template::List(items)) => items.join("\n"),
            None => {
                warn!(key, "Missing locale key");
                key.to_string()
            }
        }
    }

    /// Template list for `key`; a plain string becomes a single item.
    pub fn lookup_list(&self, lang: Option<&str>, key: &str) -> Vec<String> {
        match self.find(lang, key) {
            Some(Template::List(items)) => items.clone(),
            Some(Template::Text(text)) => vec![text.clone()],
            None => Vec::new(),
        }
    }

    /// Looks up `key` and fills in `{name}` parameters.
    pub fn text(&self, lang: Option<&str>, key: &str, params: &[(&str, &str)]) -> String {
        format(&self.lookup(lang, key), params)
    }
}

/// Replaces `{name}` with the matching parameter value.
pub fn format(template: &str, params: &[(&str, &str)]) -> String {
    substitute(template, |name| {
        params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    })
}

/// `en-US` and `EN_us` both become `en`.
fn normalize(lang: &str) -> String {
    lang.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn locale_error(path: &Path, e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Locale {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
