//! Конфигурация CLI: формат вывода по умолчанию и дополнительные продукты каталога.

use anyhow::Context;
use clap::ValueEnum;
use emicalclib::catalog::{Catalog, LoanProduct};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_FILE: &str = "emicalc.toml";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fmt {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_format: Fmt,
    pub products: Vec<LoanProduct>,
}

impl Config {
    /// Встроенный каталог с наложенными продуктами из конфигурации.
    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        let mut catalog = Catalog::builtin();
        for p in &self.products {
            catalog
                .upsert(p.clone())
                .with_context(|| format!("config product `{}`", p.id))?;
        }
        Ok(catalog)
    }
}

/// Явный путь (флаг или `EMICALC_CONFIG`), иначе `./emicalc.toml`, если он есть.
pub fn resolve_path(explicit: Option<PathBuf>, cwd: &Path) -> Option<PathBuf> {
    explicit.or_else(|| {
        let local = cwd.join(DEFAULT_FILE);
        local.is_file().then_some(local)
    })
}

/// Читает TOML; неизвестные ключи возвращаются списком, а не ошибкой.
pub fn load(path: &Path) -> anyhow::Result<(Config, Vec<String>)> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let mut unknown = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);
    let config: Config = serde_ignored::deserialize(deserializer, |p| unknown.push(p.to_string()))
        .with_context(|| format!("parsing {}", path.display()))?;

    Ok((config, unknown))
}

pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let (config, unknown) = load(path)?;
    for key in unknown {
        tracing::warn!(file = %path.display(), %key, "unknown config key ignored");
    }
    tracing::debug!(file = %path.display(), products = config.products.len(), "config loaded");
    Ok(config)
}
