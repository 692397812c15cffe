use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use fatura_ingest::IssuerProfile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_fatura_home, fatura_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub statement: StatementSection,
    #[serde(default)]
    pub report: ReportSection,
    /// Extra issuer profiles; a name here shadows a built-in one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<IssuerProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSection {
    pub profile: String,
    /// CSV of past merchant categories
    pub knowledge_base: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub top: usize,
    pub unresolved: UnresolvedPolicy,
}

/// What the report does with merchants the knowledge base does not know
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Count them as Variable / Other
    Other,
    /// Leave them out of the totals and list them separately
    Skip,
}

impl Default for StatementSection {
    fn default() -> Self {
        Self {
            profile: "nubank".to_string(),
            knowledge_base: None,
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            top: 5,
            unresolved: UnresolvedPolicy::Skip,
        }
    }
}

impl Config {
    /// Custom profiles first, then the built-ins.
    pub fn profile(&self, name: &str) -> Result<IssuerProfile> {
        if let Some(p) = self.profiles.iter().find(|p| p.name == name) {
            return Ok(p.clone());
        }
        if let Some(p) = IssuerProfile::builtin(name) {
            return Ok(p);
        }
        let known: Vec<String> = self.all_profiles().into_iter().map(|p| p.name).collect();
        bail!("unknown issuer profile {name:?} (known: {})", known.join(", "))
    }

    pub fn all_profiles(&self) -> Vec<IssuerProfile> {
        let mut all = self.profiles.clone();
        for builtin in IssuerProfile::builtins() {
            if !all.iter().any(|p| p.name == builtin.name) {
                all.push(builtin);
            }
        }
        all
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(fatura_home()?.join("config.toml"))
}

/// Load from `path`, or from the default location. A missing default config
/// means defaults; a missing explicit one is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = config_path()?;
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_fatura_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.statement.profile, "nubank");
        assert_eq!(cfg.report.top, 5);
    }

    #[test]
    fn test_custom_profile_shadows_builtin() {
        let cfg = parse_config(
            r#"
[statement]
profile = "nubank"
knowledge_base = "categories.csv"

[report]
top = 3
unresolved = "other"

[[profiles]]
name = "nubank"
skip_leading_pages = 2
payment_marker = "Pagamento recebido"
reversal_marker = "Estorno"
"#,
        )
        .unwrap();

        assert_eq!(cfg.report.unresolved, UnresolvedPolicy::Other);
        let nubank = cfg.profile("nubank").unwrap();
        assert_eq!(nubank.skip_leading_pages, 2);
        assert_eq!(nubank.payment_marker, "Pagamento recebido");
        assert_eq!(cfg.all_profiles().len(), 2);
    }

    #[test]
    fn test_unknown_profile() {
        let err = Config::default().profile("amex").unwrap_err();
        assert!(err.to_string().contains("generic-en"));
    }

    #[test]
    fn test_roundtrip_default() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(parse_config(&s).unwrap(), Config::default());
    }
}
