use clap::Args;

use crate::domain::EntityKind;
use crate::error::TransformerError;
use crate::index::{BuildOptions, CollisionPolicy, TaxonomySettings};
use crate::tme::TmeSettings;

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// TME username used for HTTP basic authentication
    #[arg(long, env = "TME_USERNAME", default_value = "", hide_env_values = true)]
    pub tme_username: String,

    /// TME password used for HTTP basic authentication
    #[arg(long, env = "TME_PASSWORD", default_value = "", hide_env_values = true)]
    pub tme_password: String,

    /// Token sent to TME in the X-Coco-Auth header
    #[arg(long, env = "TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    /// Prefix of the apiUrl in list responses
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// TME base URL
    #[arg(long, env = "TME_BASE_URL", default_value = "https://tme.ft.com")]
    pub tme_base_url: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Records requested from TME per page
    #[arg(long, alias = "maxRecords", env = "MAX_RECORDS", default_value_t = 10000)]
    pub max_records: usize,

    /// Requests executed in parallel to TME for each page
    #[arg(long, env = "SLICES", default_value_t = 10)]
    pub slices: usize,

    /// TME taxonomy name, also mixed into every identifier
    #[arg(long, env = "TME_TAXONOMY_NAME")]
    pub tme_taxonomy_name: Option<String>,

    /// Taxonomy served by this instance
    #[arg(long, value_enum, env = "ENTITY_TYPE", default_value_t = EntityKind::AlphavilleSeries)]
    pub entity_type: EntityKind,

    /// Handling of two terms that derive the same identifier
    #[arg(long, value_enum, env = "COLLISION_POLICY", default_value_t = CollisionPolicy::Overwrite)]
    pub collision_policy: CollisionPolicy,

    /// Runbook URL reported by the health check
    #[arg(long, env = "PANIC_GUIDE", default_value = "")]
    pub panic_guide: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub port: u16,
    pub source: TmeSettings,
    pub taxonomy: TaxonomySettings,
    pub build: BuildOptions,
    pub panic_guide: String,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, TransformerError> {
        if config.max_records == 0 {
            return Err(TransformerError::InvalidConfig(
                "max-records must be greater than zero".to_string(),
            ));
        }
        if config.slices == 0 || config.slices > config.max_records {
            return Err(TransformerError::InvalidConfig(format!(
                "slices must be between 1 and max-records ({}), got {}",
                config.max_records, config.slices
            )));
        }

        let tme_base_url = config.tme_base_url.trim().trim_end_matches('/').to_string();
        if tme_base_url.is_empty() {
            return Err(TransformerError::InvalidConfig(
                "tme-base-url must not be empty".to_string(),
            ));
        }

        let kind = config.entity_type;
        let taxonomy_name = config
            .tme_taxonomy_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .or_else(|| kind.default_taxonomy_name().map(str::to_string))
            .ok_or_else(|| {
                TransformerError::InvalidConfig(format!(
                    "tme-taxonomy-name is required for entity type {kind}"
                ))
            })?;

        let base_url = config
            .base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| default_base_url(config.port, kind));

        Ok(ResolvedConfig {
            port: config.port,
            source: TmeSettings {
                base_url: tme_base_url,
                username: config.tme_username,
                password: config.tme_password,
                token: config.token,
                taxonomy_name: taxonomy_name.clone(),
                max_records: config.max_records,
                slices: config.slices,
            },
            taxonomy: TaxonomySettings {
                kind,
                taxonomy_name,
                base_url: with_trailing_slash(base_url.trim()),
            },
            build: BuildOptions {
                page_size: config.max_records,
                collision_policy: config.collision_policy,
            },
            panic_guide: config.panic_guide,
        })
    }
}

pub fn default_base_url(port: u16, kind: EntityKind) -> String {
    format!(
        "http://localhost:{port}/transformers/{}/",
        kind.path_segment()
    )
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
