//! Product catalog configuration.
//!
//! Loaded from a YAML file (see `config/products.yaml`):
//!
//! ```yaml
//! data_root: /data/products
//! url_prefix: /images
//! products:
//!   - field: CTI_VEL
//!     title: CTI Radial Velocity
//!     directory: "{zoom}/{field}"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;
use viewer_common::{QueryParameters, ViewerError, ViewerResult};

/// Root configuration loaded from the catalog YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Directory all product directories are relative to
    pub data_root: PathBuf,
    /// URL path the data root is served under
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// Mount point used when a product does not name one
    #[serde(default = "default_target")]
    pub default_target: String,
    /// Keep only the newest N frames per response
    #[serde(default)]
    pub max_frames: Option<usize>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    pub products: Vec<ProductConfig>,
    #[serde(default)]
    pub xsection: Option<XsectionSettings>,
}

fn default_url_prefix() -> String {
    "/images".to_string()
}

fn default_target() -> String {
    "anim_div".to_string()
}

fn default_extensions() -> Vec<String> {
    product_selector::DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// One selectable product field.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    pub field: String,
    pub title: String,
    /// Directory template under `data_root`; `{zoom}`, `{field}` and
    /// `{height}` are substituted
    #[serde(default = "default_directory")]
    pub directory: String,
    /// File-name key; defaults to `field`
    #[serde(default)]
    pub key: Option<String>,
    /// Whether `ht` selects a level
    #[serde(default)]
    pub volumetric: bool,
    /// Used when a volumetric request omits `ht`
    #[serde(default)]
    pub default_height: Option<f64>,
    #[serde(default)]
    pub target: Option<String>,
}

fn default_directory() -> String {
    "{zoom}/{field}".to_string()
}

/// Cross-section tool wiring.
#[derive(Debug, Clone, Deserialize)]
pub struct XsectionSettings {
    pub queue_file: PathBuf,
    pub image_dir: PathBuf,
    #[serde(default = "default_xsection_prefix")]
    pub image_url_prefix: String,
    #[serde(default = "default_main_timeout")]
    pub main_timeout_secs: u64,
    #[serde(default = "default_plan_timeout")]
    pub plan_timeout_secs: u64,
}

fn default_xsection_prefix() -> String {
    "/xsection-images".to_string()
}

fn default_main_timeout() -> u64 {
    12
}

fn default_plan_timeout() -> u64 {
    2
}

impl XsectionSettings {
    pub fn to_client_config(&self) -> xsection::XsectionConfig {
        xsection::XsectionConfig {
            main_timeout: Duration::from_secs(self.main_timeout_secs),
            plan_timeout: Duration::from_secs(self.plan_timeout_secs),
            ..xsection::XsectionConfig::new(self.queue_file.clone(), self.image_dir.clone())
        }
    }
}

impl CatalogConfig {
    /// Load and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let config = Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
        info!(
            path = %path.display(),
            products = config.products.len(),
            "Loaded product catalog"
        );
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: CatalogConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validate_prefix("url_prefix", &self.url_prefix)?;
        if let Some(xs) = &self.xsection {
            validate_prefix("xsection.image_url_prefix", &xs.image_url_prefix)?;
        }
        for (i, product) in self.products.iter().enumerate() {
            if self.products[..i].iter().any(|p| p.field == product.field) {
                bail!("Duplicate product field '{}'", product.field);
            }
        }
        Ok(())
    }

    pub fn product(&self, field: &str) -> Option<&ProductConfig> {
        self.products.iter().find(|p| p.field == field)
    }

    /// Public URL of an artifact under `data_root`.
    pub fn frame_url(&self, artifact: &Path) -> Option<String> {
        let relative = artifact.strip_prefix(&self.data_root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(format!("{}/{}", self.url_prefix.trim_end_matches('/'), parts.join("/")))
    }
}

fn validate_prefix(name: &str, prefix: &str) -> Result<()> {
    if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
        bail!("{} must be a non-root absolute path, got '{}'", name, prefix);
    }
    Ok(())
}

impl ProductConfig {
    pub fn selection_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.field)
    }

    pub fn target<'a>(&'a self, catalog: &'a CatalogConfig) -> &'a str {
        self.target.as_deref().unwrap_or(&catalog.default_target)
    }

    /// Resolve the directory template for one request.
    pub fn search_dir(&self, data_root: &Path, params: &QueryParameters) -> ViewerResult<PathBuf> {
        let zoom = params.domain.key();
        check_path_token(params.domain.param_name(), zoom)?;

        let mut relative = self.directory.replace("{zoom}", zoom).replace("{field}", &self.field);
        if self.volumetric {
            let height = params
                .height
                .or(self.default_height)
                .ok_or_else(|| ViewerError::MissingParameter("ht".into()))?;
            relative = relative.replace("{height}", &height.to_string());
        }

        Ok(data_root.join(relative))
    }
}

fn check_path_token(param: &str, value: &str) -> ViewerResult<()> {
    let ok = !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if ok {
        Ok(())
    } else {
        Err(ViewerError::InvalidParameter {
            param: param.to_string(),
            message: format!("'{}' is not a valid key", value),
        })
    }
}
