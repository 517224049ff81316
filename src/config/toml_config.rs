use crate::adapters::memory_catalog::CatalogVariant;
use crate::core::allocation::DEFAULT_LARGE_ITEM_THRESHOLD;
use crate::core::BundleRules;
use crate::domain::model::ContainerChoice;
use crate::utils::error::{CartError, Result};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub bundle: BundleConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    pub trigger_family: String,
    pub trigger_attribute: String,
    pub base_unit_values: Vec<String>,
    pub container_family: String,
    pub container_size_attribute: String,
    pub large_item_threshold: u32,
    pub containers: Option<Vec<ContainerChoice>>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            trigger_family: "draft-beer".to_string(),
            trigger_attribute: "volume".to_string(),
            base_unit_values: vec![
                "1 l".to_string(),
                "1 liter".to_string(),
                "1 litre".to_string(),
                "1 л".to_string(),
                "1 литр".to_string(),
            ],
            container_family: "kegs".to_string(),
            container_size_attribute: "volume".to_string(),
            large_item_threshold: DEFAULT_LARGE_ITEM_THRESHOLD,
            containers: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub csv_path: Option<String>,
    pub variants: Option<Vec<CatalogVariant>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CartError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CartError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_CSV})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn json_logging(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|logging| logging.json)
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.bundle.validate()?;

        if let Some(path) = &self.catalog.csv_path {
            validation::validate_path("catalog.csv_path", path)?;
        }

        for variant in self.catalog.variants.iter().flatten() {
            if variant.price.is_sign_negative() {
                return Err(CartError::InvalidConfigValueError {
                    field: format!("catalog.variants[{}].price", variant.variant_id),
                    value: variant.price.to_string(),
                    reason: "Price cannot be negative".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for BundleConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("bundle.trigger_family", &self.trigger_family)?;
        validation::validate_non_empty_string("bundle.trigger_attribute", &self.trigger_attribute)?;

        if self.base_unit_values.is_empty() {
            return Err(CartError::MissingConfigError {
                field: "bundle.base_unit_values".to_string(),
            });
        }

        match &self.containers {
            Some(containers) => {
                if containers.is_empty() {
                    return Err(CartError::MissingConfigError {
                        field: "bundle.containers".to_string(),
                    });
                }
                for container in containers {
                    validation::validate_positive_number(
                        "bundle.containers.size",
                        container.size as usize,
                        1,
                    )?;
                }
            }
            None => {
                validation::validate_non_empty_string(
                    "bundle.container_family",
                    &self.container_family,
                )?;
                validation::validate_non_empty_string(
                    "bundle.container_size_attribute",
                    &self.container_size_attribute,
                )?;
            }
        }

        Ok(())
    }
}

impl BundleRules for BundleConfig {
    fn trigger_family(&self) -> &str {
        &self.trigger_family
    }

    fn trigger_attribute(&self) -> &str {
        &self.trigger_attribute
    }

    fn base_unit_values(&self) -> &[String] {
        &self.base_unit_values
    }

    fn container_family(&self) -> &str {
        &self.container_family
    }

    fn container_size_attribute(&self) -> &str {
        &self.container_size_attribute
    }

    fn large_item_threshold(&self) -> u32 {
        self.large_item_threshold
    }

    fn static_containers(&self) -> Option<&[ContainerChoice]> {
        self.containers.as_deref()
    }
}
