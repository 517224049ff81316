use crate::config::toml_config::CatalogConfig;
use crate::core::Catalog;
use crate::domain::model::{Attribute, VariantId};
use crate::utils::error::{CartError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogVariant {
    pub variant_id: VariantId,
    #[serde(default)]
    pub family: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl CatalogVariant {
    pub fn new(variant_id: VariantId, family: Option<&str>, price: Decimal) -> Self {
        Self {
            variant_id,
            family: family.map(str::to_string),
            price,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }
}

/// CSV 欄位：variant_id,family,price,attributes (attributes 為 `name=value;name=value`)
#[derive(Debug, Deserialize)]
struct CsvRow {
    variant_id: u64,
    family: String,
    price: String,
    #[serde(default)]
    attributes: String,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    variants: HashMap<VariantId, CatalogVariant>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_variants(variants: impl IntoIterator<Item = CatalogVariant>) -> Self {
        let mut catalog = Self::new();
        for variant in variants {
            catalog.insert(variant);
        }
        catalog
    }

    /// 依設定載入：先讀 CSV，再以設定檔內的規格覆蓋
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let mut catalog = match &config.csv_path {
            Some(path) => Self::from_csv_file(path)?,
            None => Self::new(),
        };

        for variant in config.variants.iter().flatten() {
            catalog.insert(variant.clone());
        }

        tracing::info!("Catalog loaded with {} variants", catalog.len());
        Ok(catalog)
    }

    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(&path)?;
        tracing::debug!("Reading catalog CSV from {}", path.as_ref().display());
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut catalog = Self::new();
        for row in csv_reader.deserialize::<CsvRow>() {
            let row = row?;
            catalog.insert(parse_row(row)?);
        }

        Ok(catalog)
    }

    pub fn insert(&mut self, variant: CatalogVariant) -> Option<CatalogVariant> {
        self.variants.insert(variant.variant_id, variant)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    fn get(&self, variant_id: VariantId) -> Result<&CatalogVariant> {
        self.variants
            .get(&variant_id)
            .ok_or(CartError::VariantNotFound { variant_id })
    }
}

fn parse_row(row: CsvRow) -> Result<CatalogVariant> {
    let variant_id = VariantId(row.variant_id);
    let price = Decimal::from_str(&row.price).map_err(|e| CartError::InvalidConfigValueError {
        field: format!("catalog.price[{}]", variant_id),
        value: row.price.clone(),
        reason: e.to_string(),
    })?;
    if price.is_sign_negative() {
        return Err(CartError::InvalidConfigValueError {
            field: format!("catalog.price[{}]", variant_id),
            value: row.price,
            reason: "Price cannot be negative".to_string(),
        });
    }

    let family = Some(row.family).filter(|family| !family.is_empty());

    let attributes = row
        .attributes
        .split(';')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => Ok(Attribute::new(name.trim(), value.trim())),
            None => Err(CartError::InvalidConfigValueError {
                field: format!("catalog.attributes[{}]", variant_id),
                value: pair.to_string(),
                reason: "expected name=value".to_string(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CatalogVariant {
        variant_id,
        family,
        price,
        attributes,
    })
}

impl Catalog for InMemoryCatalog {
    fn unit_price(&self, variant_id: VariantId) -> Result<Decimal> {
        Ok(self.get(variant_id)?.price)
    }

    fn family_of(&self, variant_id: VariantId) -> Result<Option<String>> {
        Ok(self.get(variant_id)?.family.clone())
    }

    fn attributes_of(&self, variant_id: VariantId) -> Result<Vec<Attribute>> {
        Ok(self.get(variant_id)?.attributes.clone())
    }

    fn variants_in_family(&self, family: &str) -> Result<Vec<VariantId>> {
        let mut ids: Vec<VariantId> = self
            .variants
            .values()
            .filter(|variant| variant.family.as_deref() == Some(family))
            .map(|variant| variant.variant_id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
