use crate::domain::model::{ContainerChoice, VariantId};
use crate::domain::ports::{BundleRules, Catalog};
use crate::utils::error::Result;
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::BTreeMap;

static SIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)(?:[.,]0+)?\s*\D*$").expect("valid size pattern"));

/// 容器尺寸查詢，第一次解析後快取於此實例
#[derive(Debug, Default)]
pub struct VolumeCatalog {
    cache: OnceCell<Vec<ContainerChoice>>,
}

impl VolumeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn containers<C: Catalog, R: BundleRules>(
        &self,
        catalog: &C,
        rules: &R,
    ) -> Result<&[ContainerChoice]> {
        self.cache
            .get_or_try_init(|| resolve(catalog, rules))
            .map(Vec::as_slice)
    }

    pub fn is_resolved(&self) -> bool {
        self.cache.get().is_some()
    }
}

fn resolve<C: Catalog, R: BundleRules>(catalog: &C, rules: &R) -> Result<Vec<ContainerChoice>> {
    if let Some(containers) = rules.static_containers() {
        tracing::debug!("Using {} configured containers", containers.len());
        return Ok(normalize(containers.to_vec()));
    }

    let family = rules.container_family();
    let mut containers = Vec::new();

    for variant_id in catalog.variants_in_family(family)? {
        let attributes = catalog.attributes_of(variant_id)?;
        let size = attributes
            .iter()
            .find(|attribute| attribute.name == rules.container_size_attribute())
            .and_then(|attribute| parse_size(&attribute.value));

        match size {
            Some(size) => containers.push(ContainerChoice::new(size, variant_id)),
            None => tracing::warn!(
                "Container variant {} has no usable '{}' attribute, skipping",
                variant_id,
                rules.container_size_attribute()
            ),
        }
    }

    tracing::info!(
        "Resolved {} containers from catalog family '{}'",
        containers.len(),
        family
    );

    Ok(normalize(containers))
}

/// 解析 "15 l"、"10л"、"5.0" 這類整數尺寸
pub fn parse_size(value: &str) -> Option<u32> {
    SIZE_PATTERN
        .captures(value)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|size| *size > 0)
}

/// 同尺寸只保留規格 id 最小者，依尺寸由大到小排序
fn normalize(containers: Vec<ContainerChoice>) -> Vec<ContainerChoice> {
    let mut by_size: BTreeMap<u32, VariantId> = BTreeMap::new();

    for container in containers.into_iter().filter(|c| c.size > 0) {
        by_size
            .entry(container.size)
            .and_modify(|variant_id| {
                if container.variant_id < *variant_id {
                    *variant_id = container.variant_id;
                }
            })
            .or_insert(container.variant_id);
    }

    by_size
        .into_iter()
        .rev()
        .map(|(size, variant_id)| ContainerChoice::new(size, variant_id))
        .collect()
}
