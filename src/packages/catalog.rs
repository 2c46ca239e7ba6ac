use std::collections::HashSet;

use serde::Deserialize;
use tracing::info;

use super::resolver::{InstallStatus, StatusResolver};
use crate::error::{Result, StarterError};

const BUNDLED_CATALOG: &str = include_str!("../../resources/catalog.toml");

/// A group of packages shown together in the explorer
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PackageCategory {
    /// Display label (e.g., "Browsers")
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub packages: Vec<Package>,
}

/// A package offered for installation. Its install status is not stored here;
/// ask the [`StatusResolver`] through [`Catalog::status_of`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Package {
    /// Host package name, unique across the catalog
    pub identifier: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<PackageCategory>,
}

/// Ordered, read-only catalog of categories and their packages
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<PackageCategory>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate identifiers
    pub fn new(categories: Vec<PackageCategory>) -> Result<Self> {
        let mut seen = HashSet::new();
        for package in categories.iter().flat_map(|c| c.packages.iter()) {
            if package.identifier.trim().is_empty() {
                return Err(StarterError::Catalog(format!(
                    "package '{}' has an empty identifier",
                    package.display_name
                )));
            }
            if !seen.insert(package.identifier.as_str()) {
                return Err(StarterError::Catalog(format!(
                    "duplicate package identifier '{}'",
                    package.identifier
                )));
            }
        }

        Ok(Self { categories })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.categories)
    }

    pub fn categories(&self) -> &[PackageCategory] {
        &self.categories
    }

    pub fn category(&self, idx: usize) -> Option<&PackageCategory> {
        self.categories.get(idx)
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.categories.iter().flat_map(|c| c.packages.iter())
    }

    pub fn package_count(&self) -> usize {
        self.packages().count()
    }

    pub fn is_empty(&self) -> bool {
        self.package_count() == 0
    }

    pub fn find(&self, identifier: &str) -> Option<&Package> {
        self.packages().find(|p| p.identifier == identifier)
    }

    /// Live status of a package, always read through the resolver
    pub fn status_of(&self, resolver: &StatusResolver, identifier: &str) -> InstallStatus {
        resolver.resolve_status(identifier)
    }

    /// Request the status of every package so results arrive before they are shown
    pub fn prefetch(&self, resolver: &StatusResolver) {
        for package in self.packages() {
            resolver.resolve_status(&package.identifier);
        }
    }

    /// (installed, not installed, still checking) across the whole catalog
    pub fn status_summary(&self, resolver: &StatusResolver) -> (usize, usize, usize) {
        self.packages()
            .fold((0, 0, 0), |(yes, no, pending), p| match resolver.resolve_status(&p.identifier) {
                InstallStatus::Installed => (yes + 1, no, pending),
                InstallStatus::NotInstalled => (yes, no + 1, pending),
                InstallStatus::Unknown => (yes, no, pending + 1),
            })
    }
}

/// The catalog bundled with the binary
pub fn load_catalog() -> Result<Catalog> {
    let catalog = Catalog::from_toml(BUNDLED_CATALOG)?;
    info!(
        "Loaded bundled catalog: {} categories, {} packages",
        catalog.categories().len(),
        catalog.package_count()
    );
    Ok(catalog)
}
