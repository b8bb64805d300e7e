//! Cache key policy
//!
//! Builds fully-qualified keys from a region (base key) and an optional
//! sub-key, and knows each region's TTL. Invalidation matches stored keys by
//! region prefix, so the region set is validated up front: no region may
//! contain the separator or be a prefix of another region.

use crate::error::{CacheError, CacheResult};
use std::fmt;
use std::time::Duration;

/// Default separator between region and sub-key
pub const DEFAULT_SEPARATOR: char = '_';

/// A named cache region with its TTL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    pub ttl: Duration,
}

impl Region {
    /// Create a region with a TTL in seconds
    pub fn new(name: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            name: name.into(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}s)", self.name, self.ttl.as_secs())
    }
}

/// Validated region table plus key composition rules
#[derive(Debug, Clone)]
pub struct KeyPolicy {
    separator: char,
    regions: Vec<Region>,
}

impl KeyPolicy {
    /// Build a policy, rejecting any region table that would let prefix
    /// invalidation of one region reach into another
    pub fn new(separator: char, regions: impl IntoIterator<Item = Region>) -> CacheResult<Self> {
        let regions: Vec<Region> = regions.into_iter().collect();

        if separator.is_alphanumeric() || separator.is_whitespace() {
            return Err(CacheError::PolicyInvalid(format!(
                "separator {:?} must be a punctuation character",
                separator
            )));
        }

        if regions.is_empty() {
            return Err(CacheError::PolicyInvalid(
                "at least one region must be configured".to_string(),
            ));
        }

        for region in &regions {
            validate_region_name(&region.name, separator)?;
        }

        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                if a.name == b.name {
                    return Err(CacheError::PolicyInvalid(format!(
                        "region '{}' is configured twice",
                        a.name
                    )));
                }
                if a.name.starts_with(&b.name) || b.name.starts_with(&a.name) {
                    return Err(CacheError::PolicyInvalid(format!(
                        "regions '{}' and '{}' overlap; invalidating one would clear the other",
                        a.name, b.name
                    )));
                }
            }
        }

        Ok(Self { separator, regions })
    }

    /// Separator placed between region and sub-key
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Regions in configuration order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Look up a configured region
    pub fn region(&self, base: &str) -> CacheResult<&Region> {
        self.regions
            .iter()
            .find(|r| r.name == base)
            .ok_or_else(|| CacheError::UnconfiguredKey(base.to_string()))
    }

    /// TTL configured for `base`
    pub fn ttl(&self, base: &str) -> CacheResult<Duration> {
        self.region(base).map(|r| r.ttl)
    }

    /// Fully-qualified key for a configured region
    pub fn build_key(&self, base: &str, sub: Option<&str>) -> CacheResult<String> {
        self.region(base)?;
        Ok(self.compose(base, sub))
    }

    /// Concatenate region, separator and sub-key. An empty sub-key is the
    /// same as no sub-key.
    pub fn compose(&self, base: &str, sub: Option<&str>) -> String {
        match sub {
            Some(sub) if !sub.is_empty() => format!("{}{}{}", base, self.separator, sub),
            _ => base.to_string(),
        }
    }

    /// Split a fully-qualified key back into region and sub-key
    ///
    /// Returns `None` for keys that do not belong to a configured region.
    pub fn split_key<'a>(&self, full_key: &'a str) -> Option<(&'a str, Option<&'a str>)> {
        let (base, sub) = match full_key.split_once(self.separator) {
            Some((base, sub)) => (base, Some(sub)),
            None => (full_key, None),
        };

        self.regions.iter().any(|r| r.name == base).then_some((base, sub))
    }
}

fn validate_region_name(name: &str, separator: char) -> CacheResult<()> {
    if name.is_empty() {
        return Err(CacheError::PolicyInvalid(
            "region name must not be empty".to_string(),
        ));
    }

    if name.contains(separator) {
        return Err(CacheError::PolicyInvalid(format!(
            "region '{}' contains the key separator {:?}",
            name, separator
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CacheError::PolicyInvalid(format!(
            "region '{}' may only use ASCII letters, digits, '-' and '_'",
            name
        )));
    }

    Ok(())
}
