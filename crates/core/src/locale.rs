//! Locale code conversion between the CMS and the vendor.
//!
//! The CMS uses lower case codes (`en-us`); the vendor upper-cases the
//! region (`en-US`). A configured table overrides the mechanical transform.

use std::collections::HashMap;

use locsync_common::{AppError, AppResult, SmartlingConfig};

/// Converts locale codes in both directions.
#[derive(Debug, Clone, Default)]
pub struct LocaleFormatter {
    to_vendor: HashMap<String, String>,
    to_cms: HashMap<String, String>,
    reformat: bool,
}

impl LocaleFormatter {
    /// Build a formatter from a CMS → vendor table.
    ///
    /// The reverse table is derived from `mapping`; when two CMS codes
    /// share a vendor code the lowest one wins. With `reformat` off,
    /// vendor codes are handed back to the CMS unchanged.
    #[must_use]
    pub fn new(mapping: HashMap<String, String>, reformat: bool) -> Self {
        let mut to_cms: HashMap<String, String> = HashMap::with_capacity(mapping.len());
        for (cms, vendor) in &mapping {
            to_cms
                .entry(vendor.clone())
                .and_modify(|kept| {
                    if cms < kept {
                        kept.clone_from(cms);
                    }
                })
                .or_insert_with(|| cms.clone());
        }
        Self {
            to_vendor: mapping,
            to_cms,
            reformat,
        }
    }

    #[must_use]
    pub fn from_config(config: &SmartlingConfig) -> Self {
        Self::new(
            config.locale_to_smartling_locale.clone(),
            config.reformat_language_codes,
        )
    }

    /// CMS locale code to vendor locale ID.
    pub fn to_vendor(&self, locale_id: &str) -> AppResult<String> {
        if let Some(mapped) = self.to_vendor.get(locale_id) {
            return Ok(mapped.clone());
        }

        match split_locale(locale_id)? {
            (language, None) => Ok(language.to_lowercase()),
            (language, Some(region)) => Ok(format!(
                "{}-{}",
                language.to_lowercase(),
                region.to_uppercase()
            )),
        }
    }

    /// Vendor locale ID to CMS locale code.
    pub fn to_cms(&self, locale_id: &str) -> AppResult<String> {
        let mapped = self
            .to_cms
            .get(locale_id)
            .map_or(locale_id, String::as_str);
        split_locale(mapped)?;

        if self.reformat {
            Ok(mapped.to_lowercase())
        } else {
            Ok(mapped.to_string())
        }
    }
}

fn split_locale(locale_id: &str) -> AppResult<(&str, Option<&str>)> {
    let mut parts = locale_id.split('-');
    let language = parts.next().unwrap_or_default();
    let region = parts.next();

    if language.is_empty() || region.is_some_and(str::is_empty) || parts.next().is_some() {
        return Err(AppError::Validation(format!(
            "Invalid locale ID: {locale_id:?}"
        )));
    }
    Ok((language, region))
}
