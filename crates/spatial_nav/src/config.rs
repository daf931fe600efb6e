//! Configuration for the navigation engine.
//!
//! Three layers:
//! - [`GlobalConfig`]: engine-wide defaults, overridden by `mount`.
//! - [`SectionConfig`]: per-section overrides; unset fields fall back to the
//!   global value when the section is registered.
//! - [`EngineSettings`]: host tuning that is not part of the option object,
//!   loadable from the environment.
//!
//! [`NavOptions`] is the serializable form of a section config as a host
//! would write it in JSON.

use crate::selector::ElementSelector;
use anyhow::{Context as _, Error, Result, bail};
use core::str::FromStr;
use log::warn;
use serde::Deserialize;
use std::env;

/// Elements that are focusable on their own and never get a tabindex.
pub const DEFAULT_TAB_INDEX_IGNORE_LIST: &str =
    "a, input, select, textarea, button, iframe, [contentEditable=true]";

/// Default fraction of the reference size a corner candidate must overlap.
pub const DEFAULT_STRAIGHT_OVERLAP_THRESHOLD: f64 = 0.5;

/// Default viewport margin for the on-screen test (shrinks the viewport).
pub const DEFAULT_SCREEN_MARGIN: f64 = -10.0;

/// Environment variable overriding [`EngineSettings::on_screen_margin`].
pub const SCREEN_MARGIN_ENV: &str = "SPATIAL_NAV_SCREEN_MARGIN";

/// Where candidates may come from relative to the current section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Restrict {
    /// Current section first, then every other section.
    #[default]
    SelfFirst,
    /// Never leave the current section.
    SelfOnly,
    /// All sections at once.
    Unrestricted,
}

impl FromStr for Restrict {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "self-first" => Ok(Self::SelfFirst),
            "self-only" => Ok(Self::SelfOnly),
            "none" => Ok(Self::Unrestricted),
            other => bail!("unknown restrict policy {other:?}"),
        }
    }
}

/// Which element receives focus when a section is entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnterTo {
    LastFocused,
    DefaultElement,
}

impl EnterTo {
    /// Parse an option value; the empty string means "no policy".
    ///
    /// # Errors
    /// Unknown policy names.
    pub fn parse_option(value: &str) -> Result<Option<Self>> {
        match value {
            "" => Ok(None),
            "last-focused" => Ok(Some(Self::LastFocused)),
            "default-element" => Ok(Some(Self::DefaultElement)),
            other => bail!("unknown enterTo policy {other:?}"),
        }
    }
}

/// Engine-wide defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalConfig<E> {
    pub selector: ElementSelector<E>,
    pub default_element: ElementSelector<E>,
    pub straight_only: bool,
    pub straight_overlap_threshold: f64,
    pub disabled: bool,
    pub enter_to: Option<EnterTo>,
    pub restrict: Restrict,
    pub tab_index_ignore_list: ElementSelector<E>,
}

impl<E> Default for GlobalConfig<E> {
    fn default() -> Self {
        Self {
            selector: ElementSelector::css(""),
            default_element: ElementSelector::css(""),
            straight_only: false,
            straight_overlap_threshold: DEFAULT_STRAIGHT_OVERLAP_THRESHOLD,
            disabled: false,
            enter_to: None,
            restrict: Restrict::SelfFirst,
            tab_index_ignore_list: ElementSelector::css(DEFAULT_TAB_INDEX_IGNORE_LIST),
        }
    }
}

impl<E: Clone> GlobalConfig<E> {
    /// Overwrite every field the section config sets.
    pub fn apply(&mut self, overrides: &SectionConfig<E>) {
        if let Some(selector) = &overrides.selector {
            self.selector = selector.clone();
        }
        if let Some(default_element) = &overrides.default_element {
            self.default_element = default_element.clone();
        }
        if let Some(straight_only) = overrides.straight_only {
            self.straight_only = straight_only;
        }
        if let Some(threshold) = overrides.straight_overlap_threshold {
            self.straight_overlap_threshold = clamp_threshold(threshold);
        }
        if let Some(disabled) = overrides.disabled {
            self.disabled = disabled;
        }
        if let Some(enter_to) = overrides.enter_to {
            self.enter_to = Some(enter_to);
        }
        if let Some(restrict) = overrides.restrict {
            self.restrict = restrict;
        }
        if let Some(ignore) = &overrides.tab_index_ignore_list {
            self.tab_index_ignore_list = ignore.clone();
        }
    }
}

/// Keep the overlap threshold a fraction.
pub(crate) fn clamp_threshold(threshold: f64) -> f64 {
    if (0.0..=1.0).contains(&threshold) {
        threshold
    } else {
        warn!("straightOverlapThreshold {threshold} outside [0, 1], clamping");
        if threshold.is_nan() {
            DEFAULT_STRAIGHT_OVERLAP_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        }
    }
}

/// Per-section overrides. `None` inherits from the global config.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionConfig<E> {
    /// Section id; generated when absent.
    pub id: Option<String>,
    pub selector: Option<ElementSelector<E>>,
    pub default_element: Option<ElementSelector<E>>,
    pub straight_only: Option<bool>,
    pub straight_overlap_threshold: Option<f64>,
    pub disabled: Option<bool>,
    pub enter_to: Option<EnterTo>,
    pub restrict: Option<Restrict>,
    pub tab_index_ignore_list: Option<ElementSelector<E>>,
}

impl<E> Default for SectionConfig<E> {
    fn default() -> Self {
        Self {
            id: None,
            selector: None,
            default_element: None,
            straight_only: None,
            straight_overlap_threshold: None,
            disabled: None,
            enter_to: None,
            restrict: None,
            tab_index_ignore_list: None,
        }
    }
}

impl<E> SectionConfig<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    #[must_use]
    pub fn selector(mut self, selector: impl Into<ElementSelector<E>>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    #[must_use]
    pub fn default_element(mut self, selector: impl Into<ElementSelector<E>>) -> Self {
        self.default_element = Some(selector.into());
        self
    }

    #[must_use]
    pub const fn straight_only(mut self, straight_only: bool) -> Self {
        self.straight_only = Some(straight_only);
        self
    }

    #[must_use]
    pub const fn straight_overlap_threshold(mut self, threshold: f64) -> Self {
        self.straight_overlap_threshold = Some(threshold);
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    #[must_use]
    pub const fn enter_to(mut self, enter_to: EnterTo) -> Self {
        self.enter_to = Some(enter_to);
        self
    }

    #[must_use]
    pub const fn restrict(mut self, restrict: Restrict) -> Self {
        self.restrict = Some(restrict);
        self
    }

    #[must_use]
    pub fn tab_index_ignore_list(mut self, selector: impl Into<ElementSelector<E>>) -> Self {
        self.tab_index_ignore_list = Some(selector.into());
        self
    }
}

/// JSON shape of a section/mount option object.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NavOptions {
    pub id: Option<String>,
    pub selector: Option<String>,
    pub default_element: Option<String>,
    pub straight_only: Option<bool>,
    pub straight_overlap_threshold: Option<f64>,
    pub disabled: Option<bool>,
    pub enter_to: Option<String>,
    pub restrict: Option<String>,
    pub tab_index_ignore_list: Option<String>,
}

impl NavOptions {
    /// Parse options from JSON text.
    ///
    /// # Errors
    /// Malformed JSON or unknown keys.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing navigation options")
    }

    /// Convert into a typed section config.
    ///
    /// # Errors
    /// Unknown `restrict` or `enterTo` values.
    pub fn into_config<E>(self) -> Result<SectionConfig<E>> {
        let restrict = self
            .restrict
            .as_deref()
            .map(Restrict::from_str)
            .transpose()?;
        let enter_to = match self.enter_to.as_deref() {
            Some(value) => EnterTo::parse_option(value)?,
            None => None,
        };
        Ok(SectionConfig {
            id: self.id,
            selector: self.selector.as_deref().map(ElementSelector::css),
            default_element: self.default_element.as_deref().map(ElementSelector::css),
            straight_only: self.straight_only,
            straight_overlap_threshold: self.straight_overlap_threshold,
            disabled: self.disabled,
            enter_to,
            restrict,
            tab_index_ignore_list: self
                .tab_index_ignore_list
                .as_deref()
                .map(ElementSelector::css),
        })
    }
}

/// Host tuning for the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineSettings {
    /// Margin applied to the viewport for the on-screen test. Negative values
    /// shrink the viewport.
    pub on_screen_margin: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            on_screen_margin: DEFAULT_SCREEN_MARGIN,
        }
    }
}

impl EngineSettings {
    /// Load settings from the environment.
    ///
    /// Reads `SPATIAL_NAV_SCREEN_MARGIN` (a float, default −10). Unparsable
    /// values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(raw) = env::var(SCREEN_MARGIN_ENV) {
            match raw.trim().parse::<f64>() {
                Ok(margin) if margin.is_finite() => settings.on_screen_margin = margin,
                _ => warn!("ignoring {SCREEN_MARGIN_ENV}={raw:?}: not a finite number"),
            }
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_parse_from_camel_case_json() -> Result<()> {
        let options = NavOptions::from_json(
            r#"{"selector": "a, .focusable", "defaultElement": "[data-default=true]",
                "enterTo": "last-focused", "restrict": "self-only", "straightOverlapThreshold": 0.3}"#,
        )?;
        let config: SectionConfig<u32> = options.into_config()?;
        assert_eq!(config.enter_to, Some(EnterTo::LastFocused));
        assert_eq!(config.restrict, Some(Restrict::SelfOnly));
        assert_eq!(config.straight_overlap_threshold, Some(0.3));
        assert_eq!(config.selector, Some(ElementSelector::css("a, .focusable")));
        Ok(())
    }

    #[test]
    fn empty_enter_to_means_no_policy() -> Result<()> {
        let config: SectionConfig<u32> = NavOptions::from_json(r#"{"enterTo": ""}"#)?.into_config()?;
        assert_eq!(config.enter_to, None);
        Ok(())
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert_eq!(NavOptions::from_json(r#"{"restrict": "self-first", "bogus": 1}"#).ok(), None);
        let options = NavOptions {
            restrict: Some("sideways".to_owned()),
            ..NavOptions::default()
        };
        assert_eq!(options.into_config::<u32>().ok(), None);
    }

    #[test]
    fn apply_overrides_only_set_fields() {
        let mut global: GlobalConfig<u32> = GlobalConfig::default();
        global.apply(
            &SectionConfig::new()
                .selector(".focusable")
                .straight_overlap_threshold(4.0),
        );
        assert_eq!(global.selector, ElementSelector::css(".focusable"));
        assert_eq!(global.straight_overlap_threshold, 1.0);
        assert_eq!(global.restrict, Restrict::SelfFirst);
        assert_eq!(
            global.tab_index_ignore_list,
            ElementSelector::css(DEFAULT_TAB_INDEX_IGNORE_LIST)
        );
    }
}
