// src/config/validate.rs

use std::path::Path;

use thiserror::Error;

use crate::config::model::{Configuration, LayerDescriptor, RawConfiguration};
use crate::exec::ToolKind;
use crate::exec::template::check_placeholders;

/// Reason a structurally valid document was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InvalidConfig(pub String);

impl TryFrom<RawConfiguration> for Configuration {
    type Error = InvalidConfig;

    fn try_from(raw: RawConfiguration) -> Result<Self, Self::Error> {
        validate_folders(&raw)?;
        validate_layer("content_layer", &raw.content_layer)?;
        validate_layer("settings_layer", &raw.settings_layer)?;
        validate_layer("backend_layer", &raw.backend_layer)?;
        validate_tools(&raw)?;
        Ok(Configuration::new_unchecked(raw))
    }
}

fn validate_folders(raw: &RawConfiguration) -> Result<(), InvalidConfig> {
    let folders = &raw.folders;
    // Root folders may be absolute; everything joined below them may not.
    check_non_empty("folders.development", &folders.development)?;
    check_non_empty("folders.production", &folders.production)?;
    check_non_empty("folders.validator_results", &folders.validator_results)?;
    check_fragment("folders.layers.content", &folders.layers.content)?;
    check_fragment("folders.layers.settings", &folders.layers.settings)?;
    check_fragment("folders.layers.backend", &folders.layers.backend)?;
    Ok(())
}

fn validate_layer(key: &str, layer: &LayerDescriptor) -> Result<(), InvalidConfig> {
    if let Some(views) = &layer.views {
        check_fragment(&format!("{key}.views.main"), &views.main)?;
    }
    if let Some(styles) = &layer.styles {
        check_fragment(&format!("{key}.styles.source"), &styles.source)?;
        check_fragment(&format!("{key}.styles.target"), &styles.target)?;
    }
    check_fragment(&format!("{key}.controllers.main"), &layer.controllers.main)
}

fn validate_tools(raw: &RawConfiguration) -> Result<(), InvalidConfig> {
    for tool in ToolKind::ALL {
        let template = raw.tools.template(tool);
        if template.trim().is_empty() {
            return Err(InvalidConfig(format!(
                "tools.{} must not be empty",
                tool.config_key()
            )));
        }
        check_placeholders(template, tool.placeholders())
            .map_err(|e| InvalidConfig(format!("tools.{}: {e}", tool.config_key())))?;
    }
    if let Some(reload) = &raw.tools.reload {
        if reload.trim().is_empty() {
            return Err(InvalidConfig("tools.reload must not be empty when set".to_string()));
        }
    }
    Ok(())
}

fn check_non_empty(key: &str, value: &str) -> Result<(), InvalidConfig> {
    if value.trim().is_empty() {
        return Err(InvalidConfig(format!("{key} must be a non-empty path")));
    }
    Ok(())
}

/// Every path fragment is a non-empty relative string.
fn check_fragment(key: &str, value: &str) -> Result<(), InvalidConfig> {
    check_non_empty(key, value)?;
    if Path::new(value).is_absolute() || value.starts_with('/') {
        return Err(InvalidConfig(format!(
            "{key} must be a relative path (got \"{value}\")"
        )));
    }
    Ok(())
}
