// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - [`model`] holds the serde data model and the validated [`Configuration`].
//! - [`loader`] reads a JSON or TOML document from disk.
//! - [`validate`] turns a [`RawConfiguration`] into a [`Configuration`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{DEFAULT_CONFIG_PATH, load_from_path, parse_str};
pub use model::{
    Colors, Configuration, Controllers, Folders, LayerDescriptor, LayerFolders, RawConfiguration,
    Styles, ToolsSection, Views, WatchSection,
};
pub use validate::InvalidConfig;
