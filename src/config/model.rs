// src/config/model.rs

use serde::Deserialize;

use crate::exec::ToolKind;
use crate::layer::LayerId;

/// Configuration exactly as read from disk, before validation.
///
/// ```json
/// {
///   "colors": { "red": "\u001b[31m", "green": "\u001b[32m", "default": "\u001b[0m" },
///   "folders": {
///     "development": "dev/",
///     "production": "prod/",
///     "validator_results": "validator-results/",
///     "layers": {
///       "content": "content-layer/",
///       "settings": "settings-layer/",
///       "backend": "backend-layer/"
///     }
///   },
///   "content_layer": {
///     "views": { "main": "index.html" },
///     "styles": { "source": "main.scss", "target": "main.css" },
///     "controllers": { "main": "main.js" }
///   },
///   "settings_layer": { "...": "..." },
///   "backend_layer": { "controllers": { "main": "background.js" } }
/// }
/// ```
///
/// `tools` and `watch` are optional and have defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfiguration {
    pub colors: Colors,
    pub folders: Folders,
    pub content_layer: LayerDescriptor,
    pub settings_layer: LayerDescriptor,
    pub backend_layer: LayerDescriptor,

    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// ANSI sequences used to highlight user-facing messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Colors {
    #[serde(default)]
    pub red: String,
    #[serde(default)]
    pub green: String,
    #[serde(default)]
    pub default: String,
}

impl Colors {
    pub fn red(&self, text: &str) -> String {
        format!("{}{}{}", self.red, text, self.default)
    }

    pub fn green(&self, text: &str) -> String {
        format!("{}{}{}", self.green, text, self.default)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Folders {
    pub development: String,
    pub production: String,
    #[serde(alias = "validatorResults")]
    pub validator_results: String,
    pub layers: LayerFolders,
}

/// Path fragment of each layer below the development root.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerFolders {
    pub content: String,
    pub settings: String,
    pub backend: String,
}

/// File locations of one layer, relative to that layer's folder.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerDescriptor {
    #[serde(default)]
    pub views: Option<Views>,
    #[serde(default)]
    pub styles: Option<Styles>,
    pub controllers: Controllers,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Views {
    pub main: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Styles {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Controllers {
    pub main: String,
}

/// Shell command templates for the external processors.
///
/// Templates may use `{source}`, `{dest}` and `{output}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_html_validator")]
    pub html_validator: String,

    #[serde(default = "default_css_compiler")]
    pub css_compiler: String,

    #[serde(default = "default_css_validator")]
    pub css_validator: String,

    #[serde(default = "default_js_linter")]
    pub js_linter: String,

    /// Command run after a watch-triggered task succeeds (live reload).
    #[serde(default)]
    pub reload: Option<String>,

    /// Watchdog for a single tool invocation; `0` disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_html_validator() -> String {
    "npx --no-install html-validate {source}".to_string()
}

fn default_css_compiler() -> String {
    "npx --no-install sass --no-source-map --style=expanded {source} {output}".to_string()
}

fn default_css_validator() -> String {
    "npx --no-install stylelint {source}".to_string()
}

fn default_js_linter() -> String {
    "npx --no-install eslint {source}".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            html_validator: default_html_validator(),
            css_compiler: default_css_compiler(),
            css_validator: default_css_validator(),
            js_linter: default_js_linter(),
            reload: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ToolsSection {
    pub fn template(&self, tool: ToolKind) -> &str {
        match tool {
            ToolKind::HtmlValidator => &self.html_validator,
            ToolKind::CssCompiler => &self.css_compiler,
            ToolKind::CssValidator => &self.css_validator,
            ToolKind::JsLinter => &self.js_linter,
        }
    }
}

/// `watch` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Only re-run a bound task when the changed file's content differs.
    #[serde(default = "default_use_hash")]
    pub use_hash: bool,
}

fn default_use_hash() -> bool {
    true
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            use_hash: default_use_hash(),
        }
    }
}

/// Validated, immutable configuration.
///
/// Obtain one through [`crate::config::load_from_path`] or
/// `Configuration::try_from(raw)`; the fields are only reachable through
/// accessors so a validated value cannot be edited afterwards.
#[derive(Debug, Clone)]
pub struct Configuration {
    colors: Colors,
    folders: Folders,
    content_layer: LayerDescriptor,
    settings_layer: LayerDescriptor,
    backend_layer: LayerDescriptor,
    tools: ToolsSection,
    watch: WatchSection,
}

impl Configuration {
    pub(crate) fn new_unchecked(raw: RawConfiguration) -> Self {
        Self {
            colors: raw.colors,
            folders: raw.folders,
            content_layer: raw.content_layer,
            settings_layer: raw.settings_layer,
            backend_layer: raw.backend_layer,
            tools: raw.tools,
            watch: raw.watch,
        }
    }

    pub fn colors(&self) -> &Colors {
        &self.colors
    }

    pub fn folders(&self) -> &Folders {
        &self.folders
    }

    pub fn tools(&self) -> &ToolsSection {
        &self.tools
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }

    /// Descriptor of a selectable layer; `None` for `Unset`.
    pub fn layer(&self, layer: LayerId) -> Option<&LayerDescriptor> {
        match layer {
            LayerId::Unset => None,
            LayerId::Content => Some(&self.content_layer),
            LayerId::Settings => Some(&self.settings_layer),
            LayerId::Backend => Some(&self.backend_layer),
        }
    }

    /// Folder fragment of a selectable layer; `None` for `Unset`.
    pub fn layer_fragment(&self, layer: LayerId) -> Option<&str> {
        let layers = &self.folders.layers;
        match layer {
            LayerId::Unset => None,
            LayerId::Content => Some(&layers.content),
            LayerId::Settings => Some(&layers.settings),
            LayerId::Backend => Some(&layers.backend),
        }
    }
}
