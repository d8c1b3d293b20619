#![allow(dead_code)]

use std::path::Path;

use layerbuild::config::{
    Colors, Configuration, Controllers, Folders, LayerDescriptor, LayerFolders, RawConfiguration,
    Styles, ToolsSection, Views, WatchSection,
};
use layerbuild::layer::LayerId;

/// Builder for `Configuration` with the usual three-layer layout:
///
/// ```text
/// dev/content-layer/   index.html main.scss -> main.css main.js
/// dev/settings-layer/  index.html main.scss -> main.css main.js
/// dev/backend-layer/   main.js
/// ```
///
/// Output goes to `prod/` and `validator-results/`; colors are empty.
pub struct ConfigurationBuilder {
    raw: RawConfiguration,
}

fn ui_layer() -> LayerDescriptor {
    LayerDescriptor {
        views: Some(Views {
            main: "index.html".to_string(),
        }),
        styles: Some(Styles {
            source: "main.scss".to_string(),
            target: "main.css".to_string(),
        }),
        controllers: Controllers {
            main: "main.js".to_string(),
        },
    }
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawConfiguration {
                colors: Colors::default(),
                folders: Folders {
                    development: "dev/".to_string(),
                    production: "prod/".to_string(),
                    validator_results: "validator-results/".to_string(),
                    layers: LayerFolders {
                        content: "content-layer/".to_string(),
                        settings: "settings-layer/".to_string(),
                        backend: "backend-layer/".to_string(),
                    },
                },
                content_layer: ui_layer(),
                settings_layer: ui_layer(),
                backend_layer: LayerDescriptor {
                    views: None,
                    styles: None,
                    controllers: Controllers {
                        main: "main.js".to_string(),
                    },
                },
                tools: ToolsSection::default(),
                watch: WatchSection::default(),
            },
        }
    }

    /// Prefix every folder with `root`, for tests that touch a real directory.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        let prefix = format!("{}/", root.display());
        let folders = &mut self.raw.folders;
        folders.development = format!("{prefix}{}", folders.development);
        folders.production = format!("{prefix}{}", folders.production);
        folders.validator_results = format!("{prefix}{}", folders.validator_results);
        self
    }

    pub fn with_colors(mut self, red: &str, green: &str, default: &str) -> Self {
        self.raw.colors = Colors {
            red: red.to_string(),
            green: green.to_string(),
            default: default.to_string(),
        };
        self
    }

    pub fn with_layer(mut self, layer: LayerId, descriptor: LayerDescriptor) -> Self {
        match layer {
            LayerId::Content => self.raw.content_layer = descriptor,
            LayerId::Settings => self.raw.settings_layer = descriptor,
            LayerId::Backend => self.raw.backend_layer = descriptor,
            LayerId::Unset => {}
        }
        self
    }

    pub fn with_controller(mut self, layer: LayerId, main: &str) -> Self {
        let controllers = Controllers {
            main: main.to_string(),
        };
        match layer {
            LayerId::Content => self.raw.content_layer.controllers = controllers,
            LayerId::Settings => self.raw.settings_layer.controllers = controllers,
            LayerId::Backend => self.raw.backend_layer.controllers = controllers,
            LayerId::Unset => {}
        }
        self
    }

    pub fn without_views(mut self, layer: LayerId) -> Self {
        match layer {
            LayerId::Content => self.raw.content_layer.views = None,
            LayerId::Settings => self.raw.settings_layer.views = None,
            LayerId::Backend => self.raw.backend_layer.views = None,
            LayerId::Unset => {}
        }
        self
    }

    pub fn with_tools(mut self, tools: ToolsSection) -> Self {
        self.raw.tools = tools;
        self
    }

    pub fn with_use_hash(mut self, use_hash: bool) -> Self {
        self.raw.watch.use_hash = use_hash;
        self
    }

    pub fn raw(self) -> RawConfiguration {
        self.raw
    }

    pub fn build(self) -> Configuration {
        Configuration::try_from(self.raw).expect("Failed to build valid configuration from builder")
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
