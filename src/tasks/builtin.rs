// src/tasks/builtin.rs

//! The task graph the CLI exposes.

use crate::errors::Result;
use crate::exec::ToolKind;
use crate::layer::LayerId;
use crate::resolve::TaskKind;

use super::registry::TaskRegistry;
use super::{Destination, TaskAction, TaskSpec};

/// Alternative spellings accepted on the command line.
const ALIASES: &[(&str, &str)] = &[
    ("selectLayer(content)", "setLayerToContent"),
    ("selectLayer(settings)", "setLayerToSettings"),
    ("selectLayer(backend)", "setLayerToBackend"),
    ("copyUnprocessedFilesToProdFolder", "copyUnprocessedFiles"),
    ("serveContentLayer", "serveContent"),
    ("serveSettingsLayer", "serveSettings"),
    ("serveBackendLayer", "serveBackend"),
];

impl TaskRegistry {
    /// Registry with every built-in task and alias.
    pub fn builtin() -> Result<Self> {
        let mut registry = TaskRegistry::new();

        for layer in LayerId::SELECTABLE {
            if let Some(name) = layer.selector_task() {
                registry.register(
                    TaskSpec::new(name, TaskAction::SelectLayer(layer))
                        .summary(format!("work in the {layer} layer")),
                )?;
            }
        }

        registry.register(
            TaskSpec::new(
                "validateHtml",
                TaskAction::Process {
                    tool: ToolKind::HtmlValidator,
                    kind: TaskKind::Html,
                    destination: Destination::None,
                },
            )
            .summary("validate the layer's main view"),
        )?;

        registry.register(
            TaskSpec::new(
                "compileCss",
                TaskAction::Process {
                    tool: ToolKind::CssCompiler,
                    kind: TaskKind::CssSource,
                    destination: Destination::LayerFolder,
                },
            )
            .summary("compile the layer's stylesheet source into its folder"),
        )?;

        // Validation reads the compiled output, so compilation always runs first.
        registry.register(
            TaskSpec::new(
                "validateCss",
                TaskAction::Process {
                    tool: ToolKind::CssValidator,
                    kind: TaskKind::CssTarget,
                    destination: Destination::ValidatorResults,
                },
            )
            .after("compileCss")
            .summary("compile, then validate the layer's compiled stylesheet"),
        )?;

        registry.register(
            TaskSpec::new(
                "lintJs",
                TaskAction::Process {
                    tool: ToolKind::JsLinter,
                    kind: TaskKind::Js,
                    destination: Destination::None,
                },
            )
            .summary("lint the layer's main controller"),
        )?;

        registry.register(
            TaskSpec::new("clean", TaskAction::Clean)
                .summary("delete validator results, production and compiled stylesheets"),
        )?;

        registry.register(
            TaskSpec::new("copyUnprocessedFiles", TaskAction::CopyUnprocessed)
                .summary("copy development files other than stylesheet sources to production"),
        )?;

        registry.register(
            TaskSpec::new("serveContent", TaskAction::Serve(LayerId::Content))
                .after("setLayerToContent")
                .after("compileCss")
                .after("lintJs")
                .summary("build the content layer, then watch and reload"),
        )?;

        registry.register(
            TaskSpec::new("serveSettings", TaskAction::Serve(LayerId::Settings))
                .after("setLayerToSettings")
                .after("validateHtml")
                .after("compileCss")
                .after("lintJs")
                .summary("build the settings layer, then watch and reload"),
        )?;

        registry.register(
            TaskSpec::new("serveBackend", TaskAction::Serve(LayerId::Backend))
                .after("setLayerToBackend")
                .after("lintJs")
                .summary("lint the backend layer, then watch and reload"),
        )?;

        for (alias, target) in ALIASES {
            registry.alias(alias, target)?;
        }

        Ok(registry)
    }
}
