// src/serve/mod.rs

//! Serve sessions: watch a layer's sources, re-run the matching task on
//! change and notify reload observers when it succeeds.

pub mod reload;
pub mod session;

use tracing::debug;

use crate::config::model::Configuration;
use crate::layer::LayerId;
use crate::resolve::{Leaf, Recipe};

pub use reload::{ReloadHub, ReloadSignal};
pub use session::{ServeSession, SessionSummary};

/// Which file re-runs which task while a layer is served.
///
/// The backend watch uses the backend's own folder, unlike the backend lint
/// route which reads the content folder.
const WATCHED: &[(LayerId, Recipe, &str)] = &[
    (LayerId::Content, Recipe::own(LayerId::Content, Leaf::StylesSource), "compileCss"),
    (LayerId::Content, Recipe::own(LayerId::Content, Leaf::ControllersMain), "lintJs"),
    (LayerId::Settings, Recipe::own(LayerId::Settings, Leaf::ViewsMain), "validateHtml"),
    (LayerId::Settings, Recipe::own(LayerId::Settings, Leaf::StylesSource), "compileCss"),
    (LayerId::Settings, Recipe::own(LayerId::Settings, Leaf::ControllersMain), "lintJs"),
    (LayerId::Backend, Recipe::own(LayerId::Backend, Leaf::ControllersMain), "lintJs"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchBinding {
    pub pattern: String,
    pub task: &'static str,
}

/// Bindings for serving `layer`. Entries the layer does not configure are
/// left out.
pub fn bindings_for(layer: LayerId, config: &Configuration) -> Vec<WatchBinding> {
    WATCHED
        .iter()
        .filter(|(l, _, _)| *l == layer)
        .filter_map(|(_, recipe, task)| match recipe.compose(config) {
            Ok(pattern) => Some(WatchBinding {
                pattern,
                task: *task,
            }),
            Err(missing) => {
                debug!(%layer, %task, %missing, "nothing to watch");
                None
            }
        })
        .collect()
}
