// src/resolve/routes.rs

//! The `(kind, layer) -> recipe` routing table.
//!
//! Adding a layer or a path kind is one row here; nothing else switches on
//! layer names.

use crate::config::model::Configuration;
use crate::layer::LayerId;

use super::TaskKind;

/// Which entry of a layer descriptor supplies the leaf path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaf {
    ViewsMain,
    StylesSource,
    StylesTarget,
    ControllersMain,
}

impl Leaf {
    pub fn key(self) -> &'static str {
        match self {
            Leaf::ViewsMain => "views.main",
            Leaf::StylesSource => "styles.source",
            Leaf::StylesTarget => "styles.target",
            Leaf::ControllersMain => "controllers.main",
        }
    }
}

/// How to build one path: `development + folder(layer) + leaf(owner)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    /// Layer whose folder fragment is used.
    pub folder: LayerId,
    /// Layer whose descriptor supplies the leaf.
    pub owner: LayerId,
    pub leaf: Leaf,
}

impl Recipe {
    pub const fn own(layer: LayerId, leaf: Leaf) -> Self {
        Self {
            folder: layer,
            owner: layer,
            leaf,
        }
    }

    /// Whether this recipe reads a folder other than its owner's.
    pub fn is_cross_layer(&self) -> bool {
        self.folder != self.owner
    }

    /// Concatenate the path, or name the missing descriptor entry.
    pub fn compose(&self, config: &Configuration) -> Result<String, String> {
        let missing = || format!("{}_layer.{}", self.owner, self.leaf.key());

        let fragment = config.layer_fragment(self.folder).ok_or_else(missing)?;
        let descriptor = config.layer(self.owner).ok_or_else(missing)?;

        let leaf = match self.leaf {
            Leaf::ViewsMain => descriptor.views.as_ref().map(|v| v.main.as_str()),
            Leaf::StylesSource => descriptor.styles.as_ref().map(|s| s.source.as_str()),
            Leaf::StylesTarget => descriptor.styles.as_ref().map(|s| s.target.as_str()),
            Leaf::ControllersMain => Some(descriptor.controllers.main.as_str()),
        }
        .ok_or_else(missing)?;

        Ok(format!("{}{}{}", config.folders().development, fragment, leaf))
    }
}

/// The routing table.
///
/// The backend `Js` row reads the *content* folder with the backend's
/// controller leaf. Existing project layouts depend on that composition.
pub const ROUTES: &[(TaskKind, LayerId, Recipe)] = &[
    (TaskKind::Html, LayerId::Content, Recipe::own(LayerId::Content, Leaf::ViewsMain)),
    (TaskKind::Html, LayerId::Settings, Recipe::own(LayerId::Settings, Leaf::ViewsMain)),
    (TaskKind::CssSource, LayerId::Content, Recipe::own(LayerId::Content, Leaf::StylesSource)),
    (TaskKind::CssSource, LayerId::Settings, Recipe::own(LayerId::Settings, Leaf::StylesSource)),
    (TaskKind::CssTarget, LayerId::Content, Recipe::own(LayerId::Content, Leaf::StylesTarget)),
    (TaskKind::CssTarget, LayerId::Settings, Recipe::own(LayerId::Settings, Leaf::StylesTarget)),
    (TaskKind::Js, LayerId::Content, Recipe::own(LayerId::Content, Leaf::ControllersMain)),
    (TaskKind::Js, LayerId::Settings, Recipe::own(LayerId::Settings, Leaf::ControllersMain)),
    (
        TaskKind::Js,
        LayerId::Backend,
        Recipe {
            folder: LayerId::Content,
            owner: LayerId::Backend,
            leaf: Leaf::ControllersMain,
        },
    ),
];

/// Look up the recipe for `(kind, layer)`.
pub fn recipe_for(kind: TaskKind, layer: LayerId) -> Option<Recipe> {
    ROUTES
        .iter()
        .find(|(k, l, _)| *k == kind && *l == layer)
        .map(|(_, _, recipe)| *recipe)
}

/// Layers with a route for `kind`, in table order.
pub fn routed_layers(kind: TaskKind) -> Vec<LayerId> {
    ROUTES
        .iter()
        .filter(|(k, _, _)| *k == kind)
        .map(|(_, l, _)| *l)
        .collect()
}
