// src/layer.rs

//! The active-layer selector.
//!
//! A [`LayerSelector`] is a plain value owned by the run context; nothing in
//! the crate keeps a process-wide "current layer".

use std::fmt;

use tracing::{debug, warn};

/// One of the independently buildable sub-projects, or `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LayerId {
    #[default]
    Unset,
    Content,
    Settings,
    Backend,
}

impl LayerId {
    /// The three selectable layers, in a stable order.
    pub const SELECTABLE: [LayerId; 3] = [LayerId::Content, LayerId::Settings, LayerId::Backend];

    /// Name of the task that selects this layer (`None` for `Unset`).
    pub fn selector_task(self) -> Option<&'static str> {
        match self {
            LayerId::Unset => None,
            LayerId::Content => Some("setLayerToContent"),
            LayerId::Settings => Some("setLayerToSettings"),
            LayerId::Backend => Some("setLayerToBackend"),
        }
    }

    pub fn is_set(self) -> bool {
        self != LayerId::Unset
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayerId::Unset => "unset",
            LayerId::Content => "content",
            LayerId::Settings => "settings",
            LayerId::Backend => "backend",
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the layer every layer-dependent task resolves against.
///
/// Once frozen (a serve session has started) further selections are ignored,
/// so watch-triggered runs keep resolving against the layer their bindings
/// were built for.
#[derive(Debug, Clone, Default)]
pub struct LayerSelector {
    current: LayerId,
    frozen: bool,
}

impl LayerSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the current layer. A no-op (with a warning) once frozen.
    pub fn select(&mut self, layer: LayerId) {
        if self.frozen {
            if layer != self.current {
                warn!(
                    requested = %layer,
                    active = %self.current,
                    "layer is locked for the running serve session; ignoring selection"
                );
            }
            return;
        }
        debug!(from = %self.current, to = %layer, "layer selected");
        self.current = layer;
    }

    pub fn current(&self) -> LayerId {
        self.current
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset_and_last_selection_wins() {
        let mut selector = LayerSelector::new();
        assert_eq!(selector.current(), LayerId::Unset);

        selector.select(LayerId::Content);
        selector.select(LayerId::Settings);
        selector.select(LayerId::Settings);
        assert_eq!(selector.current(), LayerId::Settings);
    }

    #[test]
    fn frozen_selector_ignores_selection() {
        let mut selector = LayerSelector::new();
        selector.select(LayerId::Backend);
        selector.freeze();
        selector.select(LayerId::Content);

        assert!(selector.is_frozen());
        assert_eq!(selector.current(), LayerId::Backend);
    }

    #[test]
    fn each_selectable_layer_has_a_selector_task() {
        assert_eq!(LayerId::Backend.selector_task(), Some("setLayerToBackend"));
        assert_eq!(LayerId::Unset.selector_task(), None);
    }
}
