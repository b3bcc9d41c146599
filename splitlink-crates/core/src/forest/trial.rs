use super::ClassId;
use super::LayerId;

/// The classes and layers touched by the current trial of a forest.
///
/// Every class and layer which saved its state is listed, so that ending the trial commits or
/// restores all of them. Layers created during the trial are dropped again on failure; layers
/// removed during the trial are only dropped once the trial succeeds.
#[derive(Debug, Default)]
pub(crate) struct TrialLog {
    pub(crate) classes: Vec<ClassId>,
    pub(crate) layers: Vec<LayerId>,
    pub(crate) created_layers: Vec<LayerId>,
    pub(crate) removed_layers: Vec<LayerId>,
}

impl TrialLog {
    pub(crate) fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.layers.is_empty()
            && self.created_layers.is_empty()
            && self.removed_layers.is_empty()
    }
}
