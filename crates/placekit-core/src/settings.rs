//! Session settings and explicit diff-based application
//!
//! Toggles are plain values; whenever one changes, the caller computes
//! a [`SettingsDiff`] against the previous snapshot and hands it to the
//! engine. There is no subscription graph, which keeps the update path
//! testable without a live engine.

use serde::{Deserialize, Serialize};

/// Flat set of session toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Occlude virtual content behind detected people
    #[serde(default)]
    pub people_occlusion: bool,
    /// Occlude virtual content behind reconstructed real-world geometry
    #[serde(default)]
    pub object_occlusion: bool,
    /// Visualize the engine's scene-understanding mesh
    #[serde(default)]
    pub debug_visualization: bool,
    /// Multiuser flag (configuration only, no protocol behind it)
    #[serde(default)]
    pub multiuser: bool,
}

/// Per-toggle change set; `None` means unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsDiff {
    pub people_occlusion: Option<bool>,
    pub object_occlusion: Option<bool>,
    pub debug_visualization: Option<bool>,
    pub multiuser: Option<bool>,
}

impl SettingsDiff {
    pub fn is_empty(&self) -> bool {
        self.people_occlusion.is_none()
            && self.object_occlusion.is_none()
            && self.debug_visualization.is_none()
            && self.multiuser.is_none()
    }
}

impl SessionSettings {
    /// Changes needed to go from `self` to `next`
    pub fn diff(&self, next: &SessionSettings) -> SettingsDiff {
        fn changed(old: bool, new: bool) -> Option<bool> {
            (old != new).then_some(new)
        }
        SettingsDiff {
            people_occlusion: changed(self.people_occlusion, next.people_occlusion),
            object_occlusion: changed(self.object_occlusion, next.object_occlusion),
            debug_visualization: changed(self.debug_visualization, next.debug_visualization),
            multiuser: changed(self.multiuser, next.multiuser),
        }
    }

    /// Diff that applies every toggle, used when a session starts
    pub fn full_diff(&self) -> SettingsDiff {
        SettingsDiff {
            people_occlusion: Some(self.people_occlusion),
            object_occlusion: Some(self.object_occlusion),
            debug_visualization: Some(self.debug_visualization),
            multiuser: Some(self.multiuser),
        }
    }
}
