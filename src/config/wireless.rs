use serde::Deserialize;
use serde::Serialize;

/// Behavior switches of the wireless feature.
///
/// Both flags are hot-swappable at runtime; cached sign classifications
/// depend on them, so any change must go through
/// [`crate::PropagationEngine::update_wireless_config`], which drops the
/// caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirelessConfig {
    /// Scope every channel by the id of the player who placed the sign.
    /// When off, all signs share one global namespace per channel name.
    #[serde(default = "default_use_player_specific_channels")]
    pub use_player_specific_channels: bool,

    /// Re-scan every loading chunk for receiver signs and rebuild the
    /// channel files from world state. Meant to be switched on once to
    /// recover lost or pre-existing signs, then switched back off.
    #[serde(default)]
    pub compatibility_mode: bool,
}

impl Default for WirelessConfig {
    fn default() -> Self {
        Self {
            use_player_specific_channels: default_use_player_specific_channels(),
            compatibility_mode: false,
        }
    }
}

fn default_use_player_specific_channels() -> bool {
    true
}
