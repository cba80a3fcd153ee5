use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Host platform a build runs on.
///
/// Selected at composition time; nothing in the workspace inspects the
/// platform at runtime to pick an implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Push SDK runs in-process with the application core.
    Android,
    /// Push SDK runs in the native host; identities arrive over the bridge.
    Ios,
}

impl Platform {
    /// Display name, used as the `platform` tag value.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
        }
    }

    /// Lowercase form sent to the backend.
    pub fn slug(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    /// Time the host-side SDK typically needs to boot before identities exist.
    pub fn default_warm_up(&self) -> Duration {
        match self {
            Platform::Android => Duration::from_millis(3_000),
            Platform::Ios => Duration::from_millis(5_000),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
