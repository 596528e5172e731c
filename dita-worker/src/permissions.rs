//! Host permissions gating notifications and periodic wakes.

use dita_core::config::{DitaConfig, Permission};
use tracing::warn;

pub trait Permissions: Send + Sync + 'static {
    fn notifications(&self) -> Permission;
    fn periodic_wake(&self) -> Permission;
}

/// Permissions recorded in the config file. The CLI grants or revokes them
/// while the worker runs, so the file is re-read on every check.
pub struct ConfigPermissions;

impl ConfigPermissions {
    fn load(&self) -> Option<DitaConfig> {
        DitaConfig::load()
            .map_err(|e| warn!("Could not read permissions from config: {e}"))
            .ok()
    }
}

impl Permissions for ConfigPermissions {
    fn notifications(&self) -> Permission {
        self.load()
            .map(|config| config.notifications.permission)
            .unwrap_or_default()
    }

    fn periodic_wake(&self) -> Permission {
        self.load()
            .map(|config| config.notifications.periodic_wake)
            .unwrap_or_default()
    }
}
