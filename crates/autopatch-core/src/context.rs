//! Per-run immutable context

use autopatch_pkg::HostDistro;

use crate::config::UpdaterConfig;

/// Everything a run needs to know about the host, resolved once at startup
#[derive(Debug, Clone)]
pub struct RunContext {
    pub hostname: String,
    pub distro: HostDistro,
    pub config: UpdaterConfig,
}

impl RunContext {
    pub fn new(hostname: impl Into<String>, distro: HostDistro, config: UpdaterConfig) -> Self {
        Self {
            hostname: hostname.into(),
            distro,
            config,
        }
    }
}
