//! Configuration types for zonegen
//!
//! A [`ZoneGenConfig`] is built once at process start (the `zonegen` binary
//! reads it from the environment) and handed by reference to every component.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default prefix stripped from addresses to form reverse-zone keys
pub const DEFAULT_REVERSE_PREFIX: &str = "192.168.";

/// Default name server control binary
pub const DEFAULT_RELOAD_COMMAND: &str = "/usr/sbin/rndc";

/// Main zonegen configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneGenConfig {
    /// Template, snapshot and live file locations
    pub zones: ZonesConfig,

    /// Inventory source configuration
    pub inventory: InventoryConfig,

    /// Name server reload settings
    #[serde(default)]
    pub reload: ReloadConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ZoneGenConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.zones.validate()?;
        self.inventory.validate()?;
        self.reload.validate()?;
        Ok(())
    }
}

/// Zone file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZonesConfig {
    /// Template holding the forward zone preamble (SOA, NS, ...)
    pub forward_template: PathBuf,

    /// Template holding the reverse zone preamble
    pub reverse_template: PathBuf,

    /// Directory of unstamped snapshots used for change detection
    pub snapshot_dir: PathBuf,

    /// Directory the name server loads zones from
    pub live_dir: PathBuf,

    /// Leading octets stripped from every address for the reverse zone
    #[serde(default = "default_reverse_prefix")]
    pub reverse_prefix: String,
}

impl ZonesConfig {
    /// Create a zone configuration with the default reverse prefix
    pub fn new(
        forward_template: impl Into<PathBuf>,
        reverse_template: impl Into<PathBuf>,
        snapshot_dir: impl Into<PathBuf>,
        live_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            forward_template: forward_template.into(),
            reverse_template: reverse_template.into(),
            snapshot_dir: snapshot_dir.into(),
            live_dir: live_dir.into(),
            reverse_prefix: default_reverse_prefix(),
        }
    }

    /// Set the reverse prefix
    pub fn with_reverse_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reverse_prefix = prefix.into();
        self
    }

    /// Validate the zone configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let paths = [
            ("forward template", &self.forward_template),
            ("reverse template", &self.reverse_template),
            ("snapshot directory", &self.snapshot_dir),
            ("live directory", &self.live_dir),
        ];
        for (what, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(crate::Error::config(format!("{} path cannot be empty", what)));
            }
        }

        if self.forward_template.file_name().is_none() || self.reverse_template.file_name().is_none() {
            return Err(crate::Error::config("Template paths must name a file"));
        }

        if self.forward_template.file_name() == self.reverse_template.file_name() {
            return Err(crate::Error::config(
                "Forward and reverse templates must have different file names",
            ));
        }

        if self.reverse_prefix.is_empty() || !self.reverse_prefix.ends_with('.') {
            return Err(crate::Error::config(format!(
                "Reverse prefix must be non-empty and end with '.': '{}'",
                self.reverse_prefix
            )));
        }

        Ok(())
    }
}

/// Inventory source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryConfig {
    /// phpIPAM HTTP API
    Phpipam {
        /// Base URL of the phpIPAM installation (e.g. "https://ipam.example.com/phpipam")
        base_url: String,
        /// API application id
        app_id: String,
        /// Subnets whose addresses are published
        subnet_ids: Vec<String>,
        /// Request timeout in seconds
        #[serde(default = "default_inventory_timeout_secs")]
        timeout_secs: u64,
        /// Also send the request as `enc_request`. Only the identity
        /// cipher is available, so this suits servers that accept
        /// unencrypted app access
        #[serde(default)]
        enc_request: bool,
    },
}

impl InventoryConfig {
    /// Validate the inventory configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            InventoryConfig::Phpipam {
                base_url,
                app_id,
                subnet_ids,
                timeout_secs,
                ..
            } => {
                if base_url.is_empty() {
                    return Err(crate::Error::config("phpIPAM base URL cannot be empty"));
                }
                if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "phpIPAM base URL must use HTTP or HTTPS scheme. Got: {}",
                        base_url
                    )));
                }
                if app_id.is_empty() {
                    return Err(crate::Error::config("phpIPAM app id cannot be empty"));
                }
                if subnet_ids.is_empty() {
                    return Err(crate::Error::config("No subnets configured"));
                }
                if subnet_ids.iter().any(|id| id.trim().is_empty()) {
                    return Err(crate::Error::config("Subnet ids cannot be empty"));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("phpIPAM timeout must be > 0"));
                }
                Ok(())
            }
        }
    }

    /// Get the inventory type name
    pub fn type_name(&self) -> &str {
        match self {
            InventoryConfig::Phpipam { .. } => "phpipam",
        }
    }
}

/// Name server reload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadConfig {
    /// Control binary to run
    #[serde(default = "default_reload_command")]
    pub command: PathBuf,

    /// Subcommand passed as the only argument
    #[serde(default = "default_reload_subcommand")]
    pub subcommand: String,

    /// Seconds to wait for the command before giving up
    #[serde(default = "default_reload_timeout_secs")]
    pub timeout_secs: u64,
}

impl ReloadConfig {
    /// Validate the reload configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.command.as_os_str().is_empty() {
            return Err(crate::Error::config("Reload command cannot be empty"));
        }
        if self.subcommand.is_empty() {
            return Err(crate::Error::config("Reload subcommand cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Reload timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            command: default_reload_command(),
            subcommand: default_reload_subcommand(),
            timeout_secs: default_reload_timeout_secs(),
        }
    }
}

/// How the zone serial is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialPolicy {
    /// Current Unix time in seconds
    #[default]
    Unix,
    /// Unix time, bumped past the last issued serial when the clock lags
    Monotonic,
}

impl std::str::FromStr for SerialPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unix" => Ok(SerialPolicy::Unix),
            "monotonic" => Ok(SerialPolicy::Monotonic),
            other => Err(crate::Error::config(format!(
                "Unknown serial policy '{}'. Valid policies: unix, monotonic",
                other
            ))),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Render and compare only; never publish or reload
    #[serde(default)]
    pub dry_run: bool,

    /// Serial selection policy
    #[serde(default)]
    pub serial_policy: SerialPolicy,

    /// Take the run lock in the snapshot directory
    #[serde(default = "default_use_lock")]
    pub use_lock: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            serial_policy: SerialPolicy::default(),
            use_lock: default_use_lock(),
        }
    }
}

fn default_reverse_prefix() -> String {
    DEFAULT_REVERSE_PREFIX.to_string()
}

fn default_inventory_timeout_secs() -> u64 {
    30
}

fn default_reload_command() -> PathBuf {
    PathBuf::from(DEFAULT_RELOAD_COMMAND)
}

fn default_reload_subcommand() -> String {
    "reload".to_string()
}

fn default_reload_timeout_secs() -> u64 {
    60
}

fn default_use_lock() -> bool {
    true
}
