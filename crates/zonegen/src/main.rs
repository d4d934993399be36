// # zonegen - IPAM to BIND zone sync
//
// One-shot job, usually run from cron or a systemd timer. Each invocation:
// 1. Reads configuration from environment variables
// 2. Fetches hosts from phpIPAM
// 3. Renders the forward and reverse zones
// 4. Publishes zones that changed and reloads the name server once
//
// All sync logic lives in zonegen-core; this binary only wires
// configuration to the engine.
//
// ## Configuration
//
// ### Zones
// - `ZONEGEN_FORWARD_TEMPLATE`: Forward zone template (required)
// - `ZONEGEN_REVERSE_TEMPLATE`: Reverse zone template (required)
// - `ZONEGEN_SNAPSHOT_DIR`: Directory for unstamped snapshots (required)
// - `ZONEGEN_LIVE_DIR`: Directory the name server loads zones from (required)
// - `ZONEGEN_REVERSE_PREFIX`: Address prefix covered by the reverse zone (default `192.168.`)
//
// ### Inventory
// - `ZONEGEN_IPAM_URL`: phpIPAM base URL (required)
// - `ZONEGEN_IPAM_APP_ID`: phpIPAM application id (required)
// - `ZONEGEN_IPAM_SUBNETS`: Comma-separated subnet ids (required)
// - `ZONEGEN_IPAM_TIMEOUT_SECS`: Request timeout (default 30)
// - `ZONEGEN_IPAM_ENC_REQUEST`: Also send `enc_request` (default false). Only
//   the identity cipher is built in, so servers requiring the legacy
//   encrypted app security are not supported
//
// ### Reload
// - `ZONEGEN_RELOAD_COMMAND`: Reload binary (default `/usr/sbin/rndc`)
// - `ZONEGEN_RELOAD_SUBCOMMAND`: Argument passed to it (default `reload`)
// - `ZONEGEN_RELOAD_TIMEOUT_SECS`: Reload timeout (default 60)
//
// ### Engine
// - `ZONEGEN_DRY_RUN`: Compare only, publish nothing (default false)
// - `ZONEGEN_SERIAL_POLICY`: `unix` or `monotonic` (default unix)
// - `ZONEGEN_LOCK`: Guard the snapshot directory with a lock file (default true)
// - `ZONEGEN_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export ZONEGEN_FORWARD_TEMPLATE=/etc/zonegen/templates/db.example.com
// export ZONEGEN_REVERSE_TEMPLATE=/etc/zonegen/templates/db.192.168
// export ZONEGEN_SNAPSHOT_DIR=/var/lib/zonegen
// export ZONEGEN_LIVE_DIR=/etc/bind/zones
// export ZONEGEN_IPAM_URL=https://ipam.example.com/phpipam
// export ZONEGEN_IPAM_APP_ID=zonegen
// export ZONEGEN_IPAM_SUBNETS=3,4
//
// zonegen
// ```

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use zonegen_core::config::{
    DEFAULT_RELOAD_COMMAND, DEFAULT_REVERSE_PREFIX, EngineConfig, InventoryConfig, ReloadConfig,
    SerialPolicy, ZoneGenConfig, ZonesConfig,
};
use zonegen_core::traits::InventorySource;
use zonegen_core::{
    CommandReloader, Error, FileZoneStore, RunLock, SyncReport, Templates, ZoneKind, ZoneSync,
    serial,
};

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (whether or not anything changed)
/// - 1: Configuration or startup error
/// - 2: Runtime error (inventory, rendering, persistence, reload, lock)
#[derive(Debug, Clone, Copy)]
enum ZonegenExitCode {
    /// Run completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Run failed
    RuntimeError = 2,
}

impl From<ZonegenExitCode> for ExitCode {
    fn from(code: ZonegenExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Raw settings as read from the environment
struct Config {
    forward_template: PathBuf,
    reverse_template: PathBuf,
    snapshot_dir: PathBuf,
    live_dir: PathBuf,
    reverse_prefix: String,
    ipam_url: String,
    ipam_app_id: String,
    ipam_subnets: Vec<String>,
    ipam_timeout_secs: u64,
    ipam_enc_request: bool,
    reload_command: PathBuf,
    reload_subcommand: String,
    reload_timeout_secs: u64,
    dry_run: bool,
    serial_policy: SerialPolicy,
    use_lock: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            forward_template: required("ZONEGEN_FORWARD_TEMPLATE")?.into(),
            reverse_template: required("ZONEGEN_REVERSE_TEMPLATE")?.into(),
            snapshot_dir: required("ZONEGEN_SNAPSHOT_DIR")?.into(),
            live_dir: required("ZONEGEN_LIVE_DIR")?.into(),
            reverse_prefix: env::var("ZONEGEN_REVERSE_PREFIX")
                .unwrap_or_else(|_| DEFAULT_REVERSE_PREFIX.to_string()),
            ipam_url: required("ZONEGEN_IPAM_URL")?,
            ipam_app_id: required("ZONEGEN_IPAM_APP_ID")?,
            ipam_subnets: split_list(&required("ZONEGEN_IPAM_SUBNETS")?),
            ipam_timeout_secs: parse_var("ZONEGEN_IPAM_TIMEOUT_SECS", 30)?,
            ipam_enc_request: parse_flag("ZONEGEN_IPAM_ENC_REQUEST", false)?,
            reload_command: env::var("ZONEGEN_RELOAD_COMMAND")
                .unwrap_or_else(|_| DEFAULT_RELOAD_COMMAND.to_string())
                .into(),
            reload_subcommand: env::var("ZONEGEN_RELOAD_SUBCOMMAND")
                .unwrap_or_else(|_| "reload".to_string()),
            reload_timeout_secs: parse_var("ZONEGEN_RELOAD_TIMEOUT_SECS", 60)?,
            dry_run: parse_flag("ZONEGEN_DRY_RUN", false)?,
            serial_policy: env::var("ZONEGEN_SERIAL_POLICY")
                .unwrap_or_else(|_| "unix".to_string())
                .parse()?,
            use_lock: parse_flag("ZONEGEN_LOCK", true)?,
            log_level: env::var("ZONEGEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Build and validate the library configuration
    fn into_zonegen_config(self) -> Result<ZoneGenConfig> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ZONEGEN_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if self.ipam_url.starts_with("http://") {
            eprintln!(
                "WARNING: ZONEGEN_IPAM_URL uses HTTP (not HTTPS). \
                The application id is sent in clear text."
            );
        }

        let config = ZoneGenConfig {
            zones: ZonesConfig::new(
                self.forward_template,
                self.reverse_template,
                self.snapshot_dir,
                self.live_dir,
            )
            .with_reverse_prefix(self.reverse_prefix),
            inventory: InventoryConfig::Phpipam {
                base_url: self.ipam_url,
                app_id: self.ipam_app_id,
                subnet_ids: self.ipam_subnets,
                timeout_secs: self.ipam_timeout_secs,
                enc_request: self.ipam_enc_request,
            },
            reload: ReloadConfig {
                command: self.reload_command,
                subcommand: self.reload_subcommand,
                timeout_secs: self.reload_timeout_secs,
            },
            engine: EngineConfig {
                dry_run: self.dry_run,
                serial_policy: self.serial_policy,
                use_lock: self.use_lock,
            },
        };

        config.validate()?;
        Ok(config)
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} is required", name))
}

fn parse_var(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number of seconds. Got: {}", name, value)),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(value) => parse_bool(&value)
            .with_context(|| format!("{} must be true or false. Got: {}", name, value)),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ZonegenExitCode::ConfigError.into();
        }
    };

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let config = match config.into_zonegen_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration validation error: {:#}", e);
            return ZonegenExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonegenExitCode::ConfigError.into();
    }

    info!(
        "Starting zonegen ({} subnet(s) from {})",
        match &config.inventory {
            InventoryConfig::Phpipam { subnet_ids, .. } => subnet_ids.len(),
        },
        config.inventory.type_name()
    );
    if config.engine.dry_run {
        warn!("Dry run: zones will be compared but not published");
    }

    // One pass, nothing to parallelize
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonegenExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run(&config));

    match result {
        Ok(report) => {
            log_report(&report);
            ZonegenExitCode::Success
        }
        Err(Error::Config(msg)) => {
            error!("Configuration error: {}", msg);
            ZonegenExitCode::ConfigError
        }
        Err(e) => {
            error!("Run failed: {}", e);
            ZonegenExitCode::RuntimeError
        }
    }
    .into()
}

/// Build the components and run one sync pass
async fn run(config: &ZoneGenConfig) -> zonegen_core::Result<SyncReport> {
    // Creates the snapshot directory, which must exist before locking it
    let store = FileZoneStore::from_config(&config.zones).await?;

    let _lock = if config.engine.use_lock {
        Some(RunLock::acquire(&config.zones.snapshot_dir)?)
    } else {
        None
    };

    let templates = Templates::load(&config.zones).await?;
    let inventory = create_inventory(&config.inventory)?;
    let reloader = CommandReloader::from_config(&config.reload);
    info!(
        "Reload command: {} {} (timeout {:?})",
        config.reload.command.display(),
        config.reload.subcommand,
        Duration::from_secs(config.reload.timeout_secs)
    );

    let engine = ZoneSync::new(
        inventory,
        Box::new(store),
        Box::new(reloader),
        serial::from_config(config),
        templates,
        config,
    )?;

    engine.run().await
}

#[cfg(feature = "phpipam")]
fn create_inventory(config: &InventoryConfig) -> zonegen_core::Result<Box<dyn InventorySource>> {
    Ok(Box::new(zonegen_phpipam::PhpIpamSource::from_config(
        config,
    )?))
}

#[cfg(not(feature = "phpipam"))]
fn create_inventory(config: &InventoryConfig) -> zonegen_core::Result<Box<dyn InventorySource>> {
    Err(Error::config(format!(
        "Inventory type '{}' is not compiled in. Rebuild with --features {}",
        config.type_name(),
        config.type_name()
    )))
}

fn log_report(report: &SyncReport) {
    for kind in ZoneKind::ALL {
        info!("{} zone: {:?}", kind, report.outcome(kind));
    }

    match report.serial {
        Some(serial) => info!("Published with serial {}", serial),
        None if report.changed() => info!("Changes detected, nothing published"),
        None => info!("Zones up to date ({} host(s))", report.host_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" 1 "), Some(true));
        assert_eq!(parse_bool("Off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("3, 4,,7 "), vec!["3", "4", "7"]);
        assert!(split_list("").is_empty());
    }

    fn config() -> Config {
        Config {
            forward_template: "/etc/zonegen/templates/db.example.com".into(),
            reverse_template: "/etc/zonegen/templates/db.192.168".into(),
            snapshot_dir: "/var/lib/zonegen".into(),
            live_dir: "/etc/bind/zones".into(),
            reverse_prefix: DEFAULT_REVERSE_PREFIX.to_string(),
            ipam_url: "https://ipam.example.com/phpipam".to_string(),
            ipam_app_id: "zonegen".to_string(),
            ipam_subnets: vec!["3".to_string()],
            ipam_timeout_secs: 30,
            ipam_enc_request: false,
            reload_command: DEFAULT_RELOAD_COMMAND.into(),
            reload_subcommand: "reload".to_string(),
            reload_timeout_secs: 60,
            dry_run: false,
            serial_policy: SerialPolicy::Unix,
            use_lock: true,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_into_zonegen_config() {
        let config = config().into_zonegen_config().unwrap();
        assert_eq!(config.zones.reverse_prefix, "192.168.");
        assert_eq!(config.inventory.type_name(), "phpipam");
        assert!(config.engine.use_lock);
    }

    #[test]
    fn test_enc_request_carried_into_inventory() {
        let mut cfg = config();
        cfg.ipam_enc_request = true;
        let config = cfg.into_zonegen_config().unwrap();
        assert!(matches!(
            config.inventory,
            InventoryConfig::Phpipam {
                enc_request: true,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut cfg = config();
        cfg.log_level = "verbose".to_string();
        assert!(cfg.into_zonegen_config().is_err());
    }

    #[test]
    fn test_empty_subnets_rejected() {
        let mut cfg = config();
        cfg.ipam_subnets.clear();
        assert!(cfg.into_zonegen_config().is_err());
    }
}
