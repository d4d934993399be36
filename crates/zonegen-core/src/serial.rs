//! Zone serial numbers
//!
//! Templates carry a `$serial` placeholder (or `${serial}`) in their SOA
//! record. Snapshots keep the placeholder; only live files are stamped.
//!
//! The placeholder syntax follows the template convention the zone templates
//! were written for: `$$` is a literal `$`, and any other `$name` such as
//! `$TTL` or `$ORIGIN` is left untouched.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::{SerialPolicy, ZoneGenConfig};
use crate::error::{Error, Result};

/// Name of the placeholder substituted with the serial
pub const SERIAL_PLACEHOLDER: &str = "serial";

/// Substitute the serial placeholder in `text`
///
/// Missing placeholders are not an error; text without one comes back
/// unchanged (apart from `$$` escapes).
pub fn stamp(text: &str, serial: u64) -> String {
    let serial = serial.to_string();
    let mut out = String::with_capacity(text.len() + serial.len());
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
            continue;
        }

        if let Some(braced) = after.strip_prefix('{')
            && let Some(end) = braced.find('}')
            && is_identifier(&braced[..end])
        {
            let name = &braced[..end];
            if name == SERIAL_PLACEHOLDER {
                out.push_str(&serial);
            } else {
                out.push_str("${");
                out.push_str(name);
                out.push('}');
            }
            rest = &braced[end + 1..];
            continue;
        }

        let len = identifier_len(after);
        if len > 0 && &after[..len] == SERIAL_PLACEHOLDER {
            out.push_str(&serial);
        } else {
            out.push('$');
            out.push_str(&after[..len]);
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out
}

fn identifier_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(*c == '_' || c.is_ascii_alphanumeric()))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && identifier_len(s) == s.len()
}

/// Source of zone serial numbers
///
/// One serial is drawn per run and shared by both zones.
#[async_trait]
pub trait SerialSource: Send + Sync {
    /// Produce the serial for this run
    async fn next_serial(&self) -> Result<u64>;
}

/// Wall-clock Unix seconds
///
/// Not strictly monotonic: two publishing runs in the same second, or a
/// clock stepped backwards, repeat or lower the serial.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixTimestampSerial;

#[async_trait]
impl SerialSource for UnixTimestampSerial {
    async fn next_serial(&self) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();
        u64::try_from(now).map_err(|_| Error::Other(format!("clock before epoch: {}", now)))
    }
}

/// Serial that never repeats or goes backwards
///
/// Draws from an inner source and bumps the result past the last serial it
/// issued, which is kept in a small state file.
pub struct MonotonicSerial {
    inner: Box<dyn SerialSource>,
    path: PathBuf,
}

impl MonotonicSerial {
    /// File name used inside the snapshot directory
    pub const STATE_FILE: &'static str = ".serial";

    /// Wrap `inner`, persisting the last serial at `path`
    pub fn new(inner: Box<dyn SerialSource>, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }

    /// Path of the last-serial state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn last_serial(&self) -> Result<Option<u64>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to read serial state {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        trimmed.parse().map(Some).map_err(|e| {
            Error::persistence(format!(
                "Corrupt serial state {}: '{}' ({})",
                self.path.display(),
                trimmed,
                e
            ))
        })
    }
}

#[async_trait]
impl SerialSource for MonotonicSerial {
    async fn next_serial(&self) -> Result<u64> {
        let candidate = self.inner.next_serial().await?;
        let serial = match self.last_serial().await? {
            Some(last) if candidate <= last => {
                tracing::debug!("Serial {} not ahead of last {}, bumping", candidate, last);
                last + 1
            }
            _ => candidate,
        };

        crate::store::write_atomic(&self.path, format!("{}\n", serial).as_bytes()).await?;
        Ok(serial)
    }
}

/// Build the serial source selected by the engine configuration
///
/// The monotonic policy keeps its state next to the snapshots.
pub fn from_config(config: &ZoneGenConfig) -> Box<dyn SerialSource> {
    match config.engine.serial_policy {
        SerialPolicy::Unix => Box::new(UnixTimestampSerial),
        SerialPolicy::Monotonic => Box::new(MonotonicSerial::new(
            Box::new(UnixTimestampSerial),
            config.zones.snapshot_dir.join(MonotonicSerial::STATE_FILE),
        )),
    }
}
