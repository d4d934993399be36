//! Zone rendering
//!
//! A zone is its template preamble followed by one generated line per host,
//! in inventory order:
//!
//! ```text
//! host1 IN A 192.168.1.10          (forward)
//! 10.1 IN PTR host1.example.com.   (reverse, prefix "192.168.")
//! ```
//!
//! Nothing is sorted, so output is only as deterministic as the inventory.

use std::fmt::Write;
use std::net::Ipv4Addr;

use crate::error::{Error, Result};
use crate::zone::{HostRecord, ZoneDocument, ZoneKind};

/// Renders forward and reverse zones from host records
#[derive(Debug, Clone)]
pub struct ZoneRenderer {
    reverse_prefix: String,
}

impl ZoneRenderer {
    /// Create a renderer that strips `reverse_prefix` from addresses
    /// when building reverse keys
    pub fn new(reverse_prefix: impl Into<String>) -> Self {
        Self {
            reverse_prefix: reverse_prefix.into(),
        }
    }

    /// The prefix stripped from addresses in the reverse zone
    pub fn reverse_prefix(&self) -> &str {
        &self.reverse_prefix
    }

    /// Render one zone
    ///
    /// # Errors
    ///
    /// [`Error::Render`] if any record does not fit the zone (empty hostname,
    /// address outside the reverse prefix).
    pub fn render(
        &self,
        template: &str,
        records: &[HostRecord],
        kind: ZoneKind,
    ) -> Result<ZoneDocument> {
        let mut text = String::with_capacity(template.len() + records.len() * 48);
        text.push_str(template);

        for record in records {
            let line = match kind {
                ZoneKind::Forward => forward_line(record)?,
                ZoneKind::Reverse => reverse_line(record, &self.reverse_prefix)?,
            };
            text.push_str(&line);
        }

        Ok(ZoneDocument::new(kind, text))
    }
}

/// Short host label: everything before the first `.`
pub fn forward_label(hostname: &str) -> Result<&str> {
    let label = hostname.split('.').next().unwrap_or_default();
    if label.is_empty() {
        return Err(Error::render(format!(
            "hostname '{}' has no host label",
            hostname
        )));
    }
    Ok(label)
}

/// Reverse lookup key: the address minus `prefix`, octets reversed
///
/// `192.168.1.10` under prefix `192.168.` becomes `10.1`.
pub fn reverse_key(address: Ipv4Addr, prefix: &str) -> Result<String> {
    let dotted = address.to_string();
    let rest = dotted.strip_prefix(prefix).ok_or_else(|| {
        Error::render(format!(
            "address {} is outside reverse prefix '{}'",
            address, prefix
        ))
    })?;

    if rest.is_empty() || rest.starts_with('.') {
        return Err(Error::render(format!(
            "reverse prefix '{}' leaves no host octets in {}",
            prefix, address
        )));
    }

    let octets: Vec<&str> = rest.split('.').rev().collect();
    Ok(octets.join("."))
}

/// Fully qualified name with its trailing root dot
pub fn canonical_name(hostname: &str) -> Result<String> {
    if hostname.is_empty() || hostname == "." {
        return Err(Error::render("empty hostname"));
    }

    if hostname.ends_with('.') {
        Ok(hostname.to_string())
    } else {
        Ok(format!("{}.", hostname))
    }
}

fn forward_line(record: &HostRecord) -> Result<String> {
    let label = forward_label(&record.hostname)?;
    let mut line = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(line, "{} IN A {}", label, record.address);
    Ok(line)
}

fn reverse_line(record: &HostRecord, prefix: &str) -> Result<String> {
    let key = reverse_key(record.address, prefix)?;
    let name = canonical_name(&record.hostname)?;
    let mut line = String::new();
    let _ = writeln!(line, "{} IN PTR {}", key, name);
    Ok(line)
}
