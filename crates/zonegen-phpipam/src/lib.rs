// # phpIPAM Inventory Source
//
// This crate provides the phpIPAM-backed inventory source for zonegen.
//
// ## Protocol
//
// phpIPAM's legacy API takes one form-encoded POST per call to
// `<base_url>/api/index.php`. Addresses are read per subnet:
//
// ```text
// controller=addresses&action=read&format=ip&subnetId=<id>&app_id=<app>
// ```
//
// Servers configured for encrypted requests also expect `enc_request`,
// the same parameters as JSON run through the application's cipher. The
// cipher is pluggable via [`RequestCipher`]; only the identity
// [`PlaintextCipher`] ships, so configuration-built sources work with
// servers whose application allows app_id access without the legacy
// Rijndael encryption.
//
// ## Response
//
// ```json
// {"success": true, "data": [{"ip": "192.168.1.10", "hostname": "host1.example.com"}]}
// ```
//
// Addresses without a hostname are not zone material and are skipped.

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use zonegen_core::config::InventoryConfig;
use zonegen_core::traits::InventorySource;
use zonegen_core::{Error, HostRecord, Result};

/// Path of the API entry point below the configured base URL
const API_PATH: &str = "/api/index.php";

/// Transform applied to the JSON request before it is sent as `enc_request`
///
/// Implementations are keyed at construction (usually with the phpIPAM
/// application key).
pub trait RequestCipher: Send + Sync {
    /// Encrypt a request payload
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt a payload produced by [`RequestCipher::encrypt`]
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// Identity cipher, for servers that authenticate by `app_id` alone
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextCipher;

impl RequestCipher for PlaintextCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        Ok(plaintext.to_string())
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        Ok(ciphertext.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Vec<AddressEntry>>,
}

#[derive(Debug, Deserialize)]
struct AddressEntry {
    ip: String,
    #[serde(default, alias = "dns_name")]
    hostname: Option<String>,
}

/// Inventory source reading host addresses from phpIPAM subnets
pub struct PhpIpamSource {
    /// Full URL of the API entry point
    endpoint: String,

    /// phpIPAM application id
    app_id: String,

    /// Subnets to read, in order
    subnet_ids: Vec<String>,

    /// Optional `enc_request` cipher
    cipher: Option<Box<dyn RequestCipher>>,

    /// HTTP client (carries the request timeout)
    client: reqwest::Client,
}

impl PhpIpamSource {
    /// Create a new phpIPAM source
    ///
    /// # Parameters
    ///
    /// - `base_url`: phpIPAM installation root (e.g., "https://ipam.example.com/phpipam")
    /// - `app_id`: API application id
    /// - `subnet_ids`: Subnets whose addresses make up the inventory
    /// - `timeout`: Per-request timeout
    pub fn new(
        base_url: &str,
        app_id: impl Into<String>,
        subnet_ids: Vec<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), API_PATH),
            app_id: app_id.into(),
            subnet_ids,
            cipher: None,
            client,
        })
    }

    /// Send `enc_request` with every call, produced by `cipher`
    pub fn with_cipher(mut self, cipher: Box<dyn RequestCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Create a source from configuration
    ///
    /// `enc_request` attaches the [`PlaintextCipher`].
    pub fn from_config(config: &InventoryConfig) -> Result<Self> {
        match config {
            InventoryConfig::Phpipam {
                base_url,
                app_id,
                subnet_ids,
                timeout_secs,
                enc_request,
            } => {
                let source = Self::new(
                    base_url,
                    app_id.clone(),
                    subnet_ids.clone(),
                    Duration::from_secs(*timeout_secs),
                )?;

                Ok(if *enc_request {
                    source.with_cipher(Box::new(PlaintextCipher))
                } else {
                    source
                })
            }
        }
    }

    /// API entry point this source posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Read the addresses of one subnet
    async fn read_addresses(&self, subnet_id: &str) -> Result<Vec<AddressEntry>> {
        let mut form = vec![
            ("controller", "addresses".to_string()),
            ("action", "read".to_string()),
            ("format", "ip".to_string()),
            ("subnetId", subnet_id.to_string()),
        ];

        if let Some(cipher) = &self.cipher {
            let request: serde_json::Map<String, serde_json::Value> = form
                .iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::from(v.as_str())))
                .collect();
            let payload = serde_json::to_string(&request)?;
            form.push(("enc_request", cipher.encrypt(&payload)?));
        }
        form.push(("app_id", self.app_id.clone()));

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::inventory(format!("Request to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::inventory(format!(
                "phpIPAM returned HTTP {} for subnet {}",
                status, subnet_id
            )));
        }

        let body: ApiResponse = response.json().await.map_err(|e| {
            Error::inventory(format!(
                "Unparsable phpIPAM response for subnet {}: {}",
                subnet_id, e
            ))
        })?;

        if !body.success {
            return Err(Error::inventory(format!(
                "phpIPAM rejected read of subnet {}: {}",
                subnet_id,
                body.message.as_deref().unwrap_or("no message")
            )));
        }

        Ok(body.data.unwrap_or_default())
    }
}

fn to_record(entry: AddressEntry) -> Result<Option<HostRecord>> {
    let hostname = match entry.hostname.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            debug!("Skipping {} (no hostname)", entry.ip);
            return Ok(None);
        }
    };

    let address: Ipv4Addr = entry.ip.trim().parse().map_err(|_| {
        Error::inventory(format!(
            "Invalid IPv4 address '{}' for {}",
            entry.ip, hostname
        ))
    })?;

    Ok(Some(HostRecord::new(hostname, address)))
}

#[async_trait::async_trait]
impl InventorySource for PhpIpamSource {
    async fn list_hosts(&self) -> Result<Vec<HostRecord>> {
        let mut hosts = Vec::new();

        for subnet_id in &self.subnet_ids {
            let entries = self.read_addresses(subnet_id).await?;
            debug!("Subnet {}: {} address(es)", subnet_id, entries.len());

            for entry in entries {
                if let Some(record) = to_record(entry)? {
                    hosts.push(record);
                }
            }
        }

        Ok(hosts)
    }

    fn source_name(&self) -> &'static str {
        "phpipam"
    }
}
