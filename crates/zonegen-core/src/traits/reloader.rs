//! Name server reload trait

use async_trait::async_trait;

/// Trait for telling the name server to pick up new zone files
///
/// Called at most once per run, after every zone file has been written.
#[async_trait]
pub trait Reloader: Send + Sync {
    /// Trigger the reload
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The name server accepted the reload
    /// - `Err(Error::Reload)`: The command failed or exited non-zero
    async fn reload(&self) -> Result<(), crate::Error>;
}
