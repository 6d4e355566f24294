//! Storage service implementation using Apache OpenDAL.

use async_trait::async_trait;
use bytes::Bytes;
use opendal::{EntryMode, ErrorKind, Operator, services};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::{Blob, BlobStore};

/// OpenDAL-backed blob store.
#[derive(Clone)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        tracing::info!(provider = config.provider.name(), "Storage initialized");
        Ok(Self { operator, config })
    }

    /// In-memory store with default limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory backend cannot be built.
    pub fn memory() -> Result<Self, StorageError> {
        Self::from_config(StorageConfig::memory())
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };
        Ok(operator)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

#[async_trait]
impl BlobStore for StorageService {
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        validate_key(path)?;
        self.operator
            .write_with(path, bytes)
            .content_type(content_type)
            .await?;
        tracing::debug!(path, content_type, "Blob written");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Blob, StorageError> {
        validate_key(path)?;
        let meta = self.operator.stat(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::not_found(path),
            _ => StorageError::from(e),
        })?;
        let buffer = self.operator.read(path).await?;
        Ok(Blob {
            bytes: buffer.to_bytes(),
            content_type: meta.content_type().map(String::from),
        })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let dir = if prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        };
        let entries = match self.operator.list_with(&dir).recursive(true).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths: Vec<String> = entries
            .into_iter()
            .filter(|entry| entry.metadata().mode() != EntryMode::DIR && !entry.path().ends_with('/'))
            .map(|entry| entry.path().trim_start_matches('/').to_string())
            .collect();
        paths.sort();
        Ok(paths)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        validate_key(path)?;
        self.operator.delete(path).await?;
        tracing::debug!(path, "Blob deleted");
        Ok(())
    }
}

/// Rejects keys that are empty, absolute, or escape their prefix.
fn validate_key(path: &str) -> Result<(), StorageError> {
    if path.is_empty()
        || path.starts_with('/')
        || path.ends_with('/')
        || path.split('/').any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(StorageError::InvalidKey(path.to_string()));
    }
    Ok(())
}

/// Sanitize a file name for use as the last path segment.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.chars().all(|c| c == '.') {
        return sanitized.replace('.', "_");
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("invoice.pdf"), "invoice.pdf");
        assert_eq!(sanitize_filename("my file (1).pdf"), "my_file__1_.pdf");
        assert_eq!(sanitize_filename("test@#$%.doc"), "test____.doc");
        assert_eq!(sanitize_filename("日本語.pdf"), "___.pdf");
        assert_eq!(sanitize_filename(".."), "__");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("exports/booking_file/2024/4/1/20240401120000").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/abs").is_err());
        assert!(validate_key("a/../b").is_err());
        assert!(validate_key("a//b").is_err());
        assert!(validate_key("dir/").is_err());
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = StorageService::memory().unwrap();
        store
            .put("attachments/1/receipt.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();

        let blob = store.get("attachments/1/receipt.pdf").await.unwrap();
        assert_eq!(blob.bytes, Bytes::from_static(b"%PDF"));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = StorageService::memory().unwrap();
        let err = store.get("attachments/1/missing.pdf").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { key } if key == "attachments/1/missing.pdf"));
    }

    #[tokio::test]
    async fn test_list_is_recursive_and_scoped() {
        let store = StorageService::memory().unwrap();
        for path in [
            "exports/booking_file/2024/4/1/20240401120000",
            "exports/booking_file/2024/4/2/20240402120000",
            "exports/payment_file/2024/4/1/20240401120000",
        ] {
            store.put(path, Bytes::from_static(b"x"), "text/csv").await.unwrap();
        }

        let listed = store.list("exports/booking_file").await.unwrap();
        assert_eq!(
            listed,
            vec![
                "exports/booking_file/2024/4/1/20240401120000".to_string(),
                "exports/booking_file/2024/4/2/20240402120000".to_string(),
            ]
        );
        assert!(store.list("exports/nothing_here").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = StorageService::memory().unwrap();
        store
            .put("attachments/1/a.png", Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap();
        store.delete("attachments/1/a.png").await.unwrap();
        assert!(store.list("attachments/1").await.unwrap().is_empty());

        // deleting again is fine
        store.delete("attachments/1/a.png").await.unwrap();
    }
}
