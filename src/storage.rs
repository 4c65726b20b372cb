use crate::config::Credentials;
use crate::error::{ConfigError, PublishError};
use log::debug;
use s3::creds::Credentials as S3Credentials;
use s3::{Bucket, Region};
use std::fs;
use std::path::{Path, PathBuf};

/// Key-addressed object storage. A write creates or overwrites `bucket/key`.
pub trait ObjectStore {
    /// Writes `body` as a single object.
    ///
    /// # Arguments
    /// * `bucket` - Destination bucket (or container) name
    /// * `key` - Object key; may contain `/` separators
    /// * `body` - Complete object contents
    /// * `content_type` - MIME type recorded with the object
    ///
    /// # Returns
    /// Returns `Ok(())` once the store has accepted the object.
    ///
    /// # Errors
    /// Returns `PublishError` on authentication, network or destination
    /// failure. Implementations do not retry.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), PublishError>;
}

/// S3 (or S3-compatible) store using a blocking client. One request per write.
pub struct S3Store {
    credentials: S3Credentials,
    region: Region,
    path_style: bool,
}

impl S3Store {
    /// A custom `endpoint` (MinIO, LocalStack, ...) switches to path-style addressing.
    pub fn new(
        credentials: &Credentials,
        region: &str,
        endpoint: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let credentials = S3Credentials::new(
            Some(credentials.access_key_id.as_str()),
            Some(credentials.secret_access_key.as_str()),
            None,
            credentials.session_token.as_deref(),
            None,
        )
        .map_err(|e| ConfigError::Invalid {
            var: "AWS_ACCESS_KEY_ID",
            value: e.to_string(),
        })?;

        let region = match endpoint {
            Some(endpoint) => Region::Custom {
                region: region.to_string(),
                endpoint: endpoint.to_string(),
            },
            None => region.parse::<Region>().map_err(|_| ConfigError::Invalid {
                var: "AWS_REGION",
                value: region.to_string(),
            })?,
        };

        Ok(Self {
            credentials,
            region,
            path_style: endpoint.is_some(),
        })
    }
}

impl ObjectStore for S3Store {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), PublishError> {
        let mut handle = Bucket::new(bucket, self.region.clone(), self.credentials.clone())
            .map_err(|e| PublishError::DestinationNotFound(format!("{}: {}", bucket, e)))?;
        if self.path_style {
            handle = handle.with_path_style();
        }

        debug!("PUT s3://{}/{} ({} bytes)", bucket, key, body.len());
        let response = handle
            .put_object_with_content_type(key, body, content_type)
            .map_err(|e| PublishError::Network(e.to_string()))?;

        check_status(
            response.status_code(),
            bucket,
            response.as_str().unwrap_or_default(),
        )
    }
}

/// Maps the HTTP status of a PUT to the publish error taxonomy.
fn check_status(status: u16, bucket: &str, body: &str) -> Result<(), PublishError> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(PublishError::Auth(body.to_string())),
        404 => Err(PublishError::DestinationNotFound(bucket.to_string())),
        _ => Err(PublishError::Rejected {
            status,
            message: body.to_string(),
        }),
    }
}

/// Directory-backed store: `<root>/<bucket>/<key>`. Used for dry runs.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn create_bucket(&self, bucket: &str) -> Result<(), PublishError> {
        fs::create_dir_all(self.root.join(bucket))?;
        Ok(())
    }

    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, PublishError> {
        let dir = self.root.join(bucket);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(PublishError::DestinationNotFound(bucket.to_string()))
        }
    }
}

impl ObjectStore for LocalStore {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), PublishError> {
        let path = self.bucket_dir(bucket)?.join(Path::new(key));
        // Keys may carry `/` prefixes; mirror them as directories.
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!(
            "Writing {} ({}, {} bytes)",
            path.display(),
            content_type,
            body.len()
        );
        fs::write(path, body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_store_overwrites_objects() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.create_bucket("sales").unwrap();

        store
            .put_object("sales", "report.csv", b"first", "text/csv")
            .unwrap();
        store
            .put_object("sales", "report.csv", b"second", "text/csv")
            .unwrap();

        let written = fs::read(store.object_path("sales", "report.csv")).unwrap();
        assert_eq!(written, b"second");
    }

    #[test]
    fn local_store_requires_an_existing_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let err = store
            .put_object("missing", "report.csv", b"x", "text/csv")
            .unwrap_err();
        assert!(matches!(err, PublishError::DestinationNotFound(b) if b == "missing"));
    }

    #[test]
    fn s3_store_accepts_static_credentials() {
        let credentials = Credentials {
            access_key_id: "AKIAEXAMPLE".into(),
            secret_access_key: "secret".into(),
            session_token: None,
        };
        let store = S3Store::new(&credentials, "us-east-1", Some("http://localhost:9000")).unwrap();
        assert!(store.path_style);
    }

    #[test]
    fn local_store_accepts_prefixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.create_bucket("sales").unwrap();

        store
            .put_object("sales", "2024/03/cleaned.csv", b"rows", "text/csv")
            .unwrap();

        let written = fs::read(store.object_path("sales", "2024/03/cleaned.csv")).unwrap();
        assert_eq!(written, b"rows");
    }

    #[test]
    fn success_statuses_pass() {
        assert!(check_status(200, "sales", "").is_ok());
        assert!(check_status(204, "sales", "").is_ok());
    }

    #[test]
    fn forbidden_is_an_auth_failure() {
        let err = check_status(403, "sales", "SignatureDoesNotMatch").unwrap_err();
        assert!(matches!(err, PublishError::Auth(body) if body == "SignatureDoesNotMatch"));
        assert!(matches!(
            check_status(401, "sales", ""),
            Err(PublishError::Auth(_))
        ));
    }

    #[test]
    fn not_found_names_the_bucket() {
        let err = check_status(404, "sales", "NoSuchBucket").unwrap_err();
        assert!(matches!(err, PublishError::DestinationNotFound(b) if b == "sales"));
    }

    #[test]
    fn other_statuses_are_rejections() {
        let err = check_status(500, "sales", "InternalError").unwrap_err();
        assert!(matches!(
            err,
            PublishError::Rejected { status: 500, message } if message == "InternalError"
        ));
    }
}
