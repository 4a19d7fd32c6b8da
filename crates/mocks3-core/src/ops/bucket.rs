//! Bucket CRUD operations.

use mocks3_model::output::{GetBucketLocationOutput, ListBucketsOutput};
use mocks3_model::types::{BucketEntry, CannedAcl, ObjectLockConfiguration, ObjectOwnership};
use tracing::info;

use crate::error::{S3ServiceError, S3ServiceResult};
use crate::locks::bucket_key;
use crate::store::meta::{BucketMetadata, VersioningState};
use crate::validation::validate_bucket_name;

use super::S3Service;

impl S3Service {
    /// CreateBucket.
    ///
    /// Enabling object lock implies versioning, as on AWS.
    ///
    /// # Errors
    ///
    /// `InvalidBucketName` on naming violations, `BucketAlreadyOwnedByYou`
    /// when the bucket exists.
    pub async fn create_bucket(
        &self,
        name: &str,
        location_constraint: Option<String>,
        canned_acl: Option<CannedAcl>,
        ownership: Option<ObjectOwnership>,
        object_lock_enabled: bool,
    ) -> S3ServiceResult<()> {
        validate_bucket_name(name)?;
        let _guard = self.locks.write(bucket_key(name)).await;

        let mut meta = BucketMetadata::new(name, location_constraint, self.owner.clone());
        if let Some(acl) = canned_acl {
            meta.acl = acl.to_policy(self.owner.clone());
        }
        meta.ownership = ownership;
        if object_lock_enabled {
            meta.object_lock = Some(ObjectLockConfiguration {
                object_lock_enabled: Some("Enabled".to_owned()),
                default_retention: None,
            });
            meta.versioning = VersioningState::Enabled;
        }

        self.buckets.create(&meta).await?;
        info!(bucket = name, "bucket created");
        Ok(())
    }

    /// HeadBucket. Returns the metadata so the caller can emit the region
    /// header.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` when absent.
    pub async fn head_bucket(&self, name: &str) -> S3ServiceResult<BucketMetadata> {
        let _guard = self.locks.read(bucket_key(name)).await;
        self.buckets.load(name).await
    }

    /// ListBuckets.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn list_buckets(&self) -> S3ServiceResult<ListBucketsOutput> {
        let buckets = self
            .buckets
            .list()
            .await?
            .into_iter()
            .map(|meta| BucketEntry {
                name: meta.name,
                creation_date: meta.creation_date,
            })
            .collect();
        Ok(ListBucketsOutput {
            owner: Some(self.owner.clone()),
            buckets,
        })
    }

    /// GetBucketLocation.
    ///
    /// Per S3 convention `us-east-1` is represented by an empty
    /// LocationConstraint.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` when absent.
    pub async fn get_bucket_location(&self, name: &str) -> S3ServiceResult<GetBucketLocationOutput> {
        let _guard = self.locks.read(bucket_key(name)).await;
        let meta = self.buckets.load(name).await?;
        let region = meta.region.unwrap_or_else(|| self.region.clone());
        Ok(GetBucketLocationOutput {
            location_constraint: (region != "us-east-1").then_some(region),
        })
    }

    /// DeleteBucket. Requires the bucket to hold no current objects and no
    /// in-progress multipart uploads.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` when absent, `BucketNotEmpty` otherwise.
    pub async fn delete_bucket(&self, name: &str) -> S3ServiceResult<()> {
        let _guard = self.locks.write(bucket_key(name)).await;
        if !self.buckets.exists(name) {
            return Err(S3ServiceError::NoSuchBucket {
                bucket: name.to_owned(),
            });
        }
        if self.objects.has_current_objects(name).await?
            || self.multiparts.bucket_has_uploads(name, &self.objects).await?
        {
            return Err(S3ServiceError::BucketNotEmpty {
                bucket: name.to_owned(),
            });
        }
        self.buckets.delete(name).await?;
        info!(bucket = name, "bucket deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::super::PutObjectOptions;
    use super::*;
    use crate::kms::KmsKeyRegistry;

    fn service() -> (tempfile::TempDir, S3Service) {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = S3Service::new(dir.path(), "us-east-1", KmsKeyRegistry::default());
        (dir, service)
    }

    fn empty_body() -> impl futures_util::Stream<Item = std::io::Result<bytes::Bytes>> + Send {
        stream::iter(vec![Ok(bytes::Bytes::from_static(b"x"))])
    }

    #[tokio::test]
    async fn test_should_show_bucket_in_listing_after_create_and_hide_after_delete() {
        let (_dir, service) = service();
        service
            .create_bucket("bucket-a", None, None, None, false)
            .await
            .expect("create");

        let listing = service.list_buckets().await.expect("list");
        assert!(listing.buckets.iter().any(|b| b.name == "bucket-a"));

        service.delete_bucket("bucket-a").await.expect("delete");
        let listing = service.list_buckets().await.expect("list");
        assert!(!listing.buckets.iter().any(|b| b.name == "bucket-a"));
    }

    #[tokio::test]
    async fn test_should_reject_invalid_bucket_names_before_touching_disk() {
        let (dir, service) = service();
        let err = service
            .create_bucket("Bad_Name", None, None, None, false)
            .await
            .expect_err("invalid name");
        assert!(matches!(err, S3ServiceError::InvalidBucketName { .. }));
        assert!(!dir.path().join("Bad_Name").exists());
    }

    #[tokio::test]
    async fn test_should_enable_versioning_when_object_lock_requested() {
        let (_dir, service) = service();
        service
            .create_bucket("locked", None, None, None, true)
            .await
            .expect("create");
        let meta = service.head_bucket("locked").await.expect("head");
        assert_eq!(meta.versioning, VersioningState::Enabled);
        assert!(meta.object_lock.is_some());
    }

    #[tokio::test]
    async fn test_should_refuse_deleting_nonempty_bucket() {
        let (_dir, service) = service();
        service
            .create_bucket("full", None, None, None, false)
            .await
            .expect("create");
        service
            .put_object("full", "obj", empty_body(), PutObjectOptions::default())
            .await
            .expect("put");

        let err = service.delete_bucket("full").await.expect_err("not empty");
        assert!(matches!(err, S3ServiceError::BucketNotEmpty { .. }));

        service
            .delete_object("full", "obj", None)
            .await
            .expect("delete object");
        service.delete_bucket("full").await.expect("now empty");
    }

    #[tokio::test]
    async fn test_should_refuse_deleting_bucket_with_inflight_upload() {
        let (_dir, service) = service();
        service
            .create_bucket("staging", None, None, None, false)
            .await
            .expect("create");
        service
            .create_multipart_upload("staging", "big", PutObjectOptions::default())
            .await
            .expect("initiate");

        let err = service.delete_bucket("staging").await.expect_err("uploads in flight");
        assert!(matches!(err, S3ServiceError::BucketNotEmpty { .. }));
    }

    #[tokio::test]
    async fn test_should_hide_us_east_1_location_constraint() {
        let (_dir, service) = service();
        service
            .create_bucket("home", None, None, None, false)
            .await
            .expect("create");
        let location = service.get_bucket_location("home").await.expect("location");
        assert_eq!(location.location_constraint, None);

        service
            .create_bucket("abroad", Some("eu-central-1".to_owned()), None, None, false)
            .await
            .expect("create");
        let location = service.get_bucket_location("abroad").await.expect("location");
        assert_eq!(location.location_constraint.as_deref(), Some("eu-central-1"));
    }
}
