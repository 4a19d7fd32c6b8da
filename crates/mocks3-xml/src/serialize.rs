//! Rendering response documents as S3-compatible XML.
//!
//! Implementors of [`S3Serialize`] write their fields as child elements in
//! the order the AWS documentation specifies for the operation; absent
//! optional fields are omitted entirely (S3 never emits empty tags).

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesText, Event};

use mocks3_model::output::{
    CompleteMultipartUploadOutput, CopyObjectResult, CreateMultipartUploadOutput,
    DeleteObjectsOutput, GetBucketLocationOutput, ListBucketsOutput, ListMultipartUploadsOutput,
    ListObjectVersionsOutput, ListObjectsOutput, ListObjectsV2Output, ListPartsOutput,
};
use mocks3_model::types::{
    AccessControlPolicy, BucketLifecycleConfiguration, CorsConfiguration, Grantee, ObjectEntry,
    ObjectLockConfiguration, ObjectLockLegalHold, ObjectLockRetention, OwnershipControls, Owner,
    ServerSideEncryptionConfiguration, Tag, Tagging, VersioningConfiguration,
};

use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// The XML Schema instance namespace used for `Grantee` type attributes.
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Trait for serializing S3 types to XML.
///
/// Implementors write their content as child elements inside the current
/// element; the root element name and namespace are handled by [`to_xml`].
///
/// Uses `io::Result` because `quick_xml::Writer` inner-content closures
/// require it.
pub trait S3Serialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as a complete S3 XML document.
///
/// Produces the XML declaration, a root element carrying the S3 namespace,
/// and the value's content.
///
/// # Errors
///
/// Returns [`XmlError`] if serialization fails.
pub fn to_xml<T: S3Serialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(quick_xml::events::BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        None,
    )))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

// ---------------------------------------------------------------------------
// Writer helpers
// ---------------------------------------------------------------------------

/// Write a simple `<tag>text</tag>` element.
fn write_text<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Write `<tag>text</tag>` only when the value is `Some`.
fn write_opt_text<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_text(writer, tag, v)?;
    }
    Ok(())
}

/// Write a lowercase boolean element.
fn write_bool<W: Write>(writer: &mut Writer<W>, tag: &str, value: bool) -> io::Result<()> {
    write_text(writer, tag, if value { "true" } else { "false" })
}

/// Write `<tag>value</tag>` for an optional boolean.
fn write_opt_bool<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<bool>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_bool(writer, tag, v)?;
    }
    Ok(())
}

/// Write a numeric element via `ToString`.
fn write_num<W: Write, N: ToString>(writer: &mut Writer<W>, tag: &str, value: N) -> io::Result<()> {
    write_text(writer, tag, &value.to_string())
}

/// Write `<tag>value</tag>` for an optional number.
fn write_opt_num<W: Write, N: ToString>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<N>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_num(writer, tag, v)?;
    }
    Ok(())
}

/// Write an ISO 8601 timestamp element with millisecond precision.
fn write_timestamp<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: &chrono::DateTime<chrono::Utc>,
) -> io::Result<()> {
    write_text(writer, tag, &format_timestamp(value))
}

/// Format a `DateTime<Utc>` as S3's ISO 8601 flavor.
pub(crate) fn format_timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Write an `Owner`-shaped element (`Owner` / `Initiator`).
fn write_owner<W: Write>(writer: &mut Writer<W>, tag: &str, owner: &Owner) -> io::Result<()> {
    writer.create_element(tag).write_inner_content(|w| {
        write_text(w, "ID", &owner.id)?;
        write_text(w, "DisplayName", &owner.display_name)?;
        Ok(())
    })?;
    Ok(())
}

/// Write the `<CommonPrefixes><Prefix>..</Prefix></CommonPrefixes>` elements.
fn write_common_prefixes<W: Write>(writer: &mut Writer<W>, prefixes: &[String]) -> io::Result<()> {
    for prefix in prefixes {
        writer
            .create_element("CommonPrefixes")
            .write_inner_content(|w| write_text(w, "Prefix", prefix))?;
    }
    Ok(())
}

/// Write a `Contents` element for an object listing entry.
fn write_contents<W: Write>(writer: &mut Writer<W>, entry: &ObjectEntry) -> io::Result<()> {
    writer.create_element("Contents").write_inner_content(|w| {
        write_text(w, "Key", &entry.key)?;
        write_timestamp(w, "LastModified", &entry.last_modified)?;
        write_text(w, "ETag", &entry.etag)?;
        write_num(w, "Size", entry.size)?;
        write_text(w, "StorageClass", &entry.storage_class)?;
        if let Some(owner) = &entry.owner {
            write_owner(w, "Owner", owner)?;
        }
        Ok(())
    })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Configuration documents
// ---------------------------------------------------------------------------

impl S3Serialize for Tag {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Tag").write_inner_content(|w| {
            write_text(w, "Key", &self.key)?;
            write_text(w, "Value", &self.value)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for Tagging {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("TagSet").write_inner_content(|w| {
            for tag in &self.tag_set {
                tag.serialize_xml(w)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for VersioningConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_opt_text(writer, "Status", self.status.map(|s| s.as_str()))
    }
}

impl S3Serialize for AccessControlPolicy {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_owner(writer, "Owner", &self.owner)?;
        writer
            .create_element("AccessControlList")
            .write_inner_content(|w| {
                for grant in &self.grants {
                    w.create_element("Grant").write_inner_content(|w| {
                        match &grant.grantee {
                            Grantee::CanonicalUser { id, display_name } => {
                                w.create_element("Grantee")
                                    .with_attribute(("xmlns:xsi", XSI_NAMESPACE))
                                    .with_attribute(("xsi:type", "CanonicalUser"))
                                    .write_inner_content(|w| {
                                        write_text(w, "ID", id)?;
                                        write_text(w, "DisplayName", display_name)?;
                                        Ok(())
                                    })?;
                            }
                            Grantee::Group { uri } => {
                                w.create_element("Grantee")
                                    .with_attribute(("xmlns:xsi", XSI_NAMESPACE))
                                    .with_attribute(("xsi:type", "Group"))
                                    .write_inner_content(|w| write_text(w, "URI", uri))?;
                            }
                        }
                        write_text(w, "Permission", grant.permission.as_str())?;
                        Ok(())
                    })?;
                }
                Ok(())
            })?;
        Ok(())
    }
}

impl S3Serialize for ObjectLockRetention {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text(writer, "Mode", self.mode.as_str())?;
        write_timestamp(writer, "RetainUntilDate", &self.retain_until_date)?;
        Ok(())
    }
}

impl S3Serialize for ObjectLockLegalHold {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text(writer, "Status", self.status.as_str())
    }
}

impl S3Serialize for ObjectLockConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_opt_text(writer, "ObjectLockEnabled", self.object_lock_enabled.as_deref())?;
        if let Some(retention) = &self.default_retention {
            writer.create_element("Rule").write_inner_content(|w| {
                w.create_element("DefaultRetention").write_inner_content(|w| {
                    write_text(w, "Mode", retention.mode.as_str())?;
                    write_opt_num(w, "Days", retention.days)?;
                    write_opt_num(w, "Years", retention.years)?;
                    Ok(())
                })?;
                Ok(())
            })?;
        }
        Ok(())
    }
}

impl S3Serialize for OwnershipControls {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for rule in &self.rules {
            writer
                .create_element("Rule")
                .write_inner_content(|w| write_text(w, "ObjectOwnership", rule.as_str()))?;
        }
        Ok(())
    }
}

impl S3Serialize for ServerSideEncryptionConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Rule").write_inner_content(|w| {
            w.create_element("ApplyServerSideEncryptionByDefault")
                .write_inner_content(|w| {
                    write_text(w, "SSEAlgorithm", self.rule.sse_algorithm.as_str())?;
                    write_opt_text(w, "KMSMasterKeyID", self.rule.kms_master_key_id.as_deref())?;
                    Ok(())
                })?;
            write_opt_bool(w, "BucketKeyEnabled", self.bucket_key_enabled)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for CorsConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for rule in &self.rules {
            writer.create_element("CORSRule").write_inner_content(|w| {
                write_opt_text(w, "ID", rule.id.as_deref())?;
                for origin in &rule.allowed_origins {
                    write_text(w, "AllowedOrigin", origin)?;
                }
                for method in &rule.allowed_methods {
                    write_text(w, "AllowedMethod", method)?;
                }
                for header in &rule.allowed_headers {
                    write_text(w, "AllowedHeader", header)?;
                }
                for header in &rule.expose_headers {
                    write_text(w, "ExposeHeader", header)?;
                }
                write_opt_num(w, "MaxAgeSeconds", rule.max_age_seconds)?;
                Ok(())
            })?;
        }
        Ok(())
    }
}

impl S3Serialize for BucketLifecycleConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for rule in &self.rules {
            writer.create_element("Rule").write_inner_content(|w| {
                write_opt_text(w, "ID", rule.id.as_deref())?;
                write_opt_text(w, "Prefix", rule.prefix.as_deref())?;
                write_text(w, "Status", rule.status.as_str())?;
                if let Some(expiration) = &rule.expiration {
                    w.create_element("Expiration").write_inner_content(|w| {
                        write_opt_num(w, "Days", expiration.days)?;
                        if let Some(date) = &expiration.date {
                            write_timestamp(w, "Date", date)?;
                        }
                        Ok(())
                    })?;
                }
                if let Some(days) = rule.noncurrent_days {
                    w.create_element("NoncurrentVersionExpiration")
                        .write_inner_content(|w| write_num(w, "NoncurrentDays", days))?;
                }
                Ok(())
            })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Service and bucket responses
// ---------------------------------------------------------------------------

impl S3Serialize for ListBucketsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        if let Some(owner) = &self.owner {
            write_owner(writer, "Owner", owner)?;
        }
        writer.create_element("Buckets").write_inner_content(|w| {
            for bucket in &self.buckets {
                w.create_element("Bucket").write_inner_content(|w| {
                    write_text(w, "Name", &bucket.name)?;
                    write_timestamp(w, "CreationDate", &bucket.creation_date)?;
                    Ok(())
                })?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for GetBucketLocationOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        // LocationConstraint has text content directly under the root;
        // us-east-1 is represented by an empty document.
        if let Some(constraint) = &self.location_constraint {
            writer.write_event(Event::Text(BytesText::new(constraint)))?;
        }
        Ok(())
    }
}

impl S3Serialize for ListObjectsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text(writer, "Name", &self.name)?;
        write_opt_text(writer, "Prefix", self.prefix.as_deref())?;
        write_opt_text(writer, "Marker", self.marker.as_deref())?;
        write_opt_text(writer, "NextMarker", self.next_marker.as_deref())?;
        write_num(writer, "MaxKeys", self.max_keys)?;
        write_opt_text(writer, "Delimiter", self.delimiter.as_deref())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for entry in &self.contents {
            write_contents(writer, entry)?;
        }
        write_common_prefixes(writer, &self.common_prefixes)?;
        Ok(())
    }
}

impl S3Serialize for ListObjectsV2Output {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text(writer, "Name", &self.name)?;
        write_opt_text(writer, "Prefix", self.prefix.as_deref())?;
        write_num(writer, "MaxKeys", self.max_keys)?;
        write_opt_text(writer, "Delimiter", self.delimiter.as_deref())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        write_num(writer, "KeyCount", self.key_count)?;
        write_opt_text(writer, "ContinuationToken", self.continuation_token.as_deref())?;
        write_opt_text(
            writer,
            "NextContinuationToken",
            self.next_continuation_token.as_deref(),
        )?;
        write_opt_text(writer, "StartAfter", self.start_after.as_deref())?;
        for entry in &self.contents {
            write_contents(writer, entry)?;
        }
        write_common_prefixes(writer, &self.common_prefixes)?;
        Ok(())
    }
}

impl S3Serialize for ListObjectVersionsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text(writer, "Name", &self.name)?;
        write_opt_text(writer, "Prefix", self.prefix.as_deref())?;
        write_opt_text(writer, "KeyMarker", self.key_marker.as_deref())?;
        write_opt_text(writer, "VersionIdMarker", self.version_id_marker.as_deref())?;
        write_opt_text(writer, "NextKeyMarker", self.next_key_marker.as_deref())?;
        write_opt_text(
            writer,
            "NextVersionIdMarker",
            self.next_version_id_marker.as_deref(),
        )?;
        write_num(writer, "MaxKeys", self.max_keys)?;
        write_opt_text(writer, "Delimiter", self.delimiter.as_deref())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for entry in &self.versions {
            let element = if entry.is_delete_marker {
                "DeleteMarker"
            } else {
                "Version"
            };
            writer.create_element(element).write_inner_content(|w| {
                write_text(w, "Key", &entry.key)?;
                write_text(w, "VersionId", &entry.version_id)?;
                write_bool(w, "IsLatest", entry.is_latest)?;
                write_timestamp(w, "LastModified", &entry.last_modified)?;
                if !entry.is_delete_marker {
                    write_text(w, "ETag", &entry.etag)?;
                    write_num(w, "Size", entry.size)?;
                    write_text(w, "StorageClass", &entry.storage_class)?;
                }
                write_owner(w, "Owner", &entry.owner)?;
                Ok(())
            })?;
        }
        write_common_prefixes(writer, &self.common_prefixes)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Multipart responses
// ---------------------------------------------------------------------------

impl S3Serialize for ListMultipartUploadsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text(writer, "Bucket", &self.bucket)?;
        write_opt_text(writer, "KeyMarker", self.key_marker.as_deref())?;
        write_opt_text(writer, "UploadIdMarker", self.upload_id_marker.as_deref())?;
        write_opt_text(writer, "NextKeyMarker", self.next_key_marker.as_deref())?;
        write_opt_text(
            writer,
            "NextUploadIdMarker",
            self.next_upload_id_marker.as_deref(),
        )?;
        write_num(writer, "MaxUploads", self.max_uploads)?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for upload in &self.uploads {
            writer.create_element("Upload").write_inner_content(|w| {
                write_text(w, "Key", &upload.key)?;
                write_text(w, "UploadId", &upload.upload_id)?;
                write_owner(w, "Initiator", &upload.initiator)?;
                write_owner(w, "Owner", &upload.owner)?;
                write_text(w, "StorageClass", &upload.storage_class)?;
                write_timestamp(w, "Initiated", &upload.initiated)?;
                Ok(())
            })?;
        }
        Ok(())
    }
}

impl S3Serialize for ListPartsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text(writer, "Bucket", &self.bucket)?;
        write_text(writer, "Key", &self.key)?;
        write_text(writer, "UploadId", &self.upload_id)?;
        write_opt_num(writer, "PartNumberMarker", self.part_number_marker)?;
        write_opt_num(writer, "NextPartNumberMarker", self.next_part_number_marker)?;
        write_num(writer, "MaxParts", self.max_parts)?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for part in &self.parts {
            writer.create_element("Part").write_inner_content(|w| {
                write_num(w, "PartNumber", part.part_number)?;
                write_timestamp(w, "LastModified", &part.last_modified)?;
                write_text(w, "ETag", &part.etag)?;
                write_num(w, "Size", part.size)?;
                Ok(())
            })?;
        }
        if let Some(initiator) = &self.initiator {
            write_owner(writer, "Initiator", initiator)?;
        }
        if let Some(owner) = &self.owner {
            write_owner(writer, "Owner", owner)?;
        }
        write_text(writer, "StorageClass", &self.storage_class)?;
        Ok(())
    }
}

impl S3Serialize for CreateMultipartUploadOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text(writer, "Bucket", &self.bucket)?;
        write_text(writer, "Key", &self.key)?;
        write_text(writer, "UploadId", &self.upload_id)?;
        Ok(())
    }
}

impl S3Serialize for CompleteMultipartUploadOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text(writer, "Location", &self.location)?;
        write_text(writer, "Bucket", &self.bucket)?;
        write_text(writer, "Key", &self.key)?;
        write_text(writer, "ETag", &self.etag)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Copy and batch-delete responses
// ---------------------------------------------------------------------------

impl S3Serialize for CopyObjectResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text(writer, "ETag", &self.etag)?;
        write_timestamp(writer, "LastModified", &self.last_modified)?;
        Ok(())
    }
}

impl S3Serialize for DeleteObjectsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for deleted in &self.deleted {
            writer.create_element("Deleted").write_inner_content(|w| {
                write_text(w, "Key", &deleted.key)?;
                write_opt_text(w, "VersionId", deleted.version_id.as_deref())?;
                write_opt_bool(w, "DeleteMarker", deleted.delete_marker)?;
                write_opt_text(
                    w,
                    "DeleteMarkerVersionId",
                    deleted.delete_marker_version_id.as_deref(),
                )?;
                Ok(())
            })?;
        }
        for error in &self.errors {
            writer.create_element("Error").write_inner_content(|w| {
                write_text(w, "Key", &error.key)?;
                write_text(w, "Code", &error.code)?;
                write_text(w, "Message", &error.message)?;
                Ok(())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mocks3_model::types::BucketEntry;

    use super::*;

    fn xml_string<T: S3Serialize>(root: &str, value: &T) -> String {
        let bytes = to_xml(root, value).expect("serialization should succeed");
        String::from_utf8(bytes).expect("valid UTF-8")
    }

    #[test]
    fn test_should_serialize_tagging_document() {
        let tagging = Tagging {
            tag_set: vec![Tag {
                key: "env".to_owned(),
                value: "test".to_owned(),
            }],
        };
        let xml = xml_string("Tagging", &tagging);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<TagSet><Tag><Key>env</Key><Value>test</Value></Tag></TagSet>"));
    }

    #[test]
    fn test_should_omit_absent_versioning_status() {
        let xml = xml_string("VersioningConfiguration", &VersioningConfiguration::default());
        assert!(!xml.contains("<Status>"));
        assert!(xml.contains("VersioningConfiguration"));
    }

    #[test]
    fn test_should_serialize_list_buckets() {
        let output = ListBucketsOutput {
            owner: Some(Owner::default()),
            buckets: vec![BucketEntry {
                name: "bucket-a".to_owned(),
                creation_date: chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            }],
        };
        let xml = xml_string("ListAllMyBucketsResult", &output);
        assert!(xml.contains("<Name>bucket-a</Name>"));
        assert!(xml.contains("<CreationDate>2024-01-02T03:04:05.000Z</CreationDate>"));
    }

    #[test]
    fn test_should_serialize_empty_location_constraint_as_empty_root() {
        let xml = xml_string("LocationConstraint", &GetBucketLocationOutput::default());
        // Empty content collapses to a self-closing or empty element.
        assert!(
            xml.contains("<LocationConstraint xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"")
        );
        assert!(!xml.contains("us-east"));
    }

    #[test]
    fn test_should_serialize_delete_result_with_errors() {
        let output = DeleteObjectsOutput {
            deleted: vec![mocks3_model::types::DeletedObject {
                key: "gone".to_owned(),
                ..Default::default()
            }],
            errors: vec![mocks3_model::types::DeleteError {
                key: "locked".to_owned(),
                code: "AccessDenied".to_owned(),
                message: "Access Denied".to_owned(),
            }],
        };
        let xml = xml_string("DeleteResult", &output);
        assert!(xml.contains("<Deleted><Key>gone</Key></Deleted>"));
        assert!(xml.contains("<Error><Key>locked</Key><Code>AccessDenied</Code>"));
    }

    #[test]
    fn test_should_serialize_grantee_with_xsi_type() {
        let policy = AccessControlPolicy::private(Owner::default());
        let xml = xml_string("AccessControlPolicy", &policy);
        assert!(xml.contains("xsi:type=\"CanonicalUser\""));
        assert!(xml.contains("<Permission>FULL_CONTROL</Permission>"));
    }

    #[test]
    fn test_should_order_v2_listing_elements_per_documentation() {
        let output = ListObjectsV2Output {
            name: "b".to_owned(),
            max_keys: 1000,
            key_count: 0,
            is_truncated: false,
            ..Default::default()
        };
        let xml = xml_string("ListBucketResult", &output);
        let name_pos = xml.find("<Name>").expect("Name present");
        let truncated_pos = xml.find("<IsTruncated>").expect("IsTruncated present");
        let count_pos = xml.find("<KeyCount>").expect("KeyCount present");
        assert!(name_pos < truncated_pos && truncated_pos < count_pos);
    }
}
