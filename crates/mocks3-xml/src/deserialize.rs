//! Parsing S3-compatible XML into `mocks3-model` types.
//!
//! Request bodies (Tagging, VersioningConfiguration, CompleteMultipartUpload,
//! Delete, the lock/ownership/encryption documents) must parse here; response
//! documents also implement [`S3Deserialize`] so that every serialized
//! document can be parsed back, which the round-trip tests rely on.
//!
//! Parsers are tolerant of additive fields: unknown elements are skipped
//! rather than rejected, matching how AWS evolves its schemas.

use quick_xml::Reader;
use quick_xml::events::Event;

use mocks3_model::output::{
    CompleteMultipartUploadOutput, CopyObjectResult, CreateMultipartUploadOutput,
    DeleteObjectsOutput, GetBucketLocationOutput, ListBucketsOutput, ListMultipartUploadsOutput,
    ListObjectVersionsOutput, ListObjectsOutput, ListObjectsV2Output, ListPartsOutput,
};
use mocks3_model::types::{
    AccessControlPolicy, BucketEntry, BucketLifecycleConfiguration, CompletedMultipartUpload,
    CompletedPart, CorsConfiguration, CorsRule, CreateBucketConfiguration, DefaultRetention,
    Delete, DeleteError, DeletedObject, Grant, Grantee, LifecycleExpiration, LifecycleRule,
    MultipartUploadEntry, ObjectEntry, ObjectIdentifier, ObjectLockConfiguration,
    ObjectLockLegalHold, ObjectLockRetention, ObjectVersionEntry, Owner, OwnershipControls,
    PartEntry, Permission, ServerSideEncryptionByDefault, ServerSideEncryptionConfiguration, Tag,
    Tagging, VersioningConfiguration,
};

use crate::error::XmlError;

/// Trait for deserializing S3 types from XML.
///
/// The reader is positioned just after the opening tag of the element; the
/// implementation consumes child content through the matching end tag.
pub trait S3Deserialize: Sized {
    /// Deserialize an instance from the given XML reader.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] if the XML is malformed or a required field is
    /// missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Parse a complete S3 XML document into a typed value.
///
/// Skips the declaration, consumes the root element, and delegates to the
/// type's [`S3Deserialize`] implementation.
///
/// # Errors
///
/// Returns [`XmlError`] if the XML is malformed or deserialization fails.
pub fn from_xml<T: S3Deserialize>(xml: &[u8]) -> Result<T, XmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(_) => return T::deserialize_xml(&mut reader),
            Event::Empty(_) => {
                // Self-closing root: hand the implementation a reader that
                // immediately yields the end tag.
                let mut empty = Reader::from_reader(&b"<E></E>"[..]);
                loop {
                    if matches!(empty.read_event()?, Event::Start(_)) {
                        break;
                    }
                }
                return T::deserialize_xml(&mut empty);
            }
            Event::Eof => return Err(XmlError::MissingElement("root element".to_owned())),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Reader helpers
// ---------------------------------------------------------------------------

/// Read the text content of the current element and consume its end tag.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let unescaped = e
                    .unescape()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::End(_) => return Ok(text),
            Event::Eof => {
                return Err(XmlError::UnexpectedStructure(
                    "EOF while reading text content".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip over the current element and all of its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedStructure(
                    "EOF while skipping element".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

fn parse_bool(s: &str) -> Result<bool, XmlError> {
    match s {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(XmlError::ParseError(format!("invalid boolean: {other}"))),
    }
}

fn parse_i32(s: &str) -> Result<i32, XmlError> {
    s.parse()
        .map_err(|e| XmlError::ParseError(format!("invalid i32 '{s}': {e}")))
}

fn parse_u32(s: &str) -> Result<u32, XmlError> {
    s.parse()
        .map_err(|e| XmlError::ParseError(format!("invalid u32 '{s}': {e}")))
}

fn parse_u64(s: &str) -> Result<u64, XmlError> {
    s.parse()
        .map_err(|e| XmlError::ParseError(format!("invalid u64 '{s}': {e}")))
}

fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, XmlError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ").map(|n| n.and_utc())
        })
        .map_err(|e| XmlError::ParseError(format!("invalid timestamp '{s}': {e}")))
}

fn parse_enum<T: std::str::FromStr<Err = String>>(s: &str) -> Result<T, XmlError> {
    s.parse().map_err(XmlError::ParseError)
}

/// Drive an element-by-element loop over the children of the current
/// element, dispatching each child start tag to `on_child`.
fn for_each_child(
    reader: &mut Reader<&[u8]>,
    mut on_child: impl FnMut(&str, &mut Reader<&[u8]>) -> Result<(), XmlError>,
) -> Result<(), XmlError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                let tag = std::str::from_utf8(name.as_ref())
                    .map_err(|e| XmlError::ParseError(e.to_string()))?
                    .to_owned();
                on_child(&tag, reader)?;
            }
            // A self-closing child carries no content; nothing to dispatch.
            Event::Empty(_) => {}
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(XmlError::UnexpectedStructure(
                    "EOF inside element".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Parse an `Owner`/`Initiator`-shaped element.
fn read_owner(reader: &mut Reader<&[u8]>) -> Result<Owner, XmlError> {
    let mut owner = Owner {
        id: String::new(),
        display_name: String::new(),
    };
    for_each_child(reader, |tag, r| {
        match tag {
            "ID" => owner.id = read_text(r)?,
            "DisplayName" => owner.display_name = read_text(r)?,
            _ => skip_element(r)?,
        }
        Ok(())
    })?;
    Ok(owner)
}

// ---------------------------------------------------------------------------
// Configuration documents
// ---------------------------------------------------------------------------

impl S3Deserialize for Tag {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut key = String::new();
        let mut value = String::new();
        for_each_child(reader, |tag, r| {
            match tag {
                "Key" => key = read_text(r)?,
                "Value" => value = read_text(r)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self { key, value })
    }
}

impl S3Deserialize for Tagging {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut tag_set = Vec::new();
        for_each_child(reader, |tag, r| {
            match tag {
                "TagSet" => {
                    for_each_child(r, |tag, r| {
                        match tag {
                            "Tag" => tag_set.push(Tag::deserialize_xml(r)?),
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self { tag_set })
    }
}

impl S3Deserialize for VersioningConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut status = None;
        for_each_child(reader, |tag, r| {
            match tag {
                "Status" => status = Some(parse_enum(&read_text(r)?)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self { status })
    }
}

impl S3Deserialize for CreateBucketConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut location_constraint = None;
        for_each_child(reader, |tag, r| {
            match tag {
                "LocationConstraint" => location_constraint = Some(read_text(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self {
            location_constraint,
        })
    }
}

impl S3Deserialize for ObjectLockRetention {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut mode = None;
        let mut retain_until_date = None;
        for_each_child(reader, |tag, r| {
            match tag {
                "Mode" => mode = Some(parse_enum(&read_text(r)?)?),
                "RetainUntilDate" => retain_until_date = Some(parse_timestamp(&read_text(r)?)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self {
            mode: mode.ok_or_else(|| XmlError::MissingElement("Mode".to_owned()))?,
            retain_until_date: retain_until_date
                .ok_or_else(|| XmlError::MissingElement("RetainUntilDate".to_owned()))?,
        })
    }
}

impl S3Deserialize for ObjectLockLegalHold {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut status = None;
        for_each_child(reader, |tag, r| {
            match tag {
                "Status" => status = Some(parse_enum(&read_text(r)?)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self {
            status: status.ok_or_else(|| XmlError::MissingElement("Status".to_owned()))?,
        })
    }
}

impl S3Deserialize for ObjectLockConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut object_lock_enabled = None;
        let mut default_retention = None;
        for_each_child(reader, |tag, r| {
            match tag {
                "ObjectLockEnabled" => object_lock_enabled = Some(read_text(r)?),
                "Rule" => {
                    for_each_child(r, |tag, r| {
                        match tag {
                            "DefaultRetention" => {
                                let mut mode = None;
                                let mut days = None;
                                let mut years = None;
                                for_each_child(r, |tag, r| {
                                    match tag {
                                        "Mode" => mode = Some(parse_enum(&read_text(r)?)?),
                                        "Days" => days = Some(parse_i32(&read_text(r)?)?),
                                        "Years" => years = Some(parse_i32(&read_text(r)?)?),
                                        _ => skip_element(r)?,
                                    }
                                    Ok(())
                                })?;
                                default_retention = Some(DefaultRetention {
                                    mode: mode.ok_or_else(|| {
                                        XmlError::MissingElement("Mode".to_owned())
                                    })?,
                                    days,
                                    years,
                                });
                            }
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self {
            object_lock_enabled,
            default_retention,
        })
    }
}

impl S3Deserialize for OwnershipControls {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut rules = Vec::new();
        for_each_child(reader, |tag, r| {
            match tag {
                "Rule" => {
                    for_each_child(r, |tag, r| {
                        match tag {
                            "ObjectOwnership" => rules.push(parse_enum(&read_text(r)?)?),
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self { rules })
    }
}

impl S3Deserialize for ServerSideEncryptionConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut sse_algorithm = None;
        let mut kms_master_key_id = None;
        let mut bucket_key_enabled = None;
        for_each_child(reader, |tag, r| {
            match tag {
                "Rule" => {
                    for_each_child(r, |tag, r| {
                        match tag {
                            "ApplyServerSideEncryptionByDefault" => {
                                for_each_child(r, |tag, r| {
                                    match tag {
                                        "SSEAlgorithm" => {
                                            sse_algorithm = Some(parse_enum(&read_text(r)?)?);
                                        }
                                        "KMSMasterKeyID" => {
                                            kms_master_key_id = Some(read_text(r)?);
                                        }
                                        _ => skip_element(r)?,
                                    }
                                    Ok(())
                                })?;
                            }
                            "BucketKeyEnabled" => {
                                bucket_key_enabled = Some(parse_bool(&read_text(r)?)?);
                            }
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self {
            rule: ServerSideEncryptionByDefault {
                sse_algorithm: sse_algorithm
                    .ok_or_else(|| XmlError::MissingElement("SSEAlgorithm".to_owned()))?,
                kms_master_key_id,
            },
            bucket_key_enabled,
        })
    }
}

impl S3Deserialize for CorsConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut rules = Vec::new();
        for_each_child(reader, |tag, r| {
            match tag {
                "CORSRule" => {
                    let mut rule = CorsRule::default();
                    for_each_child(r, |tag, r| {
                        match tag {
                            "ID" => rule.id = Some(read_text(r)?),
                            "AllowedOrigin" => rule.allowed_origins.push(read_text(r)?),
                            "AllowedMethod" => rule.allowed_methods.push(read_text(r)?),
                            "AllowedHeader" => rule.allowed_headers.push(read_text(r)?),
                            "ExposeHeader" => rule.expose_headers.push(read_text(r)?),
                            "MaxAgeSeconds" => {
                                rule.max_age_seconds = Some(parse_i32(&read_text(r)?)?);
                            }
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                    rules.push(rule);
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self { rules })
    }
}

impl S3Deserialize for BucketLifecycleConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut rules = Vec::new();
        for_each_child(reader, |tag, r| {
            match tag {
                "Rule" => {
                    let mut id = None;
                    let mut prefix = None;
                    let mut status = None;
                    let mut expiration = None;
                    let mut noncurrent_days = None;
                    for_each_child(r, |tag, r| {
                        match tag {
                            "ID" => id = Some(read_text(r)?),
                            "Prefix" => prefix = Some(read_text(r)?),
                            // The modern schema nests the prefix in a Filter.
                            "Filter" => {
                                for_each_child(r, |tag, r| {
                                    match tag {
                                        "Prefix" => prefix = Some(read_text(r)?),
                                        _ => skip_element(r)?,
                                    }
                                    Ok(())
                                })?;
                            }
                            "Status" => status = Some(parse_enum(&read_text(r)?)?),
                            "Expiration" => {
                                let mut exp = LifecycleExpiration::default();
                                for_each_child(r, |tag, r| {
                                    match tag {
                                        "Days" => exp.days = Some(parse_i32(&read_text(r)?)?),
                                        "Date" => {
                                            exp.date = Some(parse_timestamp(&read_text(r)?)?);
                                        }
                                        _ => skip_element(r)?,
                                    }
                                    Ok(())
                                })?;
                                expiration = Some(exp);
                            }
                            "NoncurrentVersionExpiration" => {
                                for_each_child(r, |tag, r| {
                                    match tag {
                                        "NoncurrentDays" => {
                                            noncurrent_days = Some(parse_i32(&read_text(r)?)?);
                                        }
                                        _ => skip_element(r)?,
                                    }
                                    Ok(())
                                })?;
                            }
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                    rules.push(LifecycleRule {
                        id,
                        prefix,
                        status: status
                            .ok_or_else(|| XmlError::MissingElement("Status".to_owned()))?,
                        expiration,
                        noncurrent_days,
                    });
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self { rules })
    }
}

impl S3Deserialize for AccessControlPolicy {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut owner = None;
        let mut grants = Vec::new();
        for_each_child(reader, |tag, r| {
            match tag {
                "Owner" => owner = Some(read_owner(r)?),
                "AccessControlList" => {
                    for_each_child(r, |tag, r| {
                        match tag {
                            "Grant" => grants.push(read_grant(r)?),
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self {
            owner: owner.ok_or_else(|| XmlError::MissingElement("Owner".to_owned()))?,
            grants,
        })
    }
}

/// Parse a `Grant` element. The grantee kind is inferred from which child
/// elements are present (`URI` for groups, `ID` for canonical users), which
/// tolerates missing `xsi:type` attributes.
fn read_grant(reader: &mut Reader<&[u8]>) -> Result<Grant, XmlError> {
    let mut id = None;
    let mut display_name = None;
    let mut uri = None;
    let mut permission = None;
    for_each_child(reader, |tag, r| {
        match tag {
            "Grantee" => {
                for_each_child(r, |tag, r| {
                    match tag {
                        "ID" => id = Some(read_text(r)?),
                        "DisplayName" => display_name = Some(read_text(r)?),
                        "URI" => uri = Some(read_text(r)?),
                        _ => skip_element(r)?,
                    }
                    Ok(())
                })?;
            }
            "Permission" => {
                permission = Some(
                    read_text(r)?
                        .parse::<Permission>()
                        .map_err(XmlError::ParseError)?,
                );
            }
            _ => skip_element(r)?,
        }
        Ok(())
    })?;

    let grantee = match (uri, id) {
        (Some(uri), _) => Grantee::Group { uri },
        (None, Some(id)) => Grantee::CanonicalUser {
            id,
            display_name: display_name.unwrap_or_default(),
        },
        (None, None) => return Err(XmlError::MissingElement("Grantee".to_owned())),
    };
    Ok(Grant {
        grantee,
        permission: permission.ok_or_else(|| XmlError::MissingElement("Permission".to_owned()))?,
    })
}

// ---------------------------------------------------------------------------
// Multipart / batch-delete request bodies
// ---------------------------------------------------------------------------

impl S3Deserialize for CompletedMultipartUpload {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut parts = Vec::new();
        for_each_child(reader, |tag, r| {
            match tag {
                "Part" => {
                    let mut part_number = None;
                    let mut etag = None;
                    for_each_child(r, |tag, r| {
                        match tag {
                            "PartNumber" => part_number = Some(parse_u32(&read_text(r)?)?),
                            "ETag" => etag = Some(read_text(r)?),
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                    parts.push(CompletedPart {
                        part_number: part_number
                            .ok_or_else(|| XmlError::MissingElement("PartNumber".to_owned()))?,
                        etag: etag.ok_or_else(|| XmlError::MissingElement("ETag".to_owned()))?,
                    });
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self { parts })
    }
}

impl S3Deserialize for Delete {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut objects = Vec::new();
        let mut quiet = false;
        for_each_child(reader, |tag, r| {
            match tag {
                "Object" => {
                    let mut key = None;
                    let mut version_id = None;
                    for_each_child(r, |tag, r| {
                        match tag {
                            "Key" => key = Some(read_text(r)?),
                            "VersionId" => version_id = Some(read_text(r)?),
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                    objects.push(ObjectIdentifier {
                        key: key.ok_or_else(|| XmlError::MissingElement("Key".to_owned()))?,
                        version_id,
                    });
                }
                "Quiet" => quiet = parse_bool(&read_text(r)?)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self { objects, quiet })
    }
}

// ---------------------------------------------------------------------------
// Response documents (round-trip support)
// ---------------------------------------------------------------------------

impl S3Deserialize for ListBucketsOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut owner = None;
        let mut buckets = Vec::new();
        for_each_child(reader, |tag, r| {
            match tag {
                "Owner" => owner = Some(read_owner(r)?),
                "Buckets" => {
                    for_each_child(r, |tag, r| {
                        match tag {
                            "Bucket" => {
                                let mut name = String::new();
                                let mut creation_date = None;
                                for_each_child(r, |tag, r| {
                                    match tag {
                                        "Name" => name = read_text(r)?,
                                        "CreationDate" => {
                                            creation_date =
                                                Some(parse_timestamp(&read_text(r)?)?);
                                        }
                                        _ => skip_element(r)?,
                                    }
                                    Ok(())
                                })?;
                                buckets.push(BucketEntry {
                                    name,
                                    creation_date: creation_date.ok_or_else(|| {
                                        XmlError::MissingElement("CreationDate".to_owned())
                                    })?,
                                });
                            }
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self { owner, buckets })
    }
}

impl S3Deserialize for GetBucketLocationOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let text = read_text(reader)?;
        Ok(Self {
            location_constraint: if text.is_empty() { None } else { Some(text) },
        })
    }
}

/// Parse a `Contents` element of an object listing.
fn read_object_entry(reader: &mut Reader<&[u8]>) -> Result<ObjectEntry, XmlError> {
    let mut entry = ObjectEntry {
        key: String::new(),
        last_modified: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
        etag: String::new(),
        size: 0,
        storage_class: String::new(),
        owner: None,
    };
    for_each_child(reader, |tag, r| {
        match tag {
            "Key" => entry.key = read_text(r)?,
            "LastModified" => entry.last_modified = parse_timestamp(&read_text(r)?)?,
            "ETag" => entry.etag = read_text(r)?,
            "Size" => entry.size = parse_u64(&read_text(r)?)?,
            "StorageClass" => entry.storage_class = read_text(r)?,
            "Owner" => entry.owner = Some(read_owner(r)?),
            _ => skip_element(r)?,
        }
        Ok(())
    })?;
    Ok(entry)
}

/// Parse a `CommonPrefixes` element into its inner prefix.
fn read_common_prefix(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut prefix = String::new();
    for_each_child(reader, |tag, r| {
        match tag {
            "Prefix" => prefix = read_text(r)?,
            _ => skip_element(r)?,
        }
        Ok(())
    })?;
    Ok(prefix)
}

impl S3Deserialize for ListObjectsOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = Self::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Name" => out.name = read_text(r)?,
                "Prefix" => out.prefix = Some(read_text(r)?),
                "Marker" => out.marker = Some(read_text(r)?),
                "NextMarker" => out.next_marker = Some(read_text(r)?),
                "MaxKeys" => out.max_keys = parse_i32(&read_text(r)?)?,
                "Delimiter" => out.delimiter = Some(read_text(r)?),
                "IsTruncated" => out.is_truncated = parse_bool(&read_text(r)?)?,
                "Contents" => out.contents.push(read_object_entry(r)?),
                "CommonPrefixes" => out.common_prefixes.push(read_common_prefix(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}

impl S3Deserialize for ListObjectsV2Output {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = Self::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Name" => out.name = read_text(r)?,
                "Prefix" => out.prefix = Some(read_text(r)?),
                "MaxKeys" => out.max_keys = parse_i32(&read_text(r)?)?,
                "Delimiter" => out.delimiter = Some(read_text(r)?),
                "IsTruncated" => out.is_truncated = parse_bool(&read_text(r)?)?,
                "KeyCount" => out.key_count = parse_i32(&read_text(r)?)?,
                "ContinuationToken" => out.continuation_token = Some(read_text(r)?),
                "NextContinuationToken" => out.next_continuation_token = Some(read_text(r)?),
                "StartAfter" => out.start_after = Some(read_text(r)?),
                "Contents" => out.contents.push(read_object_entry(r)?),
                "CommonPrefixes" => out.common_prefixes.push(read_common_prefix(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}

impl S3Deserialize for ListObjectVersionsOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = Self::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Name" => out.name = read_text(r)?,
                "Prefix" => out.prefix = Some(read_text(r)?),
                "KeyMarker" => out.key_marker = Some(read_text(r)?),
                "VersionIdMarker" => out.version_id_marker = Some(read_text(r)?),
                "NextKeyMarker" => out.next_key_marker = Some(read_text(r)?),
                "NextVersionIdMarker" => out.next_version_id_marker = Some(read_text(r)?),
                "MaxKeys" => out.max_keys = parse_i32(&read_text(r)?)?,
                "Delimiter" => out.delimiter = Some(read_text(r)?),
                "IsTruncated" => out.is_truncated = parse_bool(&read_text(r)?)?,
                "Version" => out.versions.push(read_version_entry(r, false)?),
                "DeleteMarker" => out.versions.push(read_version_entry(r, true)?),
                "CommonPrefixes" => out.common_prefixes.push(read_common_prefix(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}

fn read_version_entry(
    reader: &mut Reader<&[u8]>,
    is_delete_marker: bool,
) -> Result<ObjectVersionEntry, XmlError> {
    let mut entry = ObjectVersionEntry {
        key: String::new(),
        version_id: String::new(),
        is_latest: false,
        last_modified: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
        etag: String::new(),
        size: 0,
        storage_class: String::new(),
        owner: Owner::default(),
        is_delete_marker,
    };
    for_each_child(reader, |tag, r| {
        match tag {
            "Key" => entry.key = read_text(r)?,
            "VersionId" => entry.version_id = read_text(r)?,
            "IsLatest" => entry.is_latest = parse_bool(&read_text(r)?)?,
            "LastModified" => entry.last_modified = parse_timestamp(&read_text(r)?)?,
            "ETag" => entry.etag = read_text(r)?,
            "Size" => entry.size = parse_u64(&read_text(r)?)?,
            "StorageClass" => entry.storage_class = read_text(r)?,
            "Owner" => entry.owner = read_owner(r)?,
            _ => skip_element(r)?,
        }
        Ok(())
    })?;
    Ok(entry)
}

impl S3Deserialize for ListMultipartUploadsOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = Self::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Bucket" => out.bucket = read_text(r)?,
                "KeyMarker" => out.key_marker = Some(read_text(r)?),
                "UploadIdMarker" => out.upload_id_marker = Some(read_text(r)?),
                "NextKeyMarker" => out.next_key_marker = Some(read_text(r)?),
                "NextUploadIdMarker" => out.next_upload_id_marker = Some(read_text(r)?),
                "MaxUploads" => out.max_uploads = parse_i32(&read_text(r)?)?,
                "IsTruncated" => out.is_truncated = parse_bool(&read_text(r)?)?,
                "Upload" => {
                    let mut upload = MultipartUploadEntry {
                        key: String::new(),
                        upload_id: String::new(),
                        initiated: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
                        storage_class: String::new(),
                        owner: Owner::default(),
                        initiator: Owner::default(),
                    };
                    for_each_child(r, |tag, r| {
                        match tag {
                            "Key" => upload.key = read_text(r)?,
                            "UploadId" => upload.upload_id = read_text(r)?,
                            "Initiator" => upload.initiator = read_owner(r)?,
                            "Owner" => upload.owner = read_owner(r)?,
                            "StorageClass" => upload.storage_class = read_text(r)?,
                            "Initiated" => upload.initiated = parse_timestamp(&read_text(r)?)?,
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                    out.uploads.push(upload);
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}

impl S3Deserialize for ListPartsOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = Self::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Bucket" => out.bucket = read_text(r)?,
                "Key" => out.key = read_text(r)?,
                "UploadId" => out.upload_id = read_text(r)?,
                "PartNumberMarker" => out.part_number_marker = Some(parse_u32(&read_text(r)?)?),
                "NextPartNumberMarker" => {
                    out.next_part_number_marker = Some(parse_u32(&read_text(r)?)?);
                }
                "MaxParts" => out.max_parts = parse_i32(&read_text(r)?)?,
                "IsTruncated" => out.is_truncated = parse_bool(&read_text(r)?)?,
                "Part" => {
                    let mut part = PartEntry {
                        part_number: 0,
                        last_modified: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
                        etag: String::new(),
                        size: 0,
                    };
                    for_each_child(r, |tag, r| {
                        match tag {
                            "PartNumber" => part.part_number = parse_u32(&read_text(r)?)?,
                            "LastModified" => part.last_modified = parse_timestamp(&read_text(r)?)?,
                            "ETag" => part.etag = read_text(r)?,
                            "Size" => part.size = parse_u64(&read_text(r)?)?,
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                    out.parts.push(part);
                }
                "Initiator" => out.initiator = Some(read_owner(r)?),
                "Owner" => out.owner = Some(read_owner(r)?),
                "StorageClass" => out.storage_class = read_text(r)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}

impl S3Deserialize for CreateMultipartUploadOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = Self::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Bucket" => out.bucket = read_text(r)?,
                "Key" => out.key = read_text(r)?,
                "UploadId" => out.upload_id = read_text(r)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}

impl S3Deserialize for CompleteMultipartUploadOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = Self::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Location" => out.location = read_text(r)?,
                "Bucket" => out.bucket = read_text(r)?,
                "Key" => out.key = read_text(r)?,
                "ETag" => out.etag = read_text(r)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}

impl S3Deserialize for CopyObjectResult {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut etag = None;
        let mut last_modified = None;
        for_each_child(reader, |tag, r| {
            match tag {
                "ETag" => etag = Some(read_text(r)?),
                "LastModified" => last_modified = Some(parse_timestamp(&read_text(r)?)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(Self {
            etag: etag.ok_or_else(|| XmlError::MissingElement("ETag".to_owned()))?,
            last_modified: last_modified
                .ok_or_else(|| XmlError::MissingElement("LastModified".to_owned()))?,
        })
    }
}

impl S3Deserialize for DeleteObjectsOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = Self::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Deleted" => {
                    let mut deleted = DeletedObject::default();
                    for_each_child(r, |tag, r| {
                        match tag {
                            "Key" => deleted.key = read_text(r)?,
                            "VersionId" => deleted.version_id = Some(read_text(r)?),
                            "DeleteMarker" => {
                                deleted.delete_marker = Some(parse_bool(&read_text(r)?)?);
                            }
                            "DeleteMarkerVersionId" => {
                                deleted.delete_marker_version_id = Some(read_text(r)?);
                            }
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                    out.deleted.push(deleted);
                }
                "Error" => {
                    let mut key = String::new();
                    let mut code = String::new();
                    let mut message = String::new();
                    for_each_child(r, |tag, r| {
                        match tag {
                            "Key" => key = read_text(r)?,
                            "Code" => code = read_text(r)?,
                            "Message" => message = read_text(r)?,
                            _ => skip_element(r)?,
                        }
                        Ok(())
                    })?;
                    out.errors.push(DeleteError { key, code, message });
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}
