//! S3 XML wire format for mocks3.
//!
//! S3 speaks the RestXml protocol with `noErrorWrapping: true`. This crate
//! converts between the types in `mocks3-model` and that wire format:
//!
//! - [`S3Serialize`] / [`to_xml`] render response bodies;
//! - [`S3Deserialize`] / [`from_xml`] parse request bodies (and make response
//!   documents round-trippable for tests);
//! - [`error_to_xml`] renders the flat `<Error>` envelope.
//!
//! # Conventions
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - XML declaration `<?xml version="1.0" encoding="UTF-8"?>` with
//!   double-quoted attributes
//! - Booleans are lowercase `true`/`false`
//! - Timestamps are ISO 8601 with milliseconds (`2006-02-03T16:45:09.000Z`)
//! - Empty/absent fields are omitted rather than written as empty tags
//! - Element ordering follows the AWS documentation for each operation

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::{S3Deserialize, from_xml};
pub use error::{XmlError, error_to_xml};
pub use serialize::{S3_NAMESPACE, S3Serialize, to_xml};
