//! EWS decoding errors.

use std::error::Error as StdError;
use std::num::ParseIntError;
use std::result;
use std::string::FromUtf8Error;

use thiserror::Error;

/// A convenience wrapper around `Result` for `ews_reader::Error`.
pub type Result<T> = result::Result<T, Error>;

/// A set of errors that can occur while decoding an EWS response document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An error from the underlying XML tokenizer.
    #[error("error reading XML data")]
    Xml(#[from] quick_xml::Error),
    /// The document does not have the shape the reader expected at this point.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// The server reported an object whose type cannot stand in for the requested one.
    #[error(
        "the type of the object in the store ({found}) does not match that of the local object ({expected})"
    )]
    TypeMismatch {
        /// The element name reported by the server.
        found: String,
        /// The element name of the local object.
        expected: String,
    },
    /// Error parsing an element or attribute value.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Error validating input data.
    #[error(transparent)]
    Validate(#[from] ValidateError),
    /// A settings document could not be deserialized.
    #[error("failed to deserialize settings document")]
    Deserialize(#[from] quick_xml::DeError),
    /// A settings document could not be serialized.
    #[error("failed to serialize settings document: {0}")]
    Serialize(String),
    /// A page of folders claimed more results but carried no offset for the next page.
    #[error("more folders are available but the server did not return a paging offset")]
    MissingPageOffset,
    /// Two folders of a hierarchy resolved to the same full name.
    #[error("duplicate folder `{0}` in folder hierarchy")]
    DuplicateFolder(String),
    /// An error raised by a population routine outside of this crate.
    #[error(transparent)]
    Population(Box<dyn StdError + Send + Sync>),
}

/// The document cursor was not where an operation needed it to be.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StructuralError {
    /// A specific element was required but another node was found.
    #[error("expected element `{expected}`, found `{found}`")]
    UnexpectedElement {
        /// The required element, as `{namespace}local-name`.
        expected: String,
        /// Description of the node at the cursor.
        found: String,
    },
    /// The operation requires the cursor to be on a start tag.
    #[error("expected a start element, found `{0}`")]
    NotAtStartElement(String),
    /// An element expected to hold only text contains a child element.
    #[error("element `{0}` has element content where a text value was expected")]
    UnexpectedChildElement(String),
    /// The document ended before the current element was closed.
    #[error("unexpected end of XML document")]
    UnexpectedEndOfDocument,
}

/// A textual value could not be converted to the type it represents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Not an `xs:dateTime`/`xs:date` value, or a required one was empty.
    #[error("unable to parse `{0}` as a date/time")]
    DateTime(String),
    /// The local time does not exist in the target time zone.
    #[error("`{0}` does not exist in the configured time zone")]
    NonExistentLocalTime(String),
    #[error("unable to parse `{value}` as an integer")]
    Integer {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("unable to parse `{0}` as a boolean")]
    Boolean(String),
    #[error("unable to parse `{0}` as a number")]
    Double(String),
    #[error("unknown extended property type `{0}`")]
    PropertyType(String),
    #[error("unable to decode base64 element content")]
    Base64(#[from] base64::DecodeError),
    #[error("unable to parse data as UTF-8 text")]
    DataNotUtf8(#[from] FromUtf8Error),
}

/// Invalid input data.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidateError {
    /// A required argument was empty.
    #[error("argument `{0}` must not be empty")]
    Empty(&'static str),
}
