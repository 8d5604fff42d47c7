//! Streaming decoder for Exchange Web Services (EWS) response documents.
//!
//! This crate turns the XML documents an EWS server answers with into typed objects. It does
//! not send requests; a transport hands each response body to an [`EwsXmlReader`] and uses the
//! decoders here to read it.
//!
//! The central piece is
//! [`ServiceXmlReader::read_service_objects_collection_from_xml`], which reads a collection
//! element child by child:
//!
//!  - a caller-supplied factory creates a blank [`ServiceObject`] for each child it recognizes,
//!    and elements it does not recognize are skipped;
//!  - when the server reports a meeting message under a more specific kind than the one asked
//!    for, the object is accepted under the reported name if the [`ExchangeService`] allows it
//!    (see [`ExchangeServiceBuilder::read_compatible_service_object`]), and the decode fails
//!    with [`Error::TypeMismatch`] otherwise;
//!  - each accepted object then loads its own properties from the document.
//!
//! Date-time values are converted according to the session's time zones: instants are shown in
//! its local time zone, calendar dates keep the day they were written with, and wall-clock
//! values are anchored in the mailbox's time zone.
//!
//! # Usage
//!
//! ```
//! use ews_reader::{item_from_xml_element_name, EwsXmlReader, ExchangeServiceBuilder};
//! use ews_reader::{LoadOptions, ServiceObject, ServiceXmlReader, XmlNamespace};
//!
//! # fn main() -> Result<(), ews_reader::Error> {
//! let response = r#"<m:Items xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
//!                            xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
//!     <t:MeetingCancellation><t:Subject>Canceled: Planning</t:Subject></t:MeetingCancellation>
//!     <t:Message><t:Subject>Minutes</t:Subject></t:Message>
//! </m:Items>"#;
//!
//! let service = ExchangeServiceBuilder::new()
//!     .time_zone(chrono::Utc)
//!     .read_compatible_service_object(true)
//!     .build();
//! let mut reader = ServiceXmlReader::new(EwsXmlReader::from_str(response), &service);
//! let items = reader.read_service_objects_collection_from_xml(
//!     XmlNamespace::Messages,
//!     "Items",
//!     item_from_xml_element_name,
//!     &LoadOptions::default(),
//! )?;
//!
//! for item in &items {
//!     println!("{}: {:?}", item.xml_element_name(), item.subject());
//! }
//! # Ok(())
//! # }
//! ```

mod types;

pub mod category_list;
pub mod credentials;
pub mod dates;
pub mod error;
pub mod extensions;
pub mod reconcile;
pub mod service;
pub mod service_reader;
pub mod xml;

pub use crate::credentials::{
    Credentials, HttpRequest, OAuthCredentials, TokenCredentials, WebRequest,
};
pub use crate::error::{Error, Result};
pub use crate::service::{ExchangeService, ExchangeServiceBuilder};
pub use crate::service_reader::ServiceXmlReader;
pub use crate::types::*;
pub use crate::xml::{EwsXmlReader, XmlCursor, XmlNamespace, XmlNodeType};

#[cfg(feature = "test_helpers")]
pub mod testing;

#[cfg(test)]
mod mock_cursor;
