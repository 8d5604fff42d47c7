//! Enable the test_helpers feature to expose helper methods to build
//! sessions and decoded response objects for testing code that uses the ews-reader crate
//!
//! To use add a dev-dependency on the crate adding the feature "test_helpers"
//! e.g.
//!
//! ```toml
//! [dependencies]
//! ews-reader = { version = "0.1" }
//!
//! [dev-dependencies]
//! # mirror the same configuration your dependencies and add test_helpers
//! ews-reader = { version = "0.1", features = ["test_helpers"] }
//! ```
//!
#[cfg(doc)]
use crate::types::*;

/// Methods to build an [`ExchangeService`](crate::ExchangeService)
pub mod services {
    use crate::service::{ExchangeService, ExchangeServiceBuilder};

    /// A session in which both time zones are UTC and substitution is off.
    pub fn utc() -> ExchangeService {
        ExchangeServiceBuilder::new()
            .time_zone(chrono::Utc)
            .local_time_zone(chrono::Utc)
            .build()
    }

    /// A UTC session that accepts compatible meeting message kinds.
    ///
    /// ```
    /// let service = ews_reader::testing::services::relaxed();
    /// assert!(service.read_compatible_service_object());
    /// ```
    pub fn relaxed() -> ExchangeService {
        ExchangeServiceBuilder::new()
            .time_zone(chrono::Utc)
            .local_time_zone(chrono::Utc)
            .read_compatible_service_object(true)
            .build()
    }
}

/// Methods to build a list of [`Item`]s
pub mod items {
    use crate::service::ExchangeService;
    use crate::service_reader::ServiceXmlReader;
    use crate::types::{item_from_xml_element_name, Item, LoadOptions};
    use crate::xml::{EwsXmlReader, XmlNamespace};

    /// Decodes the items of a `t:Items` collection in `service`
    ///
    /// Example input.
    ///
    /// ```
    /// let input = r#"<t:Items xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
    ///   <t:Message><t:Subject>Hello</t:Subject></t:Message>
    /// </t:Items>"#;
    /// let service = ews_reader::testing::services::utc();
    /// let items = ews_reader::testing::items::parse(&service, input);
    /// assert_eq!(items[0].subject(), Some("Hello"));
    /// ```
    pub fn parse(service: &ExchangeService, input: &str) -> Vec<Item> {
        let mut reader = ServiceXmlReader::new(EwsXmlReader::from_str(input), service);
        reader
            .read_service_objects_collection_from_xml(
                XmlNamespace::Types,
                "Items",
                item_from_xml_element_name,
                &LoadOptions::default(),
            )
            .unwrap()
    }
}

/// Methods to build a [`FindFoldersResults`] response object
pub mod find_folders {
    use crate::service_reader::ServiceXmlReader;
    use crate::types::{FindFoldersResults, LoadOptions};
    use crate::xml::EwsXmlReader;

    /// Builds a [`FindFoldersResults`] from an `m:RootFolder` element
    ///
    /// Example input.
    ///
    /// ```
    /// let input = r#"<m:RootFolder
    ///     xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
    ///     xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types"
    ///     IndexedPagingOffset="1" TotalItemsInView="1" IncludesLastItemInRange="true">
    ///   <t:Folders><t:Folder><t:DisplayName>Inbox</t:DisplayName></t:Folder></t:Folders>
    /// </m:RootFolder>"#;
    /// let response = ews_reader::testing::find_folders::parse(input);
    /// assert_eq!(response.len(), 1);
    /// ```
    pub fn parse(input: &str) -> FindFoldersResults {
        let service = super::services::utc();
        let mut reader = ServiceXmlReader::new(EwsXmlReader::from_str(input), &service);
        FindFoldersResults::load_from_xml(&mut reader, &LoadOptions::default()).unwrap()
    }
}

/// Methods to build a [`UserConfiguration`] response object
pub mod user_configuration {
    use crate::service_reader::ServiceXmlReader;
    use crate::types::{LoadOptions, ServiceObject, UserConfiguration};
    use crate::xml::{EwsXmlReader, XmlCursor};

    /// Builds a [`UserConfiguration`] from an `m:UserConfiguration` element
    ///
    /// Example input.
    ///
    /// ```
    /// let input = r#"<m:UserConfiguration
    ///     xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
    ///     xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
    ///   <t:UserConfigurationName Name="CategoryList"/>
    ///   <t:XmlData>PGNhdGVnb3JpZXMvPg==</t:XmlData>
    /// </m:UserConfiguration>"#;
    /// let response = ews_reader::testing::user_configuration::parse(input);
    /// assert_eq!(response.name, "CategoryList");
    /// ```
    pub fn parse(input: &str) -> UserConfiguration {
        let service = super::services::utc();
        let mut reader = ServiceXmlReader::new(EwsXmlReader::from_str(input), &service);
        reader.read().unwrap();
        let mut configuration = UserConfiguration::default();
        configuration
            .load_from_xml(&mut reader, &LoadOptions::default())
            .unwrap();
        configuration
    }
}
