use std::ops::Deref;

use super::folder::{folder_from_xml_element_name, Folder};
use super::item::{item_from_xml_element_name, Item};
use super::{LoadOptions, ServiceObject};
use crate::error::{ParseError, Result};
use crate::service::ExchangeService;
use crate::service_reader::ServiceXmlReader;
use crate::xml::{XmlCursor, XmlNamespace};

/// One page of the results of a `FindFolder` or `FindItem` request.
///
/// Dereferences to the objects on the page.
#[derive(Clone, Debug, PartialEq)]
pub struct FindResults<T> {
    /// Number of matching objects in the whole view.
    pub total_count: i64,
    /// Offset of the next page, when more results are available.
    pub next_page_offset: Option<i64>,
    /// Whether the view extends past this page.
    pub more_available: bool,
    pub objects: Vec<T>,
}

/// A page of folders.
pub type FindFoldersResults = FindResults<Folder>;

/// A page of items.
pub type FindItemsResults = FindResults<Item>;

impl<T> Default for FindResults<T> {
    fn default() -> Self {
        FindResults {
            total_count: 0,
            next_page_offset: None,
            more_available: false,
            objects: Vec::new(),
        }
    }
}

impl<T> Deref for FindResults<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.objects
    }
}

impl<T> IntoIterator for FindResults<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a FindResults<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

fn parse_attribute<C: XmlCursor>(reader: &C, name: &str) -> Result<Option<i64>> {
    match reader.attribute(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|source| {
                ParseError::Integer {
                    value: value.to_owned(),
                    source,
                }
                .into()
            }),
        None => Ok(None),
    }
}

impl<T: ServiceObject> FindResults<T> {
    /// Read an `m:RootFolder` element whose objects are in `t:{collection_name}`.
    fn load_root_folder<C, F>(
        reader: &mut ServiceXmlReader<'_, C>,
        collection_name: &str,
        factory: F,
        options: &LoadOptions<'_>,
    ) -> Result<Self>
    where
        C: XmlCursor,
        F: FnMut(&ExchangeService, &str) -> Option<T>,
    {
        if !reader.is_start_element_named(XmlNamespace::Messages, "RootFolder") {
            reader.read_start_element(XmlNamespace::Messages, "RootFolder")?;
        }
        let total_count = parse_attribute(reader, "TotalItemsInView")?.unwrap_or(0);
        let offset = parse_attribute(reader, "IndexedPagingOffset")?;
        let includes_last = match reader.attribute("IncludesLastItemInRange") {
            Some(value) => super::property::parse_bool(value)?,
            None => true,
        };
        let more_available = !includes_last;
        let mut results = FindResults {
            total_count,
            next_page_offset: if more_available { offset } else { None },
            more_available,
            objects: Vec::new(),
        };
        if reader.is_empty_element() {
            return Ok(results);
        }

        results.objects = reader.read_service_objects_collection_from_xml(
            XmlNamespace::Types,
            collection_name,
            factory,
            options,
        )?;
        reader.read_end_element(XmlNamespace::Messages, "RootFolder")?;
        Ok(results)
    }
}

impl FindResults<Folder> {
    /// Read the `m:RootFolder` of a `FindFolder` response. Folder summaries are loaded as
    /// requested by `options`.
    pub fn load_from_xml<C: XmlCursor>(
        reader: &mut ServiceXmlReader<'_, C>,
        options: &LoadOptions<'_>,
    ) -> Result<Self> {
        Self::load_root_folder(reader, "Folders", folder_from_xml_element_name, options)
    }
}

impl FindResults<Item> {
    /// Read the `m:RootFolder` of a `FindItem` response. Only summary properties are loaded.
    pub fn load_from_xml<C: XmlCursor>(
        reader: &mut ServiceXmlReader<'_, C>,
        options: &LoadOptions<'_>,
    ) -> Result<Self> {
        let options = LoadOptions {
            summary_properties_only: true,
            ..*options
        };
        Self::load_root_folder(reader, "Items", item_from_xml_element_name, &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::EwsXmlReader;

    const FIND_FOLDER: &str = r#"<m:FindFolderResponseMessage ResponseClass="Success"
             xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
             xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
          <m:ResponseCode>NoError</m:ResponseCode>
          <m:RootFolder IndexedPagingOffset="2" TotalItemsInView="5" IncludesLastItemInRange="false">
            <t:Folders>
              <t:Folder><t:DisplayName>Inbox</t:DisplayName></t:Folder>
              <t:SearchFolder><t:DisplayName>Unread</t:DisplayName></t:SearchFolder>
            </t:Folders>
          </m:RootFolder>
        </m:FindFolderResponseMessage>"#;

    #[test]
    fn reads_paging_attributes_and_folders() {
        let service = ExchangeService::new();
        let mut reader = ServiceXmlReader::new(EwsXmlReader::from_str(FIND_FOLDER), &service);
        reader.read().unwrap();
        reader
            .read_element_value_named(XmlNamespace::Messages, "ResponseCode")
            .unwrap();

        let results =
            FindFoldersResults::load_from_xml(&mut reader, &LoadOptions::default()).unwrap();
        assert_eq!(results.total_count, 5);
        assert!(results.more_available);
        assert_eq!(results.next_page_offset, Some(2));
        let names: Vec<_> = results.iter().filter_map(Folder::display_name).collect();
        assert_eq!(names, ["Inbox", "Unread"]);
        assert!(reader.is_end_element(XmlNamespace::Messages, "RootFolder"));
    }

    #[test]
    fn last_page_has_no_offset() {
        let service = ExchangeService::new();
        let doc = r#"<m:RootFolder xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
                 xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types"
                 IndexedPagingOffset="3" TotalItemsInView="3" IncludesLastItemInRange="true">
              <t:Items/>
            </m:RootFolder>"#;
        let mut reader = ServiceXmlReader::new(EwsXmlReader::from_str(doc), &service);
        let results =
            FindItemsResults::load_from_xml(&mut reader, &LoadOptions::default()).unwrap();
        assert!(!results.more_available);
        assert_eq!(results.next_page_offset, None);
        assert!(results.is_empty());
    }
}
