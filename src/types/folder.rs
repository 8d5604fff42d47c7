//! Folders and the well-known folders of a mailbox.

use std::fmt;

use super::property::{
    ExtendedPropertyDefinition, PropertyBag, PropertyDefinition, PropertyType, PropertyValue,
    ServiceId,
};
use super::{LoadOptions, ServiceObject, ServiceObjectType};
use crate::error::Result;
use crate::service::ExchangeService;
use crate::service_reader::ServiceXmlReader;
use crate::xml::XmlCursor;

pub const FOLDER_ID: PropertyDefinition =
    PropertyDefinition::new("FolderId", PropertyType::Id).in_summary();
pub const PARENT_FOLDER_ID: PropertyDefinition =
    PropertyDefinition::new("ParentFolderId", PropertyType::Id).in_summary();
pub const FOLDER_CLASS: PropertyDefinition =
    PropertyDefinition::new("FolderClass", PropertyType::Text).in_summary();
pub const DISPLAY_NAME: PropertyDefinition =
    PropertyDefinition::new("DisplayName", PropertyType::Text).in_summary();
pub const TOTAL_COUNT: PropertyDefinition =
    PropertyDefinition::new("TotalCount", PropertyType::Integer).in_summary();
pub const CHILD_FOLDER_COUNT: PropertyDefinition =
    PropertyDefinition::new("ChildFolderCount", PropertyType::Integer).in_summary();
pub const UNREAD_COUNT: PropertyDefinition =
    PropertyDefinition::new("UnreadCount", PropertyType::Integer).in_summary();

const SCHEMA: [PropertyDefinition; 7] = [
    FOLDER_ID,
    PARENT_FOLDER_ID,
    FOLDER_CLASS,
    DISPLAY_NAME,
    TOTAL_COUNT,
    CHILD_FOLDER_COUNT,
    UNREAD_COUNT,
];

/// The folders every mailbox has, addressed without knowing their ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum WellKnownFolderName {
    Root,
    MsgFolderRoot,
    Calendar,
    Contacts,
    DeletedItems,
    Drafts,
    Inbox,
    Journal,
    JunkEmail,
    Notes,
    Outbox,
    SentItems,
    Tasks,
    SearchFolders,
    ArchiveRoot,
    ArchiveMsgFolderRoot,
    ArchiveDeletedItems,
}

impl WellKnownFolderName {
    /// The distinguished folder id sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            WellKnownFolderName::Root => "root",
            WellKnownFolderName::MsgFolderRoot => "msgfolderroot",
            WellKnownFolderName::Calendar => "calendar",
            WellKnownFolderName::Contacts => "contacts",
            WellKnownFolderName::DeletedItems => "deleteditems",
            WellKnownFolderName::Drafts => "drafts",
            WellKnownFolderName::Inbox => "inbox",
            WellKnownFolderName::Journal => "journal",
            WellKnownFolderName::JunkEmail => "junkemail",
            WellKnownFolderName::Notes => "notes",
            WellKnownFolderName::Outbox => "outbox",
            WellKnownFolderName::SentItems => "sentitems",
            WellKnownFolderName::Tasks => "tasks",
            WellKnownFolderName::SearchFolders => "searchfolders",
            WellKnownFolderName::ArchiveRoot => "archiveroot",
            WellKnownFolderName::ArchiveMsgFolderRoot => "archivemsgfolderroot",
            WellKnownFolderName::ArchiveDeletedItems => "archivedeleteditems",
        }
    }
}

impl fmt::Display for WellKnownFolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A folder, addressed either by id or by its well-known name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FolderId {
    Id(ServiceId),
    WellKnown(WellKnownFolderName),
}

impl From<WellKnownFolderName> for FolderId {
    fn from(name: WellKnownFolderName) -> Self {
        FolderId::WellKnown(name)
    }
}

impl From<ServiceId> for FolderId {
    fn from(id: ServiceId) -> Self {
        FolderId::Id(id)
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderId::Id(id) => id.fmt(f),
            FolderId::WellKnown(name) => name.fmt(f),
        }
    }
}

/// A folder in a mailbox.
#[derive(Clone, Debug, PartialEq)]
pub struct Folder {
    object_type: ServiceObjectType,
    xml_element_name: String,
    properties: PropertyBag,
}

impl Folder {
    /// A blank folder of the given kind.
    pub fn new(object_type: ServiceObjectType) -> Self {
        Folder {
            object_type,
            xml_element_name: object_type.xml_element_name().to_owned(),
            properties: PropertyBag::default(),
        }
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }

    pub fn id(&self) -> Option<&ServiceId> {
        self.properties.get(&FOLDER_ID).and_then(PropertyValue::as_id)
    }

    pub fn parent_folder_id(&self) -> Option<&ServiceId> {
        self.properties
            .get(&PARENT_FOLDER_ID)
            .and_then(PropertyValue::as_id)
    }

    pub fn folder_class(&self) -> Option<&str> {
        self.properties
            .get(&FOLDER_CLASS)
            .and_then(PropertyValue::as_str)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.properties
            .get(&DISPLAY_NAME)
            .and_then(PropertyValue::as_str)
    }

    /// Number of items in the folder.
    pub fn total_count(&self) -> Option<i64> {
        self.count(&TOTAL_COUNT)
    }

    pub fn child_folder_count(&self) -> Option<i64> {
        self.count(&CHILD_FOLDER_COUNT)
    }

    pub fn unread_count(&self) -> Option<i64> {
        self.count(&UNREAD_COUNT)
    }

    pub fn extended_property(
        &self,
        property: &ExtendedPropertyDefinition,
    ) -> Option<&PropertyValue> {
        self.properties.extended_property(property)
    }

    fn count(&self, property: &PropertyDefinition) -> Option<i64> {
        self.properties.get(property).and_then(PropertyValue::as_integer)
    }
}

impl ServiceObject for Folder {
    fn object_type(&self) -> ServiceObjectType {
        self.object_type
    }

    fn xml_element_name(&self) -> &str {
        &self.xml_element_name
    }

    fn set_xml_element_name(&mut self, name: String) {
        self.xml_element_name = name;
    }

    fn load_from_xml<C: XmlCursor>(
        &mut self,
        reader: &mut ServiceXmlReader<'_, C>,
        options: &LoadOptions<'_>,
    ) -> Result<()> {
        self.properties.load_from_xml(reader, &SCHEMA, options)
    }
}

/// A factory for [`ServiceXmlReader::read_service_objects_collection_from_xml`] that creates a
/// blank folder for every folder element name.
pub fn folder_from_xml_element_name(_service: &ExchangeService, name: &str) -> Option<Folder> {
    ServiceObjectType::from_xml_element_name(name)
        .filter(|kind| kind.is_folder())
        .map(Folder::new)
}
