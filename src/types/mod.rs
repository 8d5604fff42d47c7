//! This module contains the EWS objects a response can be decoded into.

use std::fmt;

use crate::error::Result;
use crate::service_reader::ServiceXmlReader;
use crate::xml::XmlCursor;

mod find_results;
pub use self::find_results::{FindFoldersResults, FindItemsResults, FindResults};

pub mod folder;
pub use self::folder::{folder_from_xml_element_name, Folder, FolderId, WellKnownFolderName};

pub mod item;
pub use self::item::{item_from_xml_element_name, Item};

pub mod property;
pub use self::property::{
    BasePropertySet, ExtendedProperty, ExtendedPropertyDefinition, MapiPropertyType,
    PropertyBag, PropertyDefinition, PropertySet, PropertyType, PropertyValue, RecurrenceRange,
    ServiceId,
};

mod user_configuration;
pub use self::user_configuration::UserConfiguration;

/// The kinds of object the server can return.
///
/// Kinds form a single-inheritance hierarchy through [`base_type`](Self::base_type): every
/// meeting message is an email message, every email message is an item, and every special
/// folder is a folder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ServiceObjectType {
    Folder,
    CalendarFolder,
    ContactsFolder,
    SearchFolder,
    TasksFolder,
    Item,
    EmailMessage,
    MeetingMessage,
    MeetingRequest,
    MeetingCancellation,
    MeetingResponse,
    Appointment,
    Contact,
    ContactGroup,
    Task,
    PostItem,
    UserConfiguration,
}

const ALL_TYPES: [ServiceObjectType; 17] = [
    ServiceObjectType::Folder,
    ServiceObjectType::CalendarFolder,
    ServiceObjectType::ContactsFolder,
    ServiceObjectType::SearchFolder,
    ServiceObjectType::TasksFolder,
    ServiceObjectType::Item,
    ServiceObjectType::EmailMessage,
    ServiceObjectType::MeetingMessage,
    ServiceObjectType::MeetingRequest,
    ServiceObjectType::MeetingCancellation,
    ServiceObjectType::MeetingResponse,
    ServiceObjectType::Appointment,
    ServiceObjectType::Contact,
    ServiceObjectType::ContactGroup,
    ServiceObjectType::Task,
    ServiceObjectType::PostItem,
    ServiceObjectType::UserConfiguration,
];

impl ServiceObjectType {
    /// The schema element name objects of this kind are written as.
    pub fn xml_element_name(self) -> &'static str {
        match self {
            ServiceObjectType::Folder => "Folder",
            ServiceObjectType::CalendarFolder => "CalendarFolder",
            ServiceObjectType::ContactsFolder => "ContactsFolder",
            ServiceObjectType::SearchFolder => "SearchFolder",
            ServiceObjectType::TasksFolder => "TasksFolder",
            ServiceObjectType::Item => "Item",
            ServiceObjectType::EmailMessage => "Message",
            ServiceObjectType::MeetingMessage => "MeetingMessage",
            ServiceObjectType::MeetingRequest => "MeetingRequest",
            ServiceObjectType::MeetingCancellation => "MeetingCancellation",
            ServiceObjectType::MeetingResponse => "MeetingResponse",
            ServiceObjectType::Appointment => "CalendarItem",
            ServiceObjectType::Contact => "Contact",
            ServiceObjectType::ContactGroup => "DistributionList",
            ServiceObjectType::Task => "Task",
            ServiceObjectType::PostItem => "PostItem",
            ServiceObjectType::UserConfiguration => "UserConfiguration",
        }
    }

    /// The kind whose schema element name is exactly `name`.
    pub fn from_xml_element_name(name: &str) -> Option<Self> {
        ALL_TYPES
            .iter()
            .copied()
            .find(|kind| kind.xml_element_name() == name)
    }

    /// The kind this kind directly derives from.
    pub fn base_type(self) -> Option<Self> {
        match self {
            ServiceObjectType::Folder
            | ServiceObjectType::Item
            | ServiceObjectType::UserConfiguration => None,
            ServiceObjectType::CalendarFolder
            | ServiceObjectType::ContactsFolder
            | ServiceObjectType::SearchFolder
            | ServiceObjectType::TasksFolder => Some(ServiceObjectType::Folder),
            ServiceObjectType::EmailMessage
            | ServiceObjectType::Appointment
            | ServiceObjectType::Contact
            | ServiceObjectType::ContactGroup
            | ServiceObjectType::Task
            | ServiceObjectType::PostItem => Some(ServiceObjectType::Item),
            ServiceObjectType::MeetingMessage => Some(ServiceObjectType::EmailMessage),
            ServiceObjectType::MeetingRequest
            | ServiceObjectType::MeetingCancellation
            | ServiceObjectType::MeetingResponse => Some(ServiceObjectType::MeetingMessage),
        }
    }

    /// Whether an object of kind `other` can be used where `self` is expected, i.e. `self` is
    /// `other` or one of its ancestors.
    pub fn is_assignable_from(self, other: Self) -> bool {
        let mut kind = Some(other);
        while let Some(k) = kind {
            if k == self {
                return true;
            }
            kind = k.base_type();
        }
        false
    }

    /// Whether this is [`Folder`](Self::Folder) or derives from it.
    pub fn is_folder(self) -> bool {
        ServiceObjectType::Folder.is_assignable_from(self)
    }

    /// Whether this is [`Item`](Self::Item) or derives from it.
    pub fn is_item(self) -> bool {
        ServiceObjectType::Item.is_assignable_from(self)
    }
}

impl fmt::Display for ServiceObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xml_element_name())
    }
}

/// How an object should populate itself from a response.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadOptions<'p> {
    /// Drop any properties the object already holds before loading.
    pub clear_property_bag: bool,
    /// The properties the request asked for. `None` accepts everything the server sent.
    pub requested_property_set: Option<&'p PropertySet>,
    /// Only load properties that are part of the summary returned by `Find*` operations.
    pub summary_properties_only: bool,
}

impl<'p> LoadOptions<'p> {
    /// Options for a response to a request that asked for `property_set`.
    pub fn with_property_set(property_set: &'p PropertySet) -> Self {
        LoadOptions {
            requested_property_set: Some(property_set),
            ..LoadOptions::default()
        }
    }
}

/// An object that can be decoded from a response document.
///
/// The collection decoder asks a factory for a blank object per child element, checks the
/// element against [`xml_element_name`](Self::xml_element_name), and then hands the cursor to
/// [`load_from_xml`](Self::load_from_xml).
pub trait ServiceObject {
    /// The static kind of this object.
    fn object_type(&self) -> ServiceObjectType;

    /// The element name this object is read from and written as.
    fn xml_element_name(&self) -> &str;

    /// Replace the element name, after the server reported this object under a more specific
    /// compatible kind.
    fn set_xml_element_name(&mut self, name: String);

    /// Populate this object from the element the reader is positioned on.
    ///
    /// On entry the cursor is on the object's start tag. On return it must be on the matching
    /// end tag, or still on the start tag if the element is empty.
    fn load_from_xml<C: XmlCursor>(
        &mut self,
        reader: &mut ServiceXmlReader<'_, C>,
        options: &LoadOptions<'_>,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_names_round_trip() {
        for kind in ALL_TYPES {
            assert_eq!(
                ServiceObjectType::from_xml_element_name(kind.xml_element_name()),
                Some(kind)
            );
        }
        assert_eq!(ServiceObjectType::from_xml_element_name("message"), None);
        assert_eq!(
            ServiceObjectType::from_xml_element_name("CalendarItem"),
            Some(ServiceObjectType::Appointment)
        );
    }

    #[test]
    fn assignability_follows_base_chain() {
        use ServiceObjectType::*;
        assert!(MeetingMessage.is_assignable_from(MeetingCancellation));
        assert!(EmailMessage.is_assignable_from(MeetingRequest));
        assert!(Item.is_assignable_from(MeetingResponse));
        assert!(MeetingMessage.is_assignable_from(MeetingMessage));
        assert!(!MeetingCancellation.is_assignable_from(MeetingMessage));
        assert!(!MeetingRequest.is_assignable_from(MeetingCancellation));
        assert!(!Folder.is_assignable_from(MeetingMessage));
        assert!(Folder.is_assignable_from(SearchFolder));
        assert!(!UserConfiguration.is_item());
        assert!(Task.is_item() && !Task.is_folder());
    }
}
