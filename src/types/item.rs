//! Items: messages, meeting messages, calendar items, contacts, tasks and posts.
//!
//! The constants in this module are the item properties this crate understands.

use chrono::{DateTime, FixedOffset};

use super::property::{
    PropertyBag, PropertyDefinition, PropertyType, PropertyValue, RecurrenceRange, ServiceId,
};
use super::{LoadOptions, ServiceObject, ServiceObjectType};
use crate::error::Result;
use crate::service::ExchangeService;
use crate::service_reader::ServiceXmlReader;
use crate::xml::XmlCursor;

pub const ITEM_ID: PropertyDefinition =
    PropertyDefinition::new("ItemId", PropertyType::Id).in_summary();
pub const PARENT_FOLDER_ID: PropertyDefinition =
    PropertyDefinition::new("ParentFolderId", PropertyType::Id).in_summary();
pub const ITEM_CLASS: PropertyDefinition =
    PropertyDefinition::new("ItemClass", PropertyType::Text).in_summary();
pub const SUBJECT: PropertyDefinition =
    PropertyDefinition::new("Subject", PropertyType::Text).in_summary();
pub const BODY: PropertyDefinition = PropertyDefinition::new("Body", PropertyType::Text);
pub const SIZE: PropertyDefinition =
    PropertyDefinition::new("Size", PropertyType::Integer).in_summary();
pub const DATE_TIME_RECEIVED: PropertyDefinition =
    PropertyDefinition::new("DateTimeReceived", PropertyType::DateTime).in_summary();
pub const DATE_TIME_SENT: PropertyDefinition =
    PropertyDefinition::new("DateTimeSent", PropertyType::DateTime).in_summary();
pub const DATE_TIME_CREATED: PropertyDefinition =
    PropertyDefinition::new("DateTimeCreated", PropertyType::DateTime).in_summary();
pub const LAST_MODIFIED_TIME: PropertyDefinition =
    PropertyDefinition::new("LastModifiedTime", PropertyType::DateTime).in_summary();
pub const IS_READ: PropertyDefinition =
    PropertyDefinition::new("IsRead", PropertyType::Boolean).in_summary();

// calendar items
pub const START: PropertyDefinition =
    PropertyDefinition::new("Start", PropertyType::DateTime).in_summary();
pub const END: PropertyDefinition =
    PropertyDefinition::new("End", PropertyType::DateTime).in_summary();
pub const IS_ALL_DAY_EVENT: PropertyDefinition =
    PropertyDefinition::new("IsAllDayEvent", PropertyType::Boolean).in_summary();
pub const START_WALL_CLOCK: PropertyDefinition =
    PropertyDefinition::new("StartWallClock", PropertyType::UnbiasedDateTime);
pub const END_WALL_CLOCK: PropertyDefinition =
    PropertyDefinition::new("EndWallClock", PropertyType::UnbiasedDateTime);
pub const RECURRENCE: PropertyDefinition =
    PropertyDefinition::new("Recurrence", PropertyType::Recurrence);

const SCHEMA: [PropertyDefinition; 17] = [
    ITEM_ID,
    PARENT_FOLDER_ID,
    ITEM_CLASS,
    SUBJECT,
    BODY,
    SIZE,
    DATE_TIME_RECEIVED,
    DATE_TIME_SENT,
    DATE_TIME_CREATED,
    LAST_MODIFIED_TIME,
    IS_READ,
    START,
    END,
    IS_ALL_DAY_EVENT,
    START_WALL_CLOCK,
    END_WALL_CLOCK,
    RECURRENCE,
];

/// An item in a mailbox.
///
/// One type covers every item kind; [`object_type`](ServiceObject::object_type) tells them apart.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    object_type: ServiceObjectType,
    xml_element_name: String,
    properties: PropertyBag,
}

impl Item {
    /// A blank item of the given kind.
    pub fn new(object_type: ServiceObjectType) -> Self {
        Item {
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
        self.properties.get(&ITEM_ID).and_then(PropertyValue::as_id)
    }

    pub fn parent_folder_id(&self) -> Option<&ServiceId> {
        self.properties
            .get(&PARENT_FOLDER_ID)
            .and_then(PropertyValue::as_id)
    }

    pub fn item_class(&self) -> Option<&str> {
        self.text(&ITEM_CLASS)
    }

    pub fn subject(&self) -> Option<&str> {
        self.text(&SUBJECT)
    }

    pub fn body(&self) -> Option<&str> {
        self.text(&BODY)
    }

    pub fn size(&self) -> Option<i64> {
        self.properties.get(&SIZE).and_then(PropertyValue::as_integer)
    }

    pub fn is_read(&self) -> Option<bool> {
        self.properties.get(&IS_READ).and_then(PropertyValue::as_bool)
    }

    pub fn date_time_received(&self) -> Option<&DateTime<FixedOffset>> {
        self.date_time(&DATE_TIME_RECEIVED)
    }

    pub fn date_time_sent(&self) -> Option<&DateTime<FixedOffset>> {
        self.date_time(&DATE_TIME_SENT)
    }

    pub fn date_time_created(&self) -> Option<&DateTime<FixedOffset>> {
        self.date_time(&DATE_TIME_CREATED)
    }

    pub fn last_modified_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.date_time(&LAST_MODIFIED_TIME)
    }

    /// Start of a calendar item, in the session's local time zone.
    pub fn start(&self) -> Option<&DateTime<FixedOffset>> {
        self.date_time(&START)
    }

    /// End of a calendar item, in the session's local time zone.
    pub fn end(&self) -> Option<&DateTime<FixedOffset>> {
        self.date_time(&END)
    }

    pub fn is_all_day_event(&self) -> Option<bool> {
        self.properties
            .get(&IS_ALL_DAY_EVENT)
            .and_then(PropertyValue::as_bool)
    }

    /// Start of a calendar item as shown on the mailbox owner's clock.
    pub fn start_wall_clock(&self) -> Option<&DateTime<FixedOffset>> {
        self.date_time(&START_WALL_CLOCK)
    }

    /// End of a calendar item as shown on the mailbox owner's clock.
    pub fn end_wall_clock(&self) -> Option<&DateTime<FixedOffset>> {
        self.date_time(&END_WALL_CLOCK)
    }

    pub fn recurrence(&self) -> Option<&RecurrenceRange> {
        self.properties
            .get(&RECURRENCE)
            .and_then(PropertyValue::as_recurrence)
    }

    fn text(&self, property: &PropertyDefinition) -> Option<&str> {
        self.properties.get(property).and_then(PropertyValue::as_str)
    }

    fn date_time(&self, property: &PropertyDefinition) -> Option<&DateTime<FixedOffset>> {
        self.properties
            .get(property)
            .and_then(PropertyValue::as_date_time)
    }
}

impl ServiceObject for Item {
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
/// blank item for every item element name.
pub fn item_from_xml_element_name(_service: &ExchangeService, name: &str) -> Option<Item> {
    ServiceObjectType::from_xml_element_name(name)
        .filter(|kind| kind.is_item())
        .map(Item::new)
}
