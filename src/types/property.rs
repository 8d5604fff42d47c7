//! Typed properties of service objects and the sets a request asks for.

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate};
use log::{debug, trace};

use crate::error::{ParseError, Result};
use crate::service_reader::ServiceXmlReader;
use crate::types::LoadOptions;
use crate::xml::XmlCursor;

/// The identifier of an item or folder in the store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ServiceId {
    /// The opaque id.
    pub unique_id: String,
    /// Version of the object the id was read with.
    pub change_key: Option<String>,
}

impl ServiceId {
    pub fn new(unique_id: impl Into<String>) -> Self {
        ServiceId {
            unique_id: unique_id.into(),
            change_key: None,
        }
    }

    /// Read an id element such as `<t:ItemId Id=".." ChangeKey=".."/>`.
    pub(crate) fn load_from_xml<C: XmlCursor>(reader: &mut C) -> Result<Self> {
        let id = ServiceId {
            unique_id: reader.read_attribute_value("Id").unwrap_or_default(),
            change_key: reader.read_attribute_value("ChangeKey"),
        };
        reader.skip_current_element()?;
        Ok(id)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unique_id)
    }
}

/// How the text of a property element is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyType {
    Text,
    Boolean,
    Integer,
    /// An instant, shown in the session's local time zone.
    DateTime,
    /// A calendar date; any offset is ignored.
    Date,
    /// A wall-clock time in the mailbox's time zone.
    UnbiasedDateTime,
    /// An id element carrying `Id` and `ChangeKey` attributes.
    Id,
    /// The range of a recurring series.
    Recurrence,
}

/// A property of a schema, identified by its element name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyDefinition {
    xml_element_name: &'static str,
    property_type: PropertyType,
    in_summary: bool,
}

impl PropertyDefinition {
    pub const fn new(xml_element_name: &'static str, property_type: PropertyType) -> Self {
        PropertyDefinition {
            xml_element_name,
            property_type,
            in_summary: false,
        }
    }

    /// Mark the property as returned by `Find*` operations.
    pub const fn in_summary(mut self) -> Self {
        self.in_summary = true;
        self
    }

    pub fn xml_element_name(&self) -> &'static str {
        self.xml_element_name
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn is_summary(&self) -> bool {
        self.in_summary
    }

    pub fn is_id(&self) -> bool {
        self.property_type == PropertyType::Id
    }
}

/// The MAPI type of an extended property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapiPropertyType {
    Boolean,
    Integer,
    Long,
    Double,
    String,
    SystemTime,
    Binary,
}

impl MapiPropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            MapiPropertyType::Boolean => "Boolean",
            MapiPropertyType::Integer => "Integer",
            MapiPropertyType::Long => "Long",
            MapiPropertyType::Double => "Double",
            MapiPropertyType::String => "String",
            MapiPropertyType::SystemTime => "SystemTime",
            MapiPropertyType::Binary => "Binary",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Boolean" => MapiPropertyType::Boolean,
            "Integer" => MapiPropertyType::Integer,
            "Long" => MapiPropertyType::Long,
            "Double" => MapiPropertyType::Double,
            "String" => MapiPropertyType::String,
            "SystemTime" => MapiPropertyType::SystemTime,
            "Binary" => MapiPropertyType::Binary,
            _ => return None,
        })
    }
}

/// A MAPI property outside of the EWS schema, addressed by tag or by name within a property
/// set.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExtendedPropertyDefinition {
    tag: Option<u16>,
    property_set: Option<String>,
    name: Option<String>,
    property_type: MapiPropertyType,
}

impl ExtendedPropertyDefinition {
    /// A property addressed by its MAPI tag, e.g. `0x0E08` for `PidTagMessageSizeExtended`.
    pub fn with_tag(tag: u16, property_type: MapiPropertyType) -> Self {
        ExtendedPropertyDefinition {
            tag: Some(tag),
            property_set: None,
            name: None,
            property_type,
        }
    }

    /// A named property in a property set, given as a distinguished set name such as `Common`
    /// or as a GUID.
    pub fn named(
        property_set: impl Into<String>,
        name: impl Into<String>,
        property_type: MapiPropertyType,
    ) -> Self {
        ExtendedPropertyDefinition {
            tag: None,
            property_set: Some(property_set.into()),
            name: Some(name.into()),
            property_type,
        }
    }

    pub fn tag(&self) -> Option<u16> {
        self.tag
    }

    pub fn property_type(&self) -> MapiPropertyType {
        self.property_type
    }

    /// Read an `ExtendedFieldURI` element.
    fn load_from_xml<C: XmlCursor>(reader: &mut C) -> Result<Self> {
        let tag = match reader.attribute("PropertyTag") {
            Some(tag) => Some(parse_tag(tag)?),
            None => None,
        };
        let property_set = reader
            .read_attribute_value("DistinguishedPropertySetId")
            .or_else(|| reader.read_attribute_value("PropertySetId"));
        let type_name = reader.attribute("PropertyType").unwrap_or("String");
        let property_type = MapiPropertyType::from_name(type_name)
            .ok_or_else(|| ParseError::PropertyType(type_name.to_owned()))?;
        let definition = ExtendedPropertyDefinition {
            tag,
            property_set,
            name: reader.read_attribute_value("PropertyName"),
            property_type,
        };
        reader.skip_current_element()?;
        Ok(definition)
    }
}

fn parse_tag(text: &str) -> Result<u16> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|source| {
        ParseError::Integer {
            value: text.to_owned(),
            source,
        }
        .into()
    })
}

/// The start and end of a recurring series.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecurrenceRange {
    /// Element name of the recurrence pattern, e.g. `WeeklyRecurrence`.
    pub pattern: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub number_of_occurrences: Option<u32>,
}

impl RecurrenceRange {
    fn load_from_xml<C: XmlCursor>(reader: &mut ServiceXmlReader<'_, C>) -> Result<Self> {
        let mut range = RecurrenceRange::default();
        reader.read_children(|reader| {
            let name = reader.local_name().to_owned();
            match name.as_str() {
                "NoEndRecurrence" | "EndDateRecurrence" | "NumberedRecurrence" => {
                    reader.read_children(|reader| {
                        let name = reader.local_name().to_owned();
                        match name.as_str() {
                            "StartDate" => {
                                range.start_date = reader.read_element_value_as_unspecified_date()?
                            }
                            "EndDate" => {
                                range.end_date = reader.read_element_value_as_unspecified_date()?
                            }
                            "NumberOfOccurrences" => {
                                let value = reader.read_element_value()?;
                                range.number_of_occurrences =
                                    Some(value.trim().parse().map_err(|source| {
                                        ParseError::Integer {
                                            value: value.clone(),
                                            source,
                                        }
                                    })?)
                            }
                            _ => reader.skip_current_element()?,
                        }
                        Ok(())
                    })
                }
                _ => {
                    range.pattern = Some(name.clone());
                    reader.skip_current_element()
                }
            }
        })?;
        Ok(range)
    }
}

/// A loaded property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Boolean(bool),
    Integer(i64),
    Double(f64),
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
    Id(ServiceId),
    Recurrence(RecurrenceRange),
    Binary(Vec<u8>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            PropertyValue::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            PropertyValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            PropertyValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match *self {
            PropertyValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<&ServiceId> {
        match self {
            PropertyValue::Id(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_recurrence(&self) -> Option<&RecurrenceRange> {
        match self {
            PropertyValue::Recurrence(r) => Some(r),
            _ => None,
        }
    }
}

/// An extended property and its value.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtendedProperty {
    pub definition: ExtendedPropertyDefinition,
    pub value: PropertyValue,
}

impl ExtendedProperty {
    /// Read an `ExtendedProperty` element. Multi-valued properties are not supported and yield
    /// `None`.
    fn load_from_xml<C: XmlCursor>(reader: &mut ServiceXmlReader<'_, C>) -> Result<Option<Self>> {
        let mut definition = None;
        let mut value = None;
        let mut multi_valued = false;
        reader.read_children(|reader| {
            let name = reader.local_name().to_owned();
            match name.as_str() {
                "ExtendedFieldURI"
                    if reader
                        .attribute("PropertyType")
                        .map_or(false, |t| t.ends_with("Array")) =>
                {
                    multi_valued = true;
                    reader.skip_current_element()?
                }
                "ExtendedFieldURI" => {
                    definition = Some(ExtendedPropertyDefinition::load_from_xml(reader)?)
                }
                "Value" => value = Some(reader.read_element_value()?),
                _ => {
                    debug!("skipping <{}> in extended property", name);
                    reader.skip_current_element()?
                }
            }
            Ok(())
        })?;

        if multi_valued {
            debug!("skipping multi-valued extended property");
            return Ok(None);
        }
        let (definition, text) = match (definition, value) {
            (Some(d), Some(v)) => (d, v),
            _ => return Ok(None),
        };
        let value = match definition.property_type {
            MapiPropertyType::Boolean => PropertyValue::Boolean(parse_bool(&text)?),
            MapiPropertyType::Integer | MapiPropertyType::Long => {
                PropertyValue::Integer(parse_integer(&text)?)
            }
            MapiPropertyType::Double => PropertyValue::Double(
                text.trim()
                    .parse()
                    .map_err(|_| ParseError::Double(text.clone()))?,
            ),
            MapiPropertyType::SystemTime => match reader.service().as_local_instant(&text)? {
                Some(dt) => PropertyValue::DateTime(dt),
                None => return Ok(None),
            },
            MapiPropertyType::Binary => PropertyValue::Binary(
                base64::engine::general_purpose::STANDARD
                    .decode(text.trim())
                    .map_err(ParseError::from)?,
            ),
            MapiPropertyType::String => PropertyValue::Text(text),
        };
        Ok(Some(ExtendedProperty { definition, value }))
    }
}

pub(crate) fn parse_bool(text: &str) -> Result<bool> {
    match text.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ParseError::Boolean(text.to_owned()).into()),
    }
}

pub(crate) fn parse_integer(text: &str) -> Result<i64> {
    text.trim().parse().map_err(|source| {
        ParseError::Integer {
            value: text.to_owned(),
            source,
        }
        .into()
    })
}

/// The properties every requested object comes back with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BasePropertySet {
    /// Only the object's id.
    IdOnly,
    /// Every property that is not computed on demand.
    FirstClassProperties,
}

/// The properties a request asks the server to return.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertySet {
    pub base: BasePropertySet,
    pub additional_properties: Vec<PropertyDefinition>,
    pub extended_properties: Vec<ExtendedPropertyDefinition>,
}

impl PropertySet {
    pub fn new(base: BasePropertySet) -> Self {
        PropertySet {
            base,
            additional_properties: Vec::new(),
            extended_properties: Vec::new(),
        }
    }

    pub fn id_only() -> Self {
        PropertySet::new(BasePropertySet::IdOnly)
    }

    pub fn first_class_properties() -> Self {
        PropertySet::new(BasePropertySet::FirstClassProperties)
    }

    pub fn with_additional(mut self, property: PropertyDefinition) -> Self {
        self.additional_properties.push(property);
        self
    }

    pub fn with_extended(mut self, property: ExtendedPropertyDefinition) -> Self {
        self.extended_properties.push(property);
        self
    }

    /// Whether a property returned for this set should be loaded.
    pub fn contains(&self, property: &PropertyDefinition) -> bool {
        match self.base {
            BasePropertySet::FirstClassProperties => true,
            BasePropertySet::IdOnly => {
                property.is_id()
                    || self
                        .additional_properties
                        .iter()
                        .any(|p| p.xml_element_name() == property.xml_element_name())
            }
        }
    }
}

impl Default for PropertySet {
    fn default() -> Self {
        PropertySet::first_class_properties()
    }
}

fn is_requested(property: &PropertyDefinition, options: &LoadOptions<'_>) -> bool {
    if options.summary_properties_only && !property.is_summary() {
        return false;
    }
    options
        .requested_property_set
        .map_or(true, |set| set.contains(property))
}

/// The loaded properties of an object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    properties: HashMap<&'static str, PropertyValue>,
    extended_properties: Vec<ExtendedProperty>,
}

impl PropertyBag {
    pub fn get(&self, property: &PropertyDefinition) -> Option<&PropertyValue> {
        self.properties.get(property.xml_element_name())
    }

    pub fn contains(&self, property: &PropertyDefinition) -> bool {
        self.properties.contains_key(property.xml_element_name())
    }

    pub fn set(&mut self, property: &PropertyDefinition, value: PropertyValue) {
        self.properties.insert(property.xml_element_name(), value);
    }

    /// The value of an extended property, if it was loaded.
    pub fn extended_property(
        &self,
        property: &ExtendedPropertyDefinition,
    ) -> Option<&PropertyValue> {
        self.extended_properties
            .iter()
            .find(|p| &p.definition == property)
            .map(|p| &p.value)
    }

    pub fn extended_properties(&self) -> &[ExtendedProperty] {
        &self.extended_properties
    }

    pub fn len(&self) -> usize {
        self.properties.len() + self.extended_properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.properties.clear();
        self.extended_properties.clear();
    }

    /// Load the children of the current element as properties of `schema`.
    ///
    /// Elements that are not in `schema` are skipped, as are properties `options` did not ask
    /// for. An empty date-time element removes the property.
    pub(crate) fn load_from_xml<C: XmlCursor>(
        &mut self,
        reader: &mut ServiceXmlReader<'_, C>,
        schema: &[PropertyDefinition],
        options: &LoadOptions<'_>,
    ) -> Result<()> {
        if options.clear_property_bag {
            self.clear();
        }
        reader.read_children(|reader| {
            if reader.local_name() == "ExtendedProperty" {
                if let Some(property) = ExtendedProperty::load_from_xml(reader)? {
                    self.extended_properties
                        .retain(|p| p.definition != property.definition);
                    self.extended_properties.push(property);
                }
                return Ok(());
            }

            let property = schema
                .iter()
                .find(|p| p.xml_element_name() == reader.local_name())
                .copied();
            match property {
                Some(property) if is_requested(&property, options) => {
                    match read_property_value(reader, &property)? {
                        Some(value) => self.set(&property, value),
                        None => {
                            self.properties.remove(property.xml_element_name());
                        }
                    }
                }
                Some(property) => {
                    trace!("skipping unrequested {}", property.xml_element_name());
                    reader.skip_current_element()?;
                }
                None => {
                    debug!("skipping unknown property <{}>", reader.local_name());
                    reader.skip_current_element()?;
                }
            }
            Ok(())
        })
    }
}

fn read_property_value<C: XmlCursor>(
    reader: &mut ServiceXmlReader<'_, C>,
    property: &PropertyDefinition,
) -> Result<Option<PropertyValue>> {
    Ok(match property.property_type() {
        PropertyType::Text => Some(PropertyValue::Text(reader.read_element_value()?)),
        PropertyType::Boolean => Some(PropertyValue::Boolean(parse_bool(
            &reader.read_element_value()?,
        )?)),
        PropertyType::Integer => Some(PropertyValue::Integer(parse_integer(
            &reader.read_element_value()?,
        )?)),
        PropertyType::DateTime => reader
            .read_element_value_as_date_time()?
            .map(PropertyValue::DateTime),
        PropertyType::Date => reader
            .read_element_value_as_unspecified_date()?
            .map(PropertyValue::Date),
        PropertyType::UnbiasedDateTime => Some(PropertyValue::DateTime(
            reader.read_element_value_as_unbiased_date_time_scoped_to_service_time_zone()?,
        )),
        PropertyType::Id => Some(PropertyValue::Id(ServiceId::load_from_xml(reader)?)),
        PropertyType::Recurrence => Some(PropertyValue::Recurrence(
            RecurrenceRange::load_from_xml(reader)?,
        )),
    })
}
