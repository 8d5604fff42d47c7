//! The master category list of a mailbox.
//!
//! Outlook keeps the categories a user can assign in a `CategoryList` configuration object in
//! the calendar folder. Its XML payload is a `categories` document that is read and written
//! here with serde:
//!
//! ```xml
//! <categories default="" lastSavedSession="2" lastSavedTime="2024-01-12T08:30:00.000Z"
//!             xmlns="CategoryList.xsd">
//!   <category name="Red category" color="0" keyboardShortcut="0"
//!             guid="{4B5B8A59-9F42-4B5C-9E0E-2B6B1A1C0A3D}"/>
//! </categories>
//! ```

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, ParseError, Result, ValidateError};
use crate::types::{UserConfiguration, WellKnownFolderName};

const NAMESPACE: &str = "CategoryList.xsd";
const DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

fn default_namespace() -> String {
    NAMESPACE.to_owned()
}

/// A category that can be assigned to items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "@name")]
    pub name: String,
    /// Index of the category color, `-1` for none.
    #[serde(rename = "@color", default)]
    pub color: i32,
    #[serde(rename = "@keyboardShortcut", default)]
    pub keyboard_shortcut: i32,
    #[serde(
        rename = "@usageCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub usage_count: Option<u32>,
    #[serde(
        rename = "@lastTimeUsed",
        default,
        with = "xs_date_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_time_used: Option<DateTime<FixedOffset>>,
    #[serde(
        rename = "@lastSessionUsed",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_session_used: Option<u8>,
    #[serde(
        rename = "@guid",
        default,
        with = "guid",
        skip_serializing_if = "Option::is_none"
    )]
    pub guid: Option<Uuid>,
}

impl Category {
    /// A new category with a fresh id.
    pub fn new(name: impl Into<String>, color: i32) -> Self {
        Category {
            name: name.into(),
            color,
            keyboard_shortcut: 0,
            usage_count: None,
            last_time_used: None,
            last_session_used: None,
            guid: Some(Uuid::new_v4()),
        }
    }
}

/// The `categories` document stored in the `CategoryList` configuration object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryList {
    #[serde(rename = "@xmlns", default = "default_namespace")]
    xmlns: String,
    /// The category applied by quick-click. Missing or malformed ids read as `None`.
    #[serde(rename = "@default", default, with = "default_category")]
    pub default_category: Option<Uuid>,
    #[serde(rename = "@lastSavedSession", default)]
    pub last_saved_session: u8,
    #[serde(
        rename = "@lastSavedTime",
        default,
        with = "xs_date_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_saved_time: Option<DateTime<FixedOffset>>,
    #[serde(rename = "category", default)]
    pub categories: Vec<Category>,
}

impl Default for CategoryList {
    fn default() -> Self {
        CategoryList {
            xmlns: default_namespace(),
            default_category: None,
            last_saved_session: 0,
            last_saved_time: None,
            categories: Vec::new(),
        }
    }
}

impl CategoryList {
    /// Name of the configuration object the list is stored in.
    pub const CONFIGURATION_NAME: &'static str = "CategoryList";

    /// Folder the configuration object is stored in.
    pub const FOLDER: WellKnownFolderName = WellKnownFolderName::Calendar;

    /// An empty configuration object to bind the list from.
    pub fn user_configuration() -> UserConfiguration {
        UserConfiguration::new(Self::CONFIGURATION_NAME, Self::FOLDER)
    }

    /// Parse a `categories` document. A leading byte order mark is ignored.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        Ok(quick_xml::de::from_str(xml)?)
    }

    /// Serialize the list as a `categories` document.
    pub fn to_xml(&self) -> Result<String> {
        let body = quick_xml::se::to_string_with_root("categories", self)
            .map_err(|e| Error::Serialize(e.to_string()))?;
        Ok(format!("{}{}", DECLARATION, body))
    }

    /// Read the list from the XML payload of a bound configuration object.
    pub fn from_user_configuration(configuration: &UserConfiguration) -> Result<Self> {
        let data = configuration
            .xml_data
            .as_deref()
            .ok_or(ValidateError::Empty("xml_data"))?;
        let xml = String::from_utf8(data.to_vec()).map_err(ParseError::from)?;
        Self::from_xml(&xml)
    }

    /// Write the list into the XML payload of `configuration`, ready to be sent back with
    /// `UpdateUserConfiguration`.
    pub fn update(&self, configuration: &mut UserConfiguration) -> Result<()> {
        configuration.xml_data = Some(self.to_xml()?.into_bytes());
        Ok(())
    }
}

mod xs_date_time {
    use chrono::{DateTime, FixedOffset};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::dates::{format_xs_date_time, parse_xs_date_time};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<FixedOffset>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&format_xs_date_time(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        parse_xs_date_time(&text)
            .ok()
            .and_then(|value| value.instant())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date-time `{}`", text)))
    }
}

mod guid {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(
        value: &Option<Uuid>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&value.braced().to_string().to_uppercase()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Uuid>, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Uuid::parse_str(text.trim())
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid guid `{}`: {}", text, e)))
    }
}

mod default_category {
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(
        value: &Option<Uuid>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&value.braced().to_string().to_uppercase()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Uuid>, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Uuid::parse_str(text.trim()).ok())
    }
}
