use base64::Engine;
use log::debug;

use super::folder::WellKnownFolderName;
use super::property::ServiceId;
use super::{LoadOptions, ServiceObject, ServiceObjectType};
use crate::error::{ParseError, Result};
use crate::service_reader::ServiceXmlReader;
use crate::xml::XmlCursor;

/// A named configuration object stored in a folder, as returned by `GetUserConfiguration`.
///
/// Only the XML and binary payloads are read; dictionary entries are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserConfiguration {
    /// Name of the configuration object.
    pub name: String,
    /// The well-known folder the object is stored in, if it was addressed that way.
    pub parent_folder: Option<String>,
    pub item_id: Option<ServiceId>,
    pub xml_data: Option<Vec<u8>>,
    pub binary_data: Option<Vec<u8>>,
}

impl UserConfiguration {
    /// A configuration object named `name` in the given folder.
    pub fn new(name: impl Into<String>, parent_folder: WellKnownFolderName) -> Self {
        UserConfiguration {
            name: name.into(),
            parent_folder: Some(parent_folder.as_str().to_owned()),
            ..UserConfiguration::default()
        }
    }

    fn read_name<C: XmlCursor>(&mut self, reader: &mut ServiceXmlReader<'_, C>) -> Result<()> {
        self.name = reader.read_attribute_value("Name").unwrap_or_default();
        let mut parent_folder = None;
        reader.read_children(|reader| {
            if reader.local_name() == "DistinguishedFolderId" {
                parent_folder = reader.read_attribute_value("Id");
            }
            reader.skip_current_element()
        })?;
        if parent_folder.is_some() {
            self.parent_folder = parent_folder;
        }
        Ok(())
    }
}

fn read_base64<C: XmlCursor>(reader: &mut C) -> Result<Vec<u8>> {
    let text = reader.read_element_value()?;
    Ok(base64::engine::general_purpose::STANDARD
        .decode(text.trim())
        .map_err(ParseError::from)?)
}

impl ServiceObject for UserConfiguration {
    fn object_type(&self) -> ServiceObjectType {
        ServiceObjectType::UserConfiguration
    }

    fn xml_element_name(&self) -> &str {
        ServiceObjectType::UserConfiguration.xml_element_name()
    }

    fn set_xml_element_name(&mut self, name: String) {
        debug!("user configurations are never substituted, ignoring <{}>", name);
    }

    fn load_from_xml<C: XmlCursor>(
        &mut self,
        reader: &mut ServiceXmlReader<'_, C>,
        options: &LoadOptions<'_>,
    ) -> Result<()> {
        if options.clear_property_bag {
            let name = std::mem::take(&mut self.name);
            let parent_folder = self.parent_folder.take();
            *self = UserConfiguration {
                name,
                parent_folder,
                ..UserConfiguration::default()
            };
        }
        reader.read_children(|reader| {
            let element = reader.local_name().to_owned();
            match element.as_str() {
                "UserConfigurationName" => self.read_name(reader)?,
                "ItemId" => self.item_id = Some(ServiceId::load_from_xml(reader)?),
                "XmlData" => self.xml_data = Some(read_base64(reader)?),
                "BinaryData" => self.binary_data = Some(read_base64(reader)?),
                _ => {
                    debug!("skipping <{}> in user configuration", element);
                    reader.skip_current_element()?
                }
            }
            Ok(())
        })
    }
}
