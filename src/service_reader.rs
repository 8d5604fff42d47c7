//! Decoding of service objects from a response document.
//!
//! [`ServiceXmlReader`] pairs a document cursor with the [`ExchangeService`] the response
//! belongs to. It reads date-time element values in the session's time zones, and decodes
//! collections of [`ServiceObject`]s, arbitrating between the kind the caller expects and the
//! kind the server reports.

use chrono::{DateTime, FixedOffset, NaiveDate};
use log::{debug, warn};

use crate::error::{Error, Result, StructuralError};
use crate::reconcile::{reconcile, TypeMatch};
use crate::service::ExchangeService;
use crate::types::{LoadOptions, ServiceObject};
use crate::xml::{describe, XmlCursor, XmlNamespace, XmlNodeType};

/// A document cursor bound to the session that issued the request.
///
/// `ServiceXmlReader` is itself an [`XmlCursor`], so population routines can use the plain
/// cursor operations on it as well as the session-aware ones below.
#[derive(Debug)]
pub struct ServiceXmlReader<'s, C> {
    cursor: C,
    service: &'s ExchangeService,
}

impl<'s, C: XmlCursor> ServiceXmlReader<'s, C> {
    /// Bind `cursor` to `service`. Pass `&mut cursor` to keep using the cursor afterwards.
    pub fn new(cursor: C, service: &'s ExchangeService) -> Self {
        ServiceXmlReader { cursor, service }
    }

    /// The session this response belongs to.
    pub fn service(&self) -> &'s ExchangeService {
        self.service
    }

    /// Gets a reference to the underlying cursor.
    pub fn get_ref(&self) -> &C {
        &self.cursor
    }

    /// Gets a mutable reference to the underlying cursor.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.cursor
    }

    /// Unwraps this reader, returning the underlying cursor.
    pub fn into_inner(self) -> C {
        self.cursor
    }

    /// Read the current element's value as an instant in the session's local time zone.
    /// An empty element yields `None`.
    pub fn read_element_value_as_date_time(&mut self) -> Result<Option<DateTime<FixedOffset>>> {
        let value = self.read_element_value()?;
        self.service.as_local_instant(&value)
    }

    /// Move to the given element and read its value as with
    /// [`read_element_value_as_date_time`](Self::read_element_value_as_date_time).
    pub fn read_element_value_as_date_time_named(
        &mut self,
        namespace: XmlNamespace,
        local_name: &str,
    ) -> Result<Option<DateTime<FixedOffset>>> {
        let value = self.read_element_value_named(namespace, local_name)?;
        self.service.as_local_instant(&value)
    }

    /// Read the current element's value as a calendar date, ignoring any offset written with
    /// it. An empty element yields `None`.
    pub fn read_element_value_as_unspecified_date(&mut self) -> Result<Option<NaiveDate>> {
        let value = self.read_element_value()?;
        self.service.as_unbiased_calendar_date(&value)
    }

    /// Read the current element's value as a wall-clock time in the service's time zone.
    /// The value is mandatory.
    pub fn read_element_value_as_unbiased_date_time_scoped_to_service_time_zone(
        &mut self,
    ) -> Result<DateTime<FixedOffset>> {
        let value = self.read_element_value()?;
        self.service.as_unbiased_instant_scoped_to_service_zone(&value)
    }

    /// Call `f` once for every child element of the current element, with the cursor on the
    /// child's start tag. Returns with the cursor on the current element's end tag.
    ///
    /// `f` should consume the child it is given; anything it leaves unread is skipped.
    pub fn read_children<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<()>,
    {
        if !self.is_start_element() {
            return Err(StructuralError::NotAtStartElement(describe(self)).into());
        }
        if self.is_empty_element() {
            return Ok(());
        }
        let depth = self.depth();
        loop {
            self.read()?;
            match self.node_type() {
                XmlNodeType::EndElement if self.depth() == depth => return Ok(()),
                XmlNodeType::StartElement if self.depth() == depth + 1 => f(self)?,
                _ => {}
            }
        }
    }

    /// Decode the children of a collection element in the `m:` namespace.
    ///
    /// See [`read_service_objects_collection_from_xml`](Self::read_service_objects_collection_from_xml).
    pub fn read_service_objects_collection<T, F>(
        &mut self,
        collection_name: &str,
        factory: F,
        options: &LoadOptions<'_>,
    ) -> Result<Vec<T>>
    where
        T: ServiceObject,
        F: FnMut(&ExchangeService, &str) -> Option<T>,
    {
        self.read_service_objects_collection_from_xml(
            XmlNamespace::Messages,
            collection_name,
            factory,
            options,
        )
    }

    /// Decode the children of the collection element `collection_namespace:collection_name`
    /// into objects, in document order.
    ///
    /// The cursor must be on the collection's start tag or immediately before it. For every
    /// child element, `factory` is asked for a blank object given the child's local name:
    ///
    ///  - if it returns `None` the child is skipped, so elements this crate does not know do
    ///    not abort the decode;
    ///  - if the child's name is not the object's [`xml_element_name`], the session must allow
    ///    compatible objects and the child must be a meeting message kind deriving from the
    ///    object's kind. The object then takes the child's name. Otherwise the decode fails with
    ///    [`Error::TypeMismatch`];
    ///  - the object loads itself with `options` and is added to the result.
    ///
    /// On success the cursor is on the collection's end tag, or on its start tag if the
    /// collection is empty.
    ///
    /// [`xml_element_name`]: ServiceObject::xml_element_name
    pub fn read_service_objects_collection_from_xml<T, F>(
        &mut self,
        collection_namespace: XmlNamespace,
        collection_name: &str,
        mut factory: F,
        options: &LoadOptions<'_>,
    ) -> Result<Vec<T>>
    where
        T: ServiceObject,
        F: FnMut(&ExchangeService, &str) -> Option<T>,
    {
        let mut objects = Vec::new();

        if !self.is_start_element_named(collection_namespace, collection_name) {
            self.read_start_element(collection_namespace, collection_name)?;
        }
        if self.is_empty_element() {
            return Ok(objects);
        }

        let depth = self.depth();
        loop {
            self.read()?;
            match self.node_type() {
                XmlNodeType::EndElement if self.depth() == depth => break,
                XmlNodeType::StartElement if self.depth() == depth + 1 => {
                    let element_name = self.local_name().to_owned();
                    match factory(self.service, &element_name) {
                        None => {
                            debug!(
                                "skipping unrecognized element <{}> in <{}>",
                                element_name, collection_name
                            );
                            self.skip_current_element()?;
                        }
                        Some(mut object) => {
                            self.process_type_match(&mut object, &element_name)?;
                            object.load_from_xml(self, options)?;
                            objects.push(object);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(objects)
    }

    fn process_type_match<T: ServiceObject>(
        &self,
        object: &mut T,
        element_name: &str,
    ) -> Result<()> {
        let allow_relaxed = self.service.read_compatible_service_object();
        match reconcile(
            element_name,
            object.xml_element_name(),
            object.object_type(),
            allow_relaxed,
        ) {
            TypeMatch::Exact => Ok(()),
            TypeMatch::Substituted(kind) => {
                debug!(
                    "reading <{}> as {} in place of {}",
                    element_name,
                    kind,
                    object.xml_element_name()
                );
                object.set_xml_element_name(element_name.to_owned());
                Ok(())
            }
            TypeMatch::Rejected => {
                warn!(
                    "server returned <{}> where <{}> was expected",
                    element_name,
                    object.xml_element_name()
                );
                Err(Error::TypeMismatch {
                    found: element_name.to_owned(),
                    expected: object.xml_element_name().to_owned(),
                })
            }
        }
    }
}

impl<C: XmlCursor> XmlCursor for ServiceXmlReader<'_, C> {
    fn read(&mut self) -> Result<()> {
        self.cursor.read()
    }

    fn node_type(&self) -> XmlNodeType {
        self.cursor.node_type()
    }

    fn local_name(&self) -> &str {
        self.cursor.local_name()
    }

    fn namespace_uri(&self) -> Option<&str> {
        self.cursor.namespace_uri()
    }

    fn depth(&self) -> usize {
        self.cursor.depth()
    }

    fn is_empty_element(&self) -> bool {
        self.cursor.is_empty_element()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.cursor.attribute(name)
    }

    fn value(&self) -> &str {
        self.cursor.value()
    }
}
