//! The session context a response is decoded in, and its builder.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

use crate::credentials::Credentials;
use crate::dates::{self, TimeZoneResolver};
use crate::error::Result;

/// The session context that response decoding runs against.
///
/// An `ExchangeService` carries the settings that change how a response is interpreted: the
/// time zones that date-time values are expressed in, and whether the server may substitute a
/// more specific type for the one that was asked for. Build one with
/// [`ExchangeServiceBuilder`]:
///
/// ```
/// # use ews_reader::ExchangeServiceBuilder;
/// let service = ExchangeServiceBuilder::new()
///     .time_zone(chrono::Utc)
///     .read_compatible_service_object(true)
///     .build();
/// assert!(service.read_compatible_service_object());
/// ```
pub struct ExchangeService {
    time_zone: Arc<dyn TimeZoneResolver>,
    local_time_zone: Arc<dyn TimeZoneResolver>,
    read_compatible_service_object: bool,
    credentials: Option<Mutex<Box<dyn Credentials>>>,
}

impl ExchangeService {
    /// A service with default settings: both time zones are the system's local time zone and
    /// type substitution is not allowed.
    pub fn new() -> Self {
        ExchangeServiceBuilder::new().build()
    }

    /// The time zone of the mailbox the service talks to.
    pub fn time_zone(&self) -> &dyn TimeZoneResolver {
        &*self.time_zone
    }

    /// The time zone that instants are presented in.
    pub fn local_time_zone(&self) -> &dyn TimeZoneResolver {
        &*self.local_time_zone
    }

    /// Whether a collection may contain meeting messages of a more specific type than the one
    /// requested.
    pub fn read_compatible_service_object(&self) -> bool {
        self.read_compatible_service_object
    }

    /// Run the session's credentials, if any, over an outbound request.
    pub fn prepare_web_request(&self, request: &mut dyn crate::WebRequest) -> Result<()> {
        if let Some(credentials) = &self.credentials {
            let mut credentials = credentials.lock().unwrap_or_else(|e| e.into_inner());
            credentials.prepare_web_request(request)?;
        }
        Ok(())
    }

    /// See [`dates::as_local_instant`]; instants are expressed in the local time zone.
    pub fn as_local_instant(&self, text: &str) -> Result<Option<DateTime<FixedOffset>>> {
        dates::as_local_instant(text, self.local_time_zone())
    }

    /// See [`dates::as_unbiased_calendar_date`].
    pub fn as_unbiased_calendar_date(&self, text: &str) -> Result<Option<NaiveDate>> {
        dates::as_unbiased_calendar_date(text)
    }

    /// See [`dates::as_unbiased_instant_in_zone`]; the wall clock is the mailbox's.
    pub fn as_unbiased_instant_scoped_to_service_zone(
        &self,
        text: &str,
    ) -> Result<DateTime<FixedOffset>> {
        dates::as_unbiased_instant_in_zone(text, self.time_zone())
    }
}

impl Default for ExchangeService {
    fn default() -> Self {
        ExchangeService::new()
    }
}

impl fmt::Debug for ExchangeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeService")
            .field("time_zone", &self.time_zone)
            .field("local_time_zone", &self.local_time_zone)
            .field(
                "read_compatible_service_object",
                &self.read_compatible_service_object,
            )
            .field("credentials", &self.credentials.is_some())
            .finish()
    }
}

/// A convenience builder for [`ExchangeService`] structs.
///
/// ```
/// # use ews_reader::{ExchangeServiceBuilder, OAuthCredentials};
/// # fn main() -> Result<(), ews_reader::Error> {
/// let offset = chrono::FixedOffset::east_opt(3600).unwrap();
/// let service = ExchangeServiceBuilder::new()
///     .time_zone(offset)
///     .local_time_zone(chrono::Utc)
///     .credentials(OAuthCredentials::new("token")?)
///     .build();
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ExchangeServiceBuilder {
    time_zone: Option<Arc<dyn TimeZoneResolver>>,
    local_time_zone: Option<Arc<dyn TimeZoneResolver>>,
    read_compatible_service_object: bool,
    credentials: Option<Box<dyn Credentials>>,
}

impl ExchangeServiceBuilder {
    /// Make a new `ExchangeServiceBuilder` with default settings.
    pub fn new() -> Self {
        ExchangeServiceBuilder::default()
    }

    /// Time zone of the mailbox. Defaults to the system's local time zone.
    pub fn time_zone<Tz: TimeZoneResolver + 'static>(mut self, time_zone: Tz) -> Self {
        self.time_zone = Some(Arc::new(time_zone));
        self
    }

    /// Time zone that instants are presented in. Defaults to the system's local time zone.
    pub fn local_time_zone<Tz: TimeZoneResolver + 'static>(mut self, time_zone: Tz) -> Self {
        self.local_time_zone = Some(Arc::new(time_zone));
        self
    }

    /// Allow the server to report a meeting message under a more specific type than the one
    /// requested. Off by default.
    pub fn read_compatible_service_object(mut self, allow: bool) -> Self {
        self.read_compatible_service_object = allow;
        self
    }

    /// Credentials used to prepare outbound requests.
    pub fn credentials<C: Credentials + 'static>(mut self, credentials: C) -> Self {
        self.credentials = Some(Box::new(credentials));
        self
    }

    /// Return the configured [`ExchangeService`].
    pub fn build(self) -> ExchangeService {
        ExchangeService {
            time_zone: self.time_zone.unwrap_or_else(|| Arc::new(Local)),
            local_time_zone: self.local_time_zone.unwrap_or_else(|| Arc::new(Local)),
            read_compatible_service_object: self.read_compatible_service_object,
            credentials: self.credentials.map(Mutex::new),
        }
    }
}
