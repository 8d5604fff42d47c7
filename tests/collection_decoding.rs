use std::io;

use chrono::{Duration, NaiveDate, Timelike, Utc};

use ews_reader::{
    dates, item_from_xml_element_name, Error, EwsXmlReader, ExchangeService,
    ExchangeServiceBuilder, FindItemsResults, Item, LoadOptions, ServiceObject,
    ServiceObjectType, ServiceXmlReader, XmlCursor, XmlNamespace,
};

const FIND_ITEM_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Header>
    <h:ServerVersionInfo MajorVersion="15" MinorVersion="20" MajorBuildNumber="7" MinorBuildNumber="0"
        xmlns:h="http://schemas.microsoft.com/exchange/services/2006/types"/>
  </s:Header>
  <s:Body>
    <m:FindItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
        xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
      <m:ResponseMessages>
        <m:FindItemResponseMessage ResponseClass="Success">
          <m:ResponseCode>NoError</m:ResponseCode>
          <m:RootFolder IndexedPagingOffset="4" TotalItemsInView="9" IncludesLastItemInRange="false">
            <t:Items>
              <t:Message>
                <t:ItemId Id="AAMkADE=" ChangeKey="CQAAABYA"/>
                <t:Subject>Quarterly report</t:Subject>
                <t:DateTimeReceived>2024-03-01T09:30:00Z</t:DateTimeReceived>
                <t:IsRead>true</t:IsRead>
              </t:Message>
              <t:MeetingRequest>
                <t:ItemId Id="AAMkADI="/>
                <t:Subject>Planning</t:Subject>
              </t:MeetingRequest>
              <t:HolographicNote>
                <t:ItemId Id="AAMkADM="/>
                <t:Subject>from a newer server</t:Subject>
              </t:HolographicNote>
              <t:CalendarItem>
                <t:ItemId Id="AAMkADQ="/>
                <t:Subject>Offsite</t:Subject>
                <t:Start>2024-03-04T00:00:00+05:00</t:Start>
                <t:IsAllDayEvent>true</t:IsAllDayEvent>
              </t:CalendarItem>
            </t:Items>
          </m:RootFolder>
        </m:FindItemResponseMessage>
      </m:ResponseMessages>
    </m:FindItemResponse>
  </s:Body>
</s:Envelope>"#;

fn service(relaxed: bool) -> ExchangeService {
    ExchangeServiceBuilder::new()
        .time_zone(Utc)
        .local_time_zone(Utc)
        .read_compatible_service_object(relaxed)
        .build()
}

fn wrap(children: &str) -> String {
    format!(
        r#"<m:Items xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
                    xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">{}</m:Items>"#,
        children
    )
}

fn decode_with<F>(service: &ExchangeService, doc: &str, factory: F) -> Result<Vec<Item>, Error>
where
    F: FnMut(&ExchangeService, &str) -> Option<Item>,
{
    let mut reader = ServiceXmlReader::new(EwsXmlReader::from_str(doc), service);
    reader.read_service_objects_collection("Items", factory, &LoadOptions::default())
}

fn meeting_message(_: &ExchangeService, _: &str) -> Option<Item> {
    Some(Item::new(ServiceObjectType::MeetingMessage))
}

#[test]
fn find_item_response() {
    let service = service(false);
    let mut reader = ServiceXmlReader::new(EwsXmlReader::from_str(FIND_ITEM_RESPONSE), &service);
    for (namespace, name) in [
        (XmlNamespace::Soap, "Envelope"),
        (XmlNamespace::Soap, "Header"),
    ] {
        reader.read_start_element(namespace, name).unwrap();
    }
    reader.read().unwrap();
    reader.skip_current_element().unwrap();
    reader.read_end_element(XmlNamespace::Soap, "Header").unwrap();
    reader.read_start_element(XmlNamespace::Soap, "Body").unwrap();
    reader
        .read_start_element(XmlNamespace::Messages, "FindItemResponse")
        .unwrap();
    reader
        .read_start_element(XmlNamespace::Messages, "ResponseMessages")
        .unwrap();
    reader
        .read_start_element(XmlNamespace::Messages, "FindItemResponseMessage")
        .unwrap();
    assert_eq!(reader.attribute("ResponseClass"), Some("Success"));
    let code = reader
        .read_element_value_named(XmlNamespace::Messages, "ResponseCode")
        .unwrap();
    assert_eq!(code, "NoError");

    let results = FindItemsResults::load_from_xml(&mut reader, &LoadOptions::default()).unwrap();
    assert_eq!(results.total_count, 9);
    assert_eq!(results.next_page_offset, Some(4));

    let subjects: Vec<_> = results.iter().filter_map(Item::subject).collect();
    assert_eq!(subjects, ["Quarterly report", "Planning", "Offsite"]);
    assert_eq!(results[0].is_read(), Some(true));
    assert_eq!(results[0].date_time_received().map(|t| t.hour()), Some(9));
    assert_eq!(results[1].object_type(), ServiceObjectType::MeetingRequest);
    assert_eq!(results[2].is_all_day_event(), Some(true));
    assert_eq!(results[2].start().map(|t| t.hour()), Some(19));

    // the decoder leaves the cursor where the next reader expects it
    reader
        .read_end_element(XmlNamespace::Messages, "FindItemResponseMessage")
        .unwrap();
}

#[test]
fn order_and_count_follow_recognized_children() {
    let doc = wrap(
        "<t:Message><t:Subject>1</t:Subject></t:Message>\
         <t:Unknown><t:Subject>x</t:Subject></t:Unknown>\
         <t:Task><t:Subject>2</t:Subject></t:Task>\
         <t:Unknown/>\
         <t:Contact><t:Subject>3</t:Subject></t:Contact>",
    );
    let items = decode_with(&service(false), &doc, item_from_xml_element_name).unwrap();
    let subjects: Vec<_> = items.iter().filter_map(Item::subject).collect();
    assert_eq!(subjects, ["1", "2", "3"]);
}

#[test]
fn empty_wrapper_is_empty_sequence() {
    let doc = r#"<m:Items xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"/>"#;
    let items = decode_with(&service(true), doc, item_from_xml_element_name).unwrap();
    assert!(items.is_empty());
}

#[test]
fn factory_is_asked_with_each_child_name() {
    let doc = wrap("<t:Message/><t:Futuristic/><t:PostItem/>");
    let mut seen = Vec::new();
    let items = decode_with(&service(false), &doc, |service, name| {
        seen.push(name.to_owned());
        item_from_xml_element_name(service, name)
    })
    .unwrap();
    assert_eq!(seen, ["Message", "Futuristic", "PostItem"]);
    assert_eq!(items.len(), 2);
}

#[test]
fn strict_session_rejects_substitutes() {
    let doc = wrap("<t:MeetingCancellation/>");
    match decode_with(&service(false), &doc, meeting_message) {
        Err(Error::TypeMismatch { found, expected }) => {
            assert_eq!(found, "MeetingCancellation");
            assert_eq!(expected, "MeetingMessage");
        }
        other => panic!("expected a type mismatch, got {:?}", other),
    }
}

#[test]
fn relaxed_session_accepts_meeting_kinds() {
    let doc = wrap(
        "<t:MeetingCancellation><t:Subject>off</t:Subject></t:MeetingCancellation>\
         <t:MeetingResponse/>",
    );
    let items = decode_with(&service(true), &doc, meeting_message).unwrap();
    assert_eq!(items[0].xml_element_name(), "MeetingCancellation");
    assert_eq!(items[0].subject(), Some("off"));
    assert_eq!(items[1].xml_element_name(), "MeetingResponse");

    let doc = wrap("<t:SomeUnknownType/>");
    assert!(matches!(
        decode_with(&service(true), &doc, meeting_message),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn relaxed_session_still_requires_assignability() {
    let doc = wrap("<t:MeetingCancellation/>");
    let factory = |_: &ExchangeService, _: &str| Some(Item::new(ServiceObjectType::MeetingRequest));
    assert!(matches!(
        decode_with(&service(true), &doc, factory),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn calendar_dates_ignore_offsets_but_instants_do_not() {
    let plain = "2024-01-01T00:00:00";
    let biased = "2024-01-01T00:00:00+05:00";

    assert_eq!(
        dates::as_unbiased_calendar_date(plain).unwrap(),
        dates::as_unbiased_calendar_date(biased).unwrap()
    );
    assert_eq!(
        dates::as_unbiased_calendar_date(plain).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 1)
    );

    let service = service(false);
    let plain = service.as_local_instant(plain).unwrap().unwrap();
    let biased = service.as_local_instant(biased).unwrap().unwrap();
    assert_eq!(plain - biased, Duration::hours(5));
}

#[test]
fn decode_never_rewinds() {
    let doc = r#"<m:Response xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"
                             xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
          <m:Items><t:Message/></m:Items>
          <m:After>tail</m:After>
        </m:Response>"#;
    let service = service(false);
    let mut reader = ServiceXmlReader::new(EwsXmlReader::from_str(doc), &service);
    reader.read().unwrap();
    let items = reader
        .read_service_objects_collection(
            "Items",
            item_from_xml_element_name,
            &LoadOptions::default(),
        )
        .unwrap();
    assert_eq!(items.len(), 1);
    assert!(reader.is_end_element(XmlNamespace::Messages, "Items"));
    assert_eq!(
        reader
            .read_element_value_named(XmlNamespace::Messages, "After")
            .unwrap(),
        "tail"
    );
}

#[test]
fn failed_decode_reports_population_errors() {
    let doc = wrap("<t:Message><t:IsRead>maybe</t:IsRead></t:Message>");
    assert!(matches!(
        decode_with(&service(false), &doc, item_from_xml_element_name),
        Err(Error::Parse(_))
    ));
}

#[test]
fn malformed_dates_fail_the_decode() {
    let doc = wrap(
        "<t:Message>\
           <t:DateTimeReceived>2024-01-01T00:00:00+0\u{0665}:00</t:DateTimeReceived>\
         </t:Message>",
    );
    assert!(matches!(
        decode_with(&service(false), &doc, item_from_xml_element_name),
        Err(Error::Parse(_))
    ));
}

/// A message type whose population refuses elements flagged as blocked.
#[derive(Debug)]
struct Screened(String);

impl ServiceObject for Screened {
    fn object_type(&self) -> ServiceObjectType {
        ServiceObjectType::EmailMessage
    }

    fn xml_element_name(&self) -> &str {
        &self.0
    }

    fn set_xml_element_name(&mut self, name: String) {
        self.0 = name;
    }

    fn load_from_xml<C: XmlCursor>(
        &mut self,
        reader: &mut ServiceXmlReader<'_, C>,
        _: &LoadOptions<'_>,
    ) -> ews_reader::Result<()> {
        if reader.attribute("Blocked") == Some("true") {
            let error = io::Error::new(io::ErrorKind::InvalidData, "blocked by policy");
            return Err(Error::Population(Box::new(error)));
        }
        reader.skip_current_element()
    }
}

#[test]
fn population_errors_abort_the_decode() {
    let doc = wrap(r#"<t:Message/><t:Message Blocked="true"/><t:Message/>"#);
    let service = service(false);
    let mut created = 0;
    let mut reader = ServiceXmlReader::new(EwsXmlReader::from_str(&doc), &service);
    let result = reader.read_service_objects_collection(
        "Items",
        |_, name| {
            created += 1;
            Some(Screened(name.to_owned()))
        },
        &LoadOptions::default(),
    );

    match result {
        Err(Error::Population(source)) => {
            let source = source.downcast_ref::<io::Error>().unwrap();
            assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            assert_eq!(source.to_string(), "blocked by policy");
        }
        other => panic!("expected a population error, got {:?}", other),
    }
    assert_eq!(created, 2);
}
