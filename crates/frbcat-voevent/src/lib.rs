//! VOEvent 2.0 packet decoding for the FRB catalog.
//!
//! [`VoEvent::parse`] decodes a packet; the result implements
//! [`frbcat_core::notice::NoticeSource`], so the core plan builder can
//! consume it without knowing anything about XML.

pub mod error;
mod parse;
mod source;

pub use error::{Error, Result};
pub use parse::VoEvent;

#[cfg(test)]
mod tests {
  use frbcat_core::{
    catalog::Table,
    event::EventType,
    mapping::Mapping,
    notice::{ColumnValue, NoticeSource, PositionCoord},
    plan::build_plan,
  };

  use super::*;

  const DETECTION: &str = r#"<?xml version="1.0" ?>
<voe:VOEvent xmlns:voe="http://www.ivoa.net/xml/VOEvent/v2.0"
    ivorn="ivo://au.csiro.parkes/frb#FRB140514_2014-05-14_17:14:11.06"
    role="observation" version="2.0">
  <Who>
    <AuthorIVORN>ivo://au.csiro.parkes.superb#</AuthorIVORN>
    <Date>2014-05-14T17:32:00</Date>
    <Author>
      <title>SUPERB survey</title>
      <shortName>SUPERB</shortName>
      <contactName>Emily Petroff</contactName>
      <contactEmail>epetroff@astron.nl</contactEmail>
    </Author>
  </Who>
  <What>
    <Group name="observatory parameters">
      <Param name="telescope" value="PARKES"/>
      <Param name="beam" value="13" unit="beam number">
        <Description>FWHM of the beam is 14.1 arcmin</Description>
      </Param>
      <Param name="sampling_time" value="0.064" unit="ms"/>
      <Param name="bandwidth" value="400.0" unit="MHz"/>
      <Param name="centre_frequency" value="1382.0" unit="MHz"/>
      <Param name="npol" value="2"/>
      <Param name="bits_per_sample" value="2"/>
      <Param name="gain" value="0.735" unit="K/Jy"/>
      <Param name="tsys" value="28.0" unit="K"/>
      <Param name="backend" value="BPSR"/>
    </Group>
    <Group name="event parameters">
      <Param name="name" value="FRB140514"/>
      <Param name="dm" value="562.7" unit="cm^-3 pc"/>
      <Param name="snr" value="16"/>
      <Param name="width" value="2.8" unit="ms"/>
    </Group>
    <Group name="advanced parameters">
      <Param name="scattering_time" value="5.4" unit="ms"/>
    </Group>
  </What>
  <WhereWhen>
    <ObsDataLocation>
      <ObservationLocation>
        <AstroCoords coord_system_id="UTC-FK5-GEO">
          <Time unit="s">
            <TimeInstant>
              <ISOTime>2014-05-14T17:14:11.06</ISOTime>
            </TimeInstant>
          </Time>
          <Position2D unit="deg">
            <Name1>RA</Name1>
            <Name2>Dec</Name2>
            <Value2>
              <C1>50.8</C1>
              <C2>-4.5</C2>
            </Value2>
            <Error2Radius>0.1175</Error2Radius>
          </Position2D>
        </AstroCoords>
      </ObservationLocation>
    </ObsDataLocation>
  </WhereWhen>
  <Why importance="0.98">
    <Description>FRB detected in real time</Description>
  </Why>
</voe:VOEvent>"#;

  const RETRACTION: &str = r#"<?xml version="1.0" ?>
<voe:VOEvent xmlns:voe="http://www.ivoa.net/xml/VOEvent/v2.0"
    ivorn="ivo://au.csiro.parkes/frb#FRB140514_retraction"
    role="observation" version="2.0">
  <Who>
    <AuthorIVORN>ivo://au.csiro.parkes.superb#</AuthorIVORN>
    <Date>2014-05-15T09:00:00</Date>
  </Who>
  <What/>
  <Citations>
    <EventIVORN cite="retraction">ivo://au.csiro.parkes/frb#FRB140514_2014-05-14_17:14:11.06</EventIVORN>
  </Citations>
</voe:VOEvent>"#;

  #[test]
  fn detection_packet_decodes() {
    let event = VoEvent::parse(DETECTION).unwrap();

    assert_eq!(
      event.attribute("ivorn").as_deref(),
      Some("ivo://au.csiro.parkes/frb#FRB140514_2014-05-14_17:14:11.06")
    );
    assert_eq!(
      event.param_value("event parameters", "name").as_deref(),
      Some("FRB140514")
    );
    assert_eq!(
      event.param_value("event parameters", "dm").as_deref(),
      Some("562.7")
    );
    assert_eq!(
      event
        .param_description("observatory parameters", "beam")
        .as_deref(),
      Some("FWHM of the beam is 14.1 arcmin")
    );
    assert_eq!(event.importance(), Some(0.98));
    assert!(event.citation().is_none());
    assert_eq!(event.raw_document(), DETECTION);
  }

  #[test]
  fn timestamps_are_normalised() {
    let event = VoEvent::parse(DETECTION).unwrap();
    assert_eq!(
      event.iso_timestamp().as_deref(),
      Some("2014-05-14 17:14:11")
    );
    assert_eq!(
      event.author_timestamp("Who.Date").as_deref(),
      Some("2014-05-14 17:32:00")
    );
  }

  #[test]
  fn authorship_paths_resolve() {
    let event = VoEvent::parse(DETECTION).unwrap();
    assert_eq!(
      event.document("Who.AuthorIVORN").as_deref(),
      Some("ivo://au.csiro.parkes.superb#")
    );
    assert_eq!(
      event.document("Who.Author.contactName").as_deref(),
      Some("Emily Petroff")
    );
    assert!(event.document("Who.Author.logoURL").is_none());
  }

  #[test]
  fn degree_positions_convert_to_sexagesimal() {
    let event = VoEvent::parse(DETECTION).unwrap();
    assert_eq!(
      event.position(PositionCoord::Ra),
      Some(ColumnValue::Text("50:48:0".to_owned()))
    );
    assert_eq!(
      event.position(PositionCoord::Dec),
      Some(ColumnValue::Text("-4:30:0".to_owned()))
    );
    assert_eq!(
      event.position(PositionCoord::Err),
      Some(ColumnValue::Real(0.1175))
    );
  }

  #[test]
  fn retraction_packet_carries_its_citation() {
    let event = VoEvent::parse(RETRACTION).unwrap();
    let citation = event.citation().unwrap();
    assert_eq!(citation.relation, "retraction");
    assert_eq!(
      citation.ivorn.as_deref(),
      Some("ivo://au.csiro.parkes/frb#FRB140514_2014-05-14_17:14:11.06")
    );
  }

  #[test]
  fn detection_builds_a_complete_plan() {
    let event = VoEvent::parse(DETECTION).unwrap();
    let plan = build_plan(&event, &Mapping::builtin()).unwrap();
    assert_eq!(plan.event_type, EventType::New);

    let frbs = plan.table(Table::Frbs);
    assert_eq!(
      frbs.value("utc"),
      Some(&ColumnValue::Text("2014-05-14 17:14:11".to_owned()))
    );

    let obs = plan.table(Table::Observations);
    assert_eq!(obs.value("verified"), Some(&ColumnValue::Bool(true)));

    let rop = plan.table(Table::RadioObservationsParams);
    assert_eq!(
      rop.value("raj"),
      Some(&ColumnValue::Text("50:48:0".to_owned()))
    );
    assert_eq!(rop.notes.len(), 1);
    assert_eq!(rop.notes[0].note, "[beam] FWHM of the beam is 14.1 arcmin");
    assert_eq!(
      rop.notes[0].last_modified.as_deref(),
      Some("2014-05-14 17:32:00")
    );

    let rmp = plan.table(Table::RadioMeasuredParams);
    assert_eq!(rmp.value("dm"), Some(&ColumnValue::Real(562.7)));
    assert!(rmp.value("voevent_xml").is_some());
  }

  #[test]
  fn retraction_builds_a_retraction_plan() {
    let event = VoEvent::parse(RETRACTION).unwrap();
    let plan = build_plan(&event, &Mapping::builtin()).unwrap();
    assert_eq!(plan.event_type, EventType::Retraction);
    assert_eq!(
      plan.citation.as_deref(),
      Some("ivo://au.csiro.parkes/frb#FRB140514_2014-05-14_17:14:11.06")
    );
  }

  #[test]
  fn non_voevent_roots_are_rejected() {
    assert!(matches!(
      VoEvent::parse("<html><body/></html>"),
      Err(Error::NotVoEvent)
    ));
  }

  #[test]
  fn packets_without_an_ivorn_are_rejected() {
    let xml = r#"<VOEvent role="observation" version="2.0"><What/></VOEvent>"#;
    assert!(matches!(VoEvent::parse(xml), Err(Error::MissingIvorn)));
  }
}
