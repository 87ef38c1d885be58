//! Hand-written VOEvent 2.0 packet parser.
//!
//! Pulls the packet apart into the handful of shapes ingestion cares
//! about: root attributes, dotted-path element texts, grouped `<Param>`
//! elements, the observation coordinates, and the citation block. The
//! full document is also retained verbatim.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// One `<Param>` element: its value and free-text description.
#[derive(Debug, Default, Clone)]
pub(crate) struct Param {
  pub value:       Option<String>,
  pub description: Option<String>,
}

/// A decoded VOEvent packet.
#[derive(Debug)]
pub struct VoEvent {
  pub(crate) raw:           String,
  /// Attributes of the `<VOEvent>` root, e.g. `ivorn` and `role`.
  pub(crate) attributes:    BTreeMap<String, String>,
  /// First text content per dotted element path, root excluded.
  pub(crate) texts:         BTreeMap<String, String>,
  /// `<Param>` elements keyed by `(group, name)`; ungrouped params use an
  /// empty group name.
  pub(crate) params:        BTreeMap<(String, String), Param>,
  pub(crate) iso_time:      Option<String>,
  pub(crate) position_unit: Option<String>,
  pub(crate) c1:            Option<String>,
  pub(crate) c2:            Option<String>,
  pub(crate) error_radius:  Option<String>,
  pub(crate) importance:    Option<f64>,
  /// `(cite relation, cited ivorn)` from `<Citations><EventIVORN>`.
  pub(crate) cited:         Option<(String, Option<String>)>,
}

impl VoEvent {
  /// Parse a VOEvent packet from its XML text.
  pub fn parse(xml: &str) -> Result<Self> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut event = VoEvent {
      raw:           xml.to_owned(),
      attributes:    BTreeMap::new(),
      texts:         BTreeMap::new(),
      params:        BTreeMap::new(),
      iso_time:      None,
      position_unit: None,
      c1:            None,
      c2:            None,
      error_radius:  None,
      importance:    None,
      cited:         None,
    };

    let mut seen_root = false;
    // Element path from the root down, root itself excluded.
    let mut stack: Vec<String> = Vec::new();
    let mut current_group: Option<String> = None;
    let mut current_param: Option<(String, String)> = None;

    loop {
      match reader.read_event() {
        Ok(Event::Start(ref e)) => {
          let local = local_string(e.name().as_ref());
          if !seen_root {
            if local != "VOEvent" {
              return Err(Error::NotVoEvent);
            }
            event.attributes = attr_map(e)?;
            seen_root = true;
            continue;
          }
          event.open_element(
            &local,
            e,
            &mut current_group,
            &mut current_param,
          )?;
          stack.push(local);
        }
        Ok(Event::Empty(ref e)) => {
          let local = local_string(e.name().as_ref());
          if !seen_root {
            if local != "VOEvent" {
              return Err(Error::NotVoEvent);
            }
            event.attributes = attr_map(e)?;
            seen_root = true;
            continue;
          }
          event.open_element(
            &local,
            e,
            &mut current_group,
            &mut current_param,
          )?;
          // An empty param has no description child to wait for.
          if local == "Param" {
            current_param = None;
          }
        }
        Ok(Event::Text(ref e)) => {
          let text = e
            .unescape()
            .map_err(|e| Error::Xml(e.to_string()))?
            .trim()
            .to_owned();
          if text.is_empty() {
            continue;
          }
          event.record_text(&stack, &current_param, text);
        }
        Ok(Event::End(ref e)) => {
          let local = local_string(e.name().as_ref());
          if stack.last() == Some(&local) {
            stack.pop();
          }
          match local.as_str() {
            "Group" => current_group = None,
            "Param" => current_param = None,
            _ => {}
          }
        }
        Ok(Event::Eof) => break,
        Err(e) => return Err(Error::Xml(e.to_string())),
        _ => {}
      }
    }

    if !seen_root {
      return Err(Error::NotVoEvent);
    }
    if !event.attributes.contains_key("ivorn") {
      return Err(Error::MissingIvorn);
    }
    Ok(event)
  }

  fn open_element(
    &mut self,
    local: &str,
    e: &BytesStart<'_>,
    current_group: &mut Option<String>,
    current_param: &mut Option<(String, String)>,
  ) -> Result<()> {
    match local {
      "Group" => {
        let attrs = attr_map(e)?;
        *current_group = attrs.get("name").cloned();
      }
      "Param" => {
        let mut attrs = attr_map(e)?;
        if let Some(name) = attrs.remove("name") {
          let key =
            (current_group.clone().unwrap_or_default(), name.clone());
          let param = self.params.entry(key.clone()).or_default();
          param.value = attrs.remove("value");
          *current_param = Some(key);
        }
      }
      "Position2D" => {
        let attrs = attr_map(e)?;
        self.position_unit = attrs.get("unit").cloned();
      }
      "Why" => {
        let attrs = attr_map(e)?;
        self.importance =
          attrs.get("importance").and_then(|v| v.parse().ok());
      }
      "EventIVORN" => {
        let attrs = attr_map(e)?;
        if let Some(cite) = attrs.get("cite") {
          self.cited = Some((cite.clone(), None));
        }
      }
      _ => {}
    }
    Ok(())
  }

  fn record_text(
    &mut self,
    stack: &[String],
    current_param: &Option<(String, String)>,
    text: String,
  ) {
    match stack.last().map(String::as_str) {
      Some("ISOTime") => self.iso_time = Some(text.clone()),
      Some("C1") => self.c1 = Some(text.clone()),
      Some("C2") => self.c2 = Some(text.clone()),
      Some("Error2Radius") => self.error_radius = Some(text.clone()),
      Some("EventIVORN") => {
        if let Some((_, ivorn @ None)) = &mut self.cited {
          *ivorn = Some(text.clone());
        }
      }
      Some("Description") => {
        if let Some(key) = current_param
          && let Some(param) = self.params.get_mut(key)
        {
          param.description = Some(text.clone());
        }
      }
      _ => {}
    }
    self.texts.entry(stack.join(".")).or_insert(text);
  }

  pub(crate) fn param(&self, group: &str, name: &str) -> Option<&Param> {
    self.params.get(&(group.to_owned(), name.to_owned()))
  }
}

fn attr_map(e: &BytesStart<'_>) -> Result<BTreeMap<String, String>> {
  let mut map = BTreeMap::new();
  for attr in e.attributes() {
    let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
    let key = local_string(attr.key.as_ref());
    let value = attr
      .unescape_value()
      .map_err(|e| Error::Xml(e.to_string()))?
      .into_owned();
    map.insert(key, value);
  }
  Ok(map)
}

fn local_string(name: &[u8]) -> String {
  // strip "prefix:" if present
  let local = if let Some(pos) = name.iter().rposition(|&b| b == b':') {
    &name[pos + 1..]
  } else {
    name
  };
  String::from_utf8_lossy(local).into_owned()
}
