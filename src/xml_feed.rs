// XML documents published by the car park service, and their decoding
use crate::facility::District;
use crate::feed_source::{FeedError, FeedKind};
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

const ROOT_ELEMENT: &str = "CarPark";

// Both feeds share the same envelope: a CarPark root holding one
// Car_park_info element per facility, with all data carried in attributes.
#[derive(Debug, PartialEq, Default, Deserialize)]
#[serde(rename = "CarPark")]
pub struct XmlCarPark<T> {
    #[serde(rename = "Car_park_info", default = "Vec::new")]
    pub facilities: Vec<T>,
}

// Lots feed entry. ID is mandatory; the rest default to empty strings.
#[derive(Debug, PartialEq, Default, Deserialize, Clone)]
pub struct XmlLot {
    #[serde(rename = "@ID")]
    pub id: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@CP_EName", default)]
    pub name_en: String,
    #[serde(rename = "@CP_PName", default)]
    pub name_pt: String,
    #[serde(rename = "@Car_CNT", default)]
    pub car_count: String,
    #[serde(rename = "@MB_CNT", default)]
    pub motorbike_count: String,
    #[serde(rename = "@maintenance", default)]
    pub maintenance: String,
    #[serde(rename = "@time", default)]
    pub time: String,
}

// Meta feed entry
#[derive(Debug, PartialEq, Default, Deserialize, Clone)]
pub struct XmlMeta {
    #[serde(rename = "@ID")]
    pub id: String,
    #[serde(rename = "@district", default)]
    pub district: String,
    #[serde(rename = "@CP_EDistrict", default)]
    pub district_en: String,
    #[serde(rename = "@CP_PDistrict", default)]
    pub district_pt: String,
}

impl From<XmlMeta> for District {
    fn from(item: XmlMeta) -> Self {
        District {
            local: item.district,
            alt1: item.district_en,
            alt2: item.district_pt,
        }
    }
}

// serde never looks at the root tag name; an <Error> envelope must not decode as an empty list
fn check_root(xml: &str, kind: FeedKind) -> Result<(), FeedError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.name();
                if name.as_ref() == ROOT_ELEMENT.as_bytes() {
                    return Ok(());
                }
                return Err(FeedError::Parse(format!(
                    "{} feed: unexpected root element <{}>",
                    kind,
                    String::from_utf8_lossy(name.as_ref())
                )));
            }
            Ok(Event::Eof) => {
                return Err(FeedError::Parse(format!("{} feed: empty document", kind)));
            }
            Ok(_) => continue,
            Err(e) => return Err(FeedError::Parse(format!("{} feed: {}", kind, e))),
        }
    }
}

fn decode<T: DeserializeOwned>(xml: &str, kind: FeedKind) -> Result<Vec<T>, FeedError> {
    check_root(xml, kind)?;

    let document: XmlCarPark<T> =
        from_str(xml).map_err(|e| FeedError::Parse(format!("{} feed: {}", kind, e)))?;

    // A feed never legitimately publishes zero facilities
    if document.facilities.is_empty() {
        return Err(FeedError::Parse(format!(
            "{} feed: no Car_park_info entries",
            kind
        )));
    }

    Ok(document.facilities)
}

pub fn parse_lots(xml: &str) -> Result<Vec<XmlLot>, FeedError> {
    decode(xml, FeedKind::Lots)
}

// Later entries win when the meta feed repeats an ID
pub fn parse_meta(xml: &str) -> Result<HashMap<String, District>, FeedError> {
    let entries: Vec<XmlMeta> = decode(xml, FeedKind::Meta)?;

    Ok(entries
        .into_iter()
        .map(|meta| (meta.id.clone(), District::from(meta)))
        .collect())
}

// Small documents for inline testing
#[cfg(test)]
pub const SMALL_LOTS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CarPark>
  <Car_park_info ID="1" name="Central" CP_EName="Central Car Park" CP_PName="Parque Central" Car_CNT="10" MB_CNT="5" maintenance="0" time="2024-03-01 10:00:00"/>
  <Car_park_info ID="2" name="North" CP_EName="North Car Park" CP_PName="Parque Norte" Car_CNT="3" MB_CNT="0" maintenance="1" time="2024-03-01 10:00:00"/>
</CarPark>
"#;

#[cfg(test)]
pub const SMALL_META_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CarPark>
  <Car_park_info ID="1" district="DownTown" CP_EDistrict="Downtown" CP_PDistrict="Baixa"/>
</CarPark>
"#;
