//! Census records shared by the behaviour suites.

use std::collections::BTreeMap;

use census_lookup::domain::{
    AttributeValue, Boundary, CensusFact, CensusTopicCode, OutputArea, OutputAreaCode, Postcode,
    PostcodeRecord,
};
use geo::{MultiPolygon, polygon};

pub(crate) fn area_code(raw: &str) -> OutputAreaCode {
    OutputAreaCode::new(raw).expect("area code")
}

/// Unit square with its lower-left corner at `(x, y)`.
pub(crate) fn square_area(code: &str, x: f64, y: f64) -> OutputArea {
    OutputArea {
        code: area_code(code),
        parent_area_code: "E01004736".to_owned(),
        parent_area_name: "Westminster 018C".to_owned(),
        boundary: Boundary::new(MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
            (x: x, y: y),
        ]])),
    }
}

pub(crate) fn postcode(raw: &str, area: &str) -> PostcodeRecord {
    PostcodeRecord {
        code: Postcode::parse(raw).expect("postcode"),
        latitude: 51.501,
        longitude: -0.1416,
        output_area_code: area_code(area),
    }
}

pub(crate) fn residents_fact(area: &str, topic: &str, residents: i64) -> CensusFact {
    CensusFact {
        output_area_code: area_code(area),
        topic: CensusTopicCode::new(topic).expect("topic code"),
        attributes: BTreeMap::from([
            (
                "Residents".to_owned(),
                AttributeValue::Integer(residents),
            ),
            (
                "Label".to_owned(),
                AttributeValue::Text(format!("{area} {topic}")),
            ),
        ]),
    }
}
