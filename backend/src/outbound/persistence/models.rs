//! Row types for the census store. These never leave the persistence layer.

use diesel::prelude::*;
use diesel::sql_types::Text;

use crate::domain::{
    AttributeValue, Attributes, Boundary, CensusFact, CensusTopicCode, OutputArea,
    OutputAreaCode, Postcode, PostcodeRecord,
};

use super::schema::{census_data, postcode_data};

/// A `postcode_data` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = postcode_data)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostcodeRow {
    pub pcd: String,
    pub lat: f64,
    pub long: f64,
    pub oa21: String,
}

impl PostcodeRow {
    pub(crate) fn into_record(self) -> Result<PostcodeRecord, String> {
        let code = Postcode::parse(&self.pcd)
            .map_err(|err| format!("stored postcode '{}' is invalid: {err}", self.pcd))?;
        let output_area_code = OutputAreaCode::new(&self.oa21)
            .map_err(|err| format!("postcode {code} has an invalid output area: {err}"))?;
        Ok(PostcodeRecord {
            code,
            latitude: self.lat,
            longitude: self.long,
            output_area_code,
        })
    }
}

/// An `output_areas` row with its geometry rendered as GeoJSON text.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct OutputAreaRow {
    #[diesel(sql_type = Text)]
    pub oa21cd: String,
    #[diesel(sql_type = Text)]
    pub lsoa21cd: String,
    #[diesel(sql_type = Text)]
    pub lsoa21nm: String,
    #[diesel(sql_type = Text)]
    pub geometry: String,
}

impl OutputAreaRow {
    pub(crate) fn into_output_area(self) -> Result<OutputArea, String> {
        let code = OutputAreaCode::new(&self.oa21cd).map_err(|err| err.to_string())?;
        let boundary = Boundary::from_geojson_str(&self.geometry)
            .map_err(|err| format!("output area {code}: {err}"))?;
        Ok(OutputArea {
            code,
            parent_area_code: self.lsoa21cd,
            parent_area_name: self.lsoa21nm,
            boundary,
        })
    }
}

/// A `census_data` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = census_data)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CensusFactRow {
    pub id: i64,
    pub geography_code: String,
    pub census_code: String,
    pub data: serde_json::Value,
}

impl CensusFactRow {
    pub(crate) fn into_fact(self) -> Result<CensusFact, String> {
        let output_area_code =
            OutputAreaCode::new(&self.geography_code).map_err(|err| err.to_string())?;
        let topic = CensusTopicCode::new(&self.census_code).map_err(|err| err.to_string())?;
        let serde_json::Value::Object(fields) = self.data else {
            return Err(format!("census_data row {} is not a JSON object", self.id));
        };
        let attributes: Attributes = fields
            .iter()
            .map(|(key, value)| (key.clone(), AttributeValue::from_json(value)))
            .collect();
        Ok(CensusFact {
            output_area_code,
            topic,
            attributes,
        })
    }
}

/// Encode attributes as the JSON object stored in `census_data.data`.
pub(crate) fn attributes_to_json(attributes: &Attributes) -> serde_json::Value {
    serde_json::Value::Object(
        attributes
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}
