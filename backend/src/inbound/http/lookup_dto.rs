//! Response bodies for postcode lookups.
//!
//! The domain result carries codes only. This module adds the presentation
//! layer's view of it: topic titles, the highlighted output area, a GeoJSON
//! map layer and one chart series per table.

use std::collections::BTreeMap;

use geojson::{Feature, FeatureCollection, JsonObject};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CensusTable, Error, LookupResult, OutputArea, OutputAreaCode, PostcodeRecord, topic_title,
};

/// Query parameters for the lookup endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LookupParams {
    /// Output area to highlight. Defaults to the postcode's own area.
    #[param(example = "E00000002")]
    pub selected: Option<String>,
}

/// The output area highlighted in tables and on the map.
///
/// Always a member of the neighbourhood being presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(OutputAreaCode);

impl Selection {
    /// Resolve the requested selection against a lookup result.
    ///
    /// A missing or blank request selects the postcode's own area. A code
    /// outside the neighbourhood is rejected.
    pub fn resolve(requested: Option<&str>, result: &LookupResult) -> Result<Self, Error> {
        let origin = result.neighbourhood.origin();
        let Some(raw) = requested.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Self(origin.clone()));
        };
        OutputAreaCode::new(raw)
            .ok()
            .filter(|code| result.neighbourhood.contains(code))
            .map(Self)
            .ok_or_else(|| {
                Error::invalid_request(format!(
                    "selected area {raw} is not part of the neighbourhood of {}",
                    result.matched_postcode.code
                ))
                .with_details(json!({ "field": "selected", "value": raw }))
            })
    }

    /// Highlighted area code.
    pub fn code(&self) -> &OutputAreaCode {
        &self.0
    }

    fn is(&self, code: &OutputAreaCode) -> bool {
        &self.0 == code
    }
}

/// Matched postcode.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostcodeBody {
    /// Canonical postcode.
    #[schema(example = "SW1A 1AA")]
    pub code: String,
    /// Latitude of the postcode centroid.
    #[schema(example = 51.501009)]
    pub latitude: f64,
    /// Longitude of the postcode centroid.
    pub longitude: f64,
    /// Output area containing the postcode.
    #[schema(example = "E00000001")]
    pub output_area_code: String,
}

impl From<&PostcodeRecord> for PostcodeBody {
    fn from(record: &PostcodeRecord) -> Self {
        Self {
            code: record.code.to_string(),
            latitude: record.latitude,
            longitude: record.longitude,
            output_area_code: record.output_area_code.to_string(),
        }
    }
}

/// One member of the neighbourhood.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutputAreaBody {
    /// Output area code.
    #[schema(example = "E00000001")]
    pub code: String,
    /// Parent LSOA code.
    #[schema(example = "E01004736")]
    pub parent_area_code: String,
    /// Parent LSOA name.
    #[schema(example = "Westminster 018C")]
    pub parent_area_name: String,
    /// True for the highlighted area.
    pub selected: bool,
}

/// A table row tagged with its output area.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CensusRowBody {
    /// Output area the row describes.
    pub output_area: String,
    /// True when the row belongs to the highlighted area.
    pub highlighted: bool,
    /// Values keyed by column. Columns the row lacks are absent.
    #[schema(value_type = Object)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// One bar of a chart.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartPointBody {
    /// Output area the bar stands for.
    pub output_area: String,
    /// Numeric value of the charted column.
    pub value: f64,
}

/// Bar chart of a table's first numeric column by output area.
///
/// Table columns are ordered by name, not by their order in the published
/// census file, so the charted column is the first one in name order that
/// holds a number in any row. A topic whose totals column sorts after a
/// breakdown column charts that breakdown.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartBody {
    /// Name of the charted column.
    pub column: String,
    /// One point per row with a numeric value, in row order.
    pub points: Vec<ChartPointBody>,
}

/// One census topic across the neighbourhood.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CensusTableBody {
    /// Census topic code.
    #[schema(example = "TS001")]
    pub topic_code: String,
    /// Human-readable topic title.
    #[schema(example = "Number of usual residents in households and communal establishments")]
    pub title: String,
    /// Union of the rows' columns, ordered by name.
    pub columns: Vec<String>,
    /// One row per fact.
    pub rows: Vec<CensusRowBody>,
    /// Absent when no column holds numbers.
    pub chart: Option<ChartBody>,
}

impl CensusTableBody {
    fn from_table(table: &CensusTable, selection: &Selection) -> Self {
        let rows = table
            .rows()
            .iter()
            .map(|row| CensusRowBody {
                output_area: row.output_area_code.to_string(),
                highlighted: selection.is(&row.output_area_code),
                values: row
                    .values
                    .iter()
                    .map(|(column, value)| (column.clone(), value.to_json()))
                    .collect(),
            })
            .collect();
        let chart = table.first_numeric_column().map(|column| ChartBody {
            column: column.to_owned(),
            points: table
                .series(column)
                .into_iter()
                .map(|(area, value)| ChartPointBody {
                    output_area: area.to_string(),
                    value,
                })
                .collect(),
        });

        Self {
            topic_code: table.topic().to_string(),
            title: topic_title(table.topic()).to_owned(),
            columns: table.columns().to_vec(),
            rows,
            chart,
        }
    }
}

/// Lookup response body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostcodeLookupResponse {
    /// The postcode that matched the request.
    pub postcode: PostcodeBody,
    /// Highlighted output area code.
    #[schema(example = "E00000001")]
    pub selected_area: String,
    /// Neighbourhood members ordered by code.
    pub output_areas: Vec<OutputAreaBody>,
    /// GeoJSON FeatureCollection: one polygon feature per area plus a point
    /// feature for the postcode.
    #[schema(value_type = Object)]
    pub map: FeatureCollection,
    /// Tables ordered by topic code.
    pub tables: Vec<CensusTableBody>,
}

impl PostcodeLookupResponse {
    /// Present `result` with `selection` highlighted.
    pub fn new(result: &LookupResult, selection: &Selection) -> Self {
        let areas = result.neighbourhood.areas();
        Self {
            postcode: PostcodeBody::from(&result.matched_postcode),
            selected_area: selection.code().to_string(),
            output_areas: areas
                .iter()
                .map(|area| OutputAreaBody {
                    code: area.code.to_string(),
                    parent_area_code: area.parent_area_code.clone(),
                    parent_area_name: area.parent_area_name.clone(),
                    selected: selection.is(&area.code),
                })
                .collect(),
            map: map_layer(&result.matched_postcode, areas, selection),
            tables: result
                .tables
                .values()
                .map(|table| CensusTableBody::from_table(table, selection))
                .collect(),
        }
    }
}

fn feature(geometry: geojson::Geometry, properties: serde_json::Value) -> Feature {
    let properties: Option<JsonObject> = match properties {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    };
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties,
        foreign_members: None,
    }
}

fn map_layer(
    postcode: &PostcodeRecord,
    areas: &[OutputArea],
    selection: &Selection,
) -> FeatureCollection {
    let mut features: Vec<Feature> = areas
        .iter()
        .map(|area| {
            feature(
                area.boundary.to_geojson(),
                json!({
                    "kind": "output_area",
                    "oa21cd": area.code.as_str(),
                    "lsoa21cd": area.parent_area_code,
                    "lsoa21nm": area.parent_area_name,
                    "selected": selection.is(&area.code),
                }),
            )
        })
        .collect();
    features.push(feature(
        geojson::Geometry::new(geojson::Value::Point(vec![
            postcode.longitude,
            postcode.latitude,
        ])),
        json!({
            "kind": "postcode",
            "postcode": postcode.code.as_str(),
        }),
    ));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
