//! File-backed loader inputs: ONS postcode CSVs, boundary GeoJSON and census
//! topic CSVs.

use std::ffi::OsString;
use std::io::{self, BufReader, Read};
use std::path::Path;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, File};
use tracing::debug;

use crate::domain::ports::{CensusSource, CensusSourceError};
use crate::domain::{
    AttributeValue, Attributes, Boundary, CensusFact, CensusTopicCode, OutputArea,
    OutputAreaCode, Postcode, PostcodeRecord,
};

const POSTCODE_COLUMN: &str = "pcd";
const LATITUDE_COLUMN: &str = "lat";
const LONGITUDE_COLUMN: &str = "long";
const OUTPUT_AREA_COLUMN: &str = "oa21";

const GEOGRAPHY_CODE_COLUMN: &str = "geography code";
const DROPPED_CENSUS_COLUMNS: [&str; 2] = ["date", "geography"];

const AREA_CODE_PROPERTY: &str = "OA21CD";
const PARENT_CODE_PROPERTY: &str = "LSOA21CD";
const PARENT_NAME_PROPERTY: &str = "LSOA21NM";

/// Source adapter reading published files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCensusSource;

#[async_trait]
impl CensusSource for FileCensusSource {
    async fn read_postcodes(&self, path: &Path) -> Result<Vec<PostcodeRecord>, CensusSourceError> {
        decode_postcodes(open_file(path)?)
    }

    async fn read_output_areas(&self, path: &Path) -> Result<Vec<OutputArea>, CensusSourceError> {
        decode_output_areas(BufReader::new(open_file(path)?))
    }

    async fn read_census_facts(
        &self,
        topic: &CensusTopicCode,
        path: &Path,
    ) -> Result<Vec<CensusFact>, CensusSourceError> {
        decode_census_facts(topic, open_file(path)?)
    }
}

/// Open `path` for streaming through a capability handle on its parent.
fn open_file(path: &Path) -> Result<File, CensusSourceError> {
    open_parent(path)
        .and_then(|(directory, file_name)| directory.open(Path::new(&file_name)))
        .map_err(|err| CensusSourceError::read(format!("{}: {err}", path.display())))
}

fn open_parent(path: &Path) -> io::Result<(Dir, OsString)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path must name a file")
    })?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((directory, file_name.to_os_string()))
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, CensusSourceError> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or_else(|| CensusSourceError::decode(format!("missing column '{name}'")))
}

fn field<'a>(row: &'a csv::StringRecord, index: usize) -> Option<&'a str> {
    row.get(index).map(str::trim).filter(|value| !value.is_empty())
}

/// Parse a coordinate, treating the ONSPD "no grid reference" sentinel
/// (latitude 99.999999) and out-of-range values as missing.
fn coordinate(raw: Option<&str>, limit: f64) -> Option<f64> {
    raw?.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && value.abs() <= limit)
}

struct PostcodeColumns {
    pcd: usize,
    lat: usize,
    long: usize,
    oa21: usize,
}

impl PostcodeColumns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, CensusSourceError> {
        Ok(Self {
            pcd: column(headers, POSTCODE_COLUMN)?,
            lat: column(headers, LATITUDE_COLUMN)?,
            long: column(headers, LONGITUDE_COLUMN)?,
            oa21: column(headers, OUTPUT_AREA_COLUMN)?,
        })
    }

    /// `None` when the row cannot yield a usable record.
    fn decode(&self, row: &csv::StringRecord) -> Option<PostcodeRecord> {
        Some(PostcodeRecord {
            code: Postcode::parse(field(row, self.pcd)?).ok()?,
            latitude: coordinate(field(row, self.lat), 90.0)?,
            longitude: coordinate(field(row, self.long), 180.0)?,
            output_area_code: OutputAreaCode::new(field(row, self.oa21)?).ok()?,
        })
    }
}

fn decode_postcodes(input: impl Read) -> Result<Vec<PostcodeRecord>, CensusSourceError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader
        .headers()
        .map_err(|err| CensusSourceError::decode(err.to_string()))?
        .clone();
    let columns = PostcodeColumns::locate(&headers)?;

    let mut records = Vec::new();
    let mut skipped = 0_usize;
    for (index, row) in reader.records().enumerate() {
        let row = row
            .map_err(|err| CensusSourceError::decode(format!("row {}: {err}", index + 1)))?;
        match columns.decode(&row) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    debug!(records = records.len(), skipped, "decoded postcode directory");
    Ok(records)
}

fn decode_output_areas(input: impl Read) -> Result<Vec<OutputArea>, CensusSourceError> {
    let geojson: geojson::GeoJson = serde_json::from_reader(input)
        .map_err(|err| CensusSourceError::decode(err.to_string()))?;
    let geojson::GeoJson::FeatureCollection(collection) = geojson else {
        return Err(CensusSourceError::decode(
            "output area boundaries must be a FeatureCollection",
        ));
    };

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| decode_output_area(feature).map_err(|message| {
            CensusSourceError::decode(format!("feature {index}: {message}"))
        }))
        .collect()
}

fn decode_output_area(feature: geojson::Feature) -> Result<OutputArea, String> {
    let property = |name: &str| -> Result<String, String> {
        feature
            .property(name)
            .and_then(serde_json::Value::as_str)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| format!("missing property '{name}'"))
    };
    let code = OutputAreaCode::new(property(AREA_CODE_PROPERTY)?).map_err(|err| err.to_string())?;
    let parent_area_code = property(PARENT_CODE_PROPERTY)?;
    let parent_area_name = property(PARENT_NAME_PROPERTY)?;
    let geometry = feature
        .geometry
        .clone()
        .ok_or_else(|| format!("output area {code} has no geometry"))?;
    let boundary =
        Boundary::from_geojson(geometry).map_err(|err| format!("output area {code}: {err}"))?;

    Ok(OutputArea {
        code,
        parent_area_code,
        parent_area_name,
        boundary,
    })
}

fn decode_census_facts(
    topic: &CensusTopicCode,
    input: impl Read,
) -> Result<Vec<CensusFact>, CensusSourceError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader
        .headers()
        .map_err(|err| CensusSourceError::decode(err.to_string()))?
        .clone();
    let key = column(&headers, GEOGRAPHY_CODE_COLUMN)?;
    let attribute_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(index, name)| {
            *index != key && !DROPPED_CENSUS_COLUMNS.contains(&name.trim())
        })
        .map(|(index, name)| (index, name.trim().to_owned()))
        .collect();

    reader
        .records()
        .enumerate()
        .map(|(index, row)| {
            let row = row
                .map_err(|err| CensusSourceError::decode(format!("row {}: {err}", index + 1)))?;
            let output_area_code = field(&row, key)
                .and_then(|raw| OutputAreaCode::new(raw).ok())
                .ok_or_else(|| {
                    CensusSourceError::decode(format!(
                        "row {}: missing '{GEOGRAPHY_CODE_COLUMN}'",
                        index + 1
                    ))
                })?;
            let attributes: Attributes = attribute_columns
                .iter()
                .map(|(column, name)| {
                    let value = row.get(*column).map_or(AttributeValue::Null, AttributeValue::infer);
                    (name.clone(), value)
                })
                .collect();
            Ok(CensusFact {
                output_area_code,
                topic: topic.clone(),
                attributes,
            })
        })
        .collect()
}
