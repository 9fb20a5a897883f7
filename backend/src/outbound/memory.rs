//! In-memory census store.
//!
//! Serves lookups when no database is configured and backs the behaviour
//! tests. Adjacency is computed with the `geo` touches predicate, so results
//! match the PostGIS adapter for valid polygons.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    CensusFactRepository, CensusFactRepositoryError, CensusLoadRepository,
    CensusLoadRepositoryError, OutputAreaRepository, OutputAreaRepositoryError,
    PostcodeRepository, PostcodeRepositoryError,
};
use crate::domain::{CensusFact, OutputArea, OutputAreaCode, Postcode, PostcodeRecord};

const POISONED: &str = "in-memory census store lock poisoned";

#[derive(Debug, Default)]
struct StoreState {
    postcodes: BTreeMap<Postcode, PostcodeRecord>,
    output_areas: BTreeMap<OutputAreaCode, OutputArea>,
    facts: Vec<CensusFact>,
}

/// Census store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCensusStore {
    state: RwLock<StoreState>,
}

impl InMemoryCensusStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records.
    ///
    /// Later postcodes and areas replace earlier ones with the same code;
    /// facts are kept in order.
    pub fn from_parts(
        postcodes: impl IntoIterator<Item = PostcodeRecord>,
        output_areas: impl IntoIterator<Item = OutputArea>,
        facts: impl IntoIterator<Item = CensusFact>,
    ) -> Self {
        let state = StoreState {
            postcodes: postcodes
                .into_iter()
                .map(|record| (record.code.clone(), record))
                .collect(),
            output_areas: output_areas
                .into_iter()
                .map(|area| (area.code.clone(), area))
                .collect(),
            facts: facts.into_iter().collect(),
        };
        Self {
            state: RwLock::new(state),
        }
    }

    fn read(&self) -> Option<RwLockReadGuard<'_, StoreState>> {
        self.state.read().ok()
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, CensusLoadRepositoryError> {
        self.state
            .write()
            .map_err(|_| CensusLoadRepositoryError::connection(POISONED))
    }
}

#[async_trait]
impl PostcodeRepository for InMemoryCensusStore {
    async fn find_by_postcode(
        &self,
        postcode: &Postcode,
    ) -> Result<Option<PostcodeRecord>, PostcodeRepositoryError> {
        let state = self
            .read()
            .ok_or_else(|| PostcodeRepositoryError::connection(POISONED))?;
        Ok(state.postcodes.get(postcode).cloned())
    }
}

#[async_trait]
impl OutputAreaRepository for InMemoryCensusStore {
    async fn find_with_touching(
        &self,
        code: &OutputAreaCode,
    ) -> Result<Vec<OutputArea>, OutputAreaRepositoryError> {
        let state = self
            .read()
            .ok_or_else(|| OutputAreaRepositoryError::connection(POISONED))?;
        let Some(origin) = state.output_areas.get(code) else {
            return Ok(Vec::new());
        };
        Ok(state
            .output_areas
            .values()
            .filter(|area| area.code == origin.code || origin.boundary.touches(&area.boundary))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CensusFactRepository for InMemoryCensusStore {
    async fn find_by_output_areas(
        &self,
        codes: &[OutputAreaCode],
    ) -> Result<Vec<CensusFact>, CensusFactRepositoryError> {
        let state = self
            .read()
            .ok_or_else(|| CensusFactRepositoryError::connection(POISONED))?;
        let mut facts: Vec<CensusFact> = state
            .facts
            .iter()
            .filter(|fact| codes.contains(&fact.output_area_code))
            .cloned()
            .collect();
        facts.sort_by(|left, right| left.output_area_code.cmp(&right.output_area_code));
        Ok(facts)
    }
}

#[async_trait]
impl CensusLoadRepository for InMemoryCensusStore {
    async fn replace_postcodes(
        &self,
        records: &[PostcodeRecord],
    ) -> Result<(), CensusLoadRepositoryError> {
        let mut state = self.write()?;
        state.postcodes = records
            .iter()
            .map(|record| (record.code.clone(), record.clone()))
            .collect();
        Ok(())
    }

    async fn replace_output_areas(
        &self,
        areas: &[OutputArea],
    ) -> Result<(), CensusLoadRepositoryError> {
        let mut state = self.write()?;
        state.output_areas = areas
            .iter()
            .map(|area| (area.code.clone(), area.clone()))
            .collect();
        Ok(())
    }

    async fn append_census_facts(
        &self,
        facts: &[CensusFact],
    ) -> Result<(), CensusLoadRepositoryError> {
        let mut state = self.write()?;
        state.facts.extend_from_slice(facts);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use geo::{MultiPolygon, polygon};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{AttributeValue, Boundary, CensusTopicCode};

    fn code(raw: &str) -> OutputAreaCode {
        OutputAreaCode::new(raw).expect("area code")
    }

    fn square(raw: &str, x: f64, y: f64) -> OutputArea {
        OutputArea {
            code: code(raw),
            parent_area_code: "E01000001".to_owned(),
            parent_area_name: "City of London 001A".to_owned(),
            boundary: Boundary::new(MultiPolygon::new(vec![polygon![
                (x: x, y: y),
                (x: x + 1.0, y: y),
                (x: x + 1.0, y: y + 1.0),
                (x: x, y: y + 1.0),
                (x: x, y: y),
            ]])),
        }
    }

    fn fact(raw: &str, value: i64) -> CensusFact {
        CensusFact {
            output_area_code: code(raw),
            topic: CensusTopicCode::new("TS001").expect("topic"),
            attributes: BTreeMap::from([("residents".to_owned(), AttributeValue::Integer(value))]),
        }
    }

    /// A 3x3 grid of unit squares named `E0000000{1..9}` row by row.
    #[fixture]
    fn grid() -> InMemoryCensusStore {
        let areas = (0..9).map(|index| {
            let x = f64::from(index % 3);
            let y = f64::from(index / 3);
            square(&format!("E0000000{}", index + 1), x, y)
        });
        InMemoryCensusStore::from_parts(Vec::new(), areas, Vec::new())
    }

    #[rstest]
    #[tokio::test]
    async fn touching_includes_origin_and_every_adjacent_square(grid: InMemoryCensusStore) {
        let centre = grid
            .find_with_touching(&code("E00000005"))
            .await
            .expect("query succeeds");
        assert_eq!(centre.len(), 9);

        let corner = grid
            .find_with_touching(&code("E00000001"))
            .await
            .expect("query succeeds");
        let codes: Vec<_> = corner.iter().map(|area| area.code.as_str()).collect();
        assert_eq!(codes, ["E00000001", "E00000002", "E00000004", "E00000005"]);
    }

    #[rstest]
    #[tokio::test]
    async fn touching_is_symmetric(grid: InMemoryCensusStore) {
        for a in 1..=9 {
            let origin = code(&format!("E0000000{a}"));
            let neighbours = grid.find_with_touching(&origin).await.expect("query");
            for neighbour in neighbours {
                let reverse = grid
                    .find_with_touching(&neighbour.code)
                    .await
                    .expect("query");
                assert!(
                    reverse.iter().any(|area| area.code == origin),
                    "{} touches {origin} but not the reverse",
                    neighbour.code
                );
            }
        }
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_area_has_no_neighbourhood(grid: InMemoryCensusStore) {
        let areas = grid
            .find_with_touching(&code("W00000001"))
            .await
            .expect("query succeeds");
        assert!(areas.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn facts_are_ordered_by_area_then_load_order() {
        let store = InMemoryCensusStore::new();
        store
            .append_census_facts(&[fact("E00000002", 1), fact("E00000001", 2)])
            .await
            .expect("append");
        store
            .append_census_facts(&[fact("E00000001", 3), fact("E00000009", 4)])
            .await
            .expect("append");

        let facts = store
            .find_by_output_areas(&[code("E00000001"), code("E00000002")])
            .await
            .expect("query succeeds");

        let values: Vec<_> = facts
            .iter()
            .map(|fact| fact.attributes["residents"].clone())
            .collect();
        assert_eq!(
            values,
            [
                AttributeValue::Integer(2),
                AttributeValue::Integer(3),
                AttributeValue::Integer(1)
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn replace_postcodes_discards_previous_records() {
        let record = |raw: &str| PostcodeRecord {
            code: Postcode::parse(raw).expect("postcode"),
            latitude: 51.5,
            longitude: -0.1,
            output_area_code: code("E00000001"),
        };
        let store = InMemoryCensusStore::from_parts([record("SW1A 1AA")], [], []);

        store
            .replace_postcodes(&[record("E1 6AN")])
            .await
            .expect("replace");

        let old = Postcode::parse("SW1A 1AA").expect("postcode");
        let new = Postcode::parse("E1 6AN").expect("postcode");
        assert!(store.find_by_postcode(&old).await.expect("query").is_none());
        assert!(store.find_by_postcode(&new).await.expect("query").is_some());
    }
}
