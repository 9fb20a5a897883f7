//! Behaviour tests for the postcode lookup endpoint over the in-memory store.

#[path = "support/census_fixtures.rs"]
mod census_fixtures;

use std::cell::RefCell;
use std::sync::Arc;

use actix_web::test as actix_test;
use actix_web::{App, web};
use census_lookup::Trace;
use census_lookup::domain::{CensusFact, OutputArea, PostcodeLookupService, PostcodeRecord};
use census_lookup::inbound::http::lookup::get_postcode_lookup;
use census_lookup::inbound::http::state::HttpState;
use census_lookup::outbound::memory::InMemoryCensusStore;
use census_fixtures::{postcode, residents_fact, square_area};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

const TOPICS: [&str; 2] = ["TS001", "TS002"];

struct LookupWorld {
    runtime: Runtime,
    local: LocalSet,
    postcodes: RefCell<Vec<PostcodeRecord>>,
    areas: RefCell<Vec<OutputArea>>,
    facts: RefCell<Vec<CensusFact>>,
    last_status: RefCell<Option<u16>>,
    last_body: RefCell<Option<Value>>,
}

impl LookupWorld {
    fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        Self {
            runtime,
            local: LocalSet::new(),
            postcodes: RefCell::new(Vec::new()),
            areas: RefCell::new(Vec::new()),
            facts: RefCell::new(Vec::new()),
            last_status: RefCell::new(None),
            last_body: RefCell::new(None),
        }
    }

    fn add_area(&self, code: &str, x: f64, y: f64) {
        self.areas.borrow_mut().push(square_area(code, x, y));
        let mut facts = self.facts.borrow_mut();
        for (offset, topic) in TOPICS.iter().enumerate() {
            facts.push(residents_fact(code, topic, 100 + offset as i64));
        }
    }

    fn http_state(&self) -> HttpState {
        let store = Arc::new(InMemoryCensusStore::from_parts(
            self.postcodes.borrow().clone(),
            self.areas.borrow().clone(),
            self.facts.borrow().clone(),
        ));
        HttpState::new(Arc::new(PostcodeLookupService::new(
            store.clone(),
            store.clone(),
            store,
        )))
    }

    fn get(&self, uri: String) {
        let state = web::Data::new(self.http_state());
        let (status, body) = self.local.block_on(&self.runtime, async move {
            let app = actix_test::init_service(
                App::new()
                    .app_data(state)
                    .wrap(Trace)
                    .service(web::scope("/api/v1").service(get_postcode_lookup)),
            )
            .await;
            let response =
                actix_test::call_service(&app, actix_test::TestRequest::get().uri(&uri).to_request()).await;
            let status = response.status().as_u16();
            let bytes = actix_test::read_body(response).await;
            let body: Value = serde_json::from_slice(&bytes).expect("JSON body");
            (status, body)
        });
        *self.last_status.borrow_mut() = Some(status);
        *self.last_body.borrow_mut() = Some(body);
    }

    fn body(&self) -> Value {
        self.last_body.borrow().clone().expect("response body")
    }

    fn table(&self, topic: &str) -> Value {
        self.body()["tables"]
            .as_array()
            .expect("tables")
            .iter()
            .find(|table| table["topicCode"] == topic)
            .cloned()
            .unwrap_or_else(|| panic!("table {topic} present"))
    }

    fn assert_table_rows(&self, topic: &str, count: usize) {
        let table = self.table(topic);
        assert_eq!(table["rows"].as_array().expect("rows").len(), count);
        assert_eq!(table["chart"]["column"], "Residents");
    }
}

fn lookup_uri(postcode: &str, selected: Option<&str>) -> String {
    let encoded = postcode.replace(' ', "%20");
    match selected {
        Some(area) => format!("/api/v1/postcodes/{encoded}?selected={area}"),
        None => format!("/api/v1/postcodes/{encoded}"),
    }
}

#[fixture]
fn world() -> LookupWorld {
    LookupWorld::new()
}

#[given("a census store with a two by two block of output areas")]
fn a_census_store_with_a_block(world: &LookupWorld) {
    world.add_area("E00000001", 0.0, 0.0);
    world.add_area("E00000002", 1.0, 0.0);
    world.add_area("E00000003", 0.0, 1.0);
    world.add_area("E00000004", 1.0, 1.0);
    world
        .postcodes
        .borrow_mut()
        .push(postcode("SW1A 1AA", "E00000001"));
}

#[given("an isolated output area with one TS001 fact")]
fn an_isolated_output_area(world: &LookupWorld) {
    world.areas.borrow_mut().push(square_area("E00000001", 0.0, 0.0));
    world
        .facts
        .borrow_mut()
        .push(residents_fact("E00000001", "TS001", 42));
    world
        .postcodes
        .borrow_mut()
        .push(postcode("SW1A 1AA", "E00000001"));
}

#[given("an output area touching two neighbours with topics TS001 and TS002")]
fn an_output_area_touching_two_neighbours(world: &LookupWorld) {
    world.add_area("E00000001", 0.0, 0.0);
    world.add_area("E00000002", 1.0, 0.0);
    world.add_area("E00000003", -1.0, 0.0);
    world
        .postcodes
        .borrow_mut()
        .push(postcode("SW1A 1AA", "E00000001"));
}

#[given("a distant output area with census data")]
fn a_distant_output_area(world: &LookupWorld) {
    world.add_area("E00000009", 10.0, 10.0);
}

#[when("the client looks up postcode \"{postcode}\"")]
fn the_client_looks_up_postcode(world: &LookupWorld, postcode: String) {
    world.get(lookup_uri(&postcode, None));
}

#[when("the client looks up postcode \"{postcode}\" with \"{area}\" selected")]
fn the_client_looks_up_postcode_with_selection(world: &LookupWorld, postcode: String, area: String) {
    world.get(lookup_uri(&postcode, Some(&area)));
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &LookupWorld, status: u16) {
    assert_eq!(*world.last_status.borrow(), Some(status));
}

#[then("the matched postcode is \"{code}\"")]
fn the_matched_postcode_is(world: &LookupWorld, code: String) {
    assert_eq!(world.body()["postcode"]["code"], code.as_str());
}

#[then("the neighbourhood is \"{codes}\"")]
fn the_neighbourhood_is(world: &LookupWorld, codes: String) {
    let body = world.body();
    let observed: Vec<&str> = body["outputAreas"]
        .as_array()
        .expect("output areas")
        .iter()
        .filter_map(|area| area["code"].as_str())
        .collect();
    let expected: Vec<&str> = codes.split(',').collect();
    assert_eq!(observed, expected);
}

#[then("the {topic} table has {count} rows")]
fn the_table_has_rows(world: &LookupWorld, topic: String, count: usize) {
    world.assert_table_rows(&topic, count);
}

#[then("the {topic} table has a single row")]
fn the_table_has_a_single_row(world: &LookupWorld, topic: String) {
    world.assert_table_rows(&topic, 1);
}

#[then("the response holds only the {topic} table")]
fn the_response_holds_only(world: &LookupWorld, topic: String) {
    let topics: Vec<Value> = world.body()["tables"]
        .as_array()
        .expect("tables")
        .iter()
        .map(|table| table["topicCode"].clone())
        .collect();
    assert_eq!(topics, vec![Value::String(topic)]);
}

#[then("the error code is \"{code}\"")]
fn the_error_code_is(world: &LookupWorld, code: String) {
    assert_eq!(world.body()["code"], code.as_str());
}

#[then("the highlighted {topic} row is for \"{area}\"")]
fn the_highlighted_row_is_for(world: &LookupWorld, topic: String, area: String) {
    let table = world.table(&topic);
    let highlighted: Vec<&Value> = table["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .filter(|row| row["highlighted"] == true)
        .collect();
    assert_eq!(highlighted.len(), 1);
    assert_eq!(highlighted[0]["outputArea"], area.as_str());
}

#[scenario(
    path = "tests/features/postcode_lookup.feature",
    name = "Isolated output area forms a neighbourhood of one"
)]
fn isolated_output_area_forms_a_neighbourhood_of_one(world: LookupWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/postcode_lookup.feature",
    name = "Touching areas share both census topics"
)]
fn touching_areas_share_both_census_topics(world: LookupWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/postcode_lookup.feature",
    name = "Postcode resolves to its touching neighbourhood"
)]
fn postcode_resolves_to_its_touching_neighbourhood(world: LookupWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/postcode_lookup.feature",
    name = "Distant areas are excluded from the neighbourhood"
)]
fn distant_areas_are_excluded_from_the_neighbourhood(world: LookupWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/postcode_lookup.feature",
    name = "Unknown postcode is reported as not found"
)]
fn unknown_postcode_is_reported_as_not_found(world: LookupWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/postcode_lookup.feature",
    name = "Blank postcode is rejected"
)]
fn blank_postcode_is_rejected(world: LookupWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/postcode_lookup.feature",
    name = "Selecting a neighbour moves the highlight"
)]
fn selecting_a_neighbour_moves_the_highlight(world: LookupWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/postcode_lookup.feature",
    name = "Selecting an area outside the neighbourhood is rejected"
)]
fn selecting_an_area_outside_the_neighbourhood_is_rejected(world: LookupWorld) {
    drop(world);
}
