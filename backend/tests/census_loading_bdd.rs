//! Behaviour tests for loading published files and resolving lookups from
//! them.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use census_lookup::domain::ports::{CensusLoadCommand, PostcodeLookupQuery};
use census_lookup::domain::{
    CensusLoadService, CensusTopicCode, Error, LookupResult, PostcodeLookupService,
};
use census_lookup::outbound::memory::InMemoryCensusStore;
use census_lookup::outbound::source::FileCensusSource;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use tokio::runtime::Runtime;

struct LoadingWorld {
    runtime: Runtime,
    directory: TempDir,
    store: Arc<InMemoryCensusStore>,
    postcode_file: RefCell<Option<PathBuf>>,
    boundary_file: RefCell<Option<PathBuf>>,
    census_files: RefCell<Vec<(CensusTopicCode, PathBuf)>>,
    load_error: RefCell<Option<Error>>,
}

impl LoadingWorld {
    fn new() -> Self {
        Self {
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("tokio runtime"),
            directory: tempfile::tempdir().expect("temp dir"),
            store: Arc::new(InMemoryCensusStore::new()),
            postcode_file: RefCell::new(None),
            boundary_file: RefCell::new(None),
            census_files: RefCell::new(Vec::new()),
            load_error: RefCell::new(None),
        }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.directory.path().join(name);
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    fn command(&self) -> CensusLoadService<FileCensusSource, InMemoryCensusStore> {
        CensusLoadService::new(Arc::new(FileCensusSource), self.store.clone())
    }

    fn load_all(&self) {
        let command = self.command();
        let postcode_file = self.postcode_file.borrow().clone();
        let boundary_file = self.boundary_file.borrow().clone();
        let census_files = self.census_files.borrow().clone();
        let result = self.runtime.block_on(async move {
            if let Some(path) = postcode_file {
                command.load_postcodes(&path).await?;
            }
            if let Some(path) = boundary_file {
                command.load_output_areas(&path).await?;
            }
            for (topic, path) in census_files {
                command.load_census_topic(&topic, &path).await?;
            }
            Ok::<_, Error>(())
        });
        *self.load_error.borrow_mut() = result.err();
    }

    fn resolve(&self, postcode: &str) -> Result<LookupResult, Error> {
        let store = self.store.clone();
        let lookup = PostcodeLookupService::new(store.clone(), store.clone(), store);
        self.runtime.block_on(lookup.resolve(postcode))
    }
}

fn postcode_csv(postcode: &str, area: &str) -> String {
    format!("pcd,lat,long,oa21\n{postcode},51.501009,-0.141588,{area}\n")
}

fn boundary_feature(code: &str, x: f64) -> String {
    let right = x + 1.0;
    format!(
        r#"{{"type":"Feature","properties":{{"OA21CD":"{code}","LSOA21CD":"E01004736","LSOA21NM":"Westminster 018C"}},"geometry":{{"type":"Polygon","coordinates":[[[{x},0.0],[{right},0.0],[{right},1.0],[{x},1.0],[{x},0.0]]]}}}}"#
    )
}

#[fixture]
fn world() -> LoadingWorld {
    LoadingWorld::new()
}

#[given("a postcode directory file with \"{postcode}\" in \"{area}\"")]
fn a_postcode_directory_file(world: &LoadingWorld, postcode: String, area: String) {
    let path = world.write("postcodes.csv", &postcode_csv(&postcode, &area));
    *world.postcode_file.borrow_mut() = Some(path);
}

#[given("a boundary file with touching areas \"{first}\" and \"{second}\"")]
fn a_boundary_file(world: &LoadingWorld, first: String, second: String) {
    let collection = format!(
        r#"{{"type":"FeatureCollection","features":[{},{}]}}"#,
        boundary_feature(&first, 0.0),
        boundary_feature(&second, 1.0)
    );
    let path = world.write("boundaries.geojson", &collection);
    *world.boundary_file.borrow_mut() = Some(path);
}

#[given("a {topic} census file for \"{first}\" and \"{second}\"")]
fn a_census_file(world: &LoadingWorld, topic: String, first: String, second: String) {
    let contents = format!(
        "date,geography,geography code,Residents: Total\n\
         2021,Westminster 018C,{first},120\n\
         2021,Westminster 018C,{second},95\n"
    );
    let path = world.write(&format!("{topic}.csv"), &contents);
    let topic = CensusTopicCode::new(&topic).expect("topic code");
    world.census_files.borrow_mut().push((topic, path));
}

#[when("the files are loaded")]
fn the_files_are_loaded(world: &LoadingWorld) {
    world.load_all();
    assert!(world.load_error.borrow().is_none(), "load should succeed");
}

#[when("a postcode directory file with \"{postcode}\" in \"{area}\" is loaded")]
fn a_postcode_directory_file_is_loaded(world: &LoadingWorld, postcode: String, area: String) {
    let path = world.write("replacement.csv", &postcode_csv(&postcode, &area));
    let command = world.command();
    world
        .runtime
        .block_on(command.load_postcodes(&path))
        .expect("reload succeeds");
}

#[when("a census file that does not exist is loaded")]
fn a_missing_census_file_is_loaded(world: &LoadingWorld) {
    let path = world.directory.path().join("absent.csv");
    let topic = CensusTopicCode::new("TS001").expect("topic code");
    world.census_files.borrow_mut().push((topic, path));
    world.load_all();
}

#[then("postcode \"{postcode}\" resolves to {count} output areas")]
fn postcode_resolves_to_areas(world: &LoadingWorld, postcode: String, count: usize) {
    let result = world.resolve(&postcode).expect("lookup succeeds");
    assert_eq!(result.neighbourhood.areas().len(), count);
}

#[then("postcode \"{postcode}\" is not found")]
fn postcode_is_not_found(world: &LoadingWorld, postcode: String) {
    let error = world.resolve(&postcode).expect_err("lookup fails");
    assert_eq!(error.code(), census_lookup::domain::ErrorCode::NotFound);
}

#[then("the {topic} table has {count} rows")]
fn the_table_has_rows(world: &LoadingWorld, topic: String, count: usize) {
    let result = world.resolve("SW1A 1AA").expect("lookup succeeds");
    let topic = CensusTopicCode::new(&topic).expect("topic code");
    let table = result.tables.get(&topic).expect("table present");
    assert_eq!(table.rows().len(), count);
    assert_eq!(table.columns(), ["Residents: Total"]);
}

#[then("the load fails with code \"{code}\"")]
fn the_load_fails_with_code(world: &LoadingWorld, code: String) {
    let error = world.load_error.borrow().clone().expect("load error");
    let observed = serde_json::to_value(error.code()).expect("serialise code");
    assert_eq!(observed, code.as_str());
}

#[scenario(
    path = "tests/features/census_loading.feature",
    name = "Loaded files answer a lookup"
)]
fn loaded_files_answer_a_lookup(world: LoadingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/census_loading.feature",
    name = "Reloading postcodes replaces earlier records"
)]
fn reloading_postcodes_replaces_earlier_records(world: LoadingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/census_loading.feature",
    name = "A missing census file fails the load"
)]
fn a_missing_census_file_fails_the_load(world: LoadingWorld) {
    drop(world);
}
