//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod census_fact_repository;
mod census_load_command;
mod census_load_repository;
mod census_source;
mod output_area_repository;
mod postcode_lookup_query;
mod postcode_repository;

#[cfg(test)]
pub use census_fact_repository::MockCensusFactRepository;
pub use census_fact_repository::{CensusFactRepository, CensusFactRepositoryError};
#[cfg(test)]
pub use census_load_command::MockCensusLoadCommand;
pub use census_load_command::{CensusLoadCommand, Dataset, LoadOutcome};
#[cfg(test)]
pub use census_load_repository::MockCensusLoadRepository;
pub use census_load_repository::{CensusLoadRepository, CensusLoadRepositoryError};
#[cfg(test)]
pub use census_source::MockCensusSource;
pub use census_source::{CensusSource, CensusSourceError};
#[cfg(test)]
pub use output_area_repository::MockOutputAreaRepository;
pub use output_area_repository::{OutputAreaRepository, OutputAreaRepositoryError};
#[cfg(test)]
pub use postcode_lookup_query::MockPostcodeLookupQuery;
pub use postcode_lookup_query::PostcodeLookupQuery;
#[cfg(test)]
pub use postcode_repository::MockPostcodeRepository;
pub use postcode_repository::{PostcodeRepository, PostcodeRepositoryError};
