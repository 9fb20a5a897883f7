//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the lookup and health endpoints and the schemas they
//! return. The document backs Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::lookup_dto::{
    CensusRowBody, CensusTableBody, ChartBody, ChartPointBody, OutputAreaBody, PostcodeBody,
    PostcodeLookupResponse,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Census lookup API",
        description = "Resolve a UK postcode to its 2021 Census output area, the areas touching it, and their census tables.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::lookup::get_postcode_lookup,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        PostcodeLookupResponse,
        PostcodeBody,
        OutputAreaBody,
        CensusTableBody,
        CensusRowBody,
        ChartBody,
        ChartPointBody,
        Error,
        ErrorCode
    )),
    tags(
        (name = "lookup", description = "Postcode neighbourhood lookups"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
