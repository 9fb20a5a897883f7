//! Postcode neighbourhood lookup endpoint.
//!
//! ```text
//! GET /api/v1/postcodes/{postcode}?selected=E00000002
//! ```

use actix_web::{HttpResponse, get, http::header, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::lookup_dto::{LookupParams, PostcodeLookupResponse, Selection};
use crate::inbound::http::state::HttpState;

/// Resolve a postcode to its output area, the touching areas and their
/// census tables.
#[utoipa::path(
    get,
    path = "/api/v1/postcodes/{postcode}",
    description = "Find the output area containing a postcode, every output area touching it, and the census tables for that neighbourhood. Example request: GET /api/v1/postcodes/SW1A%201AA",
    params(
        ("postcode" = String, Path, description = "UK postcode in any spacing or case", example = "SW1A 1AA"),
        LookupParams
    ),
    responses(
        (
            status = 200,
            description = "Neighbourhood and census tables",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = PostcodeLookupResponse
        ),
        (status = 400, description = "Blank postcode or selection outside the neighbourhood", body = Error),
        (status = 404, description = "Postcode or output area not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["lookup"],
    operation_id = "getPostcodeLookup"
)]
#[get("/postcodes/{postcode}")]
pub async fn get_postcode_lookup(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<LookupParams>,
) -> ApiResult<HttpResponse> {
    let postcode = path.into_inner();
    let result = state.lookup.resolve(&postcode).await?;
    let selection = Selection::resolve(query.selected.as_deref(), &result)?;
    let response = PostcodeLookupResponse::new(&result, &selection);
    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "public, max-age=300"))
        .json(response))
}

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod tests;
