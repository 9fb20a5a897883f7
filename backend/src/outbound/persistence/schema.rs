//! Diesel table definitions for the census store.
//!
//! These must match `migrations/` exactly. `output_areas` is absent because
//! its PostGIS geometry column has no Diesel type; its adapter uses raw SQL.

diesel::table! {
    /// Postcode directory: one row per canonical postcode.
    postcode_data (pcd) {
        /// Canonical postcode (`SW1A 1AA`).
        pcd -> Text,
        /// Centroid latitude.
        lat -> Double,
        /// Centroid longitude.
        long -> Double,
        /// Containing output area code.
        oa21 -> Text,
    }
}

diesel::table! {
    /// Census facts: one row per loaded topic row.
    census_data (id) {
        /// Surrogate key preserving load order.
        id -> BigInt,
        /// Output area code the fact describes.
        geography_code -> Text,
        /// Census topic code.
        census_code -> Text,
        /// Topic-specific attributes as a JSON object.
        data -> Jsonb,
    }
}
