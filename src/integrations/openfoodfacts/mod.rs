pub mod client;

pub use client::{
    parse_product_response, product_url, JsonFetcher, OpenFoodFactsClient, UNKNOWN_PRODUCT_NAME,
};
