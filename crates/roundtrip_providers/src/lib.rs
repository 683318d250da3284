pub mod as_the_crow_flies;
pub mod cache;
pub mod cost;
pub mod cost_provider;
pub mod cost_provider_client;
pub mod geocoder;
pub mod geocoder_client;
pub mod here_api;
pub mod location;
pub mod nominatim_api;
pub mod osrm_api;
pub mod static_geocoder;
