use crate::{
    geocoder::{Geocoder, GeocodingError},
    location::Location,
    nominatim_api::NominatimGeocoder,
    static_geocoder::StaticGeocoder,
};

/// The geocoder selected at startup.
pub enum GeocoderClient {
    Nominatim(NominatimGeocoder),
    Static(StaticGeocoder),
}

impl Geocoder for GeocoderClient {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodingError> {
        match self {
            GeocoderClient::Nominatim(geocoder) => geocoder.geocode(address).await,
            GeocoderClient::Static(geocoder) => geocoder.geocode(address).await,
        }
    }
}
