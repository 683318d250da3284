use std::path::Path;

use fxhash::FxHashMap;

use crate::{
    geocoder::{Geocoder, GeocodingError},
    location::Location,
};

/// In-memory geocoder backed by an address table.
///
/// The text format is one `address;lat;lon` entry per line. Blank lines and
/// lines starting with `#` are ignored.
#[derive(Debug, Default, Clone)]
pub struct StaticGeocoder {
    entries: FxHashMap<String, Location>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: impl Into<String>, location: Location) {
        self.entries.insert(address.into().trim().to_string(), location);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn parse(text: &str) -> Result<Self, anyhow::Error> {
        let mut geocoder = StaticGeocoder::new();

        for (line_number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.rsplitn(3, ';');
            let (Some(lon), Some(lat), Some(address)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(anyhow::anyhow!(
                    "line {}: expected `address;lat;lon`, got {:?}",
                    line_number + 1,
                    line
                ));
            };

            let lat: f64 = lat.trim().parse().map_err(|err| {
                anyhow::anyhow!("line {}: invalid latitude: {}", line_number + 1, err)
            })?;
            let lon: f64 = lon.trim().parse().map_err(|err| {
                anyhow::anyhow!("line {}: invalid longitude: {}", line_number + 1, err)
            })?;

            geocoder.insert(address, Location::from_lat_lon(lat, lon));
        }

        Ok(geocoder)
    }

    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodingError> {
        self.entries
            .get(address.trim())
            .copied()
            .ok_or_else(|| GeocodingError::NotFound {
                address: address.to_string(),
            })
    }
}
