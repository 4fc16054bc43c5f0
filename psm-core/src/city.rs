use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::{MonitorStore, WriteBatch, WriteOp};
use crate::validate::{in_range, required_text};

/// A monitored city. Read-only once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityInput {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// City administration.
pub struct CityRegistry<'a, S: MonitorStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: MonitorStore + ?Sized> CityRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and store a new city.
    ///
    /// Points and spells refer to cities by name, so names must be unique.
    pub fn create_city(&self, input: &CityInput) -> Result<City> {
        let name = required_text("name", "City name", &input.name)?;
        let latitude = in_range("latitude", "latitude", input.latitude, -90.0, 90.0)?;
        let longitude = in_range("longitude", "longitude", input.longitude, -180.0, 180.0)?;

        if self.store.find_city(name)?.is_some() {
            return Err(Error::validation(
                "name",
                format!("City \"{name}\" already exists."),
            ));
        }

        let city = City {
            id: crate::new_id(),
            name: name.to_string(),
            latitude,
            longitude,
        };
        self.store
            .commit(WriteBatch::single(WriteOp::InsertCity(city.clone())))?;
        log::info!("Created city {} with ID: {}", city.name, city.id);
        Ok(city)
    }

    pub fn list_cities(&self) -> Result<Vec<City>> {
        Ok(self.store.list_cities()?)
    }
}
