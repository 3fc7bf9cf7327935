use serde::Serialize;
use uuid::Uuid;

use crate::drivers::repo::Driver;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverResponse {
    pub id: Uuid,
    pub name: String,
    pub rating: f64,
    pub total_rides: i32,
    pub vehicle_type: String,
    pub vehicle_number: String,
    pub experience: String,
    pub phone: String,
    pub languages: Vec<String>,
    pub is_verified: bool,
    pub price_per_km: i32,
    pub availability: String,
    pub routes: Vec<String>,
}

impl From<Driver> for DriverResponse {
    fn from(d: Driver) -> Self {
        Self {
            id: d.id,
            name: d.name,
            rating: d.rating,
            total_rides: d.total_rides,
            vehicle_type: d.vehicle_type,
            vehicle_number: d.vehicle_number,
            experience: d.experience,
            phone: d.phone,
            languages: d.languages,
            is_verified: d.is_verified,
            price_per_km: d.price_per_km,
            availability: d.availability,
            routes: d.routes,
        }
    }
}
