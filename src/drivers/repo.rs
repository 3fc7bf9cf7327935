use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Verified driver profile. Seeded catalog data; there is no mutation path.
#[derive(Debug, Clone, FromRow)]
pub struct Driver {
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
    pub created_at: OffsetDateTime,
}

pub async fn list(db: &PgPool) -> Result<Vec<Driver>, sqlx::Error> {
    sqlx::query_as::<_, Driver>(
        r#"
        SELECT id, name, rating, total_rides, vehicle_type, vehicle_number, experience,
               phone, languages, is_verified, price_per_km, availability, routes, created_at
        FROM drivers
        ORDER BY name ASC
        "#,
    )
    .fetch_all(db)
    .await
}
