//! Optional demo-data bootstrap, enabled with `SEED_DEMO_DATA=true`.
//!
//! Fills empty driver and ride tables from the bundled fixtures. Ride
//! fixtures only name their poster, so a host account is synthesized (or
//! reused) per distinct poster name under the `seed.rideconnect` domain.
//! Nothing in the core depends on seeded rows.

use anyhow::Context;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::auth::password;
use crate::auth::repo::{NewUser, User};
use crate::rides::dto::{parse_date, parse_time};
use crate::rides::repo::RideStatus;

static DRIVERS_JSON: &str = include_str!("../data/drivers.json");
static RIDES_JSON: &str = include_str!("../data/rides.json");

const SEED_PASSWORD: &str = "SeedAccount#123";
const SEED_QUESTION: &str = "What is your pet's name?";
const SEED_ANSWER: &str = "fluffy";

fn default_true() -> bool {
    true
}

fn default_availability() -> String {
    "Available".into()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriverFixture {
    name: String,
    rating: f64,
    total_rides: i32,
    vehicle_type: String,
    vehicle_number: String,
    experience: String,
    phone: String,
    languages: Vec<String>,
    #[serde(default = "default_true")]
    is_verified: bool,
    price_per_km: i32,
    #[serde(default = "default_availability")]
    availability: String,
    routes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RideFixture {
    from: String,
    to: String,
    date: String,
    time: String,
    seats: i32,
    total_fare: i32,
    note: Option<String>,
    posted_by: String,
    #[serde(default = "default_true")]
    verified: bool,
    #[serde(default)]
    status: Option<RideStatus>,
}

/// Synthesized host address for a poster name: lowercased, runs of
/// non-alphanumerics collapsed to a dot.
fn email_slug(name: &str) -> String {
    let mut slug = String::new();
    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('.') {
            slug.push('.');
        }
    }
    format!("{}@seed.rideconnect", slug.trim_end_matches('.'))
}

pub async fn run(db: &PgPool) -> anyhow::Result<()> {
    seed_drivers(db).await?;
    seed_rides(db).await?;
    Ok(())
}

async fn seed_drivers(db: &PgPool) -> anyhow::Result<()> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM drivers")
        .fetch_one(db)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let fixtures: Vec<DriverFixture> =
        serde_json::from_str(DRIVERS_JSON).context("parse drivers.json")?;
    let total = fixtures.len();

    for d in fixtures {
        sqlx::query(
            r#"
            INSERT INTO drivers (name, rating, total_rides, vehicle_type, vehicle_number,
                                 experience, phone, languages, is_verified, price_per_km,
                                 availability, routes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(d.name)
        .bind(d.rating)
        .bind(d.total_rides)
        .bind(d.vehicle_type)
        .bind(d.vehicle_number)
        .bind(d.experience)
        .bind(d.phone)
        .bind(d.languages)
        .bind(d.is_verified)
        .bind(d.price_per_km)
        .bind(d.availability)
        .bind(d.routes)
        .execute(db)
        .await?;
    }

    info!(count = total, "seeded driver profiles");
    Ok(())
}

async fn seed_rides(db: &PgPool) -> anyhow::Result<()> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rides")
        .fetch_one(db)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let fixtures: Vec<RideFixture> =
        serde_json::from_str(RIDES_JSON).context("parse rides.json")?;
    let total = fixtures.len();

    // One hash shared by every synthesized host account.
    let password_hash = password::hash_password(SEED_PASSWORD)?;
    let answer_hash = password::hash_recovery_answer(SEED_ANSWER)?;

    for r in fixtures {
        let email = email_slug(&r.posted_by);
        let host = match User::find_by_email(db, &email).await? {
            Some(user) => user,
            None => {
                User::create(
                    db,
                    &NewUser {
                        name: r.posted_by.clone(),
                        email,
                        password_hash: password_hash.clone(),
                        recovery_question: SEED_QUESTION.into(),
                        recovery_answer_hash: answer_hash.clone(),
                    },
                )
                .await?
            }
        };

        let ride_date =
            parse_date(&r.date).with_context(|| format!("fixture date {:?}", r.date))?;
        let ride_time =
            parse_time(&r.time).with_context(|| format!("fixture time {:?}", r.time))?;

        sqlx::query(
            r#"
            INSERT INTO rides (origin, destination, ride_date, ride_time, seats, total_fare,
                               note, posted_by, verified, status, host_id, participants)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, '[]'::jsonb)
            "#,
        )
        .bind(r.from)
        .bind(r.to)
        .bind(ride_date)
        .bind(ride_time)
        .bind(r.seats)
        .bind(r.total_fare)
        .bind(r.note)
        .bind(r.posted_by)
        .bind(r.verified)
        .bind(r.status.unwrap_or(RideStatus::Upcoming))
        .bind(host.id)
        .execute(db)
        .await?;
    }

    info!(count = total, "seeded ride listings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_collapse_to_dotted_addresses() {
        assert_eq!(email_slug("Ananya Sharma"), "ananya.sharma@seed.rideconnect");
        assert_eq!(email_slug("  Dr. A. P. Rao "), "dr.a.p.rao@seed.rideconnect");
        assert_eq!(email_slug("Ravi!!Kumar"), "ravi.kumar@seed.rideconnect");
    }

    #[test]
    fn fixtures_parse() {
        let drivers: Vec<DriverFixture> =
            serde_json::from_str(DRIVERS_JSON).expect("drivers.json should parse");
        assert!(!drivers.is_empty());

        let rides: Vec<RideFixture> =
            serde_json::from_str(RIDES_JSON).expect("rides.json should parse");
        assert!(!rides.is_empty());
        for ride in &rides {
            assert!((1..=4).contains(&ride.seats));
            assert!(ride.total_fare >= 100);
        }
    }
}
