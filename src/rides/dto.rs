use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Time};
use uuid::Uuid;

use crate::error::ApiError;
use crate::rides::fare;
use crate::rides::repo::{Participant, Ride, RideStatus};

pub const MIN_TOTAL_FARE: i32 = 100;
pub const MAX_SEATS: i32 = 4;

/// Strict ISO `YYYY-MM-DD`.
pub(crate) fn parse_date(s: &str) -> Option<Date> {
    let fmt = format_description!("[year]-[month]-[day]");
    Date::parse(s, fmt).ok()
}

/// Strict 24h `HH:MM`.
pub(crate) fn parse_time(s: &str) -> Option<Time> {
    let (h, m) = s.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    let hour: u8 = h.parse().ok()?;
    let minute: u8 = m.parse().ok()?;
    Time::from_hms(hour, minute, 0).ok()
}

/// Raw ride payload as posted by the client. Fields are optional so a missing
/// field is reported as a validation failure instead of a transport-level
/// rejection; [`CreateRideRequest::validate`] turns it into a fully typed
/// [`NewRide`] or fails.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub seats: Option<i32>,
    pub total_fare: Option<i32>,
    pub note: Option<String>,
}

/// Validated ride payload, ready for the ledger.
#[derive(Debug, Clone)]
pub struct NewRide {
    pub origin: String,
    pub destination: String,
    pub ride_date: Date,
    pub ride_time: Time,
    pub seats: i32,
    pub total_fare: i32,
    pub note: Option<String>,
}

impl CreateRideRequest {
    pub fn validate(self) -> Result<NewRide, ApiError> {
        let origin = self
            .from
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if origin.len() < 2 {
            return Err(ApiError::validation(
                "Pickup point must be at least 2 characters",
            ));
        }

        let destination = self
            .to
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if destination.len() < 2 {
            return Err(ApiError::validation(
                "Destination must be at least 2 characters",
            ));
        }

        let ride_date = self
            .date
            .as_deref()
            .map(str::trim)
            .and_then(parse_date)
            .ok_or_else(|| ApiError::validation("Date must be in YYYY-MM-DD format"))?;

        let ride_time = self
            .time
            .as_deref()
            .map(str::trim)
            .and_then(parse_time)
            .ok_or_else(|| ApiError::validation("Time must be in HH:MM format"))?;

        let seats = self
            .seats
            .ok_or_else(|| ApiError::validation("Seats are required"))?;
        if !(1..=MAX_SEATS).contains(&seats) {
            return Err(ApiError::validation("Seats must be between 1 and 4"));
        }

        let total_fare = self
            .total_fare
            .ok_or_else(|| ApiError::validation("Total fare is required"))?;
        if total_fare < MIN_TOTAL_FARE {
            return Err(ApiError::validation("Total fare must be at least 100"));
        }

        let note = self
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(NewRide {
            origin,
            destination,
            ride_date,
            ride_time,
            seats,
            total_fare,
            note,
        })
    }
}

/// Ride as serialized for transport. `farePerPerson` and `savings` are
/// derived here, never stored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideResponse {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub date: String,
    pub time: String,
    pub seats: i32,
    pub total_fare: i32,
    pub fare_per_person: i32,
    pub savings: i32,
    pub posted_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub verified: bool,
    pub status: RideStatus,
    pub host_id: Uuid,
    pub participants: Vec<Participant>,
}

fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn format_time(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

impl From<Ride> for RideResponse {
    fn from(ride: Ride) -> Self {
        Self {
            id: ride.id,
            from: ride.origin,
            to: ride.destination,
            date: format_date(ride.ride_date),
            time: format_time(ride.ride_time),
            seats: ride.seats,
            total_fare: ride.total_fare,
            fare_per_person: fare::fare_per_person(ride.total_fare, ride.seats),
            savings: fare::savings(ride.total_fare, ride.seats),
            posted_by: ride.posted_by,
            note: ride.note,
            verified: ride.verified,
            status: ride.status,
            host_id: ride.host_id,
            participants: ride.participants.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;
    use time::macros::{date, time};
    use time::OffsetDateTime;

    fn request() -> CreateRideRequest {
        CreateRideRequest {
            from: Some("North Campus".into()),
            to: Some("City Station".into()),
            date: Some("2025-11-20".into()),
            time: Some("08:30".into()),
            seats: Some(2),
            total_fare: Some(600),
            note: None,
        }
    }

    #[test]
    fn valid_payload_parses_into_typed_fields() {
        let new = request().validate().expect("valid payload");
        assert_eq!(new.ride_date, date!(2025 - 11 - 20));
        assert_eq!(new.ride_time, time!(08:30));
        assert_eq!(new.seats, 2);
        assert_eq!(new.total_fare, 600);
    }

    #[test]
    fn rejects_short_locations() {
        let mut req = request();
        req.from = Some("A".into());
        assert!(req.validate().is_err());

        let mut req = request();
        req.to = Some("  B  ".into());
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_malformed_date_and_time() {
        let mut req = request();
        req.date = Some("20-11-2025".into());
        assert!(req.validate().is_err());

        let mut req = request();
        req.time = Some("8.30am".into());
        assert!(req.validate().is_err());

        let mut req = request();
        req.date = None;
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_seats_and_fare() {
        let mut req = request();
        req.seats = Some(0);
        assert!(req.validate().is_err());

        let mut req = request();
        req.seats = Some(5);
        assert!(req.validate().is_err());

        let mut req = request();
        req.total_fare = Some(99);
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_note_becomes_none() {
        let mut req = request();
        req.note = Some("   ".into());
        let new = req.validate().expect("valid payload");
        assert_eq!(new.note, None);
    }

    #[test]
    fn response_carries_derived_fare_fields() {
        let ride = Ride {
            id: Uuid::new_v4(),
            origin: "North Campus".into(),
            destination: "City Station".into(),
            ride_date: date!(2025 - 11 - 20),
            ride_time: time!(08:05),
            seats: 2,
            total_fare: 601,
            note: None,
            posted_by: "Host".into(),
            verified: true,
            status: RideStatus::Upcoming,
            host_id: Uuid::new_v4(),
            participants: Json(vec![]),
            created_at: OffsetDateTime::now_utc(),
        };
        let resp = RideResponse::from(ride);
        assert_eq!(resp.fare_per_person, 201);
        assert_eq!(resp.savings, 400);
        assert_eq!(resp.date, "2025-11-20");
        assert_eq!(resp.time, "08:05");

        let value = serde_json::to_value(&resp).expect("serialize ride");
        assert_eq!(value["totalFare"], 601);
        assert_eq!(value["farePerPerson"], 201);
        assert_eq!(value["status"], "upcoming");
        assert!(value.get("note").is_none());
        assert!(value.get("hostId").is_some());
    }
}
