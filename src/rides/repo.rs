use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::rides::dto::NewRide;

/// A non-host member of a ride. Stored embedded in the ride row as JSONB,
/// with camelCase keys matching the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "ride_status", rename_all = "lowercase")]
pub enum RideStatus {
    Upcoming,
    Completed,
}

#[derive(Debug, Clone, FromRow)]
pub struct Ride {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub ride_date: Date,
    pub ride_time: Time,
    pub seats: i32,
    pub total_fare: i32,
    pub note: Option<String>,
    pub posted_by: String,
    pub verified: bool,
    pub status: RideStatus,
    pub host_id: Uuid,
    pub participants: Json<Vec<Participant>>,
    pub created_at: OffsetDateTime,
}

const RIDE_COLUMNS: &str = "id, origin, destination, ride_date, ride_time, seats, total_fare, \
     note, posted_by, verified, status, host_id, participants, created_at";

/// Why a join attempt was rejected, in precondition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRejection {
    AlreadyHost,
    AlreadyJoined,
    RideFull,
}

impl JoinRejection {
    /// Classify why [`try_join`] matched nothing. Checked in the same order
    /// the admission rules are stated: host, duplicate, capacity. All three
    /// conditions are monotonic (participants only grow, the host never
    /// changes), so reading the ride after a failed conditional update cannot
    /// misattribute the rejection. Returns `None` when the ride would admit
    /// the user.
    pub fn classify(ride: &Ride, user_id: Uuid) -> Option<Self> {
        if ride.host_id == user_id {
            return Some(Self::AlreadyHost);
        }
        if ride.participants.iter().any(|p| p.user_id == user_id) {
            return Some(Self::AlreadyJoined);
        }
        if ride.participants.len() as i32 >= ride.seats {
            return Some(Self::RideFull);
        }
        None
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::AlreadyHost => "You already host this ride",
            Self::AlreadyJoined => "You already joined this ride",
            Self::RideFull => "Ride is full",
        }
    }
}

pub async fn insert(
    db: &PgPool,
    new: &NewRide,
    host_id: Uuid,
    host_name: &str,
) -> Result<Ride, sqlx::Error> {
    let ride = sqlx::query_as::<_, Ride>(&format!(
        r#"
        INSERT INTO rides (origin, destination, ride_date, ride_time, seats, total_fare,
                           note, posted_by, verified, status, host_id, participants)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, 'upcoming', $9, '[]'::jsonb)
        RETURNING {RIDE_COLUMNS}
        "#
    ))
    .bind(&new.origin)
    .bind(&new.destination)
    .bind(new.ride_date)
    .bind(new.ride_time)
    .bind(new.seats)
    .bind(new.total_fare)
    .bind(&new.note)
    .bind(host_name)
    .bind(host_id)
    .fetch_one(db)
    .await?;
    Ok(ride)
}

/// All rides, soonest first: date, then time of day, then creation order as a
/// stable tie-break.
pub async fn list(db: &PgPool) -> Result<Vec<Ride>, sqlx::Error> {
    let rides = sqlx::query_as::<_, Ride>(&format!(
        r#"
        SELECT {RIDE_COLUMNS}
        FROM rides
        ORDER BY ride_date ASC, ride_time ASC, created_at ASC
        "#
    ))
    .fetch_all(db)
    .await?;
    Ok(rides)
}

pub async fn find(db: &PgPool, ride_id: Uuid) -> Result<Option<Ride>, sqlx::Error> {
    let ride = sqlx::query_as::<_, Ride>(&format!(
        r#"
        SELECT {RIDE_COLUMNS}
        FROM rides
        WHERE id = $1
        "#
    ))
    .bind(ride_id)
    .fetch_optional(db)
    .await?;
    Ok(ride)
}

/// Appends `participant` to the ride if and only if every admission rule
/// holds at the moment Postgres applies the update: the caller is not the
/// host, is not already a participant, and a seat is still free. The
/// preconditions live in the WHERE clause, so the check and the append are a
/// single atomic statement against the row: two users racing for the last
/// seat can never both match, and the participant list can never exceed
/// `seats`.
///
/// Returns the updated ride, or `None` when no row matched. Callers
/// distinguish "ride missing" from a rule rejection by re-reading the ride
/// and applying [`JoinRejection::classify`].
pub async fn try_join(
    db: &PgPool,
    ride_id: Uuid,
    participant: &Participant,
) -> Result<Option<Ride>, sqlx::Error> {
    let membership_probe = serde_json::json!([{ "userId": participant.user_id }]);
    let ride = sqlx::query_as::<_, Ride>(&format!(
        r#"
        UPDATE rides
        SET participants = participants || $2
        WHERE id = $1
          AND host_id <> $3
          AND NOT (participants @> $4)
          AND jsonb_array_length(participants) < seats
        RETURNING {RIDE_COLUMNS}
        "#
    ))
    .bind(ride_id)
    .bind(Json(vec![participant.clone()]))
    .bind(participant.user_id)
    .bind(Json(membership_probe))
    .fetch_optional(db)
    .await?;
    Ok(ride)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    fn ride_with(host_id: Uuid, seats: i32, participants: Vec<Participant>) -> Ride {
        Ride {
            id: Uuid::new_v4(),
            origin: "North Campus".into(),
            destination: "City Station".into(),
            ride_date: date!(2025 - 11 - 20),
            ride_time: time!(08:30),
            seats,
            total_fare: 600,
            note: None,
            posted_by: "Host".into(),
            verified: true,
            status: RideStatus::Upcoming,
            host_id,
            participants: Json(participants),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn participant(user_id: Uuid) -> Participant {
        Participant {
            user_id,
            name: "Rider".into(),
            joined_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn admits_a_stranger_with_free_seats() {
        let ride = ride_with(Uuid::new_v4(), 2, vec![]);
        assert_eq!(JoinRejection::classify(&ride, Uuid::new_v4()), None);
    }

    #[test]
    fn host_is_rejected_before_any_other_rule() {
        let host = Uuid::new_v4();
        // Even on a full ride the host sees the host rejection.
        let full = ride_with(host, 1, vec![participant(Uuid::new_v4())]);
        assert_eq!(
            JoinRejection::classify(&full, host),
            Some(JoinRejection::AlreadyHost)
        );
    }

    #[test]
    fn duplicate_join_is_rejected_before_capacity() {
        let user = Uuid::new_v4();
        let full = ride_with(Uuid::new_v4(), 1, vec![participant(user)]);
        assert_eq!(
            JoinRejection::classify(&full, user),
            Some(JoinRejection::AlreadyJoined)
        );
    }

    #[test]
    fn full_ride_rejects_newcomers() {
        let ride = ride_with(
            Uuid::new_v4(),
            2,
            vec![participant(Uuid::new_v4()), participant(Uuid::new_v4())],
        );
        assert_eq!(
            JoinRejection::classify(&ride, Uuid::new_v4()),
            Some(JoinRejection::RideFull)
        );
    }

    #[test]
    fn participant_wire_keys_are_camel_case() {
        let p = participant(Uuid::new_v4());
        let value = serde_json::to_value(&p).expect("serialize participant");
        assert!(value.get("userId").is_some());
        assert!(value.get("joinedAt").is_some());
        assert!(value.get("user_id").is_none());
    }
}
