//! Fare-splitting arithmetic.
//!
//! The total fare is divided across `seats + 1` shares: the host always
//! occupies one implicit share on top of the joinable seats. Integer ceiling
//! division, so shares always cover the full fare.

/// Per-person share of `total_fare` on a ride with `seats` joinable seats.
pub fn fare_per_person(total_fare: i32, seats: i32) -> i32 {
    let shares = seats + 1;
    (total_fare + shares - 1) / shares
}

/// What the host keeps compared to riding alone.
pub fn savings(total_fare: i32, seats: i32) -> i32 {
    total_fare - fare_per_person(total_fare, seats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_evenly_when_divisible() {
        assert_eq!(fare_per_person(600, 2), 200);
        assert_eq!(fare_per_person(600, 1), 300);
    }

    #[test]
    fn rounds_up_on_remainder() {
        assert_eq!(fare_per_person(601, 2), 201);
        assert_eq!(fare_per_person(100, 3), 25);
        assert_eq!(fare_per_person(101, 3), 26);
    }

    #[test]
    fn host_share_is_implicit() {
        // 4 seats means 5 shares in total
        assert_eq!(fare_per_person(500, 4), 100);
    }

    #[test]
    fn savings_is_total_minus_share() {
        assert_eq!(savings(600, 2), 400);
        assert_eq!(savings(601, 2), 400);
        assert_eq!(savings(100, 1), 50);
    }
}
