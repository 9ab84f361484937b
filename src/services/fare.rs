//! Fare and segment arithmetic.
//!
//! Fares are exact integers in minor currency units; no floating point is
//! involved anywhere in the money path.

use super::error::BookingError;

/// Number of segments traversed between two stops on the same route.
///
/// The reverse direction is never valid: the boarding stop must come
/// strictly before the alighting stop.
pub fn segment_count(from_order: i64, to_order: i64) -> Result<i64, BookingError> {
    if from_order >= to_order {
        return Err(BookingError::InvalidSelection);
    }
    Ok(to_order - from_order)
}

/// Total fare for a journey: segments * per-segment rate * passengers.
pub fn compute_fare(
    fare_per_segment: i64,
    from_order: i64,
    to_order: i64,
    passengers: i64,
) -> Result<i64, BookingError> {
    if passengers < 1 {
        return Err(BookingError::InvalidSelection);
    }
    let segments = segment_count(from_order, to_order)?;
    Ok(segments * fare_per_segment * passengers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_segments_two_passengers() {
        // A(1) -> C(3) over a 50-per-segment train
        assert_eq!(compute_fare(50, 1, 3, 2).unwrap(), 200);
    }

    #[test]
    fn single_segment_single_passenger() {
        assert_eq!(compute_fare(75, 2, 3, 1).unwrap(), 75);
    }

    #[test]
    fn reversed_pair_is_rejected() {
        assert!(matches!(
            compute_fare(50, 3, 1, 1),
            Err(BookingError::InvalidSelection)
        ));
    }

    #[test]
    fn same_stop_is_rejected() {
        assert!(matches!(
            segment_count(2, 2),
            Err(BookingError::InvalidSelection)
        ));
    }

    #[test]
    fn zero_passengers_is_rejected() {
        assert!(matches!(
            compute_fare(50, 1, 2, 0),
            Err(BookingError::InvalidSelection)
        ));
    }

    #[test]
    fn fare_is_strictly_increasing_in_segment_count() {
        let mut last = 0;
        for to_order in 2..=6 {
            let fare = compute_fare(50, 1, to_order, 3).unwrap();
            assert!(fare > last);
            last = fare;
        }
    }
}
