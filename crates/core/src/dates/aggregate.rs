use super::model::{BookedDate, TravelDate, TravelDateAvailability};

/// Number of people interested in a travel date.
///
/// A zero-place booking that is not deleted counts as one person. Any other
/// booking adds its places, deleted or not. An editorial override
/// (`custom_display`) is added on top of the computed count.
pub fn interested_count(date: &TravelDate) -> i64 {
    let from_bookings = date
        .booked_dates
        .iter()
        .fold(0, |sum, booking| sum + booking_weight(booking));

    if date.custom_display {
        from_bookings + date.displayed_booked_seat
    } else {
        from_bookings
    }
}

fn booking_weight(booking: &BookedDate) -> i64 {
    match booking.booked_places {
        Some(0) if !booking.deleted => 1,
        Some(places) => places,
        None => 0,
    }
}

/// Replace each date's bookings with its interested count, keeping order.
pub fn aggregate_interest(dates: Vec<TravelDate>) -> Vec<TravelDateAvailability> {
    dates
        .into_iter()
        .map(|date| {
            let nb_interested_by = interested_count(&date);
            tracing::trace!(
                travel_date = date.id,
                bookings = date.booked_dates.len(),
                nb_interested_by,
                "aggregated travel date"
            );
            TravelDateAvailability {
                id: date.id,
                travel_slug: date.travel_slug,
                departure_date: date.departure_date,
                published: date.published,
                custom_display: date.custom_display,
                displayed_booked_seat: date.displayed_booked_seat,
                extra: date.extra,
                nb_interested_by,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn booking(id: i64, places: i64, deleted: bool) -> BookedDate {
        BookedDate {
            id,
            travel_date_id: 1,
            booked_places: Some(places),
            deleted,
        }
    }

    fn date(id: i64, bookings: Vec<BookedDate>) -> TravelDate {
        TravelDate {
            id,
            travel_slug: "islande-aurores".into(),
            departure_date: "2026-11-02T08:00:00Z".parse().unwrap(),
            published: true,
            custom_display: false,
            displayed_booked_seat: 0,
            booked_dates: bookings,
            extra: Map::new(),
        }
    }

    #[test]
    fn deleted_interest_signal_is_ignored() {
        let d = date(
            1,
            vec![booking(1, 0, false), booking(2, 2, false), booking(3, 0, true)],
        );
        assert_eq!(interested_count(&d), 3);
    }

    #[test]
    fn deleted_booking_with_places_still_counts() {
        let d = date(1, vec![booking(1, 3, true)]);
        assert_eq!(interested_count(&d), 3);
    }

    #[test]
    fn custom_display_adds_override() {
        let mut d = date(
            1,
            vec![booking(1, 0, false), booking(2, 2, false)],
        );
        d.custom_display = true;
        d.displayed_booked_seat = 10;
        assert_eq!(interested_count(&d), 13);
    }

    #[test]
    fn override_ignored_without_custom_display() {
        let mut d = date(1, vec![booking(1, 2, false)]);
        d.displayed_booked_seat = 10;
        assert_eq!(interested_count(&d), 2);
    }

    #[test]
    fn negative_places_are_not_clamped() {
        let d = date(1, vec![booking(1, 4, false), booking(2, -6, false)]);
        assert_eq!(interested_count(&d), -2);
    }

    #[test]
    fn missing_places_contribute_nothing() {
        let mut b = booking(1, 0, false);
        b.booked_places = None;
        assert_eq!(interested_count(&date(1, vec![b])), 0);
    }

    #[test]
    fn aggregate_keeps_order_and_drops_bookings() {
        let out = aggregate_interest(vec![
            date(2, vec![booking(1, 1, false)]),
            date(1, vec![]),
        ]);
        assert_eq!(out.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(out[0].nb_interested_by, 1);
        assert_eq!(out[1].nb_interested_by, 0);
    }

    #[test]
    fn aggregate_empty() {
        assert!(aggregate_interest(Vec::new()).is_empty());
    }
}
