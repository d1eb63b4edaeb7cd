use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use voyage_site_api::{app, AppState};
use voyage_site_core::dates::{BookedDate, StoreError, TravelDate, TravelDateStore};
use voyage_site_query::{ContentQueryService, MemoryContentSource};

/// Serves two departures of one voyage and records the slug it was asked for.
#[derive(Default)]
struct FixtureStore {
    asked: Mutex<Option<String>>,
}

#[async_trait]
impl TravelDateStore for FixtureStore {
    async fn upcoming_dates(
        &self,
        voyage_slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<TravelDate>, StoreError> {
        *self.asked.lock().unwrap() = Some(voyage_slug.to_string());
        let row = |id: i64, departure: &str, custom: bool, seats: i64, bookings: Vec<(i64, bool)>| {
            TravelDate {
                id,
                travel_slug: voyage_slug.to_string(),
                departure_date: departure.parse().unwrap(),
                published: true,
                custom_display: custom,
                displayed_booked_seat: seats,
                booked_dates: bookings
                    .into_iter()
                    .enumerate()
                    .map(|(i, (places, deleted))| BookedDate {
                        id: id * 100 + i as i64,
                        travel_date_id: id,
                        booked_places: Some(places),
                        deleted,
                    })
                    .collect(),
                extra: Default::default(),
            }
        };
        Ok(vec![
            row(1, "2099-11-02T08:00:00Z", false, 0, vec![(0, false), (2, false), (0, true), (3, true)]),
            row(2, "2099-12-20T08:00:00Z", true, 10, vec![(1, false), (2, false)]),
        ]
        .into_iter()
        .filter(|d| d.departure_date > now)
        .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn dates_endpoint_over_http() {
    let store = Arc::new(FixtureStore::default());
    let content = ContentQueryService::new(Arc::new(MemoryContentSource::new()));
    let router = app(AppState::new(store.clone(), content), None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let body: Value = reqwest::get(format!("http://{addr}/booking/islande-aurores/dates"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(store.asked.lock().unwrap().as_deref(), Some("islande-aurores"));
    let dates = body.as_array().expect("array of dates");
    let counts: Vec<_> = dates.iter().map(|d| d["nbInterestedBy"].clone()).collect();
    assert_eq!(counts, vec![json!(6), json!(13)]);
    assert!(dates.iter().all(|d| d.get("booked_dates").is_none()));
}
