//! Runs the travel-date query against a live PostgreSQL server.
//!
//! `cargo test -p voyage-site-core -- --ignored` with `DATABASE_URL` set.
//! Tables are created as temporary tables on a single connection, so the
//! target database is left untouched.

use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use voyage_site_core::dates::{aggregate_interest, PgTravelDateStore, TravelDateStore};

async fn scratch_pool(departure_type: &str) -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect(&url)
        .await
        .expect("connect");

    // Plain timestamp columns are read back as UTC.
    sqlx::query("SET TIME ZONE 'UTC'")
        .execute(&pool)
        .await
        .expect("set time zone");

    sqlx::query(&format!(
        "CREATE TEMP TABLE travel_dates (
            id bigint PRIMARY KEY,
            travel_slug text NOT NULL,
            departure_date {departure_type} NOT NULL,
            published boolean,
            custom_display boolean,
            displayed_booked_seat bigint,
            price integer
        )"
    ))
    .execute(&pool)
    .await
    .expect("create travel_dates");

    sqlx::query(
        "CREATE TEMP TABLE booked_dates (
            id bigint PRIMARY KEY,
            travel_date_id bigint NOT NULL,
            booked_places bigint,
            deleted boolean
        )",
    )
    .execute(&pool)
    .await
    .expect("create booked_dates");

    pool
}

async fn seed(pool: &PgPool, now: DateTime<Utc>) {
    // id, slug, departure, published, custom_display, displayed seats
    let dates: [(i64, &str, DateTime<Utc>, Option<bool>, Option<bool>, Option<i64>); 6] = [
        (1, "islande", now + Duration::days(30), Some(true), Some(false), None),
        (2, "islande", now + Duration::days(10), Some(true), Some(true), Some(10)),
        (3, "islande", now - Duration::days(3), Some(true), Some(false), None),
        (4, "islande", now + Duration::days(20), Some(false), Some(false), None),
        (5, "islande", now + Duration::days(40), None, Some(false), None),
        (6, "laponie", now + Duration::days(15), Some(true), Some(false), None),
    ];
    for (id, slug, departure, published, custom, seats) in dates {
        sqlx::query(
            "INSERT INTO travel_dates
                (id, travel_slug, departure_date, published, custom_display, displayed_booked_seat, price)
             VALUES ($1, $2, $3::timestamptz, $4, $5, $6, 2490)",
        )
        .bind(id)
        .bind(slug)
        .bind(departure)
        .bind(published)
        .bind(custom)
        .bind(seats)
        .execute(pool)
        .await
        .expect("insert travel date");
    }

    let bookings: [(i64, i64, Option<i64>, Option<bool>); 7] = [
        (10, 1, Some(0), None),
        (11, 1, Some(2), Some(false)),
        (12, 1, Some(0), Some(true)),
        (13, 1, Some(3), Some(true)),
        (14, 1, None, None),
        (20, 2, Some(1), None),
        (30, 3, Some(5), None),
    ];
    for (id, travel_date_id, places, deleted) in bookings {
        sqlx::query(
            "INSERT INTO booked_dates (id, travel_date_id, booked_places, deleted)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(travel_date_id)
        .bind(places)
        .bind(deleted)
        .execute(pool)
        .await
        .expect("insert booking");
    }
}

async fn assert_upcoming_only(departure_type: &str) {
    let now = Utc::now();
    let pool = scratch_pool(departure_type).await;
    seed(&pool, now).await;
    let store = PgTravelDateStore::new(pool);

    let rows = store.upcoming_dates("islande", now).await.expect("query");
    let ids: Vec<i64> = rows.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![2, 1], "published future dates of the slug, earliest first");

    let first = &rows[1];
    assert_eq!(first.booked_dates.len(), 5);
    assert!(first.booked_dates[2].deleted);
    assert!(!first.booked_dates[0].deleted);
    assert_eq!(first.booked_dates[4].booked_places, None);
    assert_eq!(first.extra.get("price"), Some(&serde_json::json!(2490)));

    let counts: Vec<i64> = aggregate_interest(rows)
        .into_iter()
        .map(|d| d.nb_interested_by)
        .collect();
    // date 2: 1 + 10 displayed; date 1: 1 + 2 + 0 + 3 + 0
    assert_eq!(counts, vec![11, 6]);

    assert!(store.upcoming_dates("inconnu", now).await.unwrap().is_empty());
    store.ping().await.expect("ping");
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
async fn upcoming_dates_with_timestamptz_column() {
    assert_upcoming_only("timestamptz").await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
async fn upcoming_dates_with_plain_timestamp_column() {
    assert_upcoming_only("timestamp").await;
}
