use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::database::directory_repo;
use crate::models::{DirectoryUserRow, Gender, RegistrationOrder, UsersRow};

// Mean earth radius, same value geopy's great_circle uses.
const EARTH_RADIUS_KM: f64 = 6371.009;

#[derive(Debug, Deserialize, Default, Validate)]
pub struct DirectoryQuery {
    pub gender: Option<Gender>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub sort_by_registration: Option<RegistrationOrder>,
    #[validate(range(min = 0.0))]
    pub max_distance: Option<f64>,
}

/// Lists other active users matching `query`; the requester is never included.
pub async fn list_users(
    pool: &SqlitePool,
    requester: &UsersRow,
    query: &DirectoryQuery,
) -> sqlx::Result<Vec<DirectoryUserRow>> {
    let rows = directory_repo::load_directory_candidates(
        pool,
        requester.id,
        query.gender,
        query.sort_by_registration,
    )
    .await?;

    let first_name = normalized_needle(query.first_name.as_deref());
    let last_name = normalized_needle(query.last_name.as_deref());

    let rows = rows
        .into_iter()
        .filter(|u| contains_folded(&u.first_name, first_name.as_deref()))
        .filter(|u| contains_folded(&u.last_name, last_name.as_deref()));

    let Some(max_distance) = query.max_distance else {
        return Ok(rows.collect());
    };
    let Some((lat0, lon0)) = requester.coordinates() else {
        return Ok(Vec::new());
    };

    let mut users = Vec::new();
    for mut user in rows {
        let (Some(lat1), Some(lon1)) = (user.latitude, user.longitude) else {
            continue;
        };
        let dist = great_circle_km(lat0, lon0, lat1, lon1);
        if dist > max_distance {
            continue;
        }
        user.distance_km = Some(dist);
        users.push(user);
    }
    Ok(users)
}

pub fn great_circle_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = |deg: f64| deg.to_radians();
    let dlat = to_rad(lat2 - lat1);
    let dlon = to_rad(lon2 - lon1);
    let a = (dlat / 2.0).sin().powi(2)
        + to_rad(lat1).cos() * to_rad(lat2).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

fn normalized_needle(raw: Option<&str>) -> Option<String> {
    raw.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
}

fn contains_folded(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(needle),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_profile, seed_user, test_pool, Profile};
    use chrono::{TimeZone, Utc};

    fn ids(users: &[DirectoryUserRow]) -> Vec<i64> {
        users.iter().map(|u| u.id).collect()
    }

    #[test]
    fn distance_matches_known_values() {
        let near = great_circle_km(0.0, 0.0, 0.0, 0.1);
        assert!((near - 11.12).abs() < 0.05, "got {near}");
        let far = great_circle_km(0.0, 0.0, 10.0, 10.0);
        assert!((far - 1568.5).abs() < 5.0, "got {far}");
        assert_eq!(great_circle_km(52.37, 4.89, 52.37, 4.89), 0.0);
    }

    #[tokio::test]
    async fn max_distance_keeps_only_nearby_users() {
        let pool = test_pool().await;
        let me = seed_user(&pool, "me", Some((0.0, 0.0))).await;
        let near = seed_user(&pool, "near", Some((0.0, 0.1))).await;
        seed_user(&pool, "far", Some((10.0, 10.0))).await;
        seed_user(&pool, "nowhere", None).await;

        let query = DirectoryQuery {
            max_distance: Some(50.0),
            ..Default::default()
        };
        let users = list_users(&pool, &me, &query).await.unwrap();

        assert_eq!(ids(&users), vec![near.id]);
        let dist = users[0].distance_km.unwrap();
        assert!(dist > 11.0 && dist < 11.2);
    }

    #[tokio::test]
    async fn requester_is_never_listed() {
        let pool = test_pool().await;
        let me = seed_user(&pool, "me", Some((0.0, 0.0))).await;
        let other = seed_user(&pool, "other", Some((0.0, 0.0))).await;

        let all = list_users(&pool, &me, &DirectoryQuery::default())
            .await
            .unwrap();
        assert_eq!(ids(&all), vec![other.id]);

        let nearby = DirectoryQuery {
            max_distance: Some(0.0),
            ..Default::default()
        };
        let within_zero = list_users(&pool, &me, &nearby).await.unwrap();
        assert_eq!(ids(&within_zero), vec![other.id]);
    }

    #[tokio::test]
    async fn requester_without_location_gets_nothing_for_distance_filter() {
        let pool = test_pool().await;
        let me = seed_user(&pool, "me", None).await;
        seed_user(&pool, "other", Some((0.0, 0.0))).await;

        let query = DirectoryQuery {
            max_distance: Some(10_000.0),
            ..Default::default()
        };
        assert!(list_users(&pool, &me, &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn gender_and_name_filters_combine() {
        let pool = test_pool().await;
        let me = seed_user(&pool, "me", None).await;
        let ivan = seed_profile(
            &pool,
            Profile {
                gender: Gender::Male,
                first_name: "Иван",
                last_name: "Петров",
                ..Profile::new("ivan")
            },
        )
        .await;
        seed_profile(
            &pool,
            Profile {
                gender: Gender::Female,
                first_name: "Ивана",
                last_name: "Петрова",
                ..Profile::new("ivana")
            },
        )
        .await;
        seed_profile(
            &pool,
            Profile {
                gender: Gender::Male,
                first_name: "Oleg",
                last_name: "Sidorov",
                ..Profile::new("oleg")
            },
        )
        .await;

        let query = DirectoryQuery {
            gender: Some(Gender::Male),
            first_name: Some("ИВА".to_string()),
            last_name: Some("петр".to_string()),
            ..Default::default()
        };
        let users = list_users(&pool, &me, &query).await.unwrap();
        assert_eq!(ids(&users), vec![ivan.id]);
    }

    #[tokio::test]
    async fn sorts_by_registration_date() {
        let pool = test_pool().await;
        let me = seed_user(&pool, "me", None).await;
        let day = |d: u32| Utc.with_ymd_and_hms(2026, 10, d, 12, 0, 0).unwrap();
        let middle = seed_profile(
            &pool,
            Profile {
                created_at: day(10),
                ..Profile::new("middle")
            },
        )
        .await;
        let oldest = seed_profile(
            &pool,
            Profile {
                created_at: day(1),
                ..Profile::new("oldest")
            },
        )
        .await;
        let newest = seed_profile(
            &pool,
            Profile {
                created_at: day(15),
                ..Profile::new("newest")
            },
        )
        .await;

        let latest = DirectoryQuery {
            sort_by_registration: Some(RegistrationOrder::Latest),
            ..Default::default()
        };
        let users = list_users(&pool, &me, &latest).await.unwrap();
        // `me` was created "now" and is excluded anyway.
        assert_eq!(ids(&users), vec![newest.id, middle.id, oldest.id]);

        let earliest = DirectoryQuery {
            sort_by_registration: Some(RegistrationOrder::Earliest),
            ..Default::default()
        };
        let users = list_users(&pool, &me, &earliest).await.unwrap();
        assert_eq!(ids(&users), vec![oldest.id, middle.id, newest.id]);
    }

    #[test]
    fn negative_distance_fails_validation() {
        let query = DirectoryQuery {
            max_distance: Some(-1.0),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }
}
