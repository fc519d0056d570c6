//! Integration tests for the PostgreSQL store
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a PostgreSQL container)
//! - Feature flag `postgres` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features postgres --test postgres_tests -- --test-threads=1
//! ```
//!
//! All tests share a single container. Each test opens its own pool and
//! truncates the tables first.

#![cfg(feature = "postgres")]

use casting::prelude::*;
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::OnceLock;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

struct PgTestEnv {
    /// Dropping this stops the container
    _container: testcontainers::ContainerAsync<Postgres>,
    connection_url: String,
}

/// Process-global so the container outlives each `#[tokio::test]` runtime
static TEST_ENV: OnceLock<PgTestEnv> = OnceLock::new();

async fn init_pg_env() -> &'static PgTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container, is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL");
    casting::storage::postgres::ensure_schema(&pool)
        .await
        .expect("Failed to create schema");
    pool.close().await;

    let _ = TEST_ENV.set(PgTestEnv {
        _container: container,
        connection_url: url,
    });
    TEST_ENV.get().unwrap()
}

/// Fresh store on the current runtime with empty tables
async fn clean_store() -> PostgresStore {
    let env = init_pg_env().await;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&env.connection_url)
        .await
        .expect("Failed to connect to PostgreSQL");

    sqlx::query("TRUNCATE association, movie, actor RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to truncate tables");

    PostgresStore::new(pool)
}

fn new_movie(title: &str) -> NewMovie {
    NewMovie {
        title: title.to_string(),
        release_date: NaiveDate::from_ymd_opt(2014, 2, 12),
    }
}

fn new_actor(name: &str) -> NewActor {
    NewActor {
        name: name.to_string(),
        age: 30,
        gender: None,
    }
}

#[tokio::test]
async fn test_movie_crud() {
    let store = clean_store().await;

    let movie = DataService::<Movie>::create(&store, new_movie("Supermen"))
        .await
        .unwrap();
    assert_eq!(movie.id, 1);
    assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(2014, 2, 12));

    let mut changed = movie.clone();
    changed.title = "Batmen".to_string();
    changed.release_date = None;
    let updated = DataService::<Movie>::update(&store, changed)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Batmen");
    assert_eq!(updated.release_date, None);

    let listed = DataService::<Movie>::list(&store).await.unwrap();
    assert_eq!(listed, vec![updated]);

    assert!(DataService::<Movie>::delete(&store, movie.id).await.unwrap());
    assert!(!DataService::<Movie>::delete(&store, movie.id).await.unwrap());
    assert!(DataService::<Movie>::get(&store, movie.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_actor_crud() {
    let store = clean_store().await;

    let actor = DataService::<Actor>::create(&store, new_actor("Anna")).await.unwrap();
    let fetched = DataService::<Actor>::get(&store, actor.id).await.unwrap();
    assert_eq!(fetched, Some(actor.clone()));

    let mut ghost = actor.clone();
    ghost.id = 999;
    assert!(DataService::<Actor>::update(&store, ghost).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_many_skips_missing_and_orders_by_id() {
    let store = clean_store().await;
    let a = DataService::<Actor>::create(&store, new_actor("A")).await.unwrap();
    let b = DataService::<Actor>::create(&store, new_actor("B")).await.unwrap();

    let found = DataService::<Actor>::get_many(&store, &[b.id, 42, a.id]).await.unwrap();

    assert_eq!(found, vec![a, b]);
}

#[tokio::test]
async fn test_link_is_idempotent_and_skips_dangling() {
    let store = clean_store().await;
    let movie = DataService::<Movie>::create(&store, new_movie("Supermen")).await.unwrap();
    let actor = DataService::<Actor>::create(&store, new_actor("Anna")).await.unwrap();

    let pairs = [
        Association::new(movie.id, actor.id),
        Association::new(movie.id, 404),
    ];
    assert_eq!(store.link_all(&pairs).await.unwrap(), 1);
    assert_eq!(store.link_all(&pairs).await.unwrap(), 0);

    assert_eq!(
        store.find_by_movie(movie.id).await.unwrap(),
        vec![Association::new(movie.id, actor.id)]
    );
    assert_eq!(
        store.find_by_actor(actor.id).await.unwrap(),
        vec![Association::new(movie.id, actor.id)]
    );
}

#[tokio::test]
async fn test_unlink_and_cascade() {
    let store = clean_store().await;
    let movie = DataService::<Movie>::create(&store, new_movie("Supermen")).await.unwrap();
    let anna = DataService::<Actor>::create(&store, new_actor("Anna")).await.unwrap();
    let boris = DataService::<Actor>::create(&store, new_actor("Boris")).await.unwrap();
    store
        .link_all(&[
            Association::new(movie.id, anna.id),
            Association::new(movie.id, boris.id),
        ])
        .await
        .unwrap();

    let removed = store
        .unlink_all(&[Association::new(movie.id, anna.id)])
        .await
        .unwrap();
    assert_eq!(removed, 1);

    assert!(DataService::<Actor>::delete(&store, boris.id).await.unwrap());
    assert!(store.find_by_movie(movie.id).await.unwrap().is_empty());
}
