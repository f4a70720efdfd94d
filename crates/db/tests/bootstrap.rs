use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    imgharvest_db::health_check(&pool).await.unwrap();

    let exists: (bool,) = sqlx::query_as(
        "SELECT EXISTS (
             SELECT 1 FROM information_schema.tables
             WHERE table_schema = 'public' AND table_name = 'images'
         )",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(exists.0, "images table should exist after migrations");
}

/// Re-running the embedded migrations against a migrated database is a no-op.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_migrations_are_idempotent(pool: PgPool) {
    imgharvest_db::run_migrations(&pool).await.unwrap();
    imgharvest_db::run_migrations(&pool).await.unwrap();

    let count = imgharvest_db::repositories::ImageRepo::count(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

/// The binary's path: build a pool from connect options, then migrate.
#[sqlx::test(migrations = false)]
async fn test_pool_from_connect_options(_: PgPoolOptions, options: PgConnectOptions) {
    let pool = imgharvest_db::create_pool_with(options).await.unwrap();
    assert_eq!(pool.options().get_max_connections(), 1);

    imgharvest_db::health_check(&pool).await.unwrap();
    imgharvest_db::run_migrations(&pool).await.unwrap();
    assert_eq!(
        imgharvest_db::repositories::ImageRepo::count(&pool)
            .await
            .unwrap(),
        0
    );

    pool.close().await;
}
