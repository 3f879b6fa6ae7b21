//! Transactional outbox relayer.
//!
//! Claims batches of `PENDING` rows from Postgres, dispatches them to a
//! webhook gateway, records outcomes transactionally, and mirrors successful
//! sends into a Redis delivery cache. An HTTP surface exposes a paginated
//! read of sent messages plus a scheduler on/off toggle.

use std::sync::Arc;
use std::time::Duration;

use database::postgres::connect_from_config_with_retry as connect_postgres_with_retry;
use database::redis::connect_from_config_with_retry as connect_redis_with_retry;
use domain_messages::{
    cache_event_channel, run_cache_consumer, HttpUpstreamSender, PgMessageRepository,
    QueryService, RedisMessageCache, RelayerJob,
};
use tracing::info;

mod api;
mod config;
mod job_adapter;
mod scheduler;
mod shutdown;
mod state;

use shutdown::serve_with_graceful_shutdown;

pub use config::Config;
use scheduler::Scheduler;
use state::AppState;

pub async fn run() -> eyre::Result<()> {
    color_eyre::install()?;

    let config = Config::from_env()?;
    core_config::tracing::init_tracing(&config.environment);

    info!("connecting to PostgreSQL");
    let db = connect_postgres_with_retry(config.postgres.clone(), None).await?;

    if config.migration.run_migrations {
        database::postgres::run_migrations::<migration::Migrator>(&db, "relayer").await?;
    }

    info!("connecting to Redis");
    let redis = connect_redis_with_retry(config.cache.redis.clone(), None).await?;

    let (cache_tx, cache_rx) = cache_event_channel();
    let (cache_shutdown_tx, cache_shutdown_rx) = tokio::sync::watch::channel(false);

    let cache = RedisMessageCache::new(redis.clone(), config.cache.ttl);
    let cache_consumer_handle =
        tokio::spawn(run_cache_consumer(cache, cache_rx, cache_shutdown_rx));

    let repository = PgMessageRepository::new(db.clone());
    let sender = HttpUpstreamSender::new(
        config.webhook.url.clone(),
        config.webhook.auth_key.clone(),
        config.webhook.timeout,
    );
    let job = RelayerJob::new(
        repository,
        sender,
        cache_tx,
        config.relayer.batch_size,
        config.relayer.max_attempts,
        config.relayer.send_timeout,
    );

    let relayer_scheduler = Arc::new(Scheduler::new(job, config.schedule.interval));
    relayer_scheduler.start().await;

    let query_service = Arc::new(QueryService::new(db.clone()));

    let state = AppState {
        db: db.clone(),
        redis: redis.clone(),
        query_service,
        scheduler: relayer_scheduler.clone(),
    };

    let router = api::router(state);

    let cleanup_scheduler = relayer_scheduler.clone();
    serve_with_graceful_shutdown(
        router,
        &config.server,
        Duration::from_secs(30),
        async move {
            info!("stopping scheduler");
            cleanup_scheduler.stop().await;
            info!("closing cache channel");
            let _ = cache_shutdown_tx.send(true);
            let _ = cache_consumer_handle.await;
        },
    )
    .await
    .map_err(|e| eyre::eyre!("server error: {e}"))?;

    info!("relayer shutdown complete");
    Ok(())
}
