use crate::clock::SystemClock;
use crate::conf::{RuntimeConfig, ServerConfig};
use crate::dispatch::{DispatchSettings, Dispatcher};
use crate::server::consumer::Consumer;
use crate::server::pid::PidFile;
use crate::source::EventSource;
use crate::store::LogStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

type Backends = (Arc<dyn LogStore>, Arc<dyn EventSource>);

/// Open the store and the source against the configured Redis server.
#[cfg(feature = "redis")]
pub fn connect(config: &ServerConfig) -> Result<Backends> {
    use crate::source::RedisSource;
    use crate::store::RedisStore;

    let client = redis::Client::open(config.redis_url.as_str())
        .with_context(|| format!("invalid redis url {}", config.redis_url))?;

    let store = RedisStore::connect(&client).context("failed to connect store")?;
    let source =
        RedisSource::connect(&client, config.block_ms).context("failed to connect source")?;

    tracing::info!(block_ms = config.block_ms, "connected to redis");
    Ok((Arc::new(store), Arc::new(source)))
}

#[cfg(not(feature = "redis"))]
pub fn connect(_config: &ServerConfig) -> Result<Backends> {
    anyhow::bail!("logsplit was built without the `redis` feature")
}

/// Create a dispatcher for `config` and register it.
pub fn build_dispatcher(
    store: Arc<dyn LogStore>,
    source: Arc<dyn EventSource>,
    config: &RuntimeConfig,
) -> Result<Dispatcher> {
    let mut dispatcher = Dispatcher::new(
        store,
        source,
        Arc::new(SystemClock),
        DispatchSettings::from(&config.trigger),
    );

    dispatcher
        .register(config.options())
        .context("failed to register stream trigger")?;

    Ok(dispatcher)
}

/// Run the consumer against the configured Redis server until Ctrl-C.
pub fn run(config: RuntimeConfig) -> Result<()> {
    let (store, source) = connect(&config.server)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    ctrlc::set_handler({
        let shutdown = shutdown.clone();
        move || {
            tracing::info!("shutdown requested");
            shutdown.store(true, Ordering::SeqCst);
        }
    })
    .context("failed to install shutdown handler")?;

    serve(store, source, &config, &shutdown)
}

/// Register and consume from the given backends until `shutdown` is set.
pub fn serve(
    store: Arc<dyn LogStore>,
    source: Arc<dyn EventSource>,
    config: &RuntimeConfig,
    shutdown: &AtomicBool,
) -> Result<()> {
    let dispatcher = build_dispatcher(store, source, config)?;

    // Best-effort; the guard removes the file when serve returns.
    let _pid_file = config
        .server
        .pid_file
        .as_ref()
        .and_then(|path| match PidFile::create(path) {
            Ok(guard) => {
                tracing::info!(pid_file = %guard.path().display(), pid = guard.pid(), "pid file written");
                Some(guard)
            }
            Err(e) => {
                tracing::warn!(error = %e, pid_file = %path, "failed to write pid file; continuing");
                None
            }
        });

    let mut consumer = Consumer::new(
        dispatcher,
        config.server.control_key.clone(),
        Duration::from_millis(config.server.idle_sleep_ms),
    );
    consumer.run(shutdown).context("consumer stopped")
}
