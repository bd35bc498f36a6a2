//! # Example: file_target
//!
//! Runs a pool whose size is read from `/tmp/target_count` once per second.
//! Every worker prints a line every 3 seconds for up to a minute and is then replaced.
//! Writing `true` to `/tmp/stop_flag` suspends reconciling; anything else resumes it.
//!
//! ## Run
//! ```bash
//! echo 2 > /tmp/target_count
//! cargo run --example file_target
//! # in another shell:
//! echo 5 > /tmp/target_count
//! echo 1 > /tmp/target_count
//! ```

use std::sync::Arc;

use poolvisor::{
    FileFlagSource, FileSource, LogWriter, Pool, PoolConfig, WorkError, WorkFn, WorkRef,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poolvisor=info,file_target=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let print_something: WorkRef = WorkFn::arc("print-something", |task: Uuid| async move {
        tracing::info!(%task, "doing work");
        Ok::<_, WorkError>(())
    });

    let pool = Pool::builder(PoolConfig::default(), print_something)
        .with_source(FileSource::new("/tmp/target_count"))
        .with_subscribers(vec![Arc::new(LogWriter::new())])
        .with_stop_flag(FileFlagSource::new("/tmp/stop_flag"))
        .build();

    pool.run().await?;
    Ok(())
}
