use anyhow::Context;
use clap::Parser;
use futures::StreamExt;
use pg_realtime::postgres::{ChangeRecord, PgChangeSource, PgConnection, ReplicationSlot};
use pg_realtime::{subscribe, Config};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "pg-realtime")]
#[command(about = "Stream PostgreSQL test_decoding changes as JSON lines", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    info!("Starting pg-realtime");
    info!("Loading configuration from {:?}", args.config);

    let config = Config::from_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    info!(
        postgres_host = %config.postgres.host,
        postgres_port = %config.postgres.port,
        postgres_database = %config.postgres.database,
        slot_name = %config.subscription.slot_name,
        poll_interval_ms = config.subscription.poll_interval_ms,
        on_parse_failure = ?config.subscription.on_parse_failure,
        "Configuration summary"
    );

    let connection = PgConnection::connect(&config.postgres_url())
        .await
        .context("failed to connect to PostgreSQL")?;
    let client = connection.client();

    let slot = ReplicationSlot::new(config.subscription.slot_name.clone());
    if config.subscription.create_slot {
        slot.ensure(&client).await?;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
        let _ = shutdown_tx.send(true);
    });

    let source = PgChangeSource::new(client.clone(), slot.clone(), config.subscription.max_changes);
    let (mut records, handle) = subscribe(source, &config.subscription, shutdown_rx);

    let mut stdout = std::io::stdout();
    let mut output = Ok(());
    while let Some(record) = records.next().await {
        if let Err(e) = write_record(&mut stdout, &record) {
            error!("Failed to write record: {}", e);
            output = Err(e);
            break;
        }
    }
    drop(records);

    let outcome = handle.await.context("subscriber task failed")?;

    if config.subscription.drop_slot_on_exit {
        if let Err(e) = slot.remove(&client).await {
            error!("Failed to drop replication slot: {}", e);
        }
    }
    drop(client);
    connection.close();

    output?;
    let stats = outcome?;
    info!(
        records = stats.records,
        skipped = stats.skipped,
        "pg-realtime finished"
    );
    Ok(())
}

fn write_record(out: &mut impl Write, record: &ChangeRecord) -> pg_realtime::Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("pg_realtime=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pg_realtime=info,warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
