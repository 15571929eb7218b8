use std::sync::Arc;

use clap::Parser;
use popwatch::{
    UpdateEvent,
    actors::{poller::PollerHandle, publisher::UpdateSubscriber},
    config::{AlertPolicy, WatchConfig},
    query::A2sClient,
    resolver::DnsResolver,
};
use tracing::{debug, error, info, instrument, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(about = "Watches game servers and tells you when one needs players")]
struct Args {
    /// Alert on any occupied server with a one minute cooldown
    #[arg(long)]
    fast: bool,

    /// Log at trace level
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::DEBUG
    };
    let filter = filter::Targets::new().with_targets(vec![("popwatch", level)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let policy = if args.fast {
        AlertPolicy::fast()
    } else {
        AlertPolicy::production()
    };
    let config = WatchConfig::default().with_policy(policy);
    debug!("using {config:?}");

    let (poller, subscriber) =
        PollerHandle::start(&config, &DnsResolver, Arc::new(A2sClient::new())).await?;

    for endpoint in poller.endpoints() {
        info!("watching {endpoint}");
    }

    tokio::select! {
        _ = render_updates(subscriber) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("failed to listen for ctrl-c: {e}");
            }
            info!("shutting down");
        }
    }

    poller.shutdown().await?;
    poller.stopped().await;

    Ok(())
}

/// Console stand-in for the tray menu and balloon popup.
#[instrument(skip_all)]
async fn render_updates(mut subscriber: UpdateSubscriber) {
    while let Some(event) = subscriber.next_update().await {
        render(&event);
    }
    debug!("update channel closed");
}

fn render(event: &UpdateEvent) {
    println!("[{}] round {}", event.completed_at.format("%H:%M:%S"), event.sequence);
    for server in &event.servers {
        println!("  {}  ({})", server.status.info(), server.connect_uri());
    }
    if event.alert_triggered {
        println!("{}", event.alert_text());
    }
}
