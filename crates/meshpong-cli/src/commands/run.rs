use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span, warn};

use meshpong_config::MeshpongConfig;
use meshpong_core::{DeviceAddr, Result};
use meshpong_mesh::{LoopbackMesh, MeshParams};
use meshpong_runtime::{
    CommandSource, LedIndicator, MeshpongNode, NodeStats, ParseMode, Responder,
    ScriptedCommandSource, StdinCommandSource, spawn_sources,
};

pub(super) struct RunOptions {
    pub peers: usize,
    pub peer_filter: String,
    pub commands: Vec<String>,
    pub duration_secs: Option<u64>,
    pub no_stdin: bool,
}

pub(super) async fn cmd_run(config: MeshpongConfig, opts: RunOptions) -> Result<()> {
    let handle_count = config.mesh.handle_count;
    let capacity = config.command.queue_capacity;
    let parse_mode = if config.command.strict {
        ParseMode::Strict
    } else {
        ParseMode::Lenient
    };
    let addr = config.node.address.unwrap_or_else(DeviceAddr::random);

    println!("meshpong v{}", env!("CARGO_PKG_VERSION"));
    println!("   Address:  {addr}");
    println!("   Handles:  {handle_count}");
    println!("   Interval: {} ms", config.mesh.interval_min_ms);
    println!("   Radio:    {}", config.mesh.radio());
    println!("   Peers:    {}", opts.peers);
    println!();

    let params = MeshParams::new(
        handle_count,
        Duration::from_millis(config.mesh.interval_min_ms),
    )
    .with_radio(config.mesh.radio());
    let mesh = LoopbackMesh::start(params);
    let (stop_tx, stop_rx) = watch::channel(false);

    let peers: Vec<_> = (0..opts.peers)
        .map(|i| {
            spawn_peer(
                &mesh,
                format!("peer-{i}"),
                &opts.peer_filter,
                parse_mode,
                capacity,
                stop_rx.clone(),
            )
        })
        .collect();

    let (store, events) = mesh.join(addr);
    let responder =
        Responder::new(addr, store, LedIndicator::new(), handle_count).with_parse_mode(parse_mode);
    let mut node = MeshpongNode::new("local", responder);

    let script: Vec<String> = config
        .node
        .initial_command
        .into_iter()
        .chain(opts.commands)
        .collect();
    let mut sources: Vec<Box<dyn CommandSource>> =
        vec![Box::new(ScriptedCommandSource::from_lines(script))];
    if !opts.no_stdin {
        sources.push(Box::new(StdinCommandSource::new()));
    }
    let commands = spawn_sources(sources, capacity);

    let duration = opts.duration_secs.map(Duration::from_secs);
    let shutdown = async move {
        match duration {
            Some(d) => tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = tokio::time::sleep(d) => info!("run duration elapsed"),
            },
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };

    let result = node
        .run(events, commands, shutdown)
        .instrument(info_span!("node", name = "local", %addr))
        .await;

    let _ = stop_tx.send(true);
    let mut rows = vec![("local".to_string(), node.stats())];
    for peer in peers {
        match peer.await {
            Ok((name, Ok(stats))) => rows.push((name, stats)),
            Ok((name, Err(e))) => warn!(peer = %name, error = %e, "peer stopped with an error"),
            Err(e) => warn!(error = %e, "peer task failed"),
        }
    }
    print_summary(&rows);

    result.map(|_| ())
}

fn spawn_peer(
    mesh: &LoopbackMesh,
    name: String,
    filter: &str,
    parse_mode: ParseMode,
    capacity: usize,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<(String, Result<NodeStats>)> {
    let addr = DeviceAddr::random();
    let (store, events) = mesh.join(addr);
    let responder = Responder::new(addr, store, LedIndicator::new(), mesh.handle_count())
        .with_parse_mode(parse_mode);
    let mut node = MeshpongNode::new(name.clone(), responder);
    let commands = spawn_sources(
        vec![Box::new(ScriptedCommandSource::from_lines([filter]))],
        capacity,
    );
    let span = info_span!("node", name = %name, %addr);

    tokio::spawn(
        async move {
            let shutdown = async move {
                let _ = stop.changed().await;
            };
            let result = node.run(events, commands, shutdown).await;
            (name, result)
        }
        .instrument(span),
    )
}

fn print_summary(rows: &[(String, NodeStats)]) {
    println!();
    println!(
        "{:<10} {:>8} {:>9} {:>12} {:>9} {:>9}",
        "node", "events", "commands", "republished", "disabled", "rejected"
    );
    for (name, s) in rows {
        println!(
            "{:<10} {:>8} {:>9} {:>12} {:>9} {:>9}",
            name, s.events, s.commands, s.republished, s.disabled, s.rejected
        );
    }
}
