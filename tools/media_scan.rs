use std::env;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use common::{MediaItem, MediaKind};
use library::config::{
    config_path_from_env, load_or_create_config, resolve_directories, resolve_path,
};
use library::{AbortHandle, FileSearcher, MediaIndex, MediaModel, ReloadStats, SearchEvents};
use serde_json::{json, Value};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: media_scan [CONFIG] [--force] [--kind movies|tv|concerts] [--json]";

enum SearchEvent {
    Started(String),
    Entered(String),
    Progress { current: usize, total: usize },
    Complete { kind: MediaKind, count: usize },
}

struct ChannelEvents {
    tx: UnboundedSender<SearchEvent>,
}

impl SearchEvents for ChannelEvents {
    fn on_search_started(&self, message: &str) {
        let _ = self.tx.send(SearchEvent::Started(message.to_string()));
    }

    fn on_entered_directory(&self, path: &str) {
        let _ = self.tx.send(SearchEvent::Entered(path.to_string()));
    }

    fn on_progress(&self, current: usize, total: usize, _operation_id: u32) {
        let _ = self.tx.send(SearchEvent::Progress { current, total });
    }

    fn on_search_complete(&self, kind: MediaKind, count: usize) {
        let _ = self.tx.send(SearchEvent::Complete { kind, count });
    }
}

struct Args {
    config_path: PathBuf,
    force: bool,
    kind: Option<MediaKind>,
    json: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut config_path = None;
    let mut force = false;
    let mut kind = None;
    let mut json = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--force" => force = true,
            "--json" => json = true,
            "--kind" => {
                let value = args.next().ok_or(USAGE)?;
                kind = Some(parse_kind(&value).ok_or_else(|| format!("unknown kind: {}", value))?);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ if config_path.is_none() && !arg.starts_with('-') => {
                config_path = Some(PathBuf::from(arg));
            }
            _ => return Err(format!("unexpected argument: {}\n{}", arg, USAGE)),
        }
    }

    Ok(Args {
        config_path: config_path.unwrap_or_else(config_path_from_env),
        force,
        kind,
        json,
    })
}

fn parse_kind(value: &str) -> Option<MediaKind> {
    match value.to_ascii_lowercase().as_str() {
        "movie" | "movies" => Some(MediaKind::Movie),
        "tv" | "tvshow" | "tvshows" | "tv_shows" => Some(MediaKind::TvShow),
        "concert" | "concerts" => Some(MediaKind::Concert),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;
    let (config, created) = load_or_create_config(&args.config_path)?;

    let default_level = if config.debug_log { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if created {
        info!("Created default config at {:?}", args.config_path);
    } else {
        info!("Loaded config from {:?}", args.config_path);
    }

    let index_path = resolve_path(&args.config_path, &config.index_path);
    let index = MediaIndex::open(&index_path)?;

    let kinds: Vec<MediaKind> = match args.kind {
        Some(kind) => vec![kind],
        None => MediaKind::ALL.to_vec(),
    };

    let mut reports: Vec<Value> = Vec::new();
    for kind in kinds {
        let directories = resolve_directories(&args.config_path, &config, kind);
        if directories.is_empty() {
            info!("No {} directories configured", kind.label());
            continue;
        }

        let (tx, rx) = unbounded_channel();
        let model = MediaModel::default();
        let mut searcher = FileSearcher::new(kind, index.clone(), model.clone())
            .with_filter(config.file_filter(kind))
            .with_events(Arc::new(ChannelEvents { tx }));
        searcher.set_directories(directories);
        let searcher = Arc::new(searcher);

        let reporter = tokio::spawn(report_events(rx));
        let abort = searcher.abort_handle();
        let worker = Arc::clone(&searcher);
        let force = args.force;
        let task = tokio::task::spawn_blocking(move || worker.reload(force));

        let result = wait_for_reload(task, &abort, kind, tokio::signal::ctrl_c).await;
        drop(searcher);
        reporter.await?;

        let stats = result??;
        if stats.aborted {
            println!("Aborted: {} (nothing new saved)", kind.label());
            reports.push(kind_report(kind, &stats, &[]));
            break;
        }
        println!(
            "Loaded: {} {} ({} stored from disk)",
            stats.loaded,
            kind.label(),
            stats.stored
        );
        reports.push(kind_report(kind, &stats, &model.items()));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

/// Waits for the reload, aborting it on every Ctrl-C. Stops listening once
/// the signal handler cannot be installed.
async fn wait_for_reload<T, F, S>(
    mut task: JoinHandle<T>,
    abort: &AbortHandle,
    kind: MediaKind,
    mut ctrl_c: F,
) -> Result<T, JoinError>
where
    F: FnMut() -> S,
    S: Future<Output = std::io::Result<()>>,
{
    let mut listening = true;
    loop {
        tokio::select! {
            result = &mut task => return result,
            signal = ctrl_c(), if listening => match signal {
                Ok(()) => {
                    warn!("Abort requested; stopping {} search", kind.label());
                    abort.abort();
                }
                Err(err) => {
                    warn!("Failed to listen for Ctrl-C: {}", err);
                    listening = false;
                }
            },
        }
    }
}

fn kind_report(kind: MediaKind, stats: &ReloadStats, items: &[MediaItem]) -> Value {
    json!({
        "kind": kind,
        "stats": stats,
        "items": items,
    })
}

async fn report_events(mut rx: UnboundedReceiver<SearchEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            SearchEvent::Started(message) => info!("{}", message),
            SearchEvent::Entered(path) => {
                if !path.is_empty() {
                    debug!("Entering {}", path);
                }
            }
            SearchEvent::Progress { current, total } => {
                if current == total || current % 100 == 0 {
                    info!("Loaded {}/{}", current, total);
                }
            }
            SearchEvent::Complete { kind, count } => {
                info!("{} ready: {} items", kind.label(), count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn failing_signal_listener_is_polled_once() {
        let abort = AbortHandle::new();
        let polls = Arc::new(AtomicUsize::new(0));
        let task = tokio::task::spawn_blocking(|| {
            std::thread::sleep(Duration::from_millis(50));
            7
        });

        let counter = Arc::clone(&polls);
        let result = wait_for_reload(task, &abort, MediaKind::Movie, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(std::io::Error::new(std::io::ErrorKind::Other, "no signals"))
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(polls.load(Ordering::SeqCst), 1);
        assert!(!abort.is_aborted());
    }

    #[tokio::test]
    async fn signal_aborts_the_reload() {
        let abort = AbortHandle::new();
        let watched = abort.clone();
        let task = tokio::task::spawn_blocking(move || {
            while !watched.is_aborted() {
                std::thread::sleep(Duration::from_millis(5));
            }
            "stopped"
        });

        let mut fired = false;
        let result = wait_for_reload(task, &abort, MediaKind::Concert, move || {
            let first = !fired;
            fired = true;
            async move {
                if first {
                    Ok(())
                } else {
                    std::future::pending().await
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "stopped");
        assert!(abort.is_aborted());
    }

    #[test]
    fn json_report_carries_stats_and_items() {
        let stats = ReloadStats {
            groups: 2,
            stored: 2,
            loaded: 1,
            aborted: false,
        };
        let item = MediaItem::from_group(
            MediaKind::Concert,
            &common::FileGroup::single(PathBuf::from("/c/Live.mkv")),
        );
        let report = kind_report(MediaKind::Concert, &stats, &[item]);
        assert_eq!(report["kind"], "concert");
        assert_eq!(report["stats"]["loaded"], 1);
        assert_eq!(report["stats"]["aborted"], false);
        assert_eq!(report["items"][0]["files"][0], "/c/Live.mkv");
    }
}
