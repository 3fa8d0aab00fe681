/* 📖 # Why does the binary only wire things together?

Everything with behavior lives in forumhub_engine and is tested there against MockPal.
The binary picks the real PAL, applies command line overrides to the config file,
starts the server and waits for Ctrl-C. The topic store is created here and dropped
on exit, so topics live exactly as long as the process.

Exit codes:
- 0: Server stopped after Ctrl-C
- 1: Startup failed (bad config, port in use, ...)
*/

use std::env;
use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;
use forumhub_base::pal::http::HttpServerHandle;
use forumhub_base::tracing::init_tracing;
use forumhub_base::{FilePath, PalHandle, RealPal};
use forumhub_engine::{InMemoryTopicStore, StoreHandle, TopicApi, TopicService, load_config};
use tracing::{info, warn};

/// Minimal forum server exposing the /topico resource.
#[derive(Parser, Debug)]
#[command(name = "forumhub", version)]
struct Args {
    /// Config file, relative to the current directory
    #[arg(long, default_value = "forumhub.toml")]
    config: String,

    /// Overrides `host` from the config file
    #[arg(long)]
    host: Option<String>,

    /// Overrides `port` from the config file
    #[arg(long)]
    port: Option<u16>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let current_dir = env::current_dir().unwrap_or_else(|e| {
        eprintln!("Error: Failed to get current directory: {}", e);
        process::exit(1);
    });
    let pal = PalHandle::new(RealPal::new(current_dir));

    let config_path = FilePath::from(args.config);
    let mut config = match load_config(&pal, &config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config from {}: {}", config_path, e);
            process::exit(1);
        }
    };
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let store = StoreHandle::new(InMemoryTopicStore::new());
    let api = TopicApi::new(TopicService::new(store, pal.clone()));

    let handle = match pal.start_http_server(Box::new(api), config.http_server_config()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: Failed to start server: {:?}", e);
            process::exit(1);
        }
    };
    info!(
        "Serving /topico on http://{}",
        handle.address(&config.host)
    );

    set_interrupt_handler(handle.clone());

    while !handle.is_shutdown() {
        thread::sleep(Duration::from_millis(200));
    }
    info!("Server stopped");
}

fn set_interrupt_handler(handle: HttpServerHandle) {
    let result = ctrlc::set_handler(move || {
        info!("Shutting down");
        handle.shutdown();
    });

    match result {
        Ok(()) => {}
        Err(ctrlc::Error::NoSuchSignal(signal)) => {
            warn!("Signal {:?} not found, Ctrl-C will not stop the server cleanly", signal)
        }
        Err(ctrlc::Error::MultipleHandlers) => {
            warn!("Ctrl-C already has a handler, the server may not stop cleanly")
        }
        Err(ctrlc::Error::System(e)) => {
            warn!("Ctrl-C handler not installed: {}", e)
        }
    }
}
