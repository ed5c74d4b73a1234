//! Multi-host dispatch CLI
//!
//! Sends one call to a pool of interchangeable hosts and prints the result.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI args + config file
//!          │
//!          ▼
//!   ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!   │    config    │───▶│  dispatcher  │───▶│  host pool   │ (shuffled per call)
//!   │ load+validate│    │  get / post  │    └──────┬───────┘
//!   └──────────────┘    └──────┬───────┘           │
//!                              │                   ▼
//!                              │            host 1 ─✗─▶ host 2 ─✗─▶ host N
//!                              ▼                   (transport errors only)
//!                       JSON / raw body → stdout or file
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use multihost_dispatch::config::validation::validate_config;
use multihost_dispatch::config::{read_config, DispatchConfig};
use multihost_dispatch::observability::logging;
use multihost_dispatch::{
    CallDescriptor, DispatchError, DispatchResult, Dispatcher, FormFields, MultipartBody, Problem,
};

/// Send HTTP calls to a pool of interchangeable hosts with failover
#[derive(Parser)]
#[command(name = "multihost-dispatch", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host base URL, replaces the configured pool (repeatable)
    #[arg(long = "host")]
    hosts: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET an endpoint and print the JSON reply
    Get {
        endpoint: String,
        /// Query parameter `key=value` (repeatable)
        #[arg(short, long = "query")]
        query: Vec<String>,
        /// Extra header `name:value` (repeatable)
        #[arg(short = 'H', long = "header")]
        header: Vec<String>,
    },
    /// GET an endpoint and write the raw body to a file or stdout
    Stream {
        endpoint: String,
        #[arg(short, long = "query")]
        query: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// POST a JSON document or form fields and print the JSON reply
    Post {
        endpoint: String,
        /// JSON document sent as the body
        #[arg(long, conflicts_with = "form")]
        json: Option<String>,
        /// Form field `key=value` (repeatable)
        #[arg(long)]
        form: Vec<String>,
        #[arg(short = 'H', long = "header")]
        header: Vec<String>,
    },
    /// POST a multipart form and write the reply body to a file or stdout
    Upload {
        endpoint: String,
        /// Text field `key=value` (repeatable)
        #[arg(long)]
        field: Vec<String>,
        /// File part `name=path` (repeatable)
        #[arg(long)]
        file: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => DispatchConfig::default(),
    };
    if !cli.hosts.is_empty() {
        config.hosts = cli.hosts.clone();
    }
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("Error: {error}");
        }
        return Err("invalid configuration".into());
    }

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("Warning: logging already initialized: {e}");
    }

    tracing::info!(
        hosts = config.hosts.len(),
        request_timeout_secs = config.timeouts.request_secs,
        accept_invalid_certs = config.tls.accept_invalid_certs,
        "Configuration loaded"
    );

    let dispatcher = Dispatcher::from_config(&config)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling call");
            on_signal.cancel();
        }
    });

    if let Err(e) = run(&dispatcher, cli.command, cancel).await {
        tracing::error!(error = %e, "Call failed");
        let problem = Problem::from(&e);
        eprintln!("{}", serde_json::to_string_pretty(&problem)?);
        return Err(e.into());
    }
    Ok(())
}

async fn run(
    dispatcher: &Dispatcher,
    command: Commands,
    cancel: CancellationToken,
) -> DispatchResult<()> {
    match command {
        Commands::Get {
            endpoint,
            query,
            header,
        } => {
            let call = CallDescriptor::new(endpoint)
                .query_map(pairs(&query, '=')?)
                .headers(pairs(&header, ':')?)
                .cancel_on(cancel);
            let outcome = dispatcher.get::<Value>(&call).await?;
            tracing::info!(host = %outcome.host, attempts = outcome.attempts, "Call answered");
            print_json(&outcome.result);
        }
        Commands::Stream {
            endpoint,
            query,
            output,
        } => {
            let call = CallDescriptor::new(endpoint)
                .query_map(pairs(&query, '=')?)
                .cancel_on(cancel.clone());
            let outcome = dispatcher.get_stream(&call).await?;
            let stream = outcome.result;
            let copy = async {
                match output {
                    Some(path) => {
                        let mut file = tokio::fs::File::create(&path).await?;
                        stream.copy_to(&mut file).await
                    }
                    None => stream.copy_to(&mut tokio::io::stdout()).await,
                }
            };
            // The call has returned; the body is still subject to Ctrl-C.
            let written = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(DispatchError::Cancelled {
                        endpoint: call.endpoint().to_string(),
                    })
                }
                written = copy => written?,
            };
            tracing::info!(host = %outcome.host, bytes = written, "Body written");
        }
        Commands::Post {
            endpoint,
            json,
            form,
            header,
        } => {
            let mut call = CallDescriptor::new(endpoint)
                .headers(pairs(&header, ':')?)
                .cancel_on(cancel);
            if let Some(raw) = json {
                let document: Value = serde_json::from_str(&raw).map_err(|e| {
                    DispatchError::InvalidRequest(format!("--json is not valid JSON: {e}"))
                })?;
                call = call.json(&document)?;
            } else if !form.is_empty() {
                let fields: FormFields = pairs(&form, '=')?.into_iter().collect();
                call = call.form(&fields);
            }
            let outcome = dispatcher.post::<Value>(&call).await?;
            tracing::info!(host = %outcome.host, attempts = outcome.attempts, "Call answered");
            print_json(&outcome.result);
        }
        Commands::Upload {
            endpoint,
            field,
            file,
            output,
        } => {
            let mut body = MultipartBody::new();
            for (name, value) in pairs(&field, '=')? {
                body = body.text(name, value);
            }
            for (name, path) in pairs(&file, '=')? {
                body = body.file_from_path(name, Path::new(&path)).await?;
            }
            let call = CallDescriptor::new(endpoint).multipart(body).cancel_on(cancel);
            let outcome = match output {
                Some(path) => {
                    let mut sink = tokio::fs::File::create(&path).await?;
                    dispatcher.post_form_streamed(&call, &mut sink).await?
                }
                None => dispatcher.post_form_streamed(&call, &mut tokio::io::stdout()).await?,
            };
            tracing::info!(host = %outcome.host, bytes = outcome.result, "Body written");
        }
    }
    Ok(())
}

/// Split `key<sep>value` arguments.
fn pairs(raw: &[String], sep: char) -> DispatchResult<Vec<(String, String)>> {
    raw.iter()
        .map(|item| {
            item.split_once(sep)
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| {
                    DispatchError::InvalidRequest(format!("expected key{sep}value, got '{item}'"))
                })
        })
        .collect()
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}
