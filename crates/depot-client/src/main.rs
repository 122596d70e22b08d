//! depot - interactive client for the depot storage gateway

use clap::Parser;
use depot_client::{ClientError, Config, DepotClient, Downloaded, Removed};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "depot")]
#[command(about = "Interactive client for the depot storage gateway")]
#[command(version)]
struct Args {
    /// Gateway address
    #[arg(short, long, default_value = "127.0.0.1:6201", env = "DEPOT_ADDR")]
    addr: String,

    /// Enable debug logging
    #[arg(short, long, env = "DEPOT_DEBUG")]
    debug: bool,
}

fn usage() {
    eprintln!("Commands:");
    eprintln!("  uploadf <f1> [f2] [f3] <dest>");
    eprintln!("  downlf <path1> [path2]");
    eprintln!("  removef <path1> [path2]");
    eprintln!("  downltar <.c|.pdf|.txt>");
    eprintln!("  dispfnames <path>");
    eprintln!("  quit");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("depot_client={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut client = DepotClient::connect(Config::new(&args.addr)).await?;
    eprintln!("Connected to depot gateway at {}", args.addr);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("depot> ");
        let Some(line) = lines.next_line().await? else { break };
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&cmd, rest)) = words.split_first() else { continue };

        match cmd {
            "quit" => {
                client.quit().await?;
                break;
            }

            "uploadf" => {
                if rest.len() < 2 || rest.len() > 4 {
                    usage();
                    continue;
                }
                let (files, dest) = rest.split_at(rest.len() - 1);
                let files: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();
                match client.upload(&files, dest[0]).await {
                    Ok(()) => println!("OK"),
                    Err(e @ (ClientError::BadSource { .. } | ClientError::BatchSize { .. })) => {
                        eprintln!("{e}")
                    }
                    Err(ClientError::Server(reason)) => eprintln!("ERR {reason}"),
                    Err(e) => {
                        eprintln!("upload failed: {e}");
                        break;
                    }
                }
            }

            "downlf" => {
                if rest.is_empty() || rest.len() > 2 {
                    usage();
                    continue;
                }
                let paths: Vec<String> = rest.iter().map(|s| s.to_string()).collect();
                match client.download_to(&paths, Path::new(".")).await {
                    Ok(results) => {
                        for result in results {
                            match result {
                                Downloaded::Saved { name, size } => {
                                    println!("Downloaded {name} ({size} bytes)")
                                }
                                Downloaded::Failed { reason } => eprintln!("ERR {reason}"),
                            }
                        }
                    }
                    Err(e) => {
                        eprintln!("download failed: {e}");
                        break;
                    }
                }
            }

            "removef" => {
                if rest.is_empty() || rest.len() > 2 {
                    usage();
                    continue;
                }
                let paths: Vec<String> = rest.iter().map(|s| s.to_string()).collect();
                match client.remove(&paths).await {
                    Ok(results) => {
                        for result in results {
                            match result {
                                Removed::Removed { name } => println!("OK {name}"),
                                Removed::Failed { reason } => eprintln!("ERR {reason}"),
                            }
                        }
                    }
                    Err(e) => {
                        eprintln!("remove failed: {e}");
                        break;
                    }
                }
            }

            "downltar" => {
                let [ext] = rest else {
                    usage();
                    continue;
                };
                match client.download_tar(ext, Path::new(".")).await {
                    Ok((name, size)) => println!("Downloaded {name} ({size} bytes)"),
                    Err(ClientError::Server(reason)) => eprintln!("ERR {reason}"),
                    Err(e) => {
                        eprintln!("archive download failed: {e}");
                        break;
                    }
                }
            }

            "dispfnames" => {
                let [path] = rest else {
                    usage();
                    continue;
                };
                match client.list_names(path).await {
                    Ok(names) => {
                        println!("NAMES {}", names.len());
                        for name in names {
                            println!("  {name}");
                        }
                    }
                    Err(ClientError::Server(reason)) => eprintln!("ERR {reason}"),
                    Err(e) => {
                        eprintln!("listing failed: {e}");
                        break;
                    }
                }
            }

            _ => usage(),
        }
    }

    Ok(())
}
