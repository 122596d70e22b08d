//! Per-connection command state machine
//!
//! One command line at a time until `QUIT` or disconnect. A malformed
//! command header costs only that command; errors inside a multi-step
//! command abort the connection, because the stream position can no longer
//! be trusted once a sub-line or body went wrong.

use crate::{handlers, GatewayConfig, Result};
use depot_proto::line::{read_line_opt, write_line};
use depot_proto::{GatewayCommand, ProtoError};
use std::sync::Arc;
use tokio::io::{BufReader, BufWriter};
use tokio::net::TcpStream;
use tracing::debug;

/// Serves one accepted client connection.
pub async fn handle(socket: TcpStream, config: Arc<GatewayConfig>) -> Result<()> {
    let routes = config.routing_table();
    let (read_half, write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);
    let mut writer = BufWriter::new(write_half);

    loop {
        let line = match read_line_opt(&mut reader).await? {
            Some(line) => line,
            None => break,
        };
        let cmd = match GatewayCommand::parse(&line) {
            Ok(cmd) => cmd,
            Err(ProtoError::Malformed(reason)) => {
                write_line(&mut writer, &format!("ERR {reason}")).await?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        debug!(command = %cmd, "gateway command");

        match cmd {
            GatewayCommand::Quit => break,
            GatewayCommand::Upload { count, dest } => {
                handlers::upload::handle(&mut reader, &mut writer, &config, &routes, count, &dest)
                    .await?
            }
            GatewayCommand::Download { count } => {
                handlers::download::handle(&mut reader, &mut writer, &config, &routes, count)
                    .await?
            }
            GatewayCommand::Remove { count } => {
                handlers::remove::handle(&mut reader, &mut writer, &config, &routes, count).await?
            }
            GatewayCommand::DownloadTar { ext } => {
                handlers::archive::handle(&mut writer, &config, &routes, &ext).await?
            }
            GatewayCommand::ListNames { path } => {
                handlers::listing::handle(&mut writer, &config, &path).await?
            }
        }
    }
    Ok(())
}
