// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! memberbridge server binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use memberbridge_server::{create_app_state, create_router, version::format_version_info};
use memberbridge_server_config::{load_config, load_config_with_file, LogFormat, LoggingConfig};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// memberbridge server - self-service groupware accounts for verified members.
#[derive(Parser, Debug)]
#[command(
	name = "memberbridge-server",
	about = "Self-service groupware accounts for verified members",
	version
)]
struct Args {
	/// TOML config file. Without it `/etc/memberbridge/server.toml` is read
	/// when present.
	#[arg(long, short = 'c', env = "MEMBERBRIDGE_SERVER_CONFIG")]
	config: Option<PathBuf>,

	/// Subcommands for memberbridge-server (e.g., `version`)
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => load_config_with_file(path)?,
		None => load_config()?,
	};

	init_tracing(&config.logging);

	let state = create_app_state(&config)?;
	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	tracing::info!(%addr, "Starting memberbridge server");

	let listener = tokio::net::TcpListener::bind(&addr).await?;
	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.with_graceful_shutdown(shutdown_signal())
	.await?;

	tracing::info!("Server stopped");
	Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
	let registry = tracing_subscriber::registry().with(filter);

	match logging.format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.init(),
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
	}
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for shutdown signal");
		std::future::pending::<()>().await;
	}
	tracing::info!("Received shutdown signal");
}
