// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use iris_detection_node::{
    api::{start_server, AppState},
    config::ServerConfig,
    version,
    vision::YoloOnnxDetector,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting {}...\n", version::get_version_string());

    let config = ServerConfig::parse();
    let addr = config.socket_addr()?;

    // The server must not accept connections without a loaded model
    println!("🧠 Loading detection model...");
    let model_config = config.model_config();
    let detector = tokio::task::spawn_blocking(move || YoloOnnxDetector::new(&model_config))
        .await
        .context("Model loading task failed")?
        .context("Failed to load detection model")?;
    println!("✅ Model loaded successfully!");

    let model_name = detector.model_name().to_string();
    let state = AppState::new(Arc::new(detector), &model_name);

    println!("🌐 Server will be available at http://{}", addr);
    println!("\nPress CTRL+C to stop the server");

    start_server(addr, state).await
}
