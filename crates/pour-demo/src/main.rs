// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use std::env;
use tokio::time::{interval, Duration};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use pour::{emit, emit_colored, emit_tagged, Color, Pour, PourOptions};

const DEMO_EVENT_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
pub async fn main() {
    let log_level = env::var("POUR_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());
    let is_docker = env::var("POUR_DOCKER")
        .map(|val| val.to_lowercase() == "true")
        .unwrap_or(false);
    let use_tls = env::var("POUR_DISABLE_TLS")
        .map(|val| val.to_lowercase() != "true")
        .unwrap_or(true);

    let env_filter = format!("h2=off,hyper=off,rustls=off,{log_level}");

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let options = PourOptions {
        is_docker,
        use_tls,
        ..Default::default()
    };
    let pour = match Pour::setup(options).await {
        Ok(pour) => pour,
        Err(e) => {
            error!("Unable to start pour: {e}");
            return;
        }
    };

    let mut ticker = interval(DEMO_EVENT_INTERVAL);
    let mut count: u64 = 0;
    loop {
        ticker.tick().await;
        count += 1;
        match count % 3 {
            0 => emit_tagged!(pour, false, Color::Cyan, ["demo", "tagged"], "tagged event", count),
            1 => emit!(pour, "heartbeat", count),
            _ => emit_colored!(pour, true, Color::Yellow, "silent event", count),
        }
    }
}
