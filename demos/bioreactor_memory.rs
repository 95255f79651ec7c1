//! Monitoring and control against the in-memory backends.
//!
//! A simulated device appends pH and temperature readings while the app
//! signs in, watches the monitoring screen, then saves new setpoints.
//!
//! Run with: RUST_LOG=debug cargo run --example bioreactor_memory

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::panic_in_result_fn
)]

use std::time::Duration;

use bioreactor_client::{
    create_memory_auth_provider, create_memory_data_source, ActiveScreen, AppBuilder, Channel, ClientConfig,
    DataPaths, RecordingNotifier, RemoteDataSource, Result, Route, Sample,
};
use serde_json::json;
use tracing_subscriber::{fmt as tracing_format, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    tracing_format()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_line_number(true)
        .init();

    let data = create_memory_data_source();
    let auth = create_memory_auth_provider();
    let uid = auth.seed_account("operador@example.com", "bomba123");

    let paths = DataPaths::default();
    data.write(&paths.user(&uid), json!({ "name": "Operador" })).await?;

    let notifier = RecordingNotifier::new();
    let app = AppBuilder::new(data.clone(), auth.clone())
        .notifier(notifier.clone())
        .config(ClientConfig::default().with_paths(paths.clone()))
        .build();

    // Simulated device: one pH and one temperature reading every 100 ms.
    let device = {
        let data = data.clone();
        let paths = paths.clone();
        tokio::spawn(async move {
            for step in 0..15u32 {
                let ph = 6.8 + f64::from(step % 5) * 0.1;
                let temperature = 24.0 + f64::from(step % 7) * 0.5;
                for (channel, value) in [(Channel::Ph, ph), (Channel::Temperature, temperature)] {
                    let sample = Sample::now(value).unwrap();
                    data.append(&paths.history(channel), sample.to_value()).await.unwrap();
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
    };

    let ActiveScreen::Login(login) = app.open(Route::Login).await? else {
        panic!("expected the login screen");
    };
    login.set_email("operador@example.com");
    login.set_password("bomba123");
    login.submit().await?;

    let ActiveScreen::Monitoring(monitoring) = app.sync().await? else {
        panic!("expected the monitoring screen");
    };

    device.await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    for reading in monitoring.view().channels {
        println!(
            "{:<12} current {:>6} {:<3} max {:>6} min {:>6} ({} samples)",
            reading.channel.key(),
            reading.current,
            reading.unit,
            reading.max,
            reading.min,
            reading.snapshot.values.len()
        );
    }

    let ActiveScreen::Control(control) = app.open(Route::Control).await? else {
        panic!("expected the control screen");
    };
    control.set_field(Channel::Rpm1, "1500");
    control.set_field(Channel::Rpm2, "1200");
    control.set_field(Channel::Temperature, "30");
    control.set_field(Channel::Ph, "7");
    control.save().await?;
    control.toggle_actuator().await?;

    println!("setpoints: {}", data.read(&paths.setpoints()).await?.unwrap_or_default());
    for notice in notifier.take() {
        println!("[{:?}] {}: {}", notice.kind, notice.title, notice.message);
    }

    let ActiveScreen::User(user) = app.open(Route::User).await? else {
        panic!("expected the user screen");
    };
    println!("signed in as {}", user.name().unwrap_or_default());
    user.sign_out().await?;
    assert_eq!(app.sync().await?.route(), Route::Login);

    app.shutdown().await;
    Ok(())
}
