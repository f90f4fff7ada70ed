//! Desktop demo for thingkit-location, driven through the command bridge
//! against the simulated provider.
//!
//! Run with: RUST_LOG=debug cargo run -p thingkit-location-demo [config.toml]

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thingkit_bridge::{BridgeEvent, ChannelEventSink, CommandBridge};
use thingkit_location::sys::SimulatedProvider;
use thingkit_location::{
    GpsApi, InteractionCallback, LocationAcquisitionManager, LocationConfig, LocationSample,
    MODULE, ResolutionToken, SettingsStatus,
};
use thingkit_permission::{GrantTable, Permission, PermissionPrompt};

/// Says yes to everything, like a patient user.
struct ConsoleUi {
    grants: Arc<GrantTable>,
}

impl PermissionPrompt for ConsoleUi {
    fn request_permission(&self, permission: Permission, request_code: i32) {
        println!("  [ui] permission prompt for {permission} (request {request_code}): allow");
        self.grants.grant(permission);
    }
}

impl InteractionCallback for ConsoleUi {
    fn resolve_settings(&self, token: &ResolutionToken, request_code: i32) -> bool {
        println!(
            "  [ui] settings dialog {} (request {request_code}): turn on",
            token.as_str()
        );
        true
    }
}

fn fix(latitude: f64, longitude: f64, timestamp_ms: i64) -> LocationSample {
    LocationSample {
        latitude,
        longitude,
        altitude: 10.0,
        bearing: 0.0,
        provider: "fused".into(),
        speed_mps: 0.0,
        timestamp_ms,
    }
}

fn show(event: &BridgeEvent) {
    match &event.payload {
        Value::Null => println!("  {}.{}: no fix", event.module, event.event),
        record => println!(
            "  {}.{}: {:.5}, {:.5} at {}",
            event.module,
            event.event,
            record["latitude"].as_f64().unwrap_or_default(),
            record["longitude"].as_f64().unwrap_or_default(),
            record["time"]
        ),
    }
}

async fn next_event(events: &async_channel::Receiver<BridgeEvent>) -> Option<BridgeEvent> {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .ok()
        .and_then(Result::ok)
}

/// Route library logs to stderr; `RUST_LOG` picks the level.
fn init_logging() {
    env_logger::init();
}

#[tokio::main]
async fn main() {
    init_logging();
    println!("=== Thingkit Location Demo ===\n");

    let config = match std::env::args().nth(1) {
        Some(path) => match LocationConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                println!("Failed to load {path}: {e}");
                return;
            }
        },
        None => LocationConfig::default(),
    };
    println!("Profile: {:?}\n", config.profile);

    let provider = Arc::new(SimulatedProvider::new());
    provider.set_last_fix(Some(fix(37.42, -122.08, 1000)));
    provider.set_settings(SettingsStatus::ResolutionRequired(ResolutionToken::new(
        "location-off",
    )));

    let grants = Arc::new(GrantTable::new());
    let manager = Arc::new(LocationAcquisitionManager::new(
        provider.clone(),
        grants.clone(),
        config,
    ));
    manager.set_interaction(Some(Arc::new(ConsoleUi { grants })));

    let api = GpsApi::new(manager.clone());
    let bridge = CommandBridge::new();
    bridge.install(&api);
    println!("Registered commands: {:?}\n", bridge.commands());

    let (sink, events) = ChannelEventSink::new();
    if let Err(e) = api.forward_events(Arc::new(sink)) {
        println!("Failed to start event forwarding: {e}");
        return;
    }

    println!("Getting current location...");
    match bridge.invoke(MODULE, "getCurrentLocation", vec![]).await {
        Ok(record) => println!("✓ {record}\n"),
        Err(e) => println!("✗ {e}\n"),
    }

    println!("Starting updates...");
    if let Err(e) = bridge.invoke(MODULE, "start", vec![]).await {
        println!("✗ Failed to start: {e}");
        return;
    }
    for (step, latitude) in [(1, 37.421), (2, 37.422), (3, 37.423)] {
        provider.push(Some(fix(latitude, -122.08, 1000 + 1000 * step)));
    }
    provider.push(None);

    for _ in 0..5 {
        match next_event(&events).await {
            Some(event) => show(&event),
            None => {
                println!("  (no more events)");
                break;
            }
        }
    }

    println!("\nStopping updates...");
    match bridge.invoke(MODULE, "stop", vec![]).await {
        Ok(_) => println!("✓ Stopped (streaming: {})", manager.is_streaming()),
        Err(e) => println!("✗ {e}"),
    }

    println!("\nCalling an unknown command...");
    if let Err(e) = bridge.invoke(MODULE, "watchPosition", vec![]).await {
        println!("✗ {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_reaches_a_logger() {
        init_logging();

        assert_ne!(log::max_level(), log::LevelFilter::Off);
    }
}
