mod common;

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde_json::json;
use thingkit_location::sys::{ProviderCall, SimulatedProvider};
use thingkit_location::{
    ConnectionState, LocationAcquisitionManager, LocationConfig, LocationError, LocationEvent,
    Permission, REQUEST_GPS, ResolutionToken, SettingsStatus, UpdateProfile,
};
use thingkit_permission::GrantTable;

use common::{CountingHost, Ui, fix_at, fixture, fused_fix};

fn drain(manager: &LocationAcquisitionManager) -> Vec<LocationEvent> {
    let events = manager.events();
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}

fn subscriptions(journal: &[ProviderCall]) -> usize {
    journal
        .iter()
        .filter(|call| matches!(call, ProviderCall::RequestUpdates(_)))
        .count()
}

#[test]
fn start_emits_cached_fix_once() {
    let fx = fixture();
    fx.provider.set_last_fix(Some(fused_fix()));

    fx.manager.start().unwrap();

    let events = drain(&fx.manager);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), "onlocationchanged");
    assert_eq!(
        events[0].payload(),
        json!({
            "latitude": 37.42,
            "longitude": -122.08,
            "altitude": 10.0,
            "bearing": 0.0,
            "provider": "fused",
            "speed": 0.0,
            "time": 1000,
        })
    );
    assert!(fx.manager.is_streaming());
    assert_eq!(fx.manager.connection_state(), ConnectionState::Connected);
}

#[test]
fn start_without_cached_fix_reports_absence() {
    let fx = fixture();

    fx.manager.start().unwrap();

    let events = drain(&fx.manager);
    assert_eq!(events, vec![LocationEvent::LocationChanged(None)]);
    assert_eq!(events[0].payload(), serde_json::Value::Null);
}

#[test]
fn updates_arrive_in_order() {
    let fx = fixture();
    fx.manager.start().unwrap();
    drain(&fx.manager);

    fx.provider.push(Some(fix_at(1)));
    fx.provider.push(None);
    fx.provider.push(Some(fix_at(2)));
    fx.provider.flush();

    let times: Vec<_> = drain(&fx.manager)
        .iter()
        .map(|event| event.payload()["time"].as_i64())
        .collect();
    assert_eq!(times, vec![Some(1), None, Some(2)]);
}

#[test]
fn second_start_replaces_subscription() {
    let fx = fixture();
    fx.manager.start().unwrap();
    fx.manager.start().unwrap();
    assert_eq!(drain(&fx.manager).len(), 2);

    fx.provider.push(Some(fix_at(7)));
    fx.provider.flush();

    let events = drain(&fx.manager);
    assert_eq!(events.len(), 1);
    let journal = fx.provider.journal();
    assert_eq!(subscriptions(&journal), 2);
    assert_eq!(
        journal
            .iter()
            .filter(|call| **call == ProviderCall::RemoveUpdates)
            .count(),
        1
    );
    assert_eq!(
        journal.iter().filter(|call| **call == ProviderCall::Connect).count(),
        1
    );
}

#[test]
fn stop_is_idempotent() {
    let fx = fixture();

    fx.manager.stop();
    assert!(fx.provider.journal().is_empty());

    fx.manager.start().unwrap();
    fx.manager.stop();
    fx.manager.stop();

    let journal = fx.provider.journal();
    assert_eq!(
        journal
            .iter()
            .filter(|call| **call == ProviderCall::Disconnect)
            .count(),
        1
    );
    assert_eq!(fx.manager.connection_state(), ConnectionState::Disconnected);
    assert!(!fx.manager.is_streaming());
}

#[test]
fn stop_silences_updates() {
    let fx = fixture();
    fx.manager.start().unwrap();
    drain(&fx.manager);

    fx.manager.stop();
    fx.provider.push(Some(fused_fix()));
    fx.provider.flush();

    assert!(drain(&fx.manager).is_empty());
    assert!(!fx.provider.has_subscriber());
}

#[test]
fn restart_after_stop_reconnects() {
    let fx = fixture();
    fx.manager.start().unwrap();
    fx.manager.stop();

    fx.manager.start().unwrap();

    assert!(fx.manager.is_streaming());
    assert!(fx.provider.is_connected());
}

#[test]
fn current_location_does_not_subscribe() {
    let fx = fixture();
    fx.provider.set_last_fix(Some(fused_fix()));

    let sample = fx.manager.get_current_location().unwrap();

    assert_eq!(sample, Some(fused_fix()));
    assert!(!fx.manager.is_streaming());
    assert_eq!(subscriptions(&fx.provider.journal()), 0);

    fx.provider.push(Some(fix_at(5)));
    fx.provider.flush();
    assert!(drain(&fx.manager).is_empty());
}

#[test]
fn current_location_without_fix_is_none() {
    let fx = fixture();

    assert_eq!(fx.manager.get_current_location(), Ok(None));
}

#[test]
fn unresolvable_settings_deny_start() {
    let fx = fixture();
    fx.provider.set_last_fix(Some(fused_fix()));
    fx.provider.set_settings(SettingsStatus::Unresolvable {
        code: 8502,
        message: "SETTINGS_CHANGE_UNAVAILABLE".into(),
    });

    let err = fx.manager.start().unwrap_err();

    assert_eq!(err, LocationError::SettingsDenied);
    assert_eq!(err.to_string(), "Location services are disabled by the user");
    assert!(!fx.manager.is_streaming());
    assert_eq!(subscriptions(&fx.provider.journal()), 0);
    assert!(drain(&fx.manager).is_empty());
    // the connection stays open
    assert_eq!(fx.manager.connection_state(), ConnectionState::Connected);

    assert_eq!(
        fx.manager.get_current_location(),
        Err(LocationError::SettingsDenied)
    );
}

#[test]
fn resolution_without_ui_is_denied() {
    let fx = fixture();
    fx.provider
        .set_settings(SettingsStatus::ResolutionRequired(ResolutionToken::new("gps-off")));

    assert_eq!(fx.manager.start(), Err(LocationError::SettingsDenied));
    assert!(!fx.manager.is_streaming());
}

#[test]
fn resolved_settings_lead_to_subscription() {
    let fx = fixture();
    fx.provider
        .set_settings(SettingsStatus::ResolutionRequired(ResolutionToken::new("gps-off")));
    let ui = Ui::new(fx.grants.clone(), true, true);
    fx.manager.set_interaction(Some(ui.clone()));

    fx.manager.start().unwrap();

    assert_eq!(*ui.resolutions.lock().unwrap(), vec!["gps-off".to_owned()]);
    assert!(fx.manager.is_streaming());
    assert_eq!(drain(&fx.manager).len(), 1);
}

#[test]
fn declined_resolution_is_denied() {
    let fx = fixture();
    fx.provider
        .set_settings(SettingsStatus::ResolutionRequired(ResolutionToken::new("gps-off")));
    let ui = Ui::new(fx.grants.clone(), false, true);
    fx.manager.set_interaction(Some(ui));

    assert_eq!(fx.manager.start(), Err(LocationError::SettingsDenied));
    assert_eq!(subscriptions(&fx.provider.journal()), 0);
}

#[test]
fn connect_failure_stops_before_permission() {
    let provider = Arc::new(SimulatedProvider::new());
    provider.fail_connect(Some("SERVICE_MISSING"));
    let host = CountingHost::granted();
    let manager = LocationAcquisitionManager::new(
        provider.clone(),
        host.clone(),
        LocationConfig::default(),
    );
    let ui = Ui::new(Arc::new(GrantTable::new()), true, true);
    manager.set_interaction(Some(ui.clone()));

    let err = manager.start().unwrap_err();

    match &err {
        LocationError::Connection(message) => assert!(message.contains("SERVICE_MISSING")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(provider.journal(), vec![ProviderCall::Connect]);
    assert_eq!(host.checks(), 0);
    assert!(ui.prompts.lock().unwrap().is_empty());
    assert_eq!(manager.connection_state(), ConnectionState::Failed);
    assert!(drain(&manager).is_empty());
}

#[test]
fn connect_timeout_is_a_connection_error() {
    let provider = Arc::new(SimulatedProvider::new());
    provider.set_connect_delay(Some(Duration::from_millis(500)));
    let config = LocationConfig::from_toml("[timeouts]\nconnect_ms = 20").unwrap();
    let manager = LocationAcquisitionManager::new(
        provider,
        Arc::new(GrantTable::granting([Permission::FineLocation])),
        config,
    );

    let err = manager.get_current_location().unwrap_err();

    assert!(matches!(err, LocationError::Connection(_)));
}

#[test]
fn late_connect_after_timed_out_start_is_released() {
    let provider = Arc::new(SimulatedProvider::new());
    provider.set_connect_delay(Some(Duration::from_millis(100)));
    let config = LocationConfig::from_toml("[timeouts]\nconnect_ms = 20").unwrap();
    let manager = LocationAcquisitionManager::new(
        provider.clone(),
        Arc::new(GrantTable::granting([Permission::FineLocation])),
        config,
    );

    assert!(manager.start().is_err());
    std::thread::sleep(Duration::from_millis(300));
    manager.stop();
    drop(manager);

    assert!(!provider.is_connected());
    assert!(!provider.has_subscriber());
}

#[test]
fn granted_permission_skips_prompt() {
    let fx = fixture();
    let ui = Ui::new(fx.grants.clone(), true, true);
    fx.manager.set_interaction(Some(ui.clone()));

    fx.manager.start().unwrap();

    assert!(ui.prompts.lock().unwrap().is_empty());
}

#[test]
fn missing_permission_prompts_once() {
    let provider = Arc::new(SimulatedProvider::new());
    let grants = Arc::new(GrantTable::new());
    let manager =
        LocationAcquisitionManager::new(provider, grants.clone(), LocationConfig::default());
    let ui = Ui::new(grants, true, true);
    manager.set_interaction(Some(ui.clone()));

    manager.start().unwrap();

    assert_eq!(
        *ui.prompts.lock().unwrap(),
        vec![(Permission::FineLocation, REQUEST_GPS)]
    );
}

#[test]
fn permission_denial_is_not_fatal_on_its_own() {
    let provider = Arc::new(SimulatedProvider::new());
    let grants = Arc::new(GrantTable::new());
    let manager =
        LocationAcquisitionManager::new(provider, grants.clone(), LocationConfig::default());
    let ui = Ui::new(grants, true, false);
    manager.set_interaction(Some(ui.clone()));

    manager.start().unwrap();

    assert_eq!(ui.prompts.lock().unwrap().len(), 1);
    assert!(manager.is_streaming());
}

#[test]
fn permission_denial_surfaces_from_provider() {
    let provider = Arc::new(SimulatedProvider::new());
    let grants = Arc::new(GrantTable::new());
    provider.enforce_permission(grants.clone());
    let manager = LocationAcquisitionManager::new(
        provider.clone(),
        grants.clone(),
        LocationConfig::default(),
    );
    manager.set_interaction(Some(Ui::new(grants, true, false)));

    let err = manager.start().unwrap_err();

    match err {
        LocationError::Connection(message) => assert!(message.contains("ACCESS_FINE_LOCATION")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!manager.is_streaming());
    assert!(!provider.has_subscriber());
}

#[test]
fn stop_during_negotiation_leaves_nothing_subscribed() {
    let fx = fixture();
    fx.provider
        .set_settings(SettingsStatus::ResolutionRequired(ResolutionToken::new("gps-off")));
    let ui = Ui::new(fx.grants.clone(), true, true);
    let weak: Weak<LocationAcquisitionManager> = Arc::downgrade(&fx.manager);
    *ui.on_resolve.lock().unwrap() = Some(Box::new(move || {
        if let Some(manager) = weak.upgrade() {
            manager.stop();
        }
    }));
    fx.manager.set_interaction(Some(ui));

    let err = fx.manager.start().unwrap_err();

    assert!(matches!(err, LocationError::Connection(_)));
    assert!(!fx.manager.is_streaming());
    assert!(!fx.provider.has_subscriber());
    assert_eq!(fx.manager.connection_state(), ConnectionState::Disconnected);
}

#[test]
fn profile_from_config_reaches_provider() {
    let provider = Arc::new(SimulatedProvider::new());
    let config = LocationConfig::from_toml(
        "[profile]\nmin_interval_ms = 1000\nfastest_interval_ms = 500\npriority = \"high-accuracy\"",
    )
    .unwrap();
    let manager = LocationAcquisitionManager::new(
        provider.clone(),
        Arc::new(GrantTable::granting([Permission::FineLocation])),
        config,
    );

    manager.start().unwrap();

    let expected: UpdateProfile = config.profile;
    assert!(
        provider
            .journal()
            .contains(&ProviderCall::RequestUpdates(expected))
    );
}

#[test]
fn dropping_manager_disconnects() {
    let fx = fixture();
    fx.manager.start().unwrap();
    let provider = fx.provider.clone();

    drop(fx);

    assert!(!provider.is_connected());
    assert!(!provider.has_subscriber());
}
