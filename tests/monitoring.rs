// tests/monitoring.rs

mod common;

use serde_json::json;

use bioreactor_client::screens::MonitoringScreen;
use bioreactor_client::{
    // ---
    messages,
    Channel,
    RemoteDataSource,
    Screen,
};

use common::{settle, wait_until, Rig};

fn ph_len(screen: &MonitoringScreen) -> usize {
    screen.series(Channel::Ph).map(|series| series.len()).unwrap_or(0)
}

#[tokio::test]
async fn history_appends_fill_the_window_and_keep_all_time_extrema() {
    // ---
    // Arrange
    // ---
    let rig = Rig::signed_in().await;
    let screen = MonitoringScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");
    assert_eq!(screen.active_feeds(), 6);

    // ---
    // Act
    // ---
    rig.append_reading(Channel::Ph, 9.5).await;
    for step in 1..=11 {
        rig.append_reading(Channel::Ph, 7.0 + f64::from(step) / 10.0).await;
    }
    wait_until("twelve readings were consumed", || {
        ph_len(&screen) == 10 && screen.view().channels[0].current == "8.1"
    })
    .await;

    // ---
    // Assert
    // ---
    let view = screen.view();
    let ph = &view.channels[0];
    assert_eq!(ph.channel, Channel::Ph);
    assert_eq!(ph.snapshot.values.len(), 10);
    assert_eq!(ph.current, "8.1");
    assert_eq!(ph.max, "9.5");
    assert_eq!(ph.min, "7.1");
    assert_eq!(ph.placeholder(), None);

    let temperature = &view.channels[1];
    assert_eq!(temperature.current, messages::NOT_AVAILABLE);
    assert_eq!(temperature.placeholder(), Some(messages::NO_DATA));

    screen.unmount().await;
}

#[tokio::test]
async fn pump_status_follows_the_actuator_record() {
    // ---
    let rig = Rig::signed_in().await;
    let screen = MonitoringScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");
    wait_until("the initial actuator snapshot arrived", || screen.view().pump_on.is_some()).await;
    assert_eq!(screen.view().pump_on, Some(false));

    rig.data
        .write(&rig.ctx.config.paths.actuator(), json!({ "on": true }))
        .await
        .expect("write failed");

    wait_until("the pump shows as on", || screen.view().pump_on == Some(true)).await;
    screen.unmount().await;
}

#[tokio::test]
async fn clear_resets_charted_channels_until_new_readings_arrive() {
    // ---
    let rig = Rig::signed_in().await;
    let screen = MonitoringScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");

    rig.append_reading(Channel::Ph, 6.9).await;
    rig.append_reading(Channel::Rpm1, 1400.0).await;
    wait_until("both readings arrived", || {
        let view = screen.view();
        view.channels[0].snapshot.values.len() == 1 && view.channels[3].current == "1400"
    })
    .await;

    screen.clear();

    let view = screen.view();
    assert_eq!(view.channels[0].placeholder(), Some(messages::NO_DATA));
    assert_eq!(view.channels[0].max, messages::NOT_AVAILABLE);
    assert_eq!(view.channels[3].current, "1400");

    // only readings appended after the clear come back
    rig.append_reading(Channel::Ph, 7.3).await;
    wait_until("the new reading arrived", || ph_len(&screen) == 1).await;
    assert_eq!(screen.view().channels[0].current, "7.3");

    screen.unmount().await;
}

#[tokio::test]
async fn reload_repopulates_from_the_stored_history() {
    // ---
    let rig = Rig::signed_in().await;
    let screen = MonitoringScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");

    for value in [6.5, 6.7, 6.6] {
        rig.append_reading(Channel::Ph, value).await;
    }
    wait_until("three readings arrived", || ph_len(&screen) == 3).await;
    screen.clear();
    assert_eq!(ph_len(&screen), 0);

    screen.reload().await.expect("reload failed");

    let ph = &screen.view().channels[0];
    assert_eq!(ph.snapshot.values, vec![6.5, 6.7, 6.6]);
    assert_eq!(ph.max, "6.7");
    assert!(!screen.is_busy());
    assert!(rig.notifier.notices().is_empty());

    screen.unmount().await;
}

#[tokio::test]
async fn failed_reload_shows_a_single_notice() {
    // ---
    let rig = Rig::signed_in().await;
    let screen = MonitoringScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");
    rig.data.fail_reads_under("history");

    assert!(screen.reload().await.is_err());

    assert_eq!(rig.messages(), vec![messages::LOAD_FAILED.to_string()]);
    screen.unmount().await;
}

#[tokio::test]
async fn failed_subscription_fails_the_mount() {
    // ---
    let rig = Rig::signed_in().await;
    rig.data.fail_reads_under("configuration/actuator");
    let screen = MonitoringScreen::new(rig.ctx.clone());

    assert!(screen.mount().await.is_err());

    assert_eq!(screen.active_feeds(), 0);
    assert_eq!(rig.messages(), vec![messages::LOAD_FAILED.to_string()]);
    let ph = rig.ctx.config.paths.history(Channel::Ph);
    assert_eq!(rig.data.subscriber_count(&ph).await, 0);
}

#[tokio::test]
async fn unmount_releases_every_subscription() {
    // ---
    // Arrange
    // ---
    let rig = Rig::signed_in().await;
    let screen = MonitoringScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");
    rig.append_reading(Channel::Ph, 7.0).await;
    wait_until("the first reading arrived", || ph_len(&screen) == 1).await;

    let paths = &rig.ctx.config.paths;
    assert_eq!(rig.data.subscriber_count(&paths.history(Channel::Ph)).await, 1);

    // ---
    // Act
    // ---
    screen.unmount().await;
    rig.append_reading(Channel::Ph, 8.0).await;
    settle().await;

    // ---
    // Assert
    // ---
    assert_eq!(screen.active_feeds(), 0);
    for channel in Channel::ALL {
        assert_eq!(rig.data.subscriber_count(&paths.history(channel)).await, 0);
    }
    assert_eq!(rig.data.subscriber_count(&paths.actuator()).await, 0);
    assert_eq!(ph_len(&screen), 1);
    assert_eq!(screen.view().channels[0].current, "7.0");
}

#[tokio::test]
async fn remounting_does_not_duplicate_feeds() {
    // ---
    let rig = Rig::signed_in().await;
    let screen = MonitoringScreen::new(rig.ctx.clone());
    screen.mount().await.expect("first mount failed");
    screen.mount().await.expect("second mount failed");

    assert_eq!(screen.active_feeds(), 6);
    let ph = rig.ctx.config.paths.history(Channel::Ph);
    assert_eq!(rig.data.subscriber_count(&ph).await, 1);

    screen.unmount().await;
}
