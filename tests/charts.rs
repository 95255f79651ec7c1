// tests/charts.rs

mod common;

use bioreactor_client::screens::ChartsScreen;
use bioreactor_client::{messages, Channel, Screen};

use common::{wait_until, Rig};

#[tokio::test]
async fn pump_speeds_are_charted_in_hundreds() {
    // ---
    let rig = Rig::signed_in().await;
    let screen = ChartsScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");
    assert_eq!(screen.active_feeds(), 4);

    rig.append_reading(Channel::Rpm1, 1500.0).await;
    rig.append_reading(Channel::Rpm2, 1250.0).await;

    wait_until("both pump readings arrived", || {
        let view = screen.view();
        view.charts[2].snapshot.values.len() == 1 && view.charts[3].snapshot.values.len() == 1
    })
    .await;

    let view = screen.view();
    assert_eq!(view.charts[2].channel, Channel::Rpm1);
    assert_eq!(view.charts[2].current, "15.0");
    assert_eq!(view.charts[3].current, "12.5");
    assert_eq!(view.charts[0].current, messages::NOT_AVAILABLE);

    screen.unmount().await;
}

#[tokio::test]
async fn extrema_cover_only_the_visible_window() {
    // ---
    // Arrange
    // ---
    let rig = Rig::signed_in().await;
    let screen = ChartsScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");

    // ---
    // Act
    // ---
    for value in [40.0, 10.0, 21.0, 22.0, 23.0, 24.0, 25.0, 26.0] {
        rig.append_reading(Channel::Temperature, value).await;
    }
    wait_until("the last reading arrived", || screen.view().charts[1].current == "26.0").await;

    // ---
    // Assert
    // ---
    let temperature = &screen.view().charts[1];
    assert_eq!(temperature.snapshot.values, vec![21.0, 22.0, 23.0, 24.0, 25.0, 26.0]);
    assert_eq!(temperature.max, "26.0");
    assert_eq!(temperature.min, "21.0");
    assert_eq!(temperature.snapshot.labels.len(), 6);
    assert_eq!(temperature.snapshot.labels.iter().filter(|label| !label.is_empty()).count(), 3);

    screen.unmount().await;
}

#[tokio::test]
async fn reload_after_clear_restores_the_latest_window() {
    // ---
    let rig = Rig::signed_in().await;
    let screen = ChartsScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");

    for value in [6.0, 6.1, 6.2, 6.3, 6.4, 6.5, 6.6] {
        rig.append_reading(Channel::Ph, value).await;
    }
    wait_until("all readings arrived", || screen.view().charts[0].current == "6.6").await;

    screen.clear();
    assert!(screen.view().charts.iter().all(|chart| chart.placeholder().is_some()));

    screen.reload().await.expect("reload failed");
    let ph = &screen.view().charts[0];
    assert_eq!(ph.snapshot.values.len(), 6);
    assert_eq!(ph.min, "6.1");

    screen.unmount().await;
}
