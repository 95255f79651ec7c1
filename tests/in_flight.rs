// tests/in_flight.rs

mod common;

use tokio::time::{sleep, Duration};

use bioreactor_client::screens::{ControlScreen, LoginScreen, MonitoringScreen};
use bioreactor_client::{
    // ---
    messages,
    AuthErrorCode,
    Channel,
    ClientConfig,
    Error,
    Route,
    Screen,
};

use common::{wait_until, Rig, EMAIL, PASSWORD};

const BACKEND_DELAY: Duration = Duration::from_millis(100);
const SHORT_TIMEOUT: Duration = Duration::from_millis(50);

fn fill(screen: &ControlScreen) {
    screen.set_field(Channel::Rpm1, "1500");
    screen.set_field(Channel::Rpm2, "1200");
    screen.set_field(Channel::Temperature, "30");
    screen.set_field(Channel::Ph, "7");
}

fn ph_len(screen: &MonitoringScreen) -> usize {
    screen.series(Channel::Ph).map(|series| series.len()).unwrap_or(0)
}

#[tokio::test(start_paused = true)]
async fn second_save_while_the_first_is_in_flight_is_rejected() {
    // ---
    // Arrange
    // ---
    let rig = Rig::signed_in().await;
    rig.data.delay_writes_under("configuration", BACKEND_DELAY);
    let screen = ControlScreen::new(rig.ctx.clone());
    fill(&screen);

    // ---
    // Act
    // ---
    let (first, (saving, second)) = tokio::join!(screen.save(), async {
        sleep(Duration::from_millis(20)).await;
        (screen.is_saving(), screen.save().await)
    });

    // ---
    // Assert
    // ---
    first.expect("first save failed");
    assert!(saving);
    assert!(matches!(second, Err(Error::Busy)));
    assert!(!screen.is_saving());
    assert_eq!(rig.messages(), vec![messages::SETTINGS_SAVED.to_string()]);
    assert_eq!(rig.history_len(Channel::Rpm1).await, 1);
}

#[tokio::test(start_paused = true)]
async fn second_toggle_while_the_first_is_in_flight_is_rejected() {
    // ---
    let rig = Rig::signed_in().await;
    rig.data.delay_writes_under("configuration/actuator", BACKEND_DELAY);
    let screen = ControlScreen::new(rig.ctx.clone());

    let (first, second) = tokio::join!(screen.toggle_actuator(), async {
        sleep(Duration::from_millis(20)).await;
        screen.toggle_actuator().await
    });

    assert!(first.expect("first toggle failed"));
    assert!(matches!(second, Err(Error::Busy)));
    assert!(screen.form().pump_on);
}

#[tokio::test(start_paused = true)]
async fn failed_toggle_after_unmount_keeps_the_switch() {
    // ---
    // Arrange
    // ---
    let rig = Rig::signed_in().await;
    rig.data.fail_writes_under("configuration/actuator");
    rig.data.delay_writes_under("configuration/actuator", BACKEND_DELAY);
    let screen = ControlScreen::new(rig.ctx.clone());

    // ---
    // Act
    // ---
    let (result, ()) = tokio::join!(screen.toggle_actuator(), async {
        sleep(Duration::from_millis(20)).await;
        screen.unmount().await;
    });

    // ---
    // Assert
    // ---
    assert!(matches!(result, Err(Error::Write(_))));
    assert!(screen.form().pump_on, "an unmounted screen must not be reverted");
    assert_eq!(rig.messages(), vec![messages::ACTUATOR_UPDATE_FAILED.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn sign_in_finishing_after_unmount_does_not_navigate() {
    // ---
    let rig = Rig::new();
    rig.auth.delay_requests(BACKEND_DELAY);
    let login = LoginScreen::new(rig.ctx.clone());
    login.set_email(EMAIL);
    login.set_password(PASSWORD);

    let (result, ()) = tokio::join!(login.submit(), async {
        sleep(Duration::from_millis(20)).await;
        login.unmount().await;
    });

    result.expect("sign-in failed");
    assert!(rig.ctx.session.is_authenticated());
    assert_eq!(rig.ctx.navigator.current(), Route::Login);
    assert_eq!(login.form().password, PASSWORD);
    assert_eq!(rig.messages(), vec![messages::LOGIN_SUCCESS.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn reload_finishing_after_unmount_leaves_the_series_alone() {
    // ---
    // Arrange
    // ---
    let rig = Rig::signed_in().await;
    let screen = MonitoringScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");
    for value in [6.5, 6.7, 6.6] {
        rig.append_reading(Channel::Ph, value).await;
    }
    wait_until("three readings arrived", || ph_len(&screen) == 3).await;
    screen.clear();
    rig.data.delay_reads_under("history", BACKEND_DELAY);

    // ---
    // Act
    // ---
    let (result, ()) = tokio::join!(screen.reload(), async {
        sleep(Duration::from_millis(20)).await;
        screen.unmount().await;
    });

    // ---
    // Assert
    // ---
    result.expect("reload failed");
    assert_eq!(ph_len(&screen), 0);
    assert!(rig.notifier.notices().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_write_times_out_as_a_write_error() {
    // ---
    let config = ClientConfig::default().with_request_timeout(SHORT_TIMEOUT);
    let rig = Rig::signed_in_with(config).await;
    rig.data.delay_writes_under("configuration", Duration::from_millis(200));
    let screen = ControlScreen::new(rig.ctx.clone());
    fill(&screen);

    let result = screen.save().await;

    match result {
        Err(Error::Write(detail)) => assert!(detail.contains("timed out"), "{detail}"),
        other => panic!("expected a write error, got {other:?}"),
    }
    assert_eq!(rig.messages(), vec![messages::SETTINGS_SAVE_FAILED.to_string()]);
    assert!(rig.read(&rig.ctx.config.paths.actuator()).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn slow_read_times_out_as_a_read_error() {
    // ---
    let config = ClientConfig::default().with_request_timeout(SHORT_TIMEOUT);
    let rig = Rig::signed_in_with(config).await;
    let screen = MonitoringScreen::new(rig.ctx.clone());
    screen.mount().await.expect("mount failed");
    rig.data.delay_reads_under("history", Duration::from_millis(200));

    let result = screen.reload().await;

    assert!(matches!(result, Err(Error::Read(_))));
    assert_eq!(rig.messages(), vec![messages::LOAD_FAILED.to_string()]);
    screen.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn slow_sign_in_times_out_as_a_network_failure() {
    // ---
    let rig = Rig::with_config(ClientConfig::default().with_request_timeout(SHORT_TIMEOUT));
    rig.auth.delay_requests(Duration::from_millis(200));
    let login = LoginScreen::new(rig.ctx.clone());
    login.set_email(EMAIL);
    login.set_password(PASSWORD);

    let result = login.submit().await;

    match result {
        Err(Error::Auth(err)) => assert_eq!(err.code, AuthErrorCode::Other("network-request-failed".into())),
        other => panic!("expected an auth error, got {other:?}"),
    }
    assert_eq!(rig.messages(), vec!["Ocorreu um erro ao fazer login.".to_string()]);
    assert!(!rig.ctx.session.is_authenticated());
    assert_eq!(rig.ctx.navigator.current(), Route::Login);
}
