// tests/user.rs

mod common;

use serde_json::json;

use bioreactor_client::screens::UserScreen;
use bioreactor_client::{
    // ---
    messages,
    AuthProvider,
    Error,
    NoticeKind,
    RemoteDataSource,
    Route,
    Screen,
    ValidationError,
};

use common::{Rig, EMAIL, PASSWORD};

#[tokio::test]
async fn profile_name_is_read_from_the_user_record() {
    // ---
    let rig = Rig::signed_in().await;
    rig.data
        .write(&rig.ctx.config.paths.user(&rig.uid), json!({ "name": "Marta" }))
        .await
        .expect("write failed");
    let screen = UserScreen::new(rig.ctx.clone());

    screen.mount().await.expect("mount failed");

    assert_eq!(screen.name().as_deref(), Some("Marta"));
    assert_eq!(screen.email().as_deref(), Some(EMAIL));
}

#[tokio::test]
async fn missing_profile_falls_back_to_a_default_name() {
    // ---
    let rig = Rig::signed_in().await;
    let screen = UserScreen::new(rig.ctx.clone());

    screen.mount().await.expect("mount failed");

    assert_eq!(screen.name().as_deref(), Some(messages::DEFAULT_USER_NAME));
    assert!(rig.notifier.notices().is_empty());
}

#[tokio::test]
async fn unreadable_profile_does_not_fail_the_mount() {
    // ---
    let rig = Rig::signed_in().await;
    rig.data.fail_reads_under("users");
    let screen = UserScreen::new(rig.ctx.clone());

    screen.mount().await.expect("mount failed");

    assert_eq!(screen.name().as_deref(), Some(messages::USER_NAME_LOAD_FAILED));
    assert!(matches!(screen.load_profile().await, Err(Error::Read(_))));
}

#[tokio::test]
async fn short_new_password_is_rejected_locally() {
    // ---
    let rig = Rig::signed_in().await;
    let screen = UserScreen::new(rig.ctx.clone());
    screen.toggle_password_form();
    screen.set_new_password("abc");
    screen.set_current_password(PASSWORD);

    let result = screen.change_password().await;

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::PasswordTooShort { min: 6 }))
    ));
    assert_eq!(rig.messages(), vec![messages::NEW_PASSWORD_TOO_SHORT.to_string()]);
    assert!(screen.password_form().visible);
}

#[tokio::test]
async fn password_change_requires_the_current_password() {
    // ---
    let rig = Rig::signed_in().await;
    let screen = UserScreen::new(rig.ctx.clone());
    screen.set_new_password("novasenha");

    assert!(matches!(
        screen.change_password().await,
        Err(Error::Validation(ValidationError::EmptyField("current_password")))
    ));
    assert_eq!(rig.messages(), vec![messages::CURRENT_PASSWORD_REQUIRED.to_string()]);

    screen.set_current_password("errada1");
    assert!(matches!(screen.change_password().await, Err(Error::Auth(_))));
    assert_eq!(rig.last_notice().message, "Senha atual incorreta.");
}

#[tokio::test]
async fn password_change_reauthenticates_after_the_login_went_stale() {
    // ---
    // Arrange
    // ---
    let rig = Rig::signed_in().await;
    rig.auth.expire_recent_login();
    let screen = UserScreen::new(rig.ctx.clone());
    screen.toggle_password_form();
    screen.set_new_password("novasenha");
    screen.set_current_password(PASSWORD);

    // ---
    // Act
    // ---
    screen.change_password().await.expect("password change failed");

    // ---
    // Assert
    // ---
    assert_eq!(rig.messages(), vec![messages::PASSWORD_UPDATED.to_string()]);
    assert_eq!(screen.password_form(), Default::default());

    rig.auth.sign_out().await.expect("sign-out failed");
    assert!(rig.auth.sign_in(EMAIL, PASSWORD).await.is_err());
    rig.auth.sign_in(EMAIL, "novasenha").await.expect("new password rejected");
}

#[tokio::test]
async fn password_change_without_a_session() {
    // ---
    let rig = Rig::new();
    let screen = UserScreen::new(rig.ctx.clone());
    screen.set_new_password("novasenha");
    screen.set_current_password(PASSWORD);

    assert!(matches!(screen.change_password().await, Err(Error::NotAuthenticated)));
    assert_eq!(rig.messages(), vec![messages::SESSION_EXPIRED.to_string()]);
}

#[tokio::test]
async fn sign_out_resets_navigation_to_login() {
    // ---
    let rig = Rig::signed_in().await;
    let navigator = &rig.ctx.navigator;
    navigator.navigate(Route::Monitoring);
    navigator.navigate(Route::User);
    let screen = UserScreen::new(rig.ctx.clone());

    screen.sign_out().await.expect("sign-out failed");

    let notice = rig.last_notice();
    assert_eq!(notice.kind, NoticeKind::Info);
    assert_eq!(notice.title, messages::TITLE_LOGOUT);
    assert_eq!(notice.message, messages::SIGNED_OUT);
    assert_eq!(navigator.history(), vec![Route::Login]);
    assert!(!rig.ctx.session.is_authenticated());
    assert_eq!(navigator.navigate(Route::Monitoring), Route::Login);
}
