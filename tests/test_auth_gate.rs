mod helpers;

use helpers::{test_users, TestWorld};
use studyshare::application::{AuthGate, GateDecision, SessionState};
use studyshare::domain::{DomainError, Route};
use studyshare::util::testing::{Operation, TEST_PASSWORD};

#[test]
fn given_unresolved_session_when_resolving_protected_route_then_placeholder() {
    // Arrange
    let world = TestWorld::signed_in();
    let gate = AuthGate::new(&world.backend);

    // Act
    let decision = gate.resolve(Route::Todos);

    // Assert
    assert!(gate.is_loading());
    assert_eq!(decision, GateDecision::Placeholder);
}

#[test]
fn given_existing_session_when_checking_then_authenticated() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut gate = AuthGate::new(&world.backend);

    // Act
    gate.check_session();

    // Assert
    assert_eq!(gate.user().map(|u| u.id.as_str()), Some(test_users::ADA_ID));
    assert_eq!(gate.resolve(Route::Upload), GateDecision::Render(Route::Upload));
    assert_eq!(gate.resolve(Route::SignIn), GateDecision::Redirect(Route::Home));
}

#[test]
fn given_no_session_when_resolving_routes_then_protected_redirect_to_sign_in() {
    // Arrange
    let world = TestWorld::anonymous();
    let mut gate = AuthGate::new(&world.backend);

    // Act
    gate.check_session();

    // Assert
    assert_eq!(gate.state(), &SessionState::Anonymous);
    assert_eq!(
        gate.resolve(Route::parse("/note/abc")),
        GateDecision::Redirect(Route::SignIn)
    );
    assert_eq!(gate.resolve(Route::SignUp), GateDecision::Render(Route::SignUp));
    assert_eq!(
        gate.resolve(Route::parse("/nowhere")),
        GateDecision::Render(Route::NotFound("/nowhere".to_string()))
    );
}

#[test]
fn given_failing_session_check_when_checking_then_anonymous_without_toast() {
    // Arrange
    let world = TestWorld::signed_in();
    world.backend.set_failing(Operation::CurrentUser, true);
    let mut gate = AuthGate::new(&world.backend);

    // Act
    gate.check_session();

    // Assert
    assert_eq!(gate.state(), &SessionState::Anonymous);
    assert!(gate.notifier().toasts().is_empty());
}

#[test]
fn given_valid_credentials_when_signing_in_then_welcomed() {
    // Arrange
    let world = TestWorld::anonymous();
    let mut gate = AuthGate::new(&world.backend);
    gate.check_session();

    // Act
    let user = gate
        .sign_in(test_users::ADA_EMAIL, TEST_PASSWORD)
        .expect("sign in should succeed")
        .clone();

    // Assert
    assert_eq!(user.name, "Ada");
    assert_eq!(gate.notifier().last().map(|t| t.message.as_str()), Some("Welcome back!"));
}

#[test]
fn given_short_password_when_signing_in_then_validation_error_without_remote_call() {
    // Arrange
    let world = TestWorld::anonymous();
    let mut gate = AuthGate::new(&world.backend);

    // Act
    let result = gate.sign_in("not-an-email", "short");

    // Assert
    match result {
        Err(DomainError::Validation(errors)) => {
            assert_eq!(errors.get("email"), Some("Invalid email address"));
            assert_eq!(errors.get("password"), Some("Password must be at least 8 characters"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(world.backend.count(Operation::CreateSession), 0);
}

#[test]
fn given_wrong_password_when_signing_in_then_error_toast_and_anonymous() {
    // Arrange
    let world = TestWorld::anonymous();
    let mut gate = AuthGate::new(&world.backend);

    // Act
    let result = gate.sign_in(test_users::ADA_EMAIL, "wrong-password");

    // Assert
    assert!(result.is_err());
    assert_eq!(gate.state(), &SessionState::Anonymous);
    assert!(gate.notifier().last().is_some());
}

#[test]
fn given_new_account_when_signing_up_then_signed_in() {
    // Arrange
    let world = TestWorld::anonymous();
    let mut gate = AuthGate::new(&world.backend);

    // Act
    let user = gate
        .sign_up("Grace", "grace@example.com", "hopper-1906")
        .expect("sign up should succeed")
        .clone();

    // Assert
    assert_eq!(user.email, "grace@example.com");
    assert_eq!(
        gate.notifier().last().map(|t| t.message.as_str()),
        Some("Account created successfully!")
    );
}

#[test]
fn given_taken_email_when_signing_up_then_fails() {
    // Arrange
    let world = TestWorld::anonymous();
    let mut gate = AuthGate::new(&world.backend);

    // Act
    let result = gate.sign_up("Ada again", test_users::ADA_EMAIL, "password-xyz");

    // Assert
    assert!(result.is_err());
    assert!(gate.user().is_none());
}

#[test]
fn given_signed_in_when_signing_out_then_anonymous() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut gate = AuthGate::new(&world.backend);
    gate.check_session();

    // Act
    gate.sign_out().expect("sign out should succeed");

    // Assert
    assert_eq!(gate.state(), &SessionState::Anonymous);
    assert_eq!(
        gate.notifier().last().map(|t| t.message.as_str()),
        Some("Logged out successfully")
    );
    assert_eq!(gate.resolve(Route::Home), GateDecision::Redirect(Route::SignIn));
}
