use assert_matches::assert_matches;
use crux_core::testing::AppTester;
use crux_core::App as _;
use crux_http::testing::ResponseBuilder;

use calendr_shared::{
    App, AvailabilityBody, Effect, Event, FieldValidity, Model, RegistrationBody, Secret,
};

fn availability_response(email: &str, available: bool) -> Event {
    Event::AvailabilityResponse {
        email: email.to_string(),
        result: Box::new(Ok(ResponseBuilder::ok()
            .body(AvailabilityBody { available })
            .build())),
    }
}

#[test]
fn test_happy_path_through_registration() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    // 1. Valid email typed: validity flips and an availability check goes out
    let update = app.update(
        Event::EmailChanged {
            text: "user@example.com".into(),
        },
        &mut model,
    );
    assert_eq!(model.email_validity, FieldValidity::Valid);
    assert_eq!(model.email_available, None);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));

    let request = update
        .effects
        .iter()
        .find_map(|e| match e {
            Effect::Http(request) => Some(&request.operation),
            _ => None,
        })
        .expect("valid email should issue an availability check");
    assert_eq!(request.method, "GET");
    assert_eq!(
        request.url,
        "https://api.example.com/api/v1/accounts/availability?email=user%40example.com"
    );

    // 2. Service says the email is free
    app.update(availability_response("user@example.com", true), &mut model);
    assert_eq!(model.email_available, Some(true));

    // 3. Password and matching confirmation
    app.update(
        Event::PasswordChanged {
            text: Secret::new("goodpass1"),
        },
        &mut model,
    );
    assert_eq!(model.password_validity, FieldValidity::Valid);
    assert_eq!(model.passwords_match, None);

    app.update(
        Event::ConfirmPasswordChanged {
            text: Secret::new("goodpass1"),
        },
        &mut model,
    );
    assert_eq!(model.passwords_match, Some(true));
    assert!(model.can_submit());

    let vm = App::default().view(&model);
    assert!(vm.can_submit);
    assert_eq!(vm.email_message, "");
    assert_eq!(vm.password_message, "");
    assert_eq!(vm.confirm_message, "");

    // 4. Submit: registration request goes out, submit latches
    let update = app.update(Event::SubmitTapped, &mut model);
    assert!(model.is_submitting);

    let request = update
        .effects
        .iter()
        .find_map(|e| match e {
            Effect::Http(request) => Some(&request.operation),
            _ => None,
        })
        .expect("submit should issue a registration request");
    assert_eq!(request.method, "POST");
    assert_eq!(request.url, "https://api.example.com/api/v1/accounts");

    // A second tap while in flight is swallowed
    let update = app.update(Event::SubmitTapped, &mut model);
    assert!(update.effects.is_empty());

    // 5. Success: navigation to signin is requested
    let update = app.update(
        Event::RegistrationResponse {
            result: Box::new(Ok(ResponseBuilder::ok()
                .body(RegistrationBody { success: true })
                .build())),
        },
        &mut model,
    );
    assert!(!model.is_submitting);
    assert!(model.active_error.is_none());
    assert!(update
        .effects
        .iter()
        .any(|e| matches!(e, Effect::Navigate(_))));
}

#[test]
fn test_registration_body_carries_encoded_password() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::EmailChanged {
            text: "user@example.com".into(),
        },
        &mut model,
    );
    app.update(availability_response("user@example.com", true), &mut model);
    app.update(
        Event::PasswordChanged {
            text: Secret::new("goodpass1"),
        },
        &mut model,
    );
    app.update(
        Event::ConfirmPasswordChanged {
            text: Secret::new("goodpass1"),
        },
        &mut model,
    );

    let update = app.update(Event::SubmitTapped, &mut model);
    let request = update
        .effects
        .iter()
        .find_map(|e| match e {
            Effect::Http(request) => Some(&request.operation),
            _ => None,
        })
        .expect("submit should issue a registration request");

    let body = String::from_utf8(request.body.clone()).expect("registration body is JSON text");
    assert!(body.contains("user@example.com"));
    // base64("goodpass1"), standard alphabet with padding; the raw
    // password must not appear on the wire
    assert!(body.contains("Z29vZHBhc3Mx"));
    assert!(!body.contains("goodpass1"));
}

#[test]
fn test_invalid_email_issues_no_availability_check() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(
        Event::EmailChanged {
            text: "bad-email".into(),
        },
        &mut model,
    );

    assert_eq!(model.email_validity, FieldValidity::Invalid);
    assert_eq!(model.email_available, None);
    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Http(_))));

    let vm = App::default().view(&model);
    assert_eq!(vm.email_message, "Enter a valid email address.");
}

#[test]
fn test_submit_tap_ignored_while_form_incomplete() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::SubmitTapped, &mut model);
    assert!(!model.is_submitting);
    assert!(update.effects.is_empty());
}

#[test]
fn test_mismatch_then_correction() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::PasswordChanged {
            text: Secret::new("goodpass1"),
        },
        &mut model,
    );
    app.update(
        Event::ConfirmPasswordChanged {
            text: Secret::new("goodpass2"),
        },
        &mut model,
    );
    assert_eq!(model.passwords_match, Some(false));

    let vm = App::default().view(&model);
    assert_eq!(vm.confirm_message, "This must match with your password above.");

    app.update(
        Event::ConfirmPasswordChanged {
            text: Secret::new("goodpass1"),
        },
        &mut model,
    );
    assert_eq!(model.passwords_match, Some(true));
}

#[test]
fn test_clearing_primary_password_suppresses_mismatch() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::PasswordChanged {
            text: Secret::new("goodpass1"),
        },
        &mut model,
    );
    app.update(
        Event::ConfirmPasswordChanged {
            text: Secret::new("x"),
        },
        &mut model,
    );
    assert_eq!(model.passwords_match, Some(false));

    app.update(
        Event::PasswordChanged {
            text: Secret::default(),
        },
        &mut model,
    );
    assert_eq!(model.passwords_match, None);

    let vm = App::default().view(&model);
    assert_eq!(vm.confirm_message, "");
}

#[test]
fn test_signin_tap_navigates_regardless_of_form_state() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::SigninTapped, &mut model);
    assert_matches!(
        update
            .effects
            .iter()
            .find(|e| matches!(e, Effect::Navigate(_))),
        Some(_)
    );
}
