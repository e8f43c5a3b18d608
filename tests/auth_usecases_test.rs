//! Account and authentication flows with the real Argon2 and JWT adapters
//! over the in-memory repositories.

use std::sync::Arc;

use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use bookstore::errors::{ErrorCode, ErrorKind, ErrorSignal};
use bookstore::infra::{Argon2PasswordService, JwtTokenService, Persistence};
use bookstore::ports::{MockTokenService, TokenService, UserRepository};
use bookstore::usecases::{
    ChangePasswordCommand, LoginCommand, LoginUserUseCase, RegisterUserCommand,
    RegisterUserUseCase, UpdateProfileCommand, UseCases,
};

const SECRET: &[u8] = b"integration-test-secret-at-least-32-bytes";

struct TestApp {
    persistence: Persistence,
    tokens: Arc<JwtTokenService>,
    use_cases: UseCases,
}

impl TestApp {
    fn new() -> Self {
        let persistence = Persistence::in_memory();
        let tokens = Arc::new(JwtTokenService::new(SECRET, 30, None));
        let use_cases = UseCases::new(
            &persistence,
            tokens.clone(),
            Arc::new(Argon2PasswordService::new()),
            true,
        );
        Self {
            persistence,
            tokens,
            use_cases,
        }
    }

    async fn register(&self, email: &str, password: &str) -> Uuid {
        let registered = assert_ok!(
            self.use_cases
                .register()
                .execute(registration(email, password))
                .await
        );
        registered.user.id.expect("registered user has an id")
    }
}

fn registration(email: &str, password: &str) -> RegisterUserCommand {
    RegisterUserCommand {
        email: email.to_string(),
        name: "Ada Lovelace".to_string(),
        age: 36,
        password: password.to_string(),
    }
}

fn login(email: &str, password: &str) -> LoginCommand {
    LoginCommand {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_normalizes_email_and_issues_token() {
    let app = TestApp::new();

    let registered = assert_ok!(
        app.use_cases
            .register()
            .execute(registration("  Ada@EXAMPLE.com ", "correct horse"))
            .await
    );

    assert_eq!(registered.user.email, "ada@example.com");
    assert_eq!(registered.user.name, "Ada Lovelace");
    assert_ne!(registered.user.hashed_password, "correct horse");

    let token = registered.access_token.expect("token issued on register");
    let claims = assert_ok!(app.tokens.decode_access_token(&token));
    assert_eq!(claims.sub, registered.user.id.unwrap().to_string());
}

#[tokio::test]
async fn test_register_same_email_different_spelling_conflicts() {
    let app = TestApp::new();
    app.register("ada@example.com", "correct horse").await;

    for spelling in [" Ada@EXAMPLE.com ", "ADA@example.COM"] {
        let err = assert_err!(
            app.use_cases
                .register()
                .execute(registration(spelling, "another password"))
                .await
        );
        assert_eq!(err.code(), ErrorCode::EmailAlreadyExists);
        assert_eq!(err.signal(), ErrorSignal::Conflict);
    }
}

#[tokio::test]
async fn test_register_treats_composed_and_decomposed_email_as_equal() {
    let app = TestApp::new();
    app.register("jos\u{00e9}@example.com", "correct horse").await;

    let err = assert_err!(
        app.use_cases
            .register()
            .execute(registration("Jose\u{0301}@example.com", "correct horse"))
            .await
    );
    assert_eq!(err.code(), ErrorCode::EmailAlreadyExists);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = TestApp::new();
    let register = app.use_cases.register();

    let err = assert_err!(register.execute(registration("not-an-email", "correct horse")).await);
    assert_eq!(err.code(), ErrorCode::InvalidEmail);

    let err = assert_err!(register.execute(registration("ada@example.com", "short")).await);
    assert_eq!(err.code(), ErrorCode::PasswordTooWeak);
    assert_eq!(err.context_value("min_length"), Some("8"));

    let mut cmd = registration("ada@example.com", "correct horse");
    cmd.age = 151;
    let err = assert_err!(register.execute(cmd).await);
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.context_value("field"), Some("age"));

    let mut cmd = registration("ada@example.com", "correct horse");
    cmd.name = "   ".to_string();
    let err = assert_err!(register.execute(cmd).await);
    assert_eq!(err.context_value("field"), Some("name"));

    // Nothing was stored by the failed attempts
    app.register("ada@example.com", "correct horse").await;
}

#[tokio::test]
async fn test_register_without_token_issuance() {
    let persistence = Persistence::in_memory();
    let mut tokens = MockTokenService::new();
    tokens.expect_create_access_token().times(0);

    let register = RegisterUserUseCase::new(
        persistence.users(),
        Arc::new(tokens),
        Arc::new(Argon2PasswordService::new()),
        false,
    );

    let registered = assert_ok!(
        register
            .execute(registration("ada@example.com", "correct horse"))
            .await
    );
    assert!(registered.access_token.is_none());
}

#[tokio::test]
async fn test_login_token_subject_is_user_id() {
    let app = TestApp::new();
    let user_id = app.register("ada@example.com", "correct horse").await;

    let result = assert_ok!(
        app.use_cases
            .login()
            .execute(login(" ADA@example.com", "correct horse"))
            .await
    );

    assert_eq!(result.user.id, Some(user_id));
    let claims = assert_ok!(app.tokens.decode_access_token(&result.access_token));
    assert_eq!(claims.sub, user_id.to_string());
}

#[tokio::test]
async fn test_login_failures_issue_no_token() {
    let persistence = Persistence::in_memory();
    let passwords = Arc::new(Argon2PasswordService::new());

    let register = RegisterUserUseCase::new(
        persistence.users(),
        Arc::new(MockTokenService::new()),
        passwords.clone(),
        false,
    );
    assert_ok!(
        register
            .execute(registration("ada@example.com", "correct horse"))
            .await
    );

    let mut tokens = MockTokenService::new();
    tokens.expect_create_access_token().times(0);
    let login_use_case = LoginUserUseCase::new(persistence.users(), Arc::new(tokens), passwords);

    let wrong_password = assert_err!(
        login_use_case
            .execute(login("ada@example.com", "battery staple"))
            .await
    );
    let unknown_email = assert_err!(
        login_use_case
            .execute(login("grace@example.com", "correct horse"))
            .await
    );

    assert_eq!(wrong_password.code(), ErrorCode::InvalidCredentials);
    assert_eq!(unknown_email.code(), ErrorCode::InvalidCredentials);
    assert_eq!(wrong_password.message(), unknown_email.message());
    assert_eq!(wrong_password.signal(), ErrorSignal::Unauthorized);
}

#[tokio::test]
async fn test_change_password_with_wrong_old_password_keeps_hash() {
    let app = TestApp::new();
    let user_id = app.register("ada@example.com", "correct horse").await;
    let before = assert_ok!(app.persistence.users().get_by_id(user_id).await).unwrap();

    let err = assert_err!(
        app.use_cases
            .change_password()
            .execute(
                user_id,
                ChangePasswordCommand {
                    old_password: "battery staple".into(),
                    new_password: "a brand new secret".into(),
                },
            )
            .await
    );
    assert_eq!(err.code(), ErrorCode::InvalidCredentials);

    let after = assert_ok!(app.persistence.users().get_by_id(user_id).await).unwrap();
    assert_eq!(before.hashed_password, after.hashed_password);
}

#[tokio::test]
async fn test_change_password_then_login_with_new_password() {
    let app = TestApp::new();
    let user_id = app.register("ada@example.com", "correct horse").await;

    assert_ok!(
        app.use_cases
            .change_password()
            .execute(
                user_id,
                ChangePasswordCommand {
                    old_password: "correct horse".into(),
                    new_password: "a brand new secret".into(),
                },
            )
            .await
    );

    let login_use_case = app.use_cases.login();
    let err = assert_err!(
        login_use_case
            .execute(login("ada@example.com", "correct horse"))
            .await
    );
    assert_eq!(err.code(), ErrorCode::InvalidCredentials);
    assert_ok!(
        login_use_case
            .execute(login("ada@example.com", "a brand new secret"))
            .await
    );
}

#[tokio::test]
async fn test_change_password_unknown_user() {
    let app = TestApp::new();

    let err = assert_err!(
        app.use_cases
            .change_password()
            .execute(
                Uuid::new_v4(),
                ChangePasswordCommand {
                    old_password: "correct horse".into(),
                    new_password: "a brand new secret".into(),
                },
            )
            .await
    );
    assert_eq!(err.code(), ErrorCode::UserNotFound);
}

#[tokio::test]
async fn test_authenticate_resolves_bearer_token() {
    let app = TestApp::new();
    let user_id = app.register("ada@example.com", "correct horse").await;
    let token = assert_ok!(app.tokens.create_access_token(&user_id.to_string()));

    let authenticate = app.use_cases.authenticate();
    let user = assert_ok!(authenticate.execute(&token).await);
    assert_eq!(user.id, Some(user_id));

    let user = assert_ok!(authenticate.execute(&format!("Bearer {}", token)).await);
    assert_eq!(user.id, Some(user_id));
}

#[tokio::test]
async fn test_authenticate_failures() {
    let app = TestApp::new();
    let user_id = app.register("ada@example.com", "correct horse").await;
    let authenticate = app.use_cases.authenticate();

    let err = assert_err!(authenticate.execute("").await);
    assert_eq!(err.code(), ErrorCode::AccessTokenMissing);

    let err = assert_err!(authenticate.execute("Bearer not.a.jwt").await);
    assert_eq!(err.code(), ErrorCode::AccessTokenInvalid);

    let expired = JwtTokenService::new(SECRET, -5, None);
    let token = assert_ok!(expired.create_access_token(&user_id.to_string()));
    let err = assert_err!(authenticate.execute(&token).await);
    assert_eq!(err.code(), ErrorCode::AccessTokenExpired);

    let foreign = JwtTokenService::new(b"some-other-secret-that-is-32-bytes!!", 30, None);
    let token = assert_ok!(foreign.create_access_token(&user_id.to_string()));
    let err = assert_err!(authenticate.execute(&token).await);
    assert_eq!(err.code(), ErrorCode::AccessTokenInvalid);

    let token = assert_ok!(app.tokens.create_access_token("not-a-uuid"));
    let err = assert_err!(authenticate.execute(&token).await);
    assert_eq!(err.code(), ErrorCode::AccessTokenInvalid);
}

#[tokio::test]
async fn test_authenticate_deleted_user_is_unauthorized() {
    let app = TestApp::new();
    let user_id = app.register("ada@example.com", "correct horse").await;
    let token = assert_ok!(app.tokens.create_access_token(&user_id.to_string()));

    assert_ok!(app.use_cases.delete_user().execute(user_id).await);

    let err = assert_err!(app.use_cases.authenticate().execute(&token).await);
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn test_update_profile_merges_fields() {
    let app = TestApp::new();
    let user_id = app.register("ada@example.com", "correct horse").await;
    let update = app.use_cases.update_profile();

    let user = assert_ok!(
        update
            .execute(
                user_id,
                UpdateProfileCommand {
                    name: Some("  Countess of Lovelace ".into()),
                    age: None,
                },
            )
            .await
    );
    assert_eq!(user.name, "Countess of Lovelace");
    assert_eq!(user.age, 36);
    assert_eq!(user.email, "ada@example.com");

    let err = assert_err!(
        update
            .execute(
                user_id,
                UpdateProfileCommand {
                    name: None,
                    age: Some(-1),
                },
            )
            .await
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_delete_user_twice() {
    let app = TestApp::new();
    let user_id = app.register("ada@example.com", "correct horse").await;
    let delete = app.use_cases.delete_user();

    assert_ok!(delete.execute(user_id).await);
    let err = assert_err!(delete.execute(user_id).await);
    assert_eq!(err.code(), ErrorCode::UserNotFound);

    // Email is free again after a hard delete
    app.register("ada@example.com", "correct horse").await;
}

#[tokio::test]
async fn test_roles_create_and_list() {
    let app = TestApp::new();
    let create = app.use_cases.create_role();

    let admin = assert_ok!(create.execute("  Admin ").await);
    assert_eq!(admin.name, "admin");
    assert_ok!(create.execute("editor").await);

    let err = assert_err!(create.execute("ADMIN").await);
    assert_eq!(err.code(), ErrorCode::ConstraintViolation);
    assert_eq!(err.signal(), ErrorSignal::Conflict);

    let roles = assert_ok!(app.use_cases.list_roles().execute().await);
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["admin", "editor"]);
    assert_eq!(roles[0].id, admin.id);
}
