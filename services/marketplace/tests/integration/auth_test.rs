use learnhub_auth_types::token::validate_session_token;
use learnhub_domain::user::UserRole;
use learnhub_marketplace::domain::types::DEFAULT_PROFILE_PICTURE;
use learnhub_marketplace::error::MarketplaceError;
use learnhub_marketplace::usecase::auth::{
    LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
};

use crate::helpers::{MockMedia, MockUserRepo, TEST_BCRYPT_COST, TEST_JWT_SECRET, staged_file};

fn register_input(email: &str) -> RegisterInput {
    RegisterInput {
        name: Some("Ada".into()),
        email: Some(email.into()),
        password: Some("hunter22".into()),
        bio: None,
        profile_picture: None,
    }
}

fn register_usecase(users: MockUserRepo, media: MockMedia) -> RegisterUseCase<MockUserRepo, MockMedia> {
    RegisterUseCase {
        users,
        media,
        jwt_secret: TEST_JWT_SECRET.into(),
        bcrypt_cost: TEST_BCRYPT_COST,
    }
}

#[tokio::test]
async fn should_make_first_registered_user_admin() {
    let users = MockUserRepo::default();
    let uc = register_usecase(users.clone(), MockMedia::default());

    let first = uc.execute(register_input("first@example.com")).await.unwrap();
    let second = uc.execute(register_input("second@example.com")).await.unwrap();

    assert_eq!(first.user.role, UserRole::Admin);
    assert_eq!(second.user.role, UserRole::Student);
    assert_eq!(first.user.profile_picture, DEFAULT_PROFILE_PICTURE);
    assert_ne!(first.user.password_hash, "hunter22", "password must be hashed");
    assert_eq!(users.users.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn should_issue_token_matching_registered_user() {
    let uc = register_usecase(MockUserRepo::default(), MockMedia::default());

    let out = uc.execute(register_input("ada@example.com")).await.unwrap();
    let info = validate_session_token(&out.token, TEST_JWT_SECRET).unwrap();

    assert_eq!(info.user_id, out.user.id);
    assert_eq!(info.name, "Ada");
    assert_eq!(info.role, UserRole::Admin);
}

#[tokio::test]
async fn should_reject_duplicate_email_on_register() {
    let uc = register_usecase(MockUserRepo::default(), MockMedia::default());
    uc.execute(register_input("ada@example.com")).await.unwrap();

    let result = uc.execute(register_input("ada@example.com")).await;

    assert!(
        matches!(result, Err(MarketplaceError::EmailTaken)),
        "expected EmailTaken, got {result:?}"
    );
}

#[tokio::test]
async fn should_require_password_on_register() {
    let uc = register_usecase(MockUserRepo::default(), MockMedia::default());
    let input = RegisterInput {
        password: Some(String::new()),
        ..register_input("ada@example.com")
    };

    let result = uc.execute(input).await;

    assert!(matches!(result, Err(MarketplaceError::MissingField("password"))));
}

#[tokio::test]
async fn should_upload_profile_picture_on_register() {
    let media = MockMedia::default();
    let uc = register_usecase(MockUserRepo::default(), media.clone());
    let input = RegisterInput {
        profile_picture: Some(staged_file("me.png", "image/png")),
        ..register_input("ada@example.com")
    };

    let out = uc.execute(input).await.unwrap();

    assert_eq!(out.user.profile_picture, "https://media.test/lms-images/me.png");
    assert_eq!(media.recorded().len(), 1);
}

#[tokio::test]
async fn should_login_with_correct_password() {
    let users = MockUserRepo::default();
    register_usecase(users.clone(), MockMedia::default())
        .execute(register_input("ada@example.com"))
        .await
        .unwrap();

    let uc = LoginUseCase {
        users,
        jwt_secret: TEST_JWT_SECRET.into(),
    };
    let out = uc
        .execute(LoginInput {
            email: Some("ada@example.com".into()),
            password: Some("hunter22".into()),
        })
        .await
        .unwrap();

    let info = validate_session_token(&out.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, out.user.id);
}

#[tokio::test]
async fn should_reject_wrong_password_on_login() {
    let users = MockUserRepo::default();
    register_usecase(users.clone(), MockMedia::default())
        .execute(register_input("ada@example.com"))
        .await
        .unwrap();

    let uc = LoginUseCase {
        users,
        jwt_secret: TEST_JWT_SECRET.into(),
    };
    let result = uc
        .execute(LoginInput {
            email: Some("ada@example.com".into()),
            password: Some("wrong-password".into()),
        })
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_reveal_unknown_email_on_login() {
    let uc = LoginUseCase {
        users: MockUserRepo::default(),
        jwt_secret: TEST_JWT_SECRET.into(),
    };

    let result = uc
        .execute(LoginInput {
            email: Some("nobody@example.com".into()),
            password: Some("whatever".into()),
        })
        .await;

    assert!(matches!(result, Err(MarketplaceError::InvalidCredentials)));
}
