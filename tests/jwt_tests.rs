mod common;

use medidiagnose_backend::config::JwtConfig;
use medidiagnose_backend::model::user::UserRole;
use medidiagnose_backend::util::jwt::{JwtError, JwtTokenUtils, JwtTokenUtilsImpl};

use common::make_user;

fn create_test_jwt_utils() -> JwtTokenUtilsImpl {
    JwtTokenUtilsImpl::new(JwtConfig::default())
}

#[test]
fn test_generate_token_success() {
    let jwt_utils = create_test_jwt_utils();
    let user = make_user("doctor@example.com", UserRole::Doctor, "password123");

    let issued = jwt_utils.generate_token(&user).unwrap();
    assert!(!issued.access_token.is_empty());
    assert_eq!(issued.token_type, "Bearer");
    assert_eq!(issued.expires_in, 10080 * 60);
}

#[test]
fn test_validate_token_carries_identity_and_flags() {
    let jwt_utils = create_test_jwt_utils();
    let user = make_user("admin@example.com", UserRole::Administrator, "password123");

    let issued = jwt_utils.generate_token(&user).unwrap();
    let claims = jwt_utils.validate_token(&issued.access_token).unwrap();

    assert_eq!(claims.sub, user.id.unwrap().to_hex());
    assert_eq!(claims.email, "admin@example.com");
    assert!(claims.is_superuser);
    assert!(claims.is_staff);
    assert!(claims.roles.is_empty());
    assert!(claims.extra_permissions.is_empty());
    assert!(claims.exp > claims.iat);
    assert!(!claims.jti.is_empty());
}

#[test]
fn test_patient_token_has_no_access_flags() {
    let jwt_utils = create_test_jwt_utils();
    let user = make_user("patient@example.com", UserRole::Patient, "password123");

    let issued = jwt_utils.generate_token(&user).unwrap();
    let claims = jwt_utils.validate_token(&issued.access_token).unwrap();

    assert!(!claims.is_superuser);
    assert!(!claims.is_staff);
}

#[test]
fn test_validate_expired_token() {
    let expired_utils = JwtTokenUtilsImpl::new(JwtConfig {
        token_expiry_minutes: -10,
        ..JwtConfig::default()
    });
    let user = make_user("doctor@example.com", UserRole::Doctor, "password123");
    let issued = expired_utils.generate_token(&user).unwrap();

    let result = create_test_jwt_utils().validate_token(&issued.access_token);
    assert!(matches!(result, Err(JwtError::TokenExpired)));
}

#[test]
fn test_validate_token_wrong_secret() {
    let jwt_utils = create_test_jwt_utils();
    let other = JwtTokenUtilsImpl::new(JwtConfig {
        jwt_secret: "a_completely_different_secret_key_of_sufficient_length".to_string(),
        ..JwtConfig::default()
    });
    let user = make_user("doctor@example.com", UserRole::Doctor, "password123");
    let issued = other.generate_token(&user).unwrap();

    let result = jwt_utils.validate_token(&issued.access_token);
    assert!(matches!(result, Err(JwtError::DecodingFailed(_))));
}

#[test]
fn test_validate_garbage_token() {
    let jwt_utils = create_test_jwt_utils();
    let result = jwt_utils.validate_token("not.a.jwt");
    assert!(matches!(result, Err(JwtError::DecodingFailed(_))));
}

#[test]
fn test_extract_token_from_header() {
    let jwt_utils = create_test_jwt_utils();

    let token = jwt_utils
        .extract_token_from_header("Bearer abc.def.ghi")
        .unwrap();
    assert_eq!(token, "abc.def.ghi");

    assert!(matches!(
        jwt_utils.extract_token_from_header("Basic abc"),
        Err(JwtError::InvalidToken)
    ));
    assert!(matches!(
        jwt_utils.extract_token_from_header("Bearer "),
        Err(JwtError::InvalidToken)
    ));
}
