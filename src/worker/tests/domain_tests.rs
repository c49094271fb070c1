//! Validation tests for worker value types.

use crate::worker::domain::{
    Email, PasswordHash, PositionName, Requester, Username, WorkerDomainError, WorkerId,
    WorkerProfile,
};
use rstest::rstest;

#[rstest]
#[case("alice")]
#[case("bob.smith+qa@team_1-x")]
fn username_accepts_django_style_characters(#[case] raw: &str) {
    let username = Username::new(raw).expect("valid username");
    assert_eq!(username.as_str(), raw);
}

#[rstest]
fn username_rejects_spaces_and_symbols() {
    assert_eq!(
        Username::new("bad name"),
        Err(WorkerDomainError::InvalidUsername("bad name".to_owned()))
    );
    assert_eq!(Username::new("   "), Err(WorkerDomainError::EmptyUsername));
}

#[rstest]
fn email_lowercases_domain_and_normalises_for_uniqueness() {
    let email = Email::new(" Alice@Example.COM ").expect("valid email");
    assert_eq!(email.as_str(), "Alice@example.com");
    assert_eq!(email.normalized(), "alice@example.com");
}

#[rstest]
#[case("no-at-sign")]
#[case("@example.com")]
#[case("alice@localhost")]
#[case("alice@exa mple.com")]
fn email_rejects_malformed_addresses(#[case] raw: &str) {
    assert!(matches!(Email::new(raw), Err(WorkerDomainError::InvalidEmail(_))));
}

#[rstest]
fn profile_requires_both_names() {
    assert_eq!(
        WorkerProfile::new("a@b.io", " ", "Doe", None),
        Err(WorkerDomainError::EmptyFirstName)
    );
    assert_eq!(
        WorkerProfile::new("a@b.io", "Jane", "", None),
        Err(WorkerDomainError::EmptyLastName)
    );
}

#[rstest]
fn weak_passwords_are_rejected_before_hashing() {
    assert_eq!(
        PasswordHash::from_plaintext("short").map(|_| ()),
        Err(WorkerDomainError::PasswordTooShort(8))
    );
    assert_eq!(
        PasswordHash::from_plaintext("1234567890").map(|_| ()),
        Err(WorkerDomainError::PasswordEntirelyNumeric)
    );
    assert_eq!(
        PasswordHash::from_new_password("Secret-pass-1", "Secret-pass-2").map(|_| ()),
        Err(WorkerDomainError::PasswordMismatch)
    );
}

#[rstest]
fn hashed_password_verifies_only_the_original() {
    let hash = PasswordHash::from_plaintext("Correct-horse-1").expect("hashing succeeds");
    assert!(hash.as_str().starts_with("$argon2"));
    assert!(hash.verify("Correct-horse-1"));
    assert!(!hash.verify("correct-horse-1"));
    assert!(!PasswordHash::from_persisted("not a phc string").verify("anything"));
}

#[rstest]
fn position_name_is_bounded() {
    assert_eq!(PositionName::new(""), Err(WorkerDomainError::EmptyPositionName));
    let long = "x".repeat(101);
    assert_eq!(
        PositionName::new(&long),
        Err(WorkerDomainError::PositionNameTooLong(101))
    );
}

#[rstest]
fn superusers_count_as_staff() {
    let requester = Requester::new(WorkerId::new(), false, true);
    assert!(requester.is_staff());
    assert!(requester.ensure_staff("x").is_ok());
    assert!(Requester::regular(WorkerId::new()).ensure_superuser("x").is_err());
}
