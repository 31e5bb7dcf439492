//! Mock authentication over the `users` collection.
//!
//! Accounts are plain documents in `users/{uid}`. Password sign-in scans
//! that collection for a matching email and password hash; registration and
//! provider sign-in write a new user document. No tokens, no network.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::listeners::{ListenerSet, Subscription};
use crate::store::{
    collection, doc, order_by, where_field, Direction, DocumentStore, Fields, SetOptions, WhereOp,
};
use crate::task::format_timestamp;

pub const USERS_COLLECTION: &str = "users";
pub const MIN_PASSWORD_LEN: usize = 6;

const GOOGLE_EMAIL: &str = "user@gmail.com";
const GOOGLE_DISPLAY_NAME: &str = "Google User";
const GOOGLE_PHOTO_URL: &str = "https://via.placeholder.com/100";

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub provider: String,
}

impl User {
    /// Display name, falling back to the local part of the email.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email_local_part(&self.email))
    }
}

/// Federated sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Google => f.write_str("google"),
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "google.com" => Ok(Provider::Google),
            other => Err(Error::InvalidArgument(format!(
                "unsupported sign-in provider '{other}'"
            ))),
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// At least one ASCII letter and one digit.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_alphabetic()) && password.chars().any(|c| c.is_ascii_digit())
}

/// Stored password digest: blake3 of `email:password`, email lowercased.
pub fn hash_password(email: &str, password: &str) -> String {
    let material = format!("{}:{}", normalize_email(email), password);
    blake3::hash(material.as_bytes()).to_hex().to_string()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

fn provider_user(uid: String, provider: Provider) -> User {
    User {
        uid,
        email: GOOGLE_EMAIL.to_string(),
        display_name: Some(GOOGLE_DISPLAY_NAME.to_string()),
        photo_url: Some(GOOGLE_PHOTO_URL.to_string()),
        provider: provider.to_string(),
    }
}

fn new_uid(prefix: &str) -> String {
    format!("{prefix}_{}", Ulid::new().to_string().to_lowercase())
}

/// Auth state bound to one document store.
pub struct Auth<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    current: Mutex<Option<User>>,
    listeners: ListenerSet<(), Option<User>>,
}

impl<'a, S: DocumentStore + ?Sized> Auth<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::restore(store, None)
    }

    /// Start with a previously persisted user already signed in.
    pub fn restore(store: &'a S, user: Option<User>) -> Self {
        Self {
            store,
            current: Mutex::new(user),
            listeners: ListenerSet::new(),
        }
    }

    fn current(&self) -> MutexGuard<'_, Option<User>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current_user(&self) -> Option<User> {
        self.current().clone()
    }

    /// Signed-in user, or `NotSignedIn` naming the attempted action.
    pub fn require_user(&self, action: &str) -> Result<User> {
        self.current_user()
            .ok_or_else(|| Error::NotSignedIn(action.to_string()))
    }

    /// Called immediately with the current state, then on every change.
    pub fn on_auth_state_changed(
        &self,
        callback: impl Fn(Option<&User>) + Send + Sync + 'static,
    ) -> Subscription {
        let callback = Arc::new(move |user: &Option<User>| callback(user.as_ref()));
        let subscription = self.listeners.add((), callback.clone());
        callback(&self.current_user());
        subscription
    }

    fn set_current(&self, user: Option<User>) {
        *self.current() = user.clone();
        for (_, callback) in self.listeners.matching(|_| true) {
            callback(&user);
        }
    }

    pub fn sign_in_with_password(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(Error::InvalidArgument(
                "Please enter both email and password".to_string(),
            ));
        }
        if !is_valid_email(&email) {
            return Err(Error::InvalidArgument(
                "Please enter a valid email address".to_string(),
            ));
        }

        let expected = hash_password(&email, password);
        let matches = self.store.get_docs(
            &collection(USERS_COLLECTION)
                .query()
                .with(where_field("email", WhereOp::Eq, email.as_str())),
        )?;
        let account = matches
            .iter()
            .find(|account| account.get("passwordHash").and_then(Value::as_str) == Some(expected.as_str()))
            .ok_or_else(|| {
                tracing::debug!(email = %email, "password sign-in rejected");
                Error::InvalidCredentials
            })?;

        let display_name = ["fullName", "displayName", "username"]
            .iter()
            .find_map(|key| account.get(key).and_then(Value::as_str))
            .map(str::to_string);
        let user = User {
            uid: account.id.clone(),
            email,
            display_name,
            photo_url: account
                .get("photoURL")
                .and_then(Value::as_str)
                .map(str::to_string),
            provider: account
                .get("provider")
                .and_then(Value::as_str)
                .unwrap_or("email")
                .to_string(),
        };
        self.signed_in(user)
    }

    /// Register a new email account and sign it in.
    pub fn create_user(&self, email: &str, password: &str, confirm: &str) -> Result<User> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(Error::InvalidArgument("Please fill in all fields".to_string()));
        }
        if !is_valid_email(&email) {
            return Err(Error::InvalidArgument(
                "Please enter a valid email address".to_string(),
            ));
        }
        if password != confirm {
            return Err(Error::InvalidArgument("Passwords do not match".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::WeakCredentials(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        if !is_strong_password(password) {
            return Err(Error::WeakCredentials(
                "Password must contain at least one letter and one number".to_string(),
            ));
        }

        let existing = self.store.get_docs(
            &collection(USERS_COLLECTION)
                .query()
                .with(where_field("email", WhereOp::Eq, email.as_str())),
        )?;
        if !existing.is_empty() {
            return Err(Error::EmailInUse(email));
        }

        let uid = new_uid("user");
        let username = email_local_part(&email).to_string();
        self.store.set_doc(
            &doc(USERS_COLLECTION, uid.clone()),
            fields(json!({
                "email": email,
                "username": username,
                "fullName": username,
                "provider": "email",
                "passwordHash": hash_password(&email, password),
                "createdAt": format_timestamp(Utc::now()),
            })),
            SetOptions::default(),
        )?;
        tracing::info!(uid = %uid, "account registered");

        let user = User {
            uid,
            email,
            display_name: Some(username),
            photo_url: None,
            provider: "email".to_string(),
        };
        self.signed_in(user)
    }

    /// Mock federated sign-in: always succeeds. The first sign-in creates the
    /// provider account and later ones resume it.
    pub fn sign_in_with_provider(&self, provider: Provider) -> Result<User> {
        let existing = self.store.get_docs(
            &collection(USERS_COLLECTION)
                .query()
                .with(where_field("email", WhereOp::Eq, GOOGLE_EMAIL))
                .with(where_field("provider", WhereOp::Eq, provider.to_string()))
                .with(order_by("createdAt", Direction::Asc)),
        )?;
        if let Some(account) = existing.iter().next() {
            tracing::debug!(uid = %account.id, "resuming provider account");
            return self.signed_in(provider_user(account.id.clone(), provider));
        }

        let uid = new_uid(&provider.to_string());
        let username: String = GOOGLE_DISPLAY_NAME
            .split_whitespace()
            .collect::<String>()
            .to_lowercase();
        self.store.set_doc(
            &doc(USERS_COLLECTION, uid.clone()),
            fields(json!({
                "email": GOOGLE_EMAIL,
                "username": username,
                "fullName": GOOGLE_DISPLAY_NAME,
                "photoURL": GOOGLE_PHOTO_URL,
                "provider": provider.to_string(),
                "createdAt": format_timestamp(Utc::now()),
            })),
            SetOptions::default(),
        )?;

        self.signed_in(provider_user(uid, provider))
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.current_user() {
            tracing::info!(uid = %user.uid, "signed out");
        }
        self.set_current(None);
    }

    /// Merge the profile fields of `user` into `users/{uid}`.
    pub fn ensure_user_document(&self, user: &User) -> Result<()> {
        self.store.set_doc(
            &doc(USERS_COLLECTION, user.uid.clone()),
            fields(json!({
                "email": user.email,
                "displayName": user.label(),
                "photoURL": user.photo_url,
                "lastLogin": format_timestamp(Utc::now()),
                "provider": user.provider,
            })),
            SetOptions::merge(),
        )
    }

    fn signed_in(&self, user: User) -> Result<User> {
        self.ensure_user_document(&user)?;
        tracing::info!(uid = %user.uid, provider = %user.provider, "signed in");
        self.set_current(Some(user.clone()));
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use std::sync::Mutex as StdMutex;

    fn store() -> MemoryStore {
        MemoryStore::seeded(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(), Utc::now())
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("demo@example.com"));
        assert!(!is_valid_email("demo@example"));
        assert!(!is_valid_email("demo example@x.io"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn password_strength() {
        assert!(is_strong_password("abc123"));
        assert!(!is_strong_password("abcdef"));
        assert!(!is_strong_password("123456"));
    }

    #[test]
    fn hash_ignores_email_case() {
        assert_eq!(
            hash_password("Demo@Example.com", "demo123"),
            hash_password("demo@example.com", "demo123")
        );
        assert_ne!(
            hash_password("demo@example.com", "demo123"),
            hash_password("demo@example.com", "demo124")
        );
    }

    #[test]
    fn seeded_accounts_sign_in() {
        let store = store();
        let auth = Auth::new(&store);
        let user = auth.sign_in_with_password("demo@example.com", "demo123").unwrap();
        assert_eq!(user.uid, "user3");
        assert_eq!(user.label(), "Demo User");
        assert_eq!(auth.current_user(), Some(user));

        let profile = store.get_doc(&doc("users", "user3")).unwrap().unwrap();
        assert!(profile.get("lastLogin").is_some());
        assert!(profile.get("passwordHash").is_some());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let store = store();
        let auth = Auth::new(&store);
        let err = auth.sign_in_with_password("demo@example.com", "nope").unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
        assert!(auth.current_user().is_none());

        let err = auth.sign_in_with_password("", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = auth.sign_in_with_password("not-an-email", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn registration_validations_run_in_order() {
        let store = store();
        let auth = Auth::new(&store);
        let cases = [
            ("", "abc123", "abc123", "fill in all fields"),
            ("bad", "abc123", "abc123", "valid email"),
            ("a@b.co", "abc123", "abc124", "do not match"),
            ("a@b.co", "ab1", "ab1", "at least 6"),
            ("a@b.co", "abcdef", "abcdef", "letter and one number"),
        ];
        for (email, password, confirm, expected) in cases {
            let err = auth.create_user(email, password, confirm).unwrap_err();
            assert!(err.to_string().contains(expected), "{err}");
        }
    }

    #[test]
    fn registration_creates_account_and_signs_in() {
        let store = store();
        let auth = Auth::new(&store);
        let user = auth.create_user("new@site.io", "secret1", "secret1").unwrap();
        assert!(user.uid.starts_with("user_"));
        assert_eq!(user.label(), "new");

        auth.sign_out();
        assert!(auth.current_user().is_none());
        let again = auth.sign_in_with_password("NEW@site.io", "secret1").unwrap();
        assert_eq!(again.uid, user.uid);

        let err = auth.create_user("new@site.io", "secret1", "secret1").unwrap_err();
        assert!(matches!(err, Error::EmailInUse(_)));
    }

    #[test]
    fn google_sign_in_creates_profile() {
        let store = store();
        let auth = Auth::new(&store);
        let user = auth.sign_in_with_provider(Provider::Google).unwrap();
        assert!(user.uid.starts_with("google_"));
        assert_eq!(user.email, "user@gmail.com");
        assert_eq!(user.photo_url.as_deref(), Some("https://via.placeholder.com/100"));

        let profile = store.get_doc(&doc("users", user.uid.clone())).unwrap().unwrap();
        assert_eq!(profile.get("username"), Some(&json!("googleuser")));
        assert_eq!(profile.get("provider"), Some(&json!("google")));
    }

    #[test]
    fn google_sign_in_resumes_existing_account() {
        let store = store();
        let auth = Auth::new(&store);
        let first = auth.sign_in_with_provider(Provider::Google).unwrap();
        auth.sign_out();
        let second = auth.sign_in_with_provider(Provider::Google).unwrap();
        assert_eq!(first.uid, second.uid);

        let accounts = store
            .get_docs(
                &collection("users")
                    .query()
                    .with(where_field("email", WhereOp::Eq, "user@gmail.com")),
            )
            .unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn auth_state_listener_tracks_changes() {
        let store = store();
        let auth = Auth::new(&store);
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = auth.on_auth_state_changed(move |user| {
            sink.lock().unwrap().push(user.map(|u| u.uid.clone()));
        });

        auth.sign_in_with_password("admin@example.com", "admin123").unwrap();
        auth.sign_out();
        drop(sub);
        auth.sign_in_with_password("admin@example.com", "admin123").unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("user2".to_string()), None]
        );
    }

    #[test]
    fn require_user_reports_action() {
        let store = store();
        let auth = Auth::new(&store);
        let err = auth.require_user("add tasks").unwrap_err();
        assert_eq!(err.to_string(), "Please log in to add tasks");
    }
}
