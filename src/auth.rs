//! # Static Auth Directory
//!
//! Three demo accounts and a session that can log into them. This is a
//! fixture, not access control: nothing in the crate checks roles, and the
//! passwords are in the source.
//!
//! Login attempts go through the shared [`RateWindowTracker`] under
//! [`LOGIN_THROTTLE_KEY`], the same way any outbound call would.

use crate::error::LoginError;
use crate::throttle::{Clock, RateWindowTracker, SystemClock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Throttle key used for login attempts.
pub const LOGIN_THROTTLE_KEY: &str = "auth/login";

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Staff
    User,
    /// Administrator
    Admin,
    /// Super administrator
    Superadmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::Superadmin => write!(f, "superadmin"),
        }
    }
}

/// A directory account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier
    pub id: String,
    /// Login name
    pub username: String,
    /// Mail address
    pub email: String,
    /// Role
    pub role: Role,
    /// Display name
    pub name: String,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A username/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Login name
    pub username: String,
    /// Plain-text password
    pub password: String,
}

// Keep passwords out of logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

const DUMMY_ACCOUNTS: [(&str, &str, Role, &str, &str); 3] = [
    ("1", "user", Role::User, "Staff User", "user123"),
    ("2", "admin", Role::Admin, "Admin Telnet", "admin123"),
    ("3", "superadmin", Role::Superadmin, "Super Admin", "super123"),
];

const EMAIL_DOMAIN: &str = "telnet.co.id";

/// Fixed lookup table of users and their credentials.
#[derive(Debug, Clone)]
pub struct Directory {
    users: Vec<User>,
    credentials: Vec<Credential>,
}

impl Default for Directory {
    /// The three demo accounts.
    fn default() -> Self {
        let users = DUMMY_ACCOUNTS
            .iter()
            .map(|&(id, username, role, name, _)| User {
                id: id.to_string(),
                username: username.to_string(),
                email: format!("{}@{}", username, EMAIL_DOMAIN),
                role,
                name: name.to_string(),
                avatar: None,
            })
            .collect();

        let credentials = DUMMY_ACCOUNTS
            .iter()
            .map(|&(_, username, _, _, password)| Credential {
                username: username.to_string(),
                password: password.to_string(),
            })
            .collect();

        Self { users, credentials }
    }
}

impl Directory {
    /// The demo directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every account.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Account by username.
    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|user| user.username == username)
    }

    /// Account matching both username and password.
    pub fn verify(&self, username: &str, password: &str) -> Option<&User> {
        let matched = self
            .credentials
            .iter()
            .any(|cred| cred.username == username && cred.password == password);

        if matched {
            self.find_user(username)
        } else {
            None
        }
    }
}

/// Who is logged in, if anyone.
///
/// ```rust
/// use std::sync::Arc;
/// use kalkulator::{DeploymentMode, Directory, RateWindowTracker, Session};
///
/// let tracker = Arc::new(RateWindowTracker::for_mode(DeploymentMode::Production));
/// let mut session = Session::new(Directory::new(), tracker);
///
/// let user = session.login("admin", "admin123").unwrap();
/// assert_eq!(user.name, "Admin Telnet");
///
/// session.logout();
/// assert!(!session.is_logged_in());
/// ```
#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    directory: Directory,
    tracker: Arc<RateWindowTracker<C>>,
    current: Option<User>,
}

impl<C: Clock> Session<C> {
    /// Logged-out session over `directory`, throttled by `tracker`.
    pub fn new(directory: Directory, tracker: Arc<RateWindowTracker<C>>) -> Self {
        Self {
            directory,
            tracker,
            current: None,
        }
    }

    /// Logs in, replacing any current user.
    ///
    /// # Errors
    ///
    /// [`LoginError::Throttled`] when too many attempts landed inside the
    /// window (the attempt is not counted), otherwise
    /// [`LoginError::InvalidCredentials`] on a mismatch.
    pub fn login(&mut self, username: &str, password: &str) -> Result<&User, LoginError> {
        if !self.tracker.try_admit(LOGIN_THROTTLE_KEY) {
            return Err(LoginError::Throttled);
        }

        let Some(user) = self.directory.verify(username, password) else {
            debug!("Rejected login for {}", username);
            return Err(LoginError::InvalidCredentials);
        };

        info!("{} logged in as {}", user.username, user.role);
        Ok(self.current.insert(user.clone()))
    }

    /// Forgets the current user.
    pub fn logout(&mut self) {
        if let Some(user) = self.current.take() {
            info!("{} logged out", user.username);
        }
    }

    /// Logged-in user.
    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// `true` while someone is logged in.
    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    /// The directory this session checks against.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throttle::{ManualClock, ThrottleConfig};

    fn session(max: u32) -> (Session<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let tracker = Arc::new(
            RateWindowTracker::with_clock(ThrottleConfig::new(max, 1000), clock.clone()).unwrap(),
        );
        (Session::new(Directory::new(), tracker), clock)
    }

    #[test]
    fn test_directory_contents() {
        let directory = Directory::new();
        assert_eq!(directory.users().len(), 3);

        let admin = directory.find_user("admin").unwrap();
        assert_eq!(admin.id, "2");
        assert_eq!(admin.email, "admin@telnet.co.id");
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.avatar, None);

        assert!(directory.find_user("root").is_none());
    }

    #[test]
    fn test_verify() {
        let directory = Directory::new();
        assert_eq!(directory.verify("user", "user123").unwrap().name, "Staff User");
        assert_eq!(
            directory.verify("superadmin", "super123").unwrap().role,
            Role::Superadmin
        );
        assert!(directory.verify("user", "admin123").is_none());
        assert!(directory.verify("nobody", "user123").is_none());
    }

    #[test]
    fn test_credential_debug_hides_password() {
        let cred = Credential {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        };
        let debug = format!("{:?}", cred);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("admin123"));
    }

    #[test]
    fn test_user_serialization() {
        let directory = Directory::new();
        let json = serde_json::to_value(directory.find_user("user").unwrap()).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["email"], "user@telnet.co.id");
        assert!(json.get("avatar").is_none());
    }

    #[test]
    fn test_login_logout() {
        let (mut session, _) = session(3);
        assert!(!session.is_logged_in());

        let user = session.login("user", "user123").unwrap();
        assert_eq!(user.username, "user");
        assert_eq!(session.current_user().unwrap().role, Role::User);

        session.logout();
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_invalid_credentials_keep_previous_user() {
        let (mut session, _) = session(3);
        session.login("admin", "admin123").unwrap();

        assert_eq!(
            session.login("admin", "wrong"),
            Err(LoginError::InvalidCredentials)
        );
        assert_eq!(session.current_user().unwrap().username, "admin");
    }

    #[test]
    fn test_login_throttled() {
        let (mut session, clock) = session(2);

        assert_eq!(session.login("user", "x"), Err(LoginError::InvalidCredentials));
        assert_eq!(session.login("user", "y"), Err(LoginError::InvalidCredentials));
        assert_eq!(session.login("user", "user123"), Err(LoginError::Throttled));

        clock.advance(1000);
        assert!(session.login("user", "user123").is_ok());
    }

    #[test]
    fn test_concurrent_logins_share_one_budget() {
        use std::sync::Barrier;
        use std::thread;

        const THREADS: usize = 6;

        let tracker = Arc::new(
            RateWindowTracker::with_clock(ThrottleConfig::new(1, 1000), ManualClock::new())
                .unwrap(),
        );
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let mut session = Session::new(Directory::new(), tracker.clone());
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    session.login("user", "user123").is_ok()
                })
            })
            .collect();

        let logged_in = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(logged_in, 1);
        assert_eq!(tracker.count(LOGIN_THROTTLE_KEY), 1);
    }
}
