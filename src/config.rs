// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Installation-specific settings for the SchoolMate instance under test
//!
//! Values come from, lowest precedence first: built-in defaults, an
//! optional JSON file named by `SCHOOLMATE_CONFIG`, and environment
//! variables (`BASE_URL`, `ADMIN_USERNAME`, `ADMIN_PASSWORD`, ...).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Environment variable naming an optional JSON config file
pub const CONFIG_FILE_VAR: &str = "SCHOOLMATE_CONFIG";

/// Environment variable for the application base URL
pub const BASE_URL_VAR: &str = "BASE_URL";

/// Default application base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

/// Single entry script of the application
pub const ENTRY_SCRIPT: &str = "index.php";

/// User roles seeded in the fixture database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    /// All roles in a stable order
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Student, Role::Parent];

    /// Lowercase role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }

    fn env_prefix(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
            Role::Parent => "PARENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::config(format!("Unknown role: {}", s)))
    }
}

/// Username/password pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Settings describing one SchoolMate installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Application base URL (always ends with '/')
    pub base_url: String,
    pub admin: Credentials,
    pub teacher: Credentials,
    pub student: Credentials,
    pub parent: Credentials,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            admin: Credentials::new("test", "test"),
            teacher: Credentials::new("teacher", "teacher"),
            student: Credentials::new("student", "student"),
            parent: Credentials::new("parent", "parent"),
        }
    }
}

impl Environment {
    /// Create the default environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = match lookup(CONFIG_FILE_VAR) {
            Some(path) if !path.trim().is_empty() => Self::from_json_file(path.trim())?,
            _ => Self::default(),
        };

        if let Some(url) = lookup(BASE_URL_VAR) {
            env.base_url = url;
        }

        for role in Role::ALL {
            let prefix = role.env_prefix();
            let creds = env.credentials_mut(role);
            if let Some(username) = lookup(&format!("{}_USERNAME", prefix)) {
                creds.username = username;
            }
            if let Some(password) = lookup(&format!("{}_PASSWORD", prefix)) {
                creds.password = password;
            }
        }

        env.base_url = normalize_base_url(&env.base_url)?;
        Ok(env)
    }

    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let mut env: Environment = serde_json::from_str(&raw)?;
        env.base_url = normalize_base_url(&env.base_url)?;
        tracing::debug!(path = %path.display(), base_url = %env.base_url, "Loaded config file");
        Ok(env)
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = normalize_base_url(url.as_ref())?;
        Ok(self)
    }

    /// Set credentials for a role
    pub fn with_credentials(mut self, role: Role, credentials: Credentials) -> Self {
        *self.credentials_mut(role) = credentials;
        self
    }

    /// Parsed base URL
    pub fn base(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// Resolve a path relative to the base URL
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.base()?.join(path.trim_start_matches('/'))?)
    }

    /// URL of the application's entry script
    pub fn entry_point(&self) -> Result<Url> {
        self.resolve(ENTRY_SCRIPT)
    }

    /// Credentials for a role
    pub fn credentials(&self, role: Role) -> &Credentials {
        match role {
            Role::Admin => &self.admin,
            Role::Teacher => &self.teacher,
            Role::Student => &self.student,
            Role::Parent => &self.parent,
        }
    }

    fn credentials_mut(&mut self, role: Role) -> &mut Credentials {
        match role {
            Role::Admin => &mut self.admin,
            Role::Teacher => &mut self.teacher,
            Role::Student => &mut self.student,
            Role::Parent => &mut self.parent,
        }
    }
}

/// Validate a base URL and make sure it ends with '/'
pub(crate) fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed)?;
    if url.cannot_be_a_base() {
        return Err(Error::config(format!("Base URL cannot be a base: {}", trimmed)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let env = Environment::from_lookup(|_| None).unwrap();
        assert_eq!(env.base_url, "http://localhost:8000/");
        assert_eq!(env.credentials(Role::Admin), &Credentials::new("test", "test"));
        assert_eq!(env.credentials(Role::Teacher).username, "teacher");
        assert_eq!(env.credentials(Role::Student).password, "student");
        assert_eq!(env.credentials(Role::Parent).username, "parent");
    }

    #[test]
    fn test_env_overrides() {
        let env = Environment::from_lookup(lookup_from(&[
            ("BASE_URL", "http://schoolmate.test/app"),
            ("ADMIN_USERNAME", "root"),
            ("PARENT_PASSWORD", "secret"),
        ]))
        .unwrap();

        assert_eq!(env.base_url, "http://schoolmate.test/app/");
        assert_eq!(env.admin.username, "root");
        assert_eq!(env.admin.password, "test");
        assert_eq!(env.parent.password, "secret");
        assert_eq!(
            env.entry_point().unwrap().as_str(),
            "http://schoolmate.test/app/index.php"
        );
    }

    #[test]
    fn test_json_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"base_url": "http://10.0.0.5:8080", "teacher": {{"username": "t1", "password": "p1"}}}}"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let env = Environment::from_lookup(lookup_from(&[
            ("SCHOOLMATE_CONFIG", path.as_str()),
            ("TEACHER_PASSWORD", "override"),
        ]))
        .unwrap();

        assert_eq!(env.base_url, "http://10.0.0.5:8080/");
        assert_eq!(env.teacher.username, "t1");
        assert_eq!(env.teacher.password, "override");
        assert_eq!(env.admin.username, "test");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = Environment::from_lookup(lookup_from(&[("BASE_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_credentials_debug_masks_password() {
        let creds = Credentials::new("test", "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
