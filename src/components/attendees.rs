use crate::error::{config_error, SyncResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Static mapping from a person's name to their email address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendeeDirectory {
    emails: HashMap<String, String>,
    extra: Vec<String>,
}

impl AttendeeDirectory {
    pub fn new(emails: HashMap<String, String>) -> Self {
        Self {
            emails,
            extra: Vec::new(),
        }
    }

    /// Addresses invited to every event alongside the shift owner
    pub fn with_extra_attendees(mut self, extra: Vec<String>) -> Self {
        self.extra = extra;
        self
    }

    /// Parse a TOML table of `"Name" = "email"` pairs
    pub fn from_toml(content: &str) -> SyncResult<Self> {
        let emails: HashMap<String, String> = toml::from_str(content)?;
        Ok(Self::new(emails))
    }

    /// Load the directory file
    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!(
                "Failed to read attendee directory {}: {}",
                path.display(),
                e
            ))
        })?;
        let directory = Self::from_toml(&content)?;
        info!("Loaded {} attendees from {}", directory.len(), path.display());
        Ok(directory)
    }

    pub fn email_for(&self, name: &str) -> Option<&str> {
        self.emails.get(name.trim()).map(String::as_str)
    }

    /// Everyone to invite for `name`'s shift, or `None` if `name` is unknown
    pub fn attendees_for(&self, name: &str) -> Option<Vec<String>> {
        let email = self.email_for(name)?;
        let mut attendees = vec![email.to_string()];
        for extra in &self.extra {
            if !attendees.contains(extra) {
                attendees.push(extra.clone());
            }
        }
        Some(attendees)
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DIRECTORY: &str = r#"
"Jane Doe" = "jane@example.com"
"John Roe" = "john@example.com"
"#;

    #[test]
    fn test_lookup() {
        let directory = AttendeeDirectory::from_toml(DIRECTORY).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.email_for("Jane Doe"), Some("jane@example.com"));
        assert_eq!(directory.email_for(" John Roe "), Some("john@example.com"));
        assert_eq!(directory.email_for("Nobody"), None);
    }

    #[test]
    fn test_extra_attendees() {
        let directory = AttendeeDirectory::from_toml(DIRECTORY)
            .unwrap()
            .with_extra_attendees(vec![
                "lead@example.com".to_string(),
                "jane@example.com".to_string(),
            ]);

        assert_eq!(
            directory.attendees_for("Jane Doe"),
            Some(vec![
                "jane@example.com".to_string(),
                "lead@example.com".to_string()
            ])
        );
        assert_eq!(directory.attendees_for("Nobody"), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DIRECTORY.as_bytes()).unwrap();

        let directory = AttendeeDirectory::load(file.path()).unwrap();
        assert_eq!(directory.email_for("Jane Doe"), Some("jane@example.com"));

        assert!(AttendeeDirectory::load(Path::new("/nonexistent/attendees.toml")).is_err());
        assert!(AttendeeDirectory::from_toml("not = [valid").is_err());
    }
}
