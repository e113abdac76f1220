use std::{
    env,
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

use crate::error::FirebaseError;

/// Environment variable that may point directly at a service account JSON
/// file. Checked before any well-known location.
pub const CREDENTIALS_ENV_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Relative paths that operators commonly drop the downloaded key at.
const WELL_KNOWN_FILES: &[&str] = &["firestore_credentials.json", "serviceAccountKey.json"];

/// Printed by the binaries when no credential can be resolved.
pub const REMEDIATION: &str = "\
To run this tool you need a Firebase service account credential:

  Option 1 - Download a service account key:
    1. Open the Firebase console: Project Settings -> Service accounts
    2. Click 'Generate New Private Key'
    3. Save the file as 'serviceAccountKey.json' in the working directory

  Option 2 - Point the environment at an existing key:
    export GOOGLE_APPLICATION_CREDENTIALS=/path/to/serviceAccountKey.json
";

/// Service account information contained within the service account JSON file
/// that you can download from Firebase.
///
/// `Serialize`, `Display`, and `Debug` are intentionally not implemented to
/// avoid accidentally leaking credentials.
#[derive(Deserialize, Clone)]
pub struct ServiceAccount {
    pub project_id: String,
    pub private_key: String,
    pub private_key_id: String,
    pub client_email: String,
    pub client_id: String,
}

impl ServiceAccount {
    /// Creates a new `ServiceAccount` instance from a service account JSON
    /// file. You can download such a file from Firebase.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FirebaseError> {
        let file_reader = File::open(path).context("Failed to read service account JSON file")?;
        let service_account = serde_json::from_reader(file_reader)
            .context("Could not extract service account details from file")?;

        Ok(service_account)
    }
}

/// Where a credential file was found during [`locate_credentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// The path named by `GOOGLE_APPLICATION_CREDENTIALS`.
    Environment(PathBuf),
    /// One of the well-known file locations.
    WellKnownFile(PathBuf),
    /// The gcloud application-default credentials file.
    ApplicationDefault(PathBuf),
}

impl CredentialSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Environment(p) | Self::WellKnownFile(p) | Self::ApplicationDefault(p) => p,
        }
    }
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment(p) => write!(f, "{} (via ${})", p.display(), CREDENTIALS_ENV_VAR),
            Self::WellKnownFile(p) => write!(f, "{}", p.display()),
            Self::ApplicationDefault(p) => {
                write!(f, "{} (application default credentials)", p.display())
            }
        }
    }
}

/// No usable credential file exists at any of the attempted locations.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no service account credential found; looked at: {}", format_attempted(.attempted))]
pub struct CredentialError {
    pub attempted: Vec<PathBuf>,
}

fn format_attempted(attempted: &[PathBuf]) -> String {
    if attempted.is_empty() {
        return "(no candidate locations)".to_string();
    }

    attempted
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The ordered list of locations a credential may live at, given the current
/// environment. The first existing entry wins.
fn candidate_sources(
    env_path: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Vec<CredentialSource> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path {
        candidates.push(CredentialSource::Environment(path));
    }

    for file in WELL_KNOWN_FILES {
        candidates.push(CredentialSource::WellKnownFile(PathBuf::from(file)));
    }

    if let Some(home) = home {
        candidates.push(CredentialSource::WellKnownFile(
            home.join("Downloads").join("serviceAccountKey.json"),
        ));
        candidates.push(CredentialSource::ApplicationDefault(
            home.join(".config/gcloud/application_default_credentials.json"),
        ));
    }

    candidates
}

/// Resolves the location of a service account credential file, in priority
/// order: the `GOOGLE_APPLICATION_CREDENTIALS` environment variable, the
/// well-known file locations, and finally the ambient gcloud
/// application-default credentials.
pub fn locate_credentials() -> Result<CredentialSource, CredentialError> {
    let env_path = env::var_os(CREDENTIALS_ENV_VAR).map(PathBuf::from);
    let home = env::var_os("HOME").map(PathBuf::from);

    let mut attempted = Vec::new();
    for candidate in candidate_sources(env_path, home) {
        if candidate.path().is_file() {
            return Ok(candidate);
        }
        attempted.push(candidate.path().to_path_buf());
    }

    Err(CredentialError { attempted })
}

/// Locates and parses the service account in one step. The returned source is
/// reported to the operator so a surprising credential is easy to spot.
pub fn resolve_service_account() -> Result<(ServiceAccount, CredentialSource), FirebaseError> {
    let source = locate_credentials()?;
    let account = ServiceAccount::from_file(source.path())?;
    Ok((account, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_path_is_checked_first() {
        let candidates = candidate_sources(
            Some(PathBuf::from("/etc/keys/sa.json")),
            Some(PathBuf::from("/home/op")),
        );

        assert_eq!(
            candidates.first(),
            Some(&CredentialSource::Environment(PathBuf::from(
                "/etc/keys/sa.json"
            )))
        );
        assert_eq!(
            candidates.last(),
            Some(&CredentialSource::ApplicationDefault(PathBuf::from(
                "/home/op/.config/gcloud/application_default_credentials.json"
            )))
        );
    }

    #[test]
    fn well_known_files_are_searched_in_order() {
        let candidates = candidate_sources(None, None);

        let paths: Vec<_> = candidates.iter().map(|c| c.path().to_path_buf()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("firestore_credentials.json"),
                PathBuf::from("serviceAccountKey.json"),
            ]
        );
    }

    #[test]
    fn error_lists_every_attempted_location() {
        let err = CredentialError {
            attempted: vec![PathBuf::from("a.json"), PathBuf::from("b.json")],
        };

        let message = err.to_string();
        assert!(message.contains("a.json"), "{message}");
        assert!(message.contains("b.json"), "{message}");
    }
}
