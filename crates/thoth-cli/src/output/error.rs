//! Structured error output on stderr.

use serde::Serialize;
use thoth_config::ConfigError;
use thoth_db::error::IndexError;
use thoth_manifest::ManifestError;
use thoth_touch::TouchError;
use thoth_vcs::VcsError;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

/// Stable machine-readable kind of the first typed error in the chain.
fn kind_of(error: &anyhow::Error) -> &'static str {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<IndexError>() {
            return match e {
                IndexError::UnknownResource(_) => "unknown_resource",
                IndexError::NotBuilt => "index_not_built",
                IndexError::BuildInProgress => "build_in_progress",
                IndexError::Pattern(_) => "invalid_pattern",
                _ => "index",
            };
        }
        if cause.downcast_ref::<ManifestError>().is_some() {
            return "manifest";
        }
        if let Some(e) = cause.downcast_ref::<VcsError>() {
            return match e {
                VcsError::NotRepository(_) => "not_a_repository",
                VcsError::Revision { .. } | VcsError::InvalidRevset(_) => "revision",
                _ => "vcs",
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return "config";
        }
        if cause.downcast_ref::<TouchError>().is_some() {
            return "pipeline";
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return "io";
        }
    }
    "internal"
}

#[must_use]
pub fn envelope(error: &anyhow::Error) -> ErrorEnvelope {
    let violations = error
        .chain()
        .find_map(|c| c.downcast_ref::<ManifestError>())
        .map(|e| e.violations().iter().map(ToString::to_string).collect())
        .unwrap_or_default();
    ErrorEnvelope {
        error: ErrorBody {
            kind: kind_of(error),
            message: format!("{error:#}"),
            violations,
        },
    }
}

/// Print `error` as a single-line JSON object on stderr.
pub fn report(error: &anyhow::Error) {
    let envelope = envelope(error);
    match serde_json::to_string(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("thoth error: {error:#}"),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn kind_follows_the_typed_cause() {
        let err = Err::<(), _>(IndexError::UnknownResource("ghost".into()))
            .context("show failed")
            .unwrap_err();
        let env = envelope(&err);
        assert_eq!(env.error.kind, "unknown_resource");
        assert!(env.error.message.contains("ghost"));
    }

    #[test]
    fn untyped_errors_are_internal() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(envelope(&err).error.kind, "internal");
    }

    #[test]
    fn manifest_violations_are_listed() {
        let err = thoth_manifest::ManifestModel::from_toml_str(
            "[[resources]]\nid = \"a\"\ndeps = [\"missing\"]\n",
        )
        .map_err(anyhow::Error::from)
        .unwrap_err();
        let env = envelope(&err);
        assert_eq!(env.error.kind, "manifest");
        assert!(!env.error.violations.is_empty());
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["error"]["kind"], "manifest");
    }
}
