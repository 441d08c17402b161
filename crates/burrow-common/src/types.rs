//! Domain primitive types used across the Burrow workspace.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{BurrowError, Result};

/// Unique identifier for one invocation, used as hostname and scratch directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(String);

impl InstanceId {
    /// Wraps an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh 8-character alphanumeric identifier from the OS RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the randomness source fails.
    pub fn generate() -> Result<Self> {
        crate::random::alphanumeric(crate::constants::INSTANCE_ID_LENGTH).map(Self)
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A command name plus its arguments. Standard streams are always inherited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Program to execute, resolved through `PATH` when not absolute.
    pub program: String,
    /// Arguments passed after the program name.
    pub args: Vec<String>,
}

impl ProcessSpec {
    /// Builds a spec from a full command line (`program` followed by arguments).
    ///
    /// # Errors
    ///
    /// Returns [`BurrowError::InvalidArgument`] if the command line is empty.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| BurrowError::InvalidArgument {
            message: "no command given".into(),
        })?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Returns the full command line, program first.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// State handed from the launcher to the confined entry point across the re-exec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceContext {
    /// Identifier chosen by the launcher.
    pub id: InstanceId,
    /// Provisioned root filesystem to confine into.
    pub rootfs: PathBuf,
}

impl InstanceContext {
    /// Serializes the context for the re-exec environment.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a context previously produced by [`InstanceContext::encode`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid encoded context.
    pub fn decode(value: &str) -> Result<Self> {
        Ok(serde_json::from_str(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_fixed_length() {
        let id = InstanceId::generate().expect("generate failed");
        assert_eq!(id.as_str().len(), crate::constants::INSTANCE_ID_LENGTH);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn process_spec_from_argv_splits_program() {
        let argv = vec!["/bin/echo".to_string(), "-n".into(), "hi".into()];
        let spec = ProcessSpec::from_argv(&argv).expect("valid argv");
        assert_eq!(spec.program, "/bin/echo");
        assert_eq!(spec.args, vec!["-n", "hi"]);
        assert_eq!(spec.argv(), argv);
        assert_eq!(spec.to_string(), "/bin/echo -n hi");
    }

    #[test]
    fn process_spec_from_empty_argv_fails() {
        let err = ProcessSpec::from_argv(&[]).expect_err("empty argv must fail");
        assert!(matches!(err, BurrowError::InvalidArgument { .. }));
    }

    #[test]
    fn context_survives_encoding() {
        let ctx = InstanceContext {
            id: InstanceId::new("Zx81qQ0a"),
            rootfs: PathBuf::from("/tmp/Zx81qQ0a/rootfs"),
        };
        let decoded = InstanceContext::decode(&ctx.encode().expect("encode")).expect("decode");
        assert_eq!(decoded, ctx);
    }

    #[test]
    fn garbage_context_is_rejected() {
        let err = InstanceContext::decode("not json").expect_err("must fail");
        assert!(matches!(err, BurrowError::Serialization { .. }));
    }
}
