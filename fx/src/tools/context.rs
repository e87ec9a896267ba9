//! ToolContext - execution context for tools

use std::path::{Path, PathBuf};
use tracing::debug;

use super::ToolError;

/// Execution context for tools - scoped to one session
///
/// All file operations are confined to the session's sandbox directory
/// unless sandboxing is explicitly disabled (tests only).
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Sandbox directory - file ops are constrained here
    pub sandbox: PathBuf,

    /// Session id (for logging and coordination)
    pub session_id: String,

    /// Whether sandbox enforcement is enabled (default: true)
    pub sandbox_enabled: bool,
}

impl ToolContext {
    /// Create a new tool context
    pub fn new(sandbox: PathBuf, session_id: String) -> Self {
        debug!(?sandbox, %session_id, "ToolContext::new");
        Self {
            sandbox,
            session_id,
            sandbox_enabled: true,
        }
    }

    /// Create a context with sandbox enforcement disabled (for testing)
    pub fn new_unsandboxed(sandbox: PathBuf, session_id: String) -> Self {
        Self {
            sandbox,
            session_id,
            sandbox_enabled: false,
        }
    }

    /// Normalize a path relative to the sandbox
    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.sandbox.join(path)
        }
    }

    /// Validate that a path stays inside the sandbox
    ///
    /// Existing paths are canonicalized to resolve symlinks; paths that
    /// do not exist yet are checked through their nearest existing parent.
    pub fn validate_path(&self, path: &Path) -> Result<PathBuf, ToolError> {
        let normalized = self.normalize_path(path);

        if !self.sandbox_enabled {
            return Ok(normalized);
        }

        let canonical = if normalized.exists() {
            normalized.canonicalize().unwrap_or_else(|_| normalized.clone())
        } else if let Some(parent) = normalized.parent() {
            if parent.exists() {
                let canonical_parent = parent.canonicalize().unwrap_or_else(|_| parent.to_path_buf());
                canonical_parent.join(normalized.file_name().unwrap_or_default())
            } else {
                normalized.clone()
            }
        } else {
            normalized.clone()
        };

        let sandbox_canonical = self.sandbox.canonicalize().unwrap_or_else(|_| self.sandbox.clone());

        if canonical.starts_with(&sandbox_canonical) {
            Ok(canonical)
        } else {
            debug!(?path, "ToolContext::validate_path: sandbox violation");
            Err(ToolError::SandboxViolation {
                path: path.to_path_buf(),
                sandbox: self.sandbox.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_path_within_sandbox() {
        let temp = tempdir().unwrap();
        let sandbox = temp.path().to_path_buf();

        let file_path = sandbox.join("notes.txt");
        fs::write(&file_path, "content").unwrap();

        let ctx = ToolContext::new(sandbox, "s-1".to_string());

        assert!(ctx.validate_path(Path::new("notes.txt")).is_ok());
    }

    #[test]
    fn test_validate_path_outside_sandbox() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "s-1".to_string());

        let result = ctx.validate_path(Path::new("/etc/passwd"));
        assert!(matches!(result, Err(ToolError::SandboxViolation { .. })));
    }

    #[test]
    fn test_validate_path_new_file_allowed() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "s-1".to_string());

        assert!(ctx.validate_path(Path::new("fresh.txt")).is_ok());
    }

    #[test]
    fn test_validate_path_parent_traversal_rejected() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "s-1".to_string());

        let result = ctx.validate_path(Path::new("../outside.txt"));
        assert!(matches!(result, Err(ToolError::SandboxViolation { .. })));
    }

    #[test]
    fn test_unsandboxed_allows_anything() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new_unsandboxed(temp.path().to_path_buf(), "s-1".to_string());

        assert!(ctx.validate_path(Path::new("/etc/passwd")).is_ok());
    }
}
