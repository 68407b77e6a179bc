// ABOUTME: Diagnostics accumulator for non-fatal warnings during deployment.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during deployment operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a warning for a script whose execute bit had to be restored.
    pub fn permission_repaired(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::PermissionRepaired,
            message: message.into(),
        }
    }

    /// Create a warning for a server process that survived a forced stop.
    pub fn lingering_process(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LingeringProcess,
            message: message.into(),
        }
    }

    /// Create a warning for deployed content that has not appeared yet.
    pub fn verification_pending(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::VerificationPending,
            message: message.into(),
        }
    }

    /// Create a lock release warning.
    pub fn lock_release(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LockRelease,
            message: message.into(),
        }
    }

    /// Create a warning for a non-fatal hook failure.
    pub fn hook(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Hook,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A server script was not executable and was fixed.
    PermissionRepaired,
    /// The old server process was still alive when deployment continued.
    LingeringProcess,
    /// The server is running but the new content was not observed yet.
    VerificationPending,
    /// Failed to release deploy lock (lock file may remain).
    LockRelease,
    /// A post-deploy or on-error hook failed.
    Hook,
}
