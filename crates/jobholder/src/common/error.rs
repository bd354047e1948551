use thiserror::Error;

use crate::holder::JobAction;

#[derive(Debug, Error)]
pub enum HolderError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Malformed duration `{value}`: {reason}")]
    MalformedDuration { value: String, reason: String },
    #[error("Malformed resource value `{0}`: no numeric value found")]
    MalformedResource(String),
    #[error("Malformed job record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("Query failed: {0}")]
    QueryFailure(String),
    #[error("Cannot {action} job {job_id}: {reason}")]
    ControlActionFailure {
        action: JobAction,
        job_id: String,
        reason: String,
    },
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),
}

impl HolderError {
    /// Parse errors make the current cycle fail without any action being taken.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedDuration { .. } | Self::MalformedResource(_) | Self::MalformedRecord { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::common::error::HolderError;
    use crate::holder::JobAction;

    #[test]
    fn only_malformed_input_is_a_parse_error() {
        let parse_errors = [
            HolderError::MalformedDuration {
                value: "UNLIMITED".to_string(),
                reason: "integer".to_string(),
            },
            HolderError::MalformedResource("N/A".to_string()),
            HolderError::MalformedRecord {
                line: 3,
                reason: "expected 12 columns, found 2".to_string(),
            },
        ];
        assert!(parse_errors.iter().all(|error| error.is_parse_error()));

        let other_errors = [
            HolderError::QueryFailure("squeue failed".to_string()),
            HolderError::ControlActionFailure {
                action: JobAction::Hold,
                job_id: "42".to_string(),
                reason: "exit code 1".to_string(),
            },
            HolderError::ConfigurationError("interval must be positive".to_string()),
            HolderError::IoError(std::io::Error::other("broken pipe")),
        ];
        assert!(other_errors.iter().all(|error| !error.is_parse_error()));
    }

    #[test]
    fn control_action_failure_message() {
        let error = HolderError::ControlActionFailure {
            action: JobAction::Release,
            job_id: "4641915".to_string(),
            reason: "exit code 1".to_string(),
        };
        insta::assert_snapshot!(error.to_string(), @"Cannot release job 4641915: exit code 1");
    }
}
