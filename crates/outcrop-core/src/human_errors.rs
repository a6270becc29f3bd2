// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command line.
//
// Every technical error is mapped to a short plain-English summary with a
// concrete next step for the operator.

use crate::error::OutcropError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip, throttling; running again may succeed.
    Transient,
    /// Operator must do something (log in, fix a path, set a project).
    ActionRequired,
    /// Cannot be fixed by retrying: bad input or unexpected service output.
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Whether running again unchanged may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    /// Multi-line text for the terminal: message, suggestion, and whether a
    /// plain re-run is worth trying.
    pub fn render(&self) -> String {
        let outlook = match (self.severity, self.retriable) {
            (Severity::Transient, _) | (_, true) => {
                "This looks temporary; running the same command again may succeed."
            }
            (Severity::ActionRequired, false) => "Re-running unchanged will fail the same way.",
            (Severity::Permanent, false) => {
                "This won't go away on its own; the input or service response needs a look."
            }
        };
        format!("{}\n{}\n{}", self.message, self.suggestion, outlook)
    }
}

/// Convert an `OutcropError` into a `HumanError`.
pub fn humanize_error(err: &OutcropError) -> HumanError {
    match err {
        OutcropError::Credential(detail) => {
            if detail.contains("No such file") || detail.contains("not found") {
                HumanError {
                    message: "The gcloud command-line tool is not installed.".into(),
                    suggestion: "Install the Google Cloud SDK, or pass --access-token-env with a variable holding a token.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "Couldn't get an access token for the fill service.".into(),
                    suggestion: "Run `gcloud auth login` and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            }
        }

        OutcropError::Transport(detail) => HumanError {
            message: "Couldn't reach the fill service.".into(),
            suggestion: format!("Check your network connection and try again. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        OutcropError::HttpStatus { status, .. } => humanize_status(*status),

        OutcropError::MissingOutput { .. } => HumanError {
            message: "The fill service answered without an image.".into(),
            suggestion: "The request may have been filtered by the service. The full response was logged; try a different input image.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        OutcropError::Image(_) => HumanError {
            message: "There's a problem with an image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        OutcropError::ImageRead { path, .. } => HumanError {
            message: format!("Couldn't read {}.", path.display()),
            suggestion: "Check that the file exists and is a JPEG or PNG image.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        OutcropError::ImageWrite { path, .. } => HumanError {
            message: format!("Couldn't write {}.", path.display()),
            suggestion: "Check that the output directory exists and is writable, and that the disk isn't full.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        OutcropError::OutputDir { path, .. } => HumanError {
            message: format!("Couldn't create the output directory {}.", path.display()),
            suggestion: "Choose an output directory you can write to, and check that no file sits in its place.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        OutcropError::InvalidConfig(detail) => HumanError {
            message: "The configuration isn't valid.".into(),
            suggestion: format!("Fix the setting and run again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        OutcropError::Cancelled { completed } => HumanError {
            message: format!("Stopped after {completed} round(s)."),
            suggestion: "Start a new run from the last written image to continue.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        OutcropError::Io(io_err) => HumanError {
            message: "A file operation failed.".into(),
            suggestion: format!("Check file permissions and free disk space. ({io_err})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        OutcropError::Serialization(_) => HumanError {
            message: "A settings or response file couldn't be parsed.".into(),
            suggestion: "Check that the configuration file is valid JSON.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

fn humanize_status(status: u16) -> HumanError {
    match status {
        401 | 403 => HumanError {
            message: "The fill service rejected our credentials.".into(),
            suggestion: "Run `gcloud auth login`, and make sure the project has the Vertex AI API enabled.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        404 => HumanError {
            message: "The fill model wasn't found.".into(),
            suggestion: "Check the project id, region and model name in the configuration.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        429 => HumanError {
            message: "The fill service is rate limiting us.".into(),
            suggestion: "Wait a minute and run again, or request a higher quota.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        500..=599 => HumanError {
            message: "The fill service had an internal problem.".into(),
            suggestion: "Try again in a few minutes.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        _ => HumanError {
            message: "The fill service refused the request.".into(),
            suggestion: format!("The request was rejected with HTTP {status}. Check the logged response for details."),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_tells_operator_whether_rerun_helps() {
        let transient = humanize_error(&OutcropError::Transport("reset".into())).render();
        assert!(transient.starts_with("Couldn't reach the fill service."));
        assert!(transient.contains("running the same command again may succeed"));

        let action = humanize_error(&OutcropError::OutputDir {
            path: "/blocked/rounds".into(),
            reason: "Not a directory".into(),
        })
        .render();
        assert!(action.contains("/blocked/rounds"));
        assert!(action.contains("Re-running unchanged will fail"));
    }

    #[test]
    fn missing_gcloud_is_action_required() {
        let err = OutcropError::Credential("gcloud: No such file or directory".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("gcloud"));
    }

    #[test]
    fn throttling_is_transient() {
        let err = OutcropError::HttpStatus {
            status: 429,
            body: String::new(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn missing_output_is_permanent() {
        let err = OutcropError::MissingOutput {
            payload: "{}".into(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
    }

    #[test]
    fn write_failure_names_path() {
        let err = OutcropError::ImageWrite {
            path: "/readonly/out-01.jpg".into(),
            reason: "permission denied".into(),
        };
        let human = humanize_error(&err);
        assert!(human.message.contains("/readonly/out-01.jpg"));
    }
}
