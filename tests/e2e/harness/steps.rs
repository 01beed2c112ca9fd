use std::time::Duration;

use super::assertions::Assertion;

/// All possible actions in a test scenario.
///
/// Commits and comments are referred to by scenario labels; the runner keeps
/// the label pointing at the comment's current id across amends and deletes.
#[derive(Debug)]
pub enum ScenarioStep {
    // Working tree
    WriteFile {
        path: String,
        content: Vec<u8>,
    },
    RemoveFile {
        path: String,
    },
    Commit {
        label: String,
    },

    // Comment actions
    AddComment {
        label: String,
        commit: Option<String>,
        file_ref: Option<String>,
        message: String,
    },
    AddCommentAs {
        label: String,
        author: String,
        message: String,
    },
    AmendComment {
        label: String,
        message: String,
    },
    DeleteComment {
        label: String,
    },

    // Repository maintenance
    IndexComments,
    VersionCheck {
        version: String,
    },
    VersionUpdate {
        version: String,
    },

    // Time control
    Wait {
        duration: Duration,
    },

    // Assertions (can be interspersed)
    Assert {
        assertion: Assertion,
    },
}
