use crate::harness::Scenario;
use anyhow::{bail, ensure};
use comment_core::{CommentError, VERSION_REF};

#[test]
fn test_first_check_stamps_repository() {
    Scenario::new("first_check")
        .checks_version("1.2.0")
        .assert_stored_version("1.2.0")
        .checks_version("1.2.0")
        .assert_stored_version("1.2.0")
        .run()
        .unwrap();
}

#[test]
fn test_mismatched_tools_are_rejected() {
    Scenario::new("mismatched_tools")
        .checks_version("1.2.0")
        .assert_version_rejected("1.3.0", "git-comment update")
        .assert_version_rejected("1.1.9", "is newer than the version installed")
        // A rejected check never rewrites the marker
        .assert_stored_version("1.2.0")
        .run()
        .unwrap();
}

#[test]
fn test_update_moves_marker() {
    Scenario::new("update_marker")
        .checks_version("1.2.0")
        .updates_version("1.3.0")
        .checks_version("1.3.0")
        .assert_stored_version("1.3.0")
        .run()
        .unwrap();
}

#[test]
fn test_corrupted_versions_name_both_sides() {
    Scenario::new("corrupted_versions")
        .checks_version("1.2.0")
        .assert_version_rejected("1..2", "tool: 1..2")
        .assert_version_rejected("1..2", "repo: 1.2.0")
        .assert_with(|repo| {
            let blob = repo.git().blob(b"2.0")?;
            repo.git().reference(VERSION_REF, blob, true, "corrupt marker")?;
            match repo.version_check("1.4.5") {
                Err(e @ CommentError::VersionCorrupted { .. }) => {
                    let text = e.to_string();
                    ensure!(text.contains("1.4.5") && text.contains("2.0"), "{}", text);
                    Ok(())
                }
                other => bail!("expected VersionCorrupted, got {:?}", other),
            }
        })
        .run()
        .unwrap();
}

#[test]
fn test_version_marker_is_not_a_comment() {
    Scenario::new("marker_not_comment")
        .checks_version("1.2.0")
        .writes("a.txt", b"a\n")
        .commits("first")
        .comments("note", "Only comment")
        .assert_with(|repo| {
            let all = repo.all_comments()?;
            ensure!(all.len() == 1, "expected one comment, found {}", all.len());
            Ok(())
        })
        .run()
        .unwrap();
}
