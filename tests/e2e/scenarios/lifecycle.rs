use crate::harness::{Assertion, Scenario};
use anyhow::{bail, ensure};
use comment_core::CommentError;

#[test]
fn test_create_amend_delete() {
    Scenario::new("create_amend_delete")
        .writes("src/lib.rs", b"pub fn answer() -> u32 {\n    42\n}\n")
        .commits("answer")
        .comments_on("review", "src/lib.rs:2", "Magic number")
        .assert_comment_count("answer", 1)
        .assert_content("review", "Magic number")
        .wait_minutes(5)
        .amends("review", "Magic number, name it")
        .assert_content("review", "Magic number, name it")
        .assert_comment_count("answer", 1)
        .deletes("review")
        .assert_tombstone("review")
        // The tombstone keeps the ref slot
        .assert_comment_count("answer", 1)
        .run()
        .unwrap();
}

#[test]
fn test_amend_keeps_author_and_creation_time() {
    Scenario::new("amend_keeps_author")
        .writes("a.txt", b"a\n")
        .commits("first")
        .comments_as("note", "Ada Lovelace <ada@example.com>", "Needs a test")
        .wait_minutes(30)
        .amends("note", "Needs two tests")
        .assert(Assertion::CommentAuthor {
            label: "note".to_string(),
            name: "Ada Lovelace".to_string(),
        })
        .assert(Assertion::CommentAmendedBy {
            label: "note".to_string(),
            name: "Test User".to_string(),
        })
        .assert_with(|repo| {
            let comments = repo.comments_on_commitish("HEAD")?;
            ensure!(comments.len() == 1, "expected one comment, got {}", comments.len());
            let comment = &comments[0];
            let elapsed = comment.amend_time - comment.create_time;
            ensure!(elapsed.num_minutes() == 30, "amended {} after creation", elapsed);
            Ok(())
        })
        .run()
        .unwrap();
}

#[test]
fn test_abbreviated_ids_resolve() {
    Scenario::new("abbreviated_ids")
        .writes("a.txt", b"a\n")
        .commits("first")
        .comments("note", "Short ids work")
        .assert_with(|repo| {
            let comments = repo.comments_on_commitish("HEAD")?;
            let id = comments[0].id.clone().unwrap_or_default();
            let found = repo.comment_by_id(&id[..7])?;
            ensure!(found.id.as_deref() == Some(id.as_str()), "resolved to {:?}", found.id);
            Ok(())
        })
        .run()
        .unwrap();
}

#[test]
fn test_comments_stay_on_their_commit() {
    Scenario::new("comments_per_commit")
        .writes("a.txt", b"a\n")
        .commits("first")
        .comments("one", "On the first commit")
        .writes("b.txt", b"b\n")
        .commits("second")
        .comments("two", "On the second commit")
        .comments("three", "Also on the second commit")
        .assert_comment_count("first", 1)
        .assert_comment_count("second", 2)
        .run()
        .unwrap();
}

#[test]
fn test_invalid_input_is_rejected() {
    Scenario::new("invalid_input")
        .writes("a.txt", b"a\n")
        .commits("first")
        .assert_with(|repo| {
            match repo.create_comment("no-such-commit", None, "text", None) {
                Err(CommentError::CommitNotFound(_)) => {}
                other => bail!("expected CommitNotFound, got {:?}", other.map(|_| ())),
            }
            match repo.create_comment("", None, "", None) {
                Err(CommentError::EmptyMessage) => {}
                other => bail!("expected EmptyMessage, got {:?}", other.map(|_| ())),
            }
            match repo.create_comment("", Some("no email here"), "text", None) {
                Err(CommentError::InvalidPerson(_)) => {}
                other => bail!("expected InvalidPerson, got {:?}", other.map(|_| ())),
            }
            match repo.update_comment("0123456789abcdef", None, "text") {
                Err(CommentError::CommentNotFound(_)) => {}
                other => bail!("expected CommentNotFound, got {:?}", other.map(|_| ())),
            }
            Ok(())
        })
        .run()
        .unwrap();
}
