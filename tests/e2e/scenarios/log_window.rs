use crate::harness::Scenario;

fn rows(count: usize, edited: usize) -> Vec<u8> {
    (1..=count)
        .map(|n| {
            if n == edited {
                format!("row {:02} edited\n", n)
            } else {
                format!("row {:02}\n", n)
            }
        })
        .collect::<String>()
        .into_bytes()
}

fn edited_file() -> Scenario {
    Scenario::new("log_window")
        .writes("notes.txt", &rows(30, 0))
        .commits("base")
        .writes("notes.txt", &rows(30, 15))
        .commits("edit")
        .comments_on("review", "notes.txt:15", "Why was this edited")
}

#[test]
fn test_three_lines_each_side() {
    // The removed row fills one slot of the before-window.
    edited_file()
        .assert_log_contains("edit", (3, 3), "\nnotes.txt\n")
        .assert_log_contains("edit", (3, 3), "row 13\n")
        .assert_log_contains("edit", (3, 3), "row 14\n")
        .assert_log_contains("edit", (3, 3), "-  row 15\n")
        .assert_log_contains("edit", (3, 3), "+  row 15 edited\n")
        .assert_log_contains("edit", (3, 3), "Why was this edited")
        .assert_log_contains("edit", (3, 3), "row 18\n")
        .assert_log_omits("edit", (3, 3), "row 12\n")
        .assert_log_omits("edit", (3, 3), "row 19\n")
        .run()
        .unwrap();
}

#[test]
fn test_narrow_window() {
    edited_file()
        .assert_log_contains("edit", (1, 1), "row 16\n")
        .assert_log_omits("edit", (1, 1), "row 14\n")
        .assert_log_omits("edit", (1, 1), "row 17\n")
        .run()
        .unwrap();
}

#[test]
fn test_comment_follows_its_line() {
    edited_file()
        .assert_with(|repo| {
            let diff = repo.diff_commits("HEAD", 3)?;
            let formatter = comment_core::Formatter::new(comment_core::FormatConfig {
                margin: false,
                ..Default::default()
            });
            let mut out = String::new();
            comment_core::DiffPrinter::new(&mut out, &formatter, 3, 3).print_diff(&diff)?;

            let line = out.find("row 15 edited").unwrap_or(usize::MAX);
            let comment = out.find("Why was this edited").unwrap_or(0);
            let after = out.find("row 16").unwrap_or(0);
            anyhow::ensure!(line < comment && comment < after, "out of order:\n{}", out);
            Ok(())
        })
        .run()
        .unwrap();
}

#[test]
fn test_uncommented_files_are_silent() {
    edited_file()
        .writes("quiet.txt", b"nothing to see\n")
        .commits("second_edit")
        .comments_on("loud", "notes.txt:3", "Not in this diff")
        .assert_log_omits("second_edit", (3, 3), "quiet.txt")
        .assert_log_contains("second_edit", (3, 3), "\ncomments:\n")
        .assert_log_contains("second_edit", (3, 3), "Not in this diff")
        .run()
        .unwrap();
}

#[test]
fn test_general_comments_render_after_the_diff() {
    edited_file()
        .comments("summary", "Overall fine")
        .assert_with(|repo| {
            let diff = repo.diff_commits("HEAD", 3)?;
            let formatter = comment_core::Formatter::new(comment_core::FormatConfig {
                margin: false,
                ..Default::default()
            });
            let mut out = String::new();
            comment_core::DiffPrinter::new(&mut out, &formatter, 3, 3).print_diff(&diff)?;

            let file = out.find("\nnotes.txt\n").unwrap_or(usize::MAX);
            let block = out.find("\ncomments:\n").unwrap_or(0);
            anyhow::ensure!(file < block, "general comments precede the diff:\n{}", out);
            anyhow::ensure!(out.trim_end().ends_with("Overall fine"), "unexpected tail:\n{}", out);
            Ok(())
        })
        .run()
        .unwrap();
}
