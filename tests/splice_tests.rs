//! Integration tests for line-range splicing.
//!
//! These tests drive the full pipeline:
//! load target + replacement → validate boundary → splice → atomic write

use linesplice::splice::{apply_splice, splice_lines, SpliceRequest};
use linesplice::{LineSequence, SpliceBoundary, SpliceError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    fn five_lines() -> LineSequence {
        LineSequence::from_lines(["A\n", "B\n", "C\n", "D\n", "E\n"])
    }

    fn setup(dir: &Path, target: &str, replacement: &str) -> (PathBuf, PathBuf) {
        let target_path = dir.join("Presentation.jsx");
        let replacement_path = dir.join("clean_slides.txt");
        fs::write(&target_path, target).expect("Failed to write target");
        fs::write(&replacement_path, replacement).expect("Failed to write replacement");
        (target_path, replacement_path)
    }

    /// Every valid boundary yields head ++ replacement ++ tail.
    #[test]
    fn test_result_is_head_replacement_tail_for_all_boundaries() {
        let target = five_lines();
        let replacement = LineSequence::from_lines(["X\n", "Y\n"]);
        let original = target.lines();
        let n = original.len();

        for start in 0..=n {
            for end in start..=n {
                let result = splice_lines(&target, &replacement, SpliceBoundary::new(start, end))
                    .expect("Valid boundary should splice");

                let mut expected: Vec<String> = original[..start].to_vec();
                expected.extend(replacement.lines());
                expected.extend_from_slice(&original[end..]);

                assert_eq!(result.lines(), expected, "boundary [{}, {})", start, end);
                assert_eq!(result.len(), start + replacement.len() + (n - end));
            }
        }
    }

    #[test]
    fn test_concrete_middle_replacement() {
        let result = splice_lines(
            &five_lines(),
            &LineSequence::from_lines(["X\n", "Y\n"]),
            SpliceBoundary::new(1, 4),
        )
        .expect("Splice should succeed");

        assert_eq!(result.lines(), vec!["A\n", "X\n", "Y\n", "E\n"]);
    }

    #[test]
    fn test_empty_replacement_at_empty_range_is_noop() {
        let target = five_lines();
        let result = splice_lines(&target, &LineSequence::from_text(""), SpliceBoundary::new(2, 2))
            .expect("Splice should succeed");

        assert_eq!(result, target);
    }

    #[test]
    fn test_equal_boundaries_insert_without_deleting() {
        let result = splice_lines(
            &five_lines(),
            &LineSequence::from_text("NEW\n"),
            SpliceBoundary::new(3, 3),
        )
        .expect("Splice should succeed");

        assert_eq!(
            result.lines(),
            vec!["A\n", "B\n", "C\n", "NEW\n", "D\n", "E\n"]
        );
    }

    #[test]
    fn test_full_range_equals_replacement() {
        let replacement = LineSequence::from_text("only\ncontent");
        let result = splice_lines(&five_lines(), &replacement, SpliceBoundary::new(0, 5))
            .expect("Splice should succeed");

        assert_eq!(result.to_text(), "only\ncontent");
    }

    #[test]
    fn test_end_past_line_count_is_detected() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let (target, replacement) = setup(workspace.path(), "A\nB\nC\nD\nE\n", "X\n");

        let request = SpliceRequest::new(target.clone(), replacement, SpliceBoundary::new(2, 6));
        match apply_splice(&request) {
            Err(SpliceError::InvalidBoundary {
                file, line_count, ..
            }) => {
                assert_eq!(file, target);
                assert_eq!(line_count, 5);
            }
            other => panic!("Expected InvalidBoundary, got: {:?}", other),
        }

        assert_eq!(
            fs::read_to_string(&target).expect("read"),
            "A\nB\nC\nD\nE\n",
            "Rejected splice must not touch the target"
        );
    }

    /// Running the same splice twice does not reproduce the first result.
    #[test]
    fn test_second_run_is_not_idempotent() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let (target, replacement) = setup(workspace.path(), "A\nB\nC\nD\nE\n", "X\nY\n");
        let request = SpliceRequest::new(target.clone(), replacement, SpliceBoundary::new(1, 4));

        apply_splice(&request).expect("First run should succeed");
        let first = fs::read_to_string(&target).expect("read");
        assert_eq!(first, "A\nX\nY\nE\n");

        // [1, 4) still fits the 4-line result, so the second run succeeds
        // but cuts the wrong lines.
        apply_splice(&request).expect("Second run should succeed");
        let second = fs::read_to_string(&target).expect("read");
        assert_eq!(second, "A\nX\nY\n");
        assert_ne!(first, second);
    }

    #[test]
    fn test_terminators_are_preserved_verbatim() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let (target, replacement) =
            setup(workspace.path(), "one\r\ntwo\r\nthree\r\nfour", "2a\r\n2b\n");

        let request = SpliceRequest::new(target.clone(), replacement, SpliceBoundary::new(1, 3));
        apply_splice(&request).expect("Splice should succeed");

        assert_eq!(
            fs::read(&target).expect("read"),
            b"one\r\n2a\r\n2b\nfour".to_vec()
        );
    }

    #[test]
    fn test_replacement_without_trailing_newline_joins_tail() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let (target, replacement) = setup(workspace.path(), "A\nB\nC\n", "X");

        let request = SpliceRequest::new(target.clone(), replacement, SpliceBoundary::new(1, 2));
        apply_splice(&request).expect("Splice should succeed");

        // Plain concatenation: no newline is invented between X and C.
        assert_eq!(fs::read_to_string(&target).expect("read"), "A\nXC\n");
    }

    #[test]
    fn test_non_utf8_target_is_encoding_error() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let target = workspace.path().join("bin.dat");
        let replacement = workspace.path().join("r.txt");
        fs::write(&target, [0xc3u8, 0x28, 0x0a]).expect("write");
        fs::write(&replacement, "X\n").expect("write");

        let request = SpliceRequest::new(target.clone(), replacement, SpliceBoundary::new(0, 1));
        match apply_splice(&request) {
            Err(SpliceError::Encoding { file, .. }) => assert_eq!(file, target),
            other => panic!("Expected Encoding error, got: {:?}", other),
        }
    }

    #[test]
    fn test_missing_target_is_io_error() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let target = workspace.path().join("nope.jsx");
        let replacement = workspace.path().join("r.txt");
        fs::write(&replacement, "X\n").expect("write");

        let request = SpliceRequest::new(target.clone(), replacement, SpliceBoundary::new(0, 0));
        match apply_splice(&request) {
            Err(SpliceError::Io { path, .. }) => assert_eq!(path, target),
            other => panic!("Expected Io error, got: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_survive_atomic_write() {
        use std::os::unix::fs::PermissionsExt;

        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let (target, replacement) = setup(workspace.path(), "A\nB\n", "X\n");
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).expect("chmod");

        let request = SpliceRequest::new(target.clone(), replacement, SpliceBoundary::new(0, 1));
        apply_splice(&request).expect("Splice should succeed");

        let mode = fs::metadata(&target).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_target_is_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let (target, replacement) = setup(workspace.path(), "A\nB\nC\n", "X\n");
        fs::set_permissions(&target, fs::Permissions::from_mode(0o444)).expect("chmod");

        // Privileged users can write through 0444; nothing to check then.
        if fs::OpenOptions::new().write(true).open(&target).is_ok() {
            return;
        }

        let request = SpliceRequest::new(target.clone(), replacement, SpliceBoundary::new(1, 2));
        match apply_splice(&request) {
            Err(SpliceError::Io { path, .. }) => assert_eq!(path, target),
            other => panic!("Expected Io error, got: {:?}", other),
        }

        assert_eq!(fs::read_to_string(&target).expect("read"), "A\nB\nC\n");
        let mode = fs::metadata(&target).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o444);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_target_patches_link_destination() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let (real, replacement) = setup(workspace.path(), "A\nB\nC\n", "X\n");
        let link = workspace.path().join("link.jsx");
        std::os::unix::fs::symlink(&real, &link).expect("Failed to create symlink");

        let request = SpliceRequest::new(link.clone(), replacement, SpliceBoundary::new(1, 2));
        apply_splice(&request).expect("Splice should succeed");

        let link_meta = fs::symlink_metadata(&link).expect("symlink metadata");
        assert!(link_meta.file_type().is_symlink(), "Link must stay a symlink");
        assert_eq!(fs::read_to_string(&real).expect("read"), "A\nX\nC\n");
        assert_eq!(fs::read_to_string(&link).expect("read"), "A\nX\nC\n");
    }
}
