use test_driver::{echo_binary, fnv1a_binary, run, stderr, stdout};

// -- echo --

#[test]
fn echo_plain_arguments() {
    let out = run(&echo_binary(), &["a", "b", "c"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "a b c\n");
}

#[test]
fn echo_without_arguments_prints_nothing() {
    let out = run(&echo_binary(), &[]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "");
}

#[test]
fn echo_no_linefeed() {
    let out = run(&echo_binary(), &["-n", "a", "b"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "a b");
}

#[test]
fn echo_prefix_applies_to_every_argument() {
    let out = run(&echo_binary(), &["-p", "X:", "a", "b"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "X:a X:b\n");
}

#[test]
fn echo_prefix_attached_forms() {
    for form in ["-pX:", "-p=X:", "--prefix=X:"] {
        let out = run(&echo_binary(), &[form, "a"]);
        assert_eq!(stdout(&out), "X:a\n", "form {form}");
    }
}

#[test]
fn echo_combined_group_with_value() {
    // -n is a flag, so -np takes the next token as the prefix
    let out = run(&echo_binary(), &["-np", "X:", "a"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "X:a");
}

#[test]
fn echo_double_dash_stops_option_parsing() {
    let out = run(&echo_binary(), &["--", "-n", "a"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "-n a\n");
}

#[test]
fn echo_unrecognized_option_fails() {
    let out = run(&echo_binary(), &["--bogus"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unrecognized option: '--bogus'"));
    assert_eq!(stdout(&out), "");
}

#[test]
fn echo_missing_value_fails() {
    let out = run(&echo_binary(), &["--prefix"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("option requires an argument -- prefix"));
}

#[test]
fn echo_help_exits_successfully() {
    let out = run(&echo_binary(), &["--help", "a"]);
    assert!(out.status.success());
    let text = stderr(&out);
    assert!(text.contains("Usage:"));
    assert!(text.contains("--prefix=STRING"));
    // help exits before any echoing happens
    assert_eq!(stdout(&out), "");
}

// -- fnv1a --

#[test]
fn fnv1a_hashes_arguments() {
    let out = run(&fnv1a_binary(), &["hello", "world"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "437d114f    hello\n276bbbd7    world\n");
}

#[test]
fn fnv1a_ignore_case() {
    let out = run(&fnv1a_binary(), &["-i", "HELLO"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "437d114f    HELLO\n");
}

#[test]
fn fnv1a_caseful_clears_ignore_case() {
    let out = run(&fnv1a_binary(), &["-i", "--caseful", "HELLO"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "f741f16f    HELLO\n");
}

#[test]
fn fnv1a_version_continues() {
    let out = run(&fnv1a_binary(), &["--version", "abc"]);
    assert!(out.status.success());
    assert!(stderr(&out).contains("fnv1a 1.0.0"));
    assert_eq!(stdout(&out), "c9ea9d13    abc\n");
}

#[test]
fn fnv1a_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hashes.txt");
    let path = path.to_str().unwrap();
    let out = run(&fnv1a_binary(), &["-o", path, "abc"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "");
    assert_eq!(std::fs::read_to_string(path).unwrap(), "c9ea9d13    abc\n");
}

#[test]
fn fnv1a_help_shows_usage_suffix() {
    let out = run(&fnv1a_binary(), &["--help"]);
    assert!(out.status.success());
    let text = stderr(&out);
    assert!(text.contains("[options] string..."));
    assert!(text.contains("--output=FILE"));
}
