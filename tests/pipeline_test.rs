mod support;

use std::fs;

use email_sift::*;
use support::{FakeDns, append, read, scratch};

fn run(config: &Config, dns: &FakeDns) -> RunStats {
    let mut pipeline = Pipeline::new(config.clone(), dns);
    let stats = pipeline.run().unwrap();
    assert_eq!(pipeline.phase(), Phase::Done);
    stats
}

#[test]
fn test_single_line_scenario() {
    let (_dir, config) = scratch();
    let line = "contact us at john@example.com or spam@bad-nx-domain.invalid";
    fs::write(&config.input, format!("{line}\n")).unwrap();
    let dns = FakeDns::resolving(&["example.com"]);

    let stats = run(&config, &dns);

    assert_eq!(read(&config.output), "{\"Email\":\"john@example.com\"}\n");
    assert_eq!(read(&config.domains), "example.com\n");
    assert_eq!(read(&config.checkpoint), (line.len() + 1).to_string());
    assert_eq!(stats.lines, 1);
    assert_eq!(stats.candidates, 2);
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.domain_rejected, 1);
    assert_eq!(stats.start_offset, 0);
    assert_eq!(stats.end_offset, line.len() as u64 + 1);
}

#[test]
fn test_same_email_twice_in_line() {
    let (_dir, config) = scratch();
    fs::write(&config.input, "john@example.com and again john@example.com\n").unwrap();
    let dns = FakeDns::resolving(&["example.com"]);

    let stats = run(&config, &dns);

    assert_eq!(read(&config.output), "{\"Email\":\"john@example.com\"}\n");
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(dns.calls(), 1);
}

#[test]
fn test_cached_domain_needs_no_lookup() {
    let (_dir, config) = scratch();
    fs::write(&config.domains, "example.com\n").unwrap();
    fs::write(&config.input, "reach john@example.com\nor jane@example.com\n").unwrap();
    let dns = FakeDns::default();

    let stats = run(&config, &dns);

    assert_eq!(dns.calls(), 0);
    assert_eq!(stats.lookups, 0);
    assert_eq!(stats.accepted, 2);
    assert_eq!(read(&config.domains), "example.com\n");
}

#[test]
fn test_rerun_on_unchanged_input_is_noop() {
    let (_dir, config) = scratch();
    fs::write(
        &config.input,
        "john@example.com\nnothing here\njane@example.com bob@nx.invalid\n",
    )
    .unwrap();
    let dns = FakeDns::resolving(&["example.com"]);

    run(&config, &dns);
    let output = read(&config.output);
    let checkpoint = read(&config.checkpoint);

    let stats = run(&config, &dns);

    assert_eq!(stats.lines, 0);
    assert_eq!(stats.candidates, 0);
    assert_eq!(read(&config.output), output);
    assert_eq!(read(&config.checkpoint), checkpoint);
}

#[test]
fn test_resume_matches_uninterrupted_run() {
    let lines = [
        "alice@example.com wrote to bob@example.org",
        "no addresses",
        "alice@example.com again, plus carol@nx.invalid",
        "dave@example.org\r",
        "erin@example.com",
    ];
    let input = lines.iter().map(|l| format!("{l}\n")).collect::<String>();
    let resolvable = ["example.com", "example.org"];

    let (_whole_dir, whole) = scratch();
    fs::write(&whole.input, &input).unwrap();
    run(&whole, &FakeDns::resolving(&resolvable));

    for prefix in 0..=lines.len() {
        let (_dir, config) = scratch();
        fs::write(&config.input, &input).unwrap();
        let dns = FakeDns::resolving(&resolvable);

        let first = run(
            &Config {
                max_lines: Some(prefix),
                ..config.clone()
            },
            &dns,
        );
        assert_eq!(first.lines, prefix);

        let second = run(&config, &dns);
        assert_eq!(second.lines, lines.len() - prefix);
        assert_eq!(second.start_offset, first.end_offset);

        assert_eq!(read(&config.output), read(&whole.output), "prefix {prefix}");
        assert_eq!(read(&config.checkpoint), input.len().to_string());
    }
}

#[test]
fn test_each_email_written_once_across_lines_and_runs() {
    let (_dir, config) = scratch();
    let dns = FakeDns::resolving(&["example.com"]);

    fs::write(&config.input, "john@example.com\njohn@example.com\n").unwrap();
    run(&config, &dns);
    append(&config.input, "still john@example.com and jane@example.com\n");
    let stats = run(&config, &dns);

    assert_eq!(stats.duplicates, 1);
    assert_eq!(
        read(&config.output),
        "{\"Email\":\"john@example.com\"}\n{\"Email\":\"jane@example.com\"}\n"
    );
}

#[test]
fn test_domain_log_only_grows() {
    let (_dir, config) = scratch();
    let dns = FakeDns::resolving(&["one.com", "two.com"]);

    fs::write(&config.input, "a@one.com\n").unwrap();
    run(&config, &dns);
    let before = read(&config.domains);

    append(&config.input, "b@two.com c@one.com\n");
    run(&config, &dns);
    let after = read(&config.domains);

    assert!(after.starts_with(&before));
    assert_eq!(after, "one.com\ntwo.com\n");
}

#[test]
fn test_timed_out_domain_is_retried() {
    let (_dir, config) = scratch();
    let dns = FakeDns::resolving(&[]).timing_out(&["slow.example"]);
    fs::write(&config.input, "a@slow.example\nb@slow.example\n").unwrap();

    let stats = run(&config, &dns);

    assert_eq!(dns.calls(), 2);
    assert_eq!(stats.domain_rejected, 2);
    assert_eq!(read(&config.output), "");
    assert_eq!(read(&config.domains), "");
}

#[test]
fn test_syntax_checked_before_lookup() {
    let (_dir, config) = scratch();
    let dns = FakeDns::resolving(&["example.com"]);
    fs::write(&config.input, "weird@-bad.example.com\n").unwrap();

    let stats = run(&config, &dns);

    assert_eq!(stats.syntax_rejected, 1);
    assert_eq!(dns.calls(), 0);
}

#[test]
fn test_unterminated_last_line_is_left_for_next_run() {
    let (_dir, config) = scratch();
    let dns = FakeDns::resolving(&["example.com"]);
    fs::write(&config.input, "first line\r\nlast john@example.com").unwrap();

    let stats = run(&config, &dns);

    assert_eq!(stats.lines, 1);
    assert_eq!(stats.candidates, 0);
    assert_eq!(read(&config.checkpoint), "12");
    assert_eq!(read(&config.output), "");
    assert_eq!(dns.calls(), 0);
}

#[test]
fn test_unterminated_last_line_scanned_on_request() {
    let (_dir, config) = scratch();
    let dns = FakeDns::resolving(&["example.com"]);
    fs::write(&config.input, "first line\r\nlast john@example.com").unwrap();

    let stats = run(
        &Config {
            scan_unterminated: true,
            ..config.clone()
        },
        &dns,
    );

    assert_eq!(stats.lines, 2);
    assert_eq!(stats.accepted, 1);
    assert_eq!(read(&config.checkpoint), "33");
}

#[test]
fn test_line_split_across_writes_is_read_whole() {
    let (_dir, config) = scratch();
    let dns = FakeDns::resolving(&["example.com"]);

    fs::write(&config.input, "hi john@exa").unwrap();
    let first = run(&config, &dns);
    assert_eq!(first.lines, 0);
    assert!(!config.checkpoint.exists());

    append(&config.input, "mple.com\n");
    let second = run(&config, &dns);

    assert_eq!(second.start_offset, 0);
    assert_eq!(second.accepted, 1);
    assert_eq!(read(&config.output), "{\"Email\":\"john@example.com\"}\n");
    assert_eq!(read(&config.checkpoint), "20");
    assert_eq!(dns.queried(), ["example.com"]);
}

#[test]
fn test_checkpoint_past_end_rescans() {
    let (_dir, config) = scratch();
    let dns = FakeDns::resolving(&["example.com"]);
    fs::write(&config.checkpoint, "9999").unwrap();
    fs::write(&config.input, "john@example.com\n").unwrap();

    let stats = run(&config, &dns);

    assert_eq!(stats.start_offset, 0);
    assert_eq!(stats.accepted, 1);
    assert_eq!(read(&config.checkpoint), "17");
}

#[test]
fn test_missing_input_is_fatal() {
    let (_dir, config) = scratch();
    let dns = FakeDns::default();
    let mut pipeline = Pipeline::new(config.clone(), &dns);

    let err = pipeline.run().unwrap_err();

    assert!(matches!(err, SiftError::Io { operation: "open input", .. }));
    assert_eq!(pipeline.phase(), Phase::Fatal);
    assert!(!config.checkpoint.exists());
}

#[test]
fn test_invalid_pattern_is_fatal() {
    let (_dir, config) = scratch();
    fs::write(&config.input, "john@example.com\n").unwrap();
    let dns = FakeDns::default();
    let mut pipeline = Pipeline::new(
        Config {
            pattern: "([".into(),
            ..config
        },
        &dns,
    );

    assert!(matches!(pipeline.run(), Err(SiftError::Pattern { .. })));
    assert_eq!(pipeline.phase(), Phase::Fatal);
}

#[test]
fn test_strict_policy_holds_checkpoint_on_write_failure() {
    let (dir, mut config) = scratch();
    config.domains = dir.path().join("missing").join("domains.txt");
    fs::write(&config.input, "john@example.com\n").unwrap();
    let dns = FakeDns::resolving(&["example.com"]);
    let mut pipeline = Pipeline::new(config.clone(), &dns);

    assert!(pipeline.run().is_err());
    assert_eq!(pipeline.phase(), Phase::Fatal);
    assert!(!config.checkpoint.exists());
    assert_eq!(read(&config.output), "");
}

#[test]
fn test_lenient_policy_advances_past_write_failure() {
    let (dir, mut config) = scratch();
    config.domains = dir.path().join("missing").join("domains.txt");
    config.checkpoint_policy = CheckpointPolicy::Lenient;
    fs::write(&config.input, "john@example.com\n").unwrap();
    let dns = FakeDns::resolving(&["example.com"]);

    let stats = run(&config, &dns);

    assert_eq!(stats.write_failures, 1);
    assert_eq!(stats.accepted, 0);
    assert_eq!(read(&config.checkpoint), "17");
    assert_eq!(read(&config.output), "");
}
