//! Shared fixtures: a scripted nameserver lookup and scratch state directories.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use email_sift::{Config, LookupOutcome, NsLookup};
use tempfile::TempDir;

/// Answers NS queries from fixed lists and records every query.
#[derive(Default)]
pub struct FakeDns {
    resolvable: HashSet<String>,
    timeouts: HashSet<String>,
    queries: RefCell<Vec<String>>,
}

impl FakeDns {
    pub fn resolving(domains: &[&str]) -> Self {
        Self {
            resolvable: domains.iter().map(|d| (*d).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn timing_out(mut self, domains: &[&str]) -> Self {
        self.timeouts = domains.iter().map(|d| (*d).to_string()).collect();
        self
    }

    pub fn calls(&self) -> usize {
        self.queries.borrow().len()
    }

    pub fn queried(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl NsLookup for FakeDns {
    fn lookup_ns(&self, domain: &str) -> LookupOutcome {
        self.queries.borrow_mut().push(domain.to_string());
        if self.timeouts.contains(domain) {
            LookupOutcome::TimedOut
        } else if self.resolvable.contains(domain) {
            LookupOutcome::Found(2)
        } else {
            LookupOutcome::Empty
        }
    }
}

/// Config with every state file inside `dir`
pub fn config_in(dir: &Path) -> Config {
    Config {
        input: dir.join("input.json"),
        output: dir.join("output.json"),
        domains: dir.join("domains.txt"),
        checkpoint: dir.join("persistent.txt"),
        ..Config::default()
    }
}

pub fn scratch() -> (TempDir, Config) {
    let dir = TempDir::new().expect("create temp dir");
    let config = config_in(dir.path());
    (dir, config)
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

pub fn append(path: &Path, text: &str) {
    use std::io::Write;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .expect("open for append");
    file.write_all(text.as_bytes()).expect("append");
}
