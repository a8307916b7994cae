//! Line transport: one `<subject> <payload>` message per line.

use std::fmt;
use std::io::BufRead;

use anyhow::Result;
use tracing::{error, warn};

use rebound::{Decoder, DispatchError, Rebound, SubjectMapper};

/// What happened to one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    DeadLettered,
    Rejected,
    Failed,
    Skipped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub handled: u64,
    pub dead_lettered: u64,
    pub rejected: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl RelayStats {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Handled => self.handled += 1,
            Outcome::DeadLettered => self.dead_lettered += 1,
            Outcome::Rejected => self.rejected += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

impl fmt::Display for RelayStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "handled={} dead_lettered={} rejected={} failed={} skipped={}",
            self.handled, self.dead_lettered, self.rejected, self.failed, self.skipped
        )
    }
}

/// Split a line into subject and payload. Blank lines and `#` comments
/// yield `None`; a subject without payload gets an empty payload.
pub fn parse_line(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let line = line.trim_ascii();
    if line.is_empty() || line.starts_with(b"#") {
        return None;
    }
    match line.iter().position(u8::is_ascii_whitespace) {
        Some(at) => Some((&line[..at], line[at..].trim_ascii_start())),
        None => Some((line, &line[line.len()..])),
    }
}

pub fn relay_line<E, D>(rb: &Rebound<E, D>, mapper: &SubjectMapper, line: &[u8]) -> Outcome
where
    E: fmt::Display,
    D: Decoder,
{
    let Some((subject, payload)) = parse_line(line) else {
        return Outcome::Skipped;
    };

    let subject = match std::str::from_utf8(subject) {
        Ok(subject) => subject,
        Err(err) => {
            warn!(
                subject = %String::from_utf8_lossy(subject),
                error = %err,
                "Rejected message with a non UTF-8 subject"
            );
            return Outcome::Rejected;
        }
    };

    match rb.dispatch_subject(mapper, subject, payload) {
        Ok(()) => Outcome::Handled,
        Err(DispatchError::NoHandler { event_name }) => {
            warn!(subject, event_name = %event_name, "Dead letter: no handler for event");
            Outcome::DeadLettered
        }
        Err(err @ (DispatchError::Subject(_) | DispatchError::EmptyName)) => {
            warn!(subject, error = %err, "Dead letter: unroutable subject");
            Outcome::DeadLettered
        }
        Err(DispatchError::Decode { event_name, source }) => {
            warn!(subject, event_name = %event_name, error = %source, "Rejected malformed payload");
            Outcome::Rejected
        }
        Err(DispatchError::Handler(err)) => {
            error!(subject, error = %err, "Event handler failed");
            Outcome::Failed
        }
    }
}

/// Relay every line of `input`, returning the tally once input ends.
/// Only a read failure stops the run; bad lines are tallied and skipped over.
pub fn run<E, D>(rb: &Rebound<E, D>, mapper: &SubjectMapper, input: impl BufRead) -> Result<RelayStats>
where
    E: fmt::Display,
    D: Decoder,
{
    let mut stats = RelayStats::default();
    for line in input.split(b'\n') {
        let line = line?;
        stats.record(relay_line(rb, mapper, &line));
    }
    Ok(stats)
}
