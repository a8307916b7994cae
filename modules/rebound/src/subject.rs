//! Event names from broker subjects.
//!
//! Subjects such as `sales.events.private.order.123.completed` carry a
//! routing prefix and an entity id that are not part of the event name.
//! `SubjectMapper` strips the prefix and, optionally, one id segment:
//!
//! ```
//! use rebound::SubjectMapper;
//!
//! let mapper = SubjectMapper::new("sales.events.private.").with_id_segment(1);
//! let name = mapper.event_name("sales.events.private.order.123.completed").unwrap();
//! assert_eq!(name, "order.completed");
//! ```

use crate::error::SubjectError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectMapper {
    prefix: String,
    id_segment: Option<usize>,
}

impl SubjectMapper {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            id_segment: None,
        }
    }

    /// Drop the dot-separated segment at `index` (counted after the prefix).
    pub fn with_id_segment(mut self, index: usize) -> Self {
        self.id_segment = Some(index);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn id_segment(&self) -> Option<usize> {
        self.id_segment
    }

    pub fn event_name(&self, subject: &str) -> Result<String, SubjectError> {
        let rest = subject
            .strip_prefix(self.prefix.as_str())
            .ok_or_else(|| SubjectError::MissingPrefix {
                subject: subject.to_string(),
                prefix: self.prefix.clone(),
            })?;

        let Some(index) = self.id_segment else {
            return non_empty(subject, rest.to_string());
        };

        let mut parts: Vec<&str> = rest.split('.').collect();
        if rest.is_empty() || index >= parts.len() {
            return Err(SubjectError::MissingSegment {
                subject: subject.to_string(),
                index,
            });
        }
        parts.remove(index);

        non_empty(subject, parts.join("."))
    }
}

fn non_empty(subject: &str, name: String) -> Result<String, SubjectError> {
    if name.is_empty() {
        Err(SubjectError::Empty {
            subject: subject.to_string(),
        })
    } else {
        Ok(name)
    }
}
