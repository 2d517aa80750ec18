use std::fmt;

/// A playback offset, or a range of offsets, in seconds.
///
/// Absence of a timestamp is expressed as `Option<Timestamp>` on the field,
/// never as a zero value here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub from: u32,
    /// End of the range; `None` for a single instant.
    pub to: Option<u32>,
}

impl Timestamp {
    pub fn at(from: u32) -> Self {
        Timestamp { from, to: None }
    }

    pub fn range(from: u32, to: u32) -> Self {
        Timestamp { from, to: Some(to) }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.from / 60, self.from % 60)?;
        if let Some(to) = self.to {
            write!(f, "-{}:{:02}", to / 60, to % 60)?;
        }
        Ok(())
    }
}
