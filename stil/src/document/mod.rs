use std::fmt;

use crate::block::Block;
use crate::block::field::Field;

/// A parsed STIL entry.
///
/// Only the parser constructs documents; once returned they are read-only.
/// Blocks keep the order their tune markers appeared in, which is not
/// necessarily numeric order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StilDocument {
    key: String,
    global_comment: Option<String>,
    blocks: Vec<Block>,
}

impl StilDocument {
    pub(crate) fn new(key: String, global_comment: Option<String>, blocks: Vec<Block>) -> Self {
        StilDocument {
            key,
            global_comment,
            blocks,
        }
    }

    /// The normalized key the entry was located by.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Comment that applies to the whole file rather than a subtune.
    pub fn global_comment(&self) -> Option<&str> {
        self.global_comment.as_deref()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Fields recorded for subtune `tune`, or `None` if the entry has no
    /// block for it.
    pub fn get_tune(&self, tune: u32) -> Option<&[Field]> {
        self.blocks
            .iter()
            .find(|b| b.tune_number == tune)
            .map(|b| b.fields.as_slice())
    }

    /// Tune numbers in block order.
    pub fn tunes(&self) -> impl Iterator<Item = u32> + '_ {
        self.blocks.iter().map(|b| b.tune_number)
    }
}

impl fmt::Display for StilDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{File: {}}}", self.key)?;
        if let Some(comment) = &self.global_comment {
            writeln!(f, "\n{{SID-wide comment}}\n{}", comment)?;
        }

        writeln!(f, "\n{{Per-tune info}}")?;
        for block in &self.blocks {
            writeln!(f, "\n  {{#{}}}", block.tune_number)?;
            for field in &block.fields {
                for line in field.to_string().lines() {
                    writeln!(f, "    {}", line)?;
                }
            }
        }
        Ok(())
    }
}
