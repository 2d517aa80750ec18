pub mod field;
pub mod timestamp;

use crate::block::field::Field;
use crate::parser::StilError;

/// The fields recorded for one subtune, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Subtune number. 0 for an entry that never reached a tune marker, a
    /// comment or a field.
    pub tune_number: u32,
    pub fields: Vec<Field>,
}

impl Block {
    pub fn new(tune_number: u32) -> Self {
        Block {
            tune_number,
            fields: Vec::new(),
        }
    }

    pub fn push_field(&mut self, field: Field) -> Result<(), StilError> {
        self.fields
            .try_reserve(1)
            .map_err(|_| StilError::OutOfMemory { what: "field list" })?;
        self.fields.push(field);
        Ok(())
    }

    pub fn last_field_mut(&mut self) -> Option<&mut Field> {
        self.fields.last_mut()
    }
}
