pub mod bugs;
pub mod error;
pub mod lookup;
pub mod paths;
pub mod psid;
pub mod songlengths;

pub use bugs::BugEntry;
pub use error::HvscError;
pub use paths::Hvsc;
pub use psid::{PsidError, PsidFile, PsidHeader, SidFormat};
pub use songlengths::Songlengths;
