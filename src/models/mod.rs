pub mod discipline;
pub mod kb_entry;
pub mod line_item;
pub mod result;
pub mod unit;

pub use discipline::{Discipline, DisciplineClass};
pub use kb_entry::{parse_decimal, EntryFeatures, KbEntry, MissingField, RawFeatures, RawKbRecord};
pub use line_item::{CostType, LineItem};
pub use result::{MatchOutcome, MatchResult, RejectionReason, UnmatchedRecord};
pub use unit::{Unit, UnitClass};
