pub mod exclusions;
pub mod frequency;

pub use exclusions::ExclusionPlan;
pub use frequency::{BlockStat, FrequencyTable, NumberCount};
