//! Query modules for each graph table, plus native query execution.

pub mod labels;
pub mod native;
pub mod nodes;
pub mod properties;
pub mod relationships;
pub mod util;
