pub mod category;
pub mod classify;
pub mod expand;
pub mod lexical;

pub use category::{Category, CategoryMode};
pub use classify::{Analysis, Intent, classify};
