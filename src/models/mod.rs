pub mod visitor;

pub use visitor::{VisitorForm, VisitorRecord};
