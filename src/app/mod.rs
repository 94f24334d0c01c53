pub mod form;
pub mod report;

pub use form::{InputForm, SubmitOutcome};
