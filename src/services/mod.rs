pub mod failure_writer;
pub mod json_repair;
pub mod question_validator;

pub use failure_writer::FailureWriter;
pub use json_repair::{lenient_parse, repair, RepairRule, REPAIR_RULES};
pub use question_validator::{build_single_question, validate, SingleQuestionForm, ValidQuestion};
