pub mod gateway;
pub mod question_bank_client;

pub use gateway::{HierarchySource, QuestionGateway};
pub use question_bank_client::QuestionBankClient;
