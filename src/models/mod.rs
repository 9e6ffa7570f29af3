pub mod entity;
pub mod import_job;
pub mod loaders;
pub mod page;
pub mod question;

pub use entity::{Chapter, Class, Localized, NamePayload, Named, NewTopic, Topic, TopicName};
pub use import_job::ImportJob;
pub use loaders::{load_all_import_jobs, load_import_job};
pub use page::PageRequest;
pub use question::{
    Difficulty, Group, QuestionDraft, QuestionIndex, QuestionSummary, QuestionType, SchemaKind,
};
