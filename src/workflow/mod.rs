pub mod import_ctx;
pub mod import_flow;
pub mod list_view;
pub mod selection;

pub use import_ctx::ImportCtx;
pub use import_flow::{enrich, ImportFlow};
pub use list_view::{DeleteOutcome, ListView, PaginationMode, ViewState};
pub use selection::{
    CascadeLevel, CascadeLoader, CascadeState, FetchTicket, Options, SelectionCascade,
};
