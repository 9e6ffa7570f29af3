//! 分页列表视图 - 流程层
//!
//! 管理页码、加载状态、展开行和删除确认框，不直接发请求。

use crate::models::PageRequest;
use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;
use tracing::{info, warn};

/// 分页方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// `limit = page * size`, `offset = (page - 1) * size`，下一页始终可点
    Windowed,
    /// `limit = size`，返回不足一页时禁用下一页
    Simple,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Error(String),
    Empty,
    Loaded(Vec<T>),
}

/// 删除确认的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 没有待确认的删除
    NothingPending,
    /// 删除成功，需要重新拉取当前页
    Deleted { id: String },
    /// 删除失败，不重新拉取
    Failed { id: String, message: String },
}

impl DeleteOutcome {
    pub fn needs_refetch(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted { .. })
    }
}

#[derive(Debug)]
pub struct ListView<T> {
    mode: PaginationMode,
    page_size: usize,
    page: usize,
    state: ViewState<T>,
    last_count: Option<usize>,
    expanded: HashSet<String>,
    pending_delete: Option<String>,
}

impl<T> ListView<T> {
    pub fn new(mode: PaginationMode, page_size: usize) -> Self {
        Self {
            mode,
            page_size: page_size.max(1),
            page: 1,
            state: ViewState::Loading,
            last_count: None,
            expanded: HashSet::new(),
            pending_delete: None,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    /// 当前页对应的请求参数
    pub fn request(&self) -> PageRequest {
        let offset = (self.page - 1).saturating_mul(self.page_size);
        let limit = match self.mode {
            PaginationMode::Windowed => self.page.saturating_mul(self.page_size),
            PaginationMode::Simple => self.page_size,
        };
        PageRequest { limit, offset }
    }

    pub fn begin_load(&mut self) -> PageRequest {
        self.state = ViewState::Loading;
        self.request()
    }

    pub fn apply<E: Display>(&mut self, result: Result<Vec<T>, E>) {
        self.state = match result {
            Ok(items) => {
                self.last_count = Some(items.len());
                if items.is_empty() {
                    ViewState::Empty
                } else {
                    ViewState::Loaded(items)
                }
            }
            Err(e) => {
                warn!("⚠️ 列表加载失败: {}", e);
                self.last_count = None;
                ViewState::Error(e.to_string())
            }
        };
    }

    // ========== 翻页 ==========

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        match self.mode {
            PaginationMode::Windowed => true,
            PaginationMode::Simple => self
                .last_count
                .map_or(true, |count| count >= self.page_size),
        }
    }

    /// 返回是否翻页成功
    pub fn next_page(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page = self.page.saturating_add(1);
        self.expanded.clear();
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.page -= 1;
        self.expanded.clear();
        true
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
        self.last_count = None;
        self.expanded.clear();
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.max(1);
        self.last_count = None;
        self.expanded.clear();
    }

    // ========== 展开 ==========

    /// 切换某一行的展开状态，返回切换后的状态
    pub fn toggle_expand(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    // ========== 删除 ==========

    pub fn request_delete(&mut self, id: &str) {
        self.pending_delete = Some(id.to_string());
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// 执行删除；无论成败都关闭确认框，只有成功时才需要重新拉取
    pub async fn confirm_delete<F, Fut, R, E>(&mut self, delete: F) -> DeleteOutcome
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Display,
    {
        let Some(id) = self.pending_delete.take() else {
            return DeleteOutcome::NothingPending;
        };

        match delete(id.clone()).await {
            Ok(_) => {
                info!("🗑️ 已删除 {}", id);
                self.expanded.remove(&id);
                DeleteOutcome::Deleted { id }
            }
            Err(e) => {
                warn!("⚠️ 删除 {} 失败: {}", id, e);
                DeleteOutcome::Failed {
                    id,
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windowed_pagination_grows_limit() {
        let mut view: ListView<u32> = ListView::new(PaginationMode::Windowed, 10);
        assert_eq!(view.request(), PageRequest { limit: 10, offset: 0 });
        assert!(view.next_page());
        assert_eq!(view.request(), PageRequest { limit: 20, offset: 10 });
        view.apply(Ok::<_, String>(vec![1]));
        // 返回不足一页也不影响下一页
        assert!(view.has_next());
    }

    #[test]
    fn simple_pagination_detects_short_page() {
        let mut view: ListView<u32> = ListView::new(PaginationMode::Simple, 3);
        assert!(!view.has_previous());
        view.apply(Ok::<_, String>(vec![1, 2, 3]));
        assert!(view.next_page());
        assert_eq!(view.request(), PageRequest { limit: 3, offset: 3 });
        view.apply(Ok::<_, String>(vec![4]));
        assert!(!view.has_next());
        assert!(!view.next_page());
        assert!(view.previous_page());
        assert_eq!(view.page(), 1);

        view.go_to(4);
        assert_eq!(view.request(), PageRequest { limit: 3, offset: 9 });
        assert!(view.has_next());
        view.reset_page();
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn huge_page_number_saturates_instead_of_overflowing() {
        let mut view: ListView<u32> = ListView::new(PaginationMode::Windowed, 20);
        view.go_to(usize::MAX);
        let request = view.request();
        assert_eq!(request.limit, usize::MAX);
        assert_eq!(request.offset, usize::MAX);

        let mut simple: ListView<u32> = ListView::new(PaginationMode::Simple, 20);
        simple.go_to(usize::MAX);
        assert_eq!(simple.request().limit, 20);
        assert!(simple.next_page());
        assert_eq!(simple.page(), usize::MAX);
    }

    #[test]
    fn load_states() {
        let mut view: ListView<u32> = ListView::new(PaginationMode::Windowed, 10);
        assert_eq!(view.state(), &ViewState::Loading);
        view.apply(Ok::<_, String>(Vec::new()));
        assert_eq!(view.state(), &ViewState::Empty);
        view.begin_load();
        view.apply(Err::<Vec<u32>, _>("HTTP 500"));
        assert_eq!(view.state(), &ViewState::Error("HTTP 500".to_string()));
    }

    #[test]
    fn toggle_expand_flips_row() {
        let mut view: ListView<u32> = ListView::new(PaginationMode::Windowed, 10);
        assert!(view.toggle_expand("q1"));
        assert!(view.is_expanded("q1"));
        assert!(!view.toggle_expand("q1"));
        assert!(!view.is_expanded("q1"));
    }

    #[test]
    fn delete_closes_dialog_and_refetches_only_on_success() {
        let mut view: ListView<u32> = ListView::new(PaginationMode::Windowed, 10);
        assert_eq!(
            tokio_test::block_on(view.confirm_delete(|_| async { Ok::<_, String>(()) })),
            DeleteOutcome::NothingPending
        );

        view.request_delete("q1");
        let outcome =
            tokio_test::block_on(view.confirm_delete(|_| async { Err::<(), _>("HTTP 404") }));
        assert!(!outcome.needs_refetch());
        assert_eq!(view.pending_delete(), None);

        view.request_delete("q2");
        let outcome =
            tokio_test::block_on(view.confirm_delete(|id| async move { Ok::<_, String>(id) }));
        assert!(outcome.needs_refetch());
        assert_eq!(view.pending_delete(), None);

        view.request_delete("q3");
        view.cancel_delete();
        assert_eq!(view.pending_delete(), None);
    }
}
