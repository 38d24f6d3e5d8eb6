use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

/// 頁面層級狀態：捲動鎖定與提示訊息。
///
/// Modals receive a shared handle instead of touching document globals.
/// The scroll lock is counted so a nested modal closing does not unlock the
/// page while its parent is still open.
#[derive(Debug, Default)]
pub struct PageHost {
    scroll_locks: AtomicUsize,
    next_toast: AtomicU64,
    toasts: Mutex<Vec<Toast>>,
}

impl PageHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lock_scroll(&self) {
        self.scroll_locks.fetch_add(1, Ordering::SeqCst);
    }

    pub fn unlock_scroll(&self) {
        let _ = self
            .scroll_locks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locks.load(Ordering::SeqCst) > 0
    }

    /// 顯示提示訊息，`duration` 後自動移除
    pub fn show_toast(self: &Arc<Self>, message: impl Into<String>, duration: Duration) -> u64 {
        let id = self.next_toast.fetch_add(1, Ordering::SeqCst) + 1;
        self.toasts().push(Toast {
            id,
            message: message.into(),
        });

        let page = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            page.dismiss_toast(id);
        });
        id
    }

    pub fn dismiss_toast(&self, id: u64) {
        self.toasts().retain(|toast| toast.id != id);
    }

    pub fn active_toasts(&self) -> Vec<Toast> {
        self.toasts().clone()
    }

    fn toasts(&self) -> MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
