use crate::domain::model::Project;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// 每次送出前領取的序號，用來判斷結果是否已過時
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// 目前專案的唯一持有者，整份替換並通知訂閱者
pub struct ProjectStore {
    tx: watch::Sender<Project>,
    latest_ticket: AtomicU64,
}

impl ProjectStore {
    pub fn new(initial: Project) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            latest_ticket: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> Project {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Project> {
        self.tx.subscribe()
    }

    pub fn begin_request(&self) -> RequestTicket {
        RequestTicket(self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// 只有最新一次請求的結果可以寫入；較早送出、較晚完成的結果會被丟棄
    pub fn commit(&self, ticket: RequestTicket, project: Project) -> bool {
        let latest = self.latest_ticket.load(Ordering::SeqCst);
        if ticket.0 != latest {
            tracing::warn!(
                "⏭️ Discarding stale resolution (ticket {}, latest {})",
                ticket.0,
                latest
            );
            return false;
        }

        self.tx.send_replace(project);
        true
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new(Project::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Project {
        Project {
            name: name.to_string(),
            ..Project::default()
        }
    }

    #[test]
    fn test_stale_ticket_cannot_overwrite_newer_request() {
        let store = ProjectStore::default();
        let first = store.begin_request();
        let second = store.begin_request();

        assert!(store.commit(second, named("second")));
        assert!(!store.commit(first, named("first")));
        assert_eq!(store.current().name, "second");
    }

    #[test]
    fn test_subscribers_see_replacement() {
        let store = ProjectStore::default();
        let mut rx = store.subscribe();

        let ticket = store.begin_request();
        store.commit(ticket, named("updated"));

        tokio_test::block_on(async {
            rx.changed().await.unwrap();
        });
        assert_eq!(rx.borrow_and_update().name, "updated");
    }
}
