use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::audit::AuditLogEntry;
use crate::models::rbac::{Action, Module};
use crate::models::user::UserProfile;
use crate::notify::{NoticeSeverity, Notifier};
use crate::store::DirectoryStore;
use crate::utils::utc_now;

/// Entries kept in memory per session; the durable trail is unbounded.
const IN_MEMORY_LIMIT: usize = 200;

/// Append-only audit trail for one session.
///
/// `record` inserts at the head of the in-memory log immediately, then hands
/// the entry to a detached task for durable persistence. A persistence
/// failure is logged and dropped: the mutation that triggered the entry has
/// already succeeded and must not be affected.
pub struct AuditRecorder {
    store: Arc<dyn DirectoryStore>,
    notifier: Arc<dyn Notifier>,
    entries: RwLock<VecDeque<AuditLogEntry>>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn DirectoryStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            entries: RwLock::new(VecDeque::new()),
        }
    }

    pub async fn record(
        &self,
        actor: &UserProfile,
        module: Module,
        action: Action,
        details: impl Into<String>,
    ) {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            timestamp: utc_now(),
            user_id: actor.id,
            user_name: actor.name.clone(),
            module,
            action,
            details: details.into(),
        };

        {
            let mut entries = self.entries.write().await;
            entries.push_front(entry.clone());
            entries.truncate(IN_MEMORY_LIMIT);
        }

        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(err) = store.insert_audit_entry(&entry).await {
                tracing::warn!(%err, entry_id = %entry.id, "failed to persist audit entry");
                notifier.notify(NoticeSeverity::Warning, "audit entry was not persisted");
            }
        });
    }

    /// Newest-first view of the in-memory log.
    pub async fn recent(&self) -> Vec<AuditLogEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    /// Replace the in-memory log with entries from the hydration bundle.
    pub async fn seed(&self, entries: Vec<AuditLogEntry>) {
        let mut guard = self.entries.write().await;
        *guard = entries.into_iter().take(IN_MEMORY_LIMIT).collect();
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
