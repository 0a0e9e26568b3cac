//! Optimistic reconciliation of the displayed feed.
//!
//! The reconciler holds the server-confirmed list plus one pending
//! optimistic write, applied over the confirmed list at render time:
//! a create placeholder renders ahead of everything, an update overlay
//! substitutes the confirmed item with the same id. Confirmations and
//! failures carry the epoch captured when the write began; anything from
//! an older epoch (state was reset meanwhile) is ignored.
//!
//! One pending write at a time: starting a second optimistic write before
//! the first resolves replaces the slot. Concurrent independent edits are
//! out of scope.
use chrono::Utc;

use crate::models::{Post, PostDraft};

/// Epoch token tying an in-flight request to the reconciler state it
/// started from.
pub type Epoch = u64;

/// The single pending optimistic write.
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    Idle,
    Create { temp: Post },
    Update { original: Post, overlay: Post },
}

#[derive(Debug)]
pub struct FeedReconciler {
    confirmed: Vec<Post>,
    pending: Pending,
    epoch: Epoch,
    next_temp_id: i64,
}

impl FeedReconciler {
    pub fn new() -> Self {
        Self {
            confirmed: Vec::new(),
            pending: Pending::Idle,
            epoch: 0,
            // Negative ids are disjoint from anything the server assigns.
            next_temp_id: -1,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn pending(&self) -> &Pending {
        &self.pending
    }

    /// Drop all state and invalidate every in-flight request.
    pub fn reset(&mut self) {
        self.confirmed.clear();
        self.pending = Pending::Idle;
        self.epoch += 1;
    }

    /// Append a fetched page to the confirmed list, skipping ids already
    /// present (a prepended create can shift page boundaries).
    pub fn append_page(&mut self, items: Vec<Post>) {
        for item in items {
            if !self.contains(item.id) {
                self.confirmed.push(item);
            }
        }
    }

    /// Start an optimistic create: the placeholder renders immediately
    /// under a synthetic id with the current timestamp.
    pub fn begin_create(&mut self, draft: &PostDraft) -> Epoch {
        let now = Utc::now();
        let temp = Post {
            id: self.next_temp_id,
            autor: draft.autor.clone(),
            categoria: draft.categoria.clone(),
            publicacao: draft.publicacao.clone(),
            imagem: draft.imagem.clone(),
            created_at: now,
            updated_at: now,
        };
        self.next_temp_id -= 1;
        self.pending = Pending::Create { temp };
        self.epoch
    }

    /// Splice in the server-confirmed post and drop the placeholder.
    pub fn confirm_create(&mut self, epoch: Epoch, post: Post) {
        if self.is_stale(epoch, "create confirmation") {
            return;
        }
        if matches!(self.pending, Pending::Create { .. }) {
            self.pending = Pending::Idle;
        }
        if !self.contains(post.id) {
            self.confirmed.insert(0, post);
        }
    }

    /// Drop the placeholder after a failed create. Returns whether a
    /// placeholder was actually pending, so the caller knows to surface
    /// the error.
    pub fn fail_create(&mut self, epoch: Epoch) -> bool {
        if self.is_stale(epoch, "create failure") {
            return false;
        }
        if matches!(self.pending, Pending::Create { .. }) {
            self.pending = Pending::Idle;
            true
        } else {
            false
        }
    }

    /// Start an optimistic update: overlay the edited fields on the
    /// confirmed item while the request is in flight. Returns `None` when
    /// no confirmed item has that id.
    ///
    /// The overlay keeps the original id and creation time, and falls back
    /// to the current image when the draft carries none, so the card does
    /// not flicker while the request runs.
    pub fn begin_update(&mut self, post_id: i64, draft: &PostDraft) -> Option<Epoch> {
        let original = self.confirmed.iter().find(|p| p.id == post_id)?.clone();
        let overlay = Post {
            id: original.id,
            autor: draft.autor.clone(),
            categoria: draft.categoria.clone(),
            publicacao: draft.publicacao.clone(),
            imagem: draft.imagem.clone().or_else(|| original.imagem.clone()),
            created_at: original.created_at,
            updated_at: Utc::now(),
        };
        self.pending = Pending::Update { original, overlay };
        Some(self.epoch)
    }

    /// Replace the overlayed item with the server-confirmed one.
    pub fn confirm_update(&mut self, epoch: Epoch, post: Post) {
        if self.is_stale(epoch, "update confirmation") {
            return;
        }
        if matches!(self.pending, Pending::Update { .. }) {
            self.pending = Pending::Idle;
        }
        if let Some(slot) = self.confirmed.iter_mut().find(|p| p.id == post.id) {
            *slot = post;
        }
    }

    /// Drop the overlay after a failed update, restoring the pre-edit
    /// item. Returns the original for caller messaging.
    pub fn fail_update(&mut self, epoch: Epoch) -> Option<Post> {
        if self.is_stale(epoch, "update failure") {
            return None;
        }
        match std::mem::replace(&mut self.pending, Pending::Idle) {
            Pending::Update { original, .. } => {
                // The confirmed list was never touched; make sure the slot
                // still holds the pre-edit item and hand it back.
                if let Some(slot) = self.confirmed.iter_mut().find(|p| p.id == original.id) {
                    *slot = original.clone();
                }
                Some(original)
            }
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Remove an item immediately. Deletes are not reverted even if the
    /// background request later fails.
    pub fn remove(&mut self, post_id: i64) {
        self.confirmed.retain(|p| p.id != post_id);
        match &self.pending {
            Pending::Create { temp } if temp.id == post_id => self.pending = Pending::Idle,
            Pending::Update { original, .. } if original.id == post_id => {
                self.pending = Pending::Idle
            }
            _ => {}
        }
    }

    /// The list as it should render: placeholder first, then the confirmed
    /// items with any update overlay substituted in.
    pub fn visible(&self) -> Vec<&Post> {
        let mut items = Vec::with_capacity(self.confirmed.len() + 1);

        if let Pending::Create { temp } = &self.pending {
            if !self.contains(temp.id) {
                items.push(temp);
            }
        }

        for post in &self.confirmed {
            match &self.pending {
                Pending::Update { overlay, .. } if overlay.id == post.id => items.push(overlay),
                _ => items.push(post),
            }
        }

        items
    }

    fn contains(&self, post_id: i64) -> bool {
        self.confirmed.iter().any(|p| p.id == post_id)
    }

    fn is_stale(&self, epoch: Epoch, what: &str) -> bool {
        if epoch != self.epoch {
            tracing::debug!(stale_epoch = epoch, current_epoch = self.epoch, "{what} ignored");
            return true;
        }
        false
    }
}

impl Default for FeedReconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn confirmed_post(id: i64, autor: &str) -> Post {
        let at = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        Post {
            id,
            autor: autor.to_string(),
            categoria: "post".to_string(),
            publicacao: format!("publicacao {id}"),
            imagem: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn draft(autor: &str) -> PostDraft {
        PostDraft {
            autor: autor.to_string(),
            categoria: "post".to_string(),
            publicacao: "nova publicacao".to_string(),
            imagem: None,
        }
    }

    #[test]
    fn placeholder_renders_ahead_of_confirmed_items() {
        let mut feed = FeedReconciler::new();
        feed.append_page(vec![confirmed_post(1, "Ana"), confirmed_post(2, "Bia")]);

        feed.begin_create(&draft("Caio"));

        let visible = feed.visible();
        assert_eq!(visible.len(), 3);
        assert!(visible[0].id < 0);
        assert_eq!(visible[0].autor, "Caio");
        assert_eq!(visible[1].id, 1);
    }

    #[test]
    fn confirmed_create_replaces_placeholder_with_server_id() {
        let mut feed = FeedReconciler::new();
        feed.append_page(vec![confirmed_post(1, "Ana")]);

        let epoch = feed.begin_create(&draft("Caio"));
        feed.confirm_create(epoch, confirmed_post(42, "Caio"));

        let visible = feed.visible();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].id, 42);
        assert!(visible.iter().all(|p| p.id > 0), "no temp entry left");
        assert_eq!(visible.iter().filter(|p| p.id == 42).count(), 1);
    }

    #[test]
    fn confirm_create_does_not_duplicate_an_already_listed_id() {
        let mut feed = FeedReconciler::new();
        let epoch = feed.begin_create(&draft("Caio"));
        feed.append_page(vec![confirmed_post(42, "Caio")]);

        feed.confirm_create(epoch, confirmed_post(42, "Caio"));

        assert_eq!(feed.visible().iter().filter(|p| p.id == 42).count(), 1);
    }

    #[test]
    fn failed_create_drops_the_placeholder() {
        let mut feed = FeedReconciler::new();
        feed.append_page(vec![confirmed_post(1, "Ana")]);

        let epoch = feed.begin_create(&draft("Caio"));
        assert!(feed.fail_create(epoch));

        let visible = feed.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 1);
    }

    #[test]
    fn second_create_replaces_the_single_pending_slot() {
        // Documented constraint: one optimistic write at a time.
        let mut feed = FeedReconciler::new();
        feed.begin_create(&draft("Caio"));
        feed.begin_create(&draft("Dani"));

        let visible = feed.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].autor, "Dani");
    }

    #[test]
    fn update_overlay_preserves_id_and_creation_time() {
        let mut feed = FeedReconciler::new();
        let original = confirmed_post(5, "Ana");
        feed.append_page(vec![original.clone()]);

        feed.begin_update(5, &draft("Ana Maria")).unwrap();

        let visible = feed.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 5);
        assert_eq!(visible[0].autor, "Ana Maria");
        assert_eq!(visible[0].created_at, original.created_at);
    }

    #[test]
    fn update_overlay_falls_back_to_existing_image() {
        let mut feed = FeedReconciler::new();
        let mut original = confirmed_post(5, "Ana");
        original.imagem = Some("data:image/png;base64,AAAA".to_string());
        feed.append_page(vec![original.clone()]);

        feed.begin_update(5, &draft("Ana Maria")).unwrap();

        assert_eq!(feed.visible()[0].imagem, original.imagem);
    }

    #[test]
    fn failed_update_restores_the_pre_edit_item_exactly() {
        let mut feed = FeedReconciler::new();
        let original = confirmed_post(5, "Ana");
        feed.append_page(vec![original.clone()]);

        let epoch = feed.begin_update(5, &draft("Ana Maria")).unwrap();
        let restored = feed.fail_update(epoch).unwrap();

        assert_eq!(restored, original);
        let visible = feed.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(*visible[0], original);
        assert_eq!(*feed.pending(), Pending::Idle);
    }

    #[test]
    fn confirmed_update_replaces_the_item() {
        let mut feed = FeedReconciler::new();
        feed.append_page(vec![confirmed_post(5, "Ana")]);

        let epoch = feed.begin_update(5, &draft("Ana Maria")).unwrap();
        let mut server = confirmed_post(5, "Ana Maria");
        server.publicacao = "nova publicacao".to_string();
        feed.confirm_update(epoch, server.clone());

        assert_eq!(*feed.visible()[0], server);
        assert_eq!(*feed.pending(), Pending::Idle);
    }

    #[test]
    fn update_of_unknown_id_is_refused() {
        let mut feed = FeedReconciler::new();
        assert!(feed.begin_update(99, &draft("Ana")).is_none());
    }

    #[test]
    fn delete_removes_immediately() {
        let mut feed = FeedReconciler::new();
        feed.append_page(vec![confirmed_post(1, "Ana"), confirmed_post(2, "Bia")]);

        feed.remove(1);

        let visible = feed.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 2);
    }

    #[test]
    fn deleting_the_item_under_update_drops_the_overlay() {
        let mut feed = FeedReconciler::new();
        feed.append_page(vec![confirmed_post(5, "Ana")]);
        feed.begin_update(5, &draft("Ana Maria")).unwrap();

        feed.remove(5);

        assert!(feed.visible().is_empty());
        assert_eq!(*feed.pending(), Pending::Idle);
    }

    #[test]
    fn stale_confirmation_after_reset_is_ignored() {
        let mut feed = FeedReconciler::new();
        let epoch = feed.begin_create(&draft("Caio"));

        feed.reset();
        feed.confirm_create(epoch, confirmed_post(42, "Caio"));

        assert!(feed.visible().is_empty());
    }

    #[test]
    fn stale_failure_after_reset_is_ignored() {
        let mut feed = FeedReconciler::new();
        feed.append_page(vec![confirmed_post(5, "Ana")]);
        let epoch = feed.begin_update(5, &draft("Ana Maria")).unwrap();

        feed.reset();
        assert!(feed.fail_update(epoch).is_none());
    }

    #[test]
    fn append_page_skips_ids_already_present() {
        let mut feed = FeedReconciler::new();
        feed.append_page(vec![confirmed_post(1, "Ana"), confirmed_post(2, "Bia")]);
        feed.append_page(vec![confirmed_post(2, "Bia"), confirmed_post(3, "Caio")]);

        let ids: Vec<i64> = feed.visible().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
