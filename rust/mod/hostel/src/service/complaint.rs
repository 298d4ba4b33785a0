use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use hostel_flux::StateStore;
use hostel_kv::{JsonKV, KVError, KVStore};
use tracing::{debug, info, warn};

use crate::config::HostelConfig;
use crate::error::HostelError;
use crate::model::{
    Complaint, ComplaintForm, ComplaintStatus, Identity, NewComplaint, StatusCounts,
};
use crate::service::{COMPLAINTS_KEY, Pending, new_id, suspend};
use crate::state::{COMPLAINTS_ITEMS, COMPLAINTS_SUBMITTING, COMPLAINTS_UPDATING};

/// Complaint store: the authoritative, persisted complaint collection.
///
/// The collection is an immutable snapshot behind an `Arc`. Every mutation
/// builds the next snapshot, writes it to storage under `complaints`, and
/// only then swaps it in, so memory and storage agree whenever a call
/// returns. Snapshots handed out earlier are never modified.
pub struct ComplaintStore {
    kv: Arc<dyn KVStore>,
    state: Arc<StateStore>,
    items: RwLock<Arc<Vec<Complaint>>>,
    submit_delay: Duration,
    review_delay: Duration,
    default_hostel_id: String,
    submitting: AtomicUsize,
    updating: AtomicUsize,
}

impl ComplaintStore {
    /// Create the store from the persisted collection.
    ///
    /// A missing or unparseable collection starts empty, and the empty
    /// collection is written back immediately.
    pub fn new(
        kv: Arc<dyn KVStore>,
        state: Arc<StateStore>,
        config: &HostelConfig,
    ) -> Result<Self, HostelError> {
        let items = match kv.get_json::<Vec<Complaint>>(COMPLAINTS_KEY) {
            Ok(Some(items)) => {
                debug!("loaded {} complaints", items.len());
                items
            }
            Ok(None) => {
                debug!("no persisted complaints, initializing empty collection");
                kv.set_json(COMPLAINTS_KEY, &[] as &[Complaint])?;
                Vec::new()
            }
            Err(KVError::Serialization(msg)) => {
                warn!("resetting malformed complaint collection: {msg}");
                kv.set_json(COMPLAINTS_KEY, &[] as &[Complaint])?;
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let items = Arc::new(items);
        state.set(COMPLAINTS_ITEMS, Arc::clone(&items));
        state.set(COMPLAINTS_SUBMITTING, false);
        state.set(COMPLAINTS_UPDATING, false);

        Ok(Self {
            kv,
            state,
            items: RwLock::new(items),
            submit_delay: config.submit_delay(),
            review_delay: config.review_delay(),
            default_hostel_id: config.default_hostel_id.clone(),
            submitting: AtomicUsize::new(0),
            updating: AtomicUsize::new(0),
        })
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Append a new complaint with a fresh id, the current time, and status
    /// `pending`. Returns the stored record.
    pub fn add_complaint(&self, input: NewComplaint) -> Result<Complaint, HostelError> {
        let complaint = Complaint {
            id: format!("complaint-{}", new_id()),
            title: input.title,
            description: input.description,
            category: input.category,
            room_number: input.room_number,
            created_at: Utc::now(),
            status: ComplaintStatus::Pending,
            student_id: input.student_id,
            student_name: input.student_name,
            hostel_id: input.hostel_id,
            updated_at: None,
            comments: None,
        };

        self.mutate(|items| {
            items.push(complaint.clone());
            Some(())
        })?;

        info!(
            id = %complaint.id,
            student = %complaint.student_id,
            category = %complaint.category,
            "complaint created"
        );
        Ok(complaint)
    }

    /// Move a complaint to `status`, stamping `updated_at`.
    ///
    /// `comments` replaces the previous comments only when it is non-empty.
    /// An unknown id, or a request to go back to `pending`, changes nothing
    /// and returns `Ok(None)`.
    pub fn update_complaint_status(
        &self,
        id: &str,
        status: ComplaintStatus,
        comments: Option<&str>,
    ) -> Result<Option<Complaint>, HostelError> {
        if status == ComplaintStatus::Pending {
            warn!(id, "ignoring status update back to pending");
            return Ok(None);
        }

        let now = Utc::now();
        let updated = self.mutate(|items| {
            let slot = items.iter_mut().find(|c| c.id == id)?;
            let mut next = slot.clone();
            next.status = status;
            next.updated_at = Some(now);
            if let Some(text) = comments.filter(|c| !c.is_empty()) {
                next.comments = Some(text.to_string());
            }
            *slot = next.clone();
            Some(next)
        })?;

        match &updated {
            Some(c) => info!(id, status = %c.status, "complaint status updated"),
            None => debug!(id, "status update for unknown complaint ignored"),
        }
        Ok(updated)
    }

    /// Student-facing submission: create a complaint from the form on
    /// behalf of `identity` after the simulated round trip.
    ///
    /// Without an identity nothing happens and `Ok(None)` is returned.
    pub async fn submit(
        &self,
        identity: Option<&Identity>,
        form: ComplaintForm,
    ) -> Result<Option<Complaint>, HostelError> {
        let Some(identity) = identity else {
            debug!("submission without a session ignored");
            return Ok(None);
        };

        let _pending = Pending::begin(&self.submitting, &self.state, COMPLAINTS_SUBMITTING);
        suspend(self.submit_delay).await;

        let input = NewComplaint::from_form(form, identity, &self.default_hostel_id);
        self.add_complaint(input).map(Some)
    }

    /// Rector-facing review: apply a status update after the simulated
    /// round trip.
    pub async fn review(
        &self,
        id: &str,
        status: ComplaintStatus,
        comments: Option<&str>,
    ) -> Result<Option<Complaint>, HostelError> {
        let _pending = Pending::begin(&self.updating, &self.state, COMPLAINTS_UPDATING);
        suspend(self.review_delay).await;

        self.update_complaint_status(id, status, comments)
    }

    /// Run `f` on a copy of the collection; when it returns `Some`, persist
    /// the copy, swap it in, and publish it.
    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Vec<Complaint>) -> Option<R>,
    ) -> Result<Option<R>, HostelError> {
        let out = {
            let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
            let mut next = (**items).clone();
            let Some(out) = f(&mut next) else {
                return Ok(None);
            };

            self.kv.set_json(COMPLAINTS_KEY, &next)?;
            *items = Arc::new(next);
            out
        };

        self.publish();
        Ok(Some(out))
    }

    /// Publish the current snapshot. Runs without the lock held; repeats
    /// if another mutation swapped in a newer snapshot meanwhile, so the
    /// last value published is always the current one.
    fn publish(&self) {
        loop {
            let snapshot = self.complaints();
            self.state.set(COMPLAINTS_ITEMS, Arc::clone(&snapshot));
            if Arc::ptr_eq(&snapshot, &self.complaints()) {
                break;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The current snapshot of the whole collection.
    pub fn complaints(&self) -> Arc<Vec<Complaint>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Complaints filed by one student, in submission order.
    pub fn get_student_complaints(&self, student_id: &str) -> Vec<Complaint> {
        self.filter(|c| c.student_id == student_id)
    }

    /// Complaints filed in one hostel, in submission order.
    pub fn get_hostel_complaints(&self, hostel_id: &str) -> Vec<Complaint> {
        self.filter(|c| c.hostel_id == hostel_id)
    }

    /// Every complaint, in submission order.
    pub fn get_all_complaints(&self) -> Vec<Complaint> {
        (*self.complaints()).clone()
    }

    pub fn get_complaints_by_status(&self, status: ComplaintStatus) -> Vec<Complaint> {
        self.filter(|c| c.status == status)
    }

    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::tally(self.complaints().iter())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst) > 0
    }

    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::SeqCst) > 0
    }

    fn filter(&self, pred: impl Fn(&Complaint) -> bool) -> Vec<Complaint> {
        self.complaints()
            .iter()
            .filter(|&c| pred(c))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use hostel_kv::MemoryKV;

    use super::*;
    use crate::model::Role;

    fn open(kv: &Arc<MemoryKV>) -> ComplaintStore {
        ComplaintStore::new(
            kv.clone(),
            Arc::new(StateStore::new()),
            &HostelConfig::headless(),
        )
        .unwrap()
    }

    fn input(title: &str, student_id: &str, hostel_id: &str) -> NewComplaint {
        NewComplaint {
            title: title.to_string(),
            description: format!("{title} description"),
            category: "plumbing".to_string(),
            room_number: "204".to_string(),
            student_id: student_id.to_string(),
            student_name: format!("Student {student_id}"),
            hostel_id: hostel_id.to_string(),
        }
    }

    fn student() -> Identity {
        Identity {
            id: "s1".into(),
            name: "Aditya Student".into(),
            email: "student@pu.edu".into(),
            role: Role::Student,
            hostel_id: Some("h1".into()),
        }
    }

    fn persisted(kv: &MemoryKV) -> Vec<Complaint> {
        kv.get_json(COMPLAINTS_KEY).unwrap().unwrap()
    }

    #[test]
    fn empty_collection_is_persisted_on_first_open() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);

        assert!(store.get_all_complaints().is_empty());
        assert_eq!(kv.get(COMPLAINTS_KEY).unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn malformed_collection_is_reset() {
        let kv = Arc::new(MemoryKV::new());
        kv.set(COMPLAINTS_KEY, b"[{\"id\":").unwrap();

        let store = open(&kv);
        assert!(store.get_all_complaints().is_empty());
        assert!(persisted(&kv).is_empty());
    }

    #[test]
    fn add_assigns_id_timestamp_and_pending() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);

        let before = Utc::now();
        let c = store.add_complaint(input("Leaky faucet", "s1", "h1")).unwrap();

        assert!(c.id.starts_with("complaint-"));
        assert_eq!(c.status, ComplaintStatus::Pending);
        assert!(c.created_at >= before);
        assert!(c.updated_at.is_none());
        assert!(c.comments.is_none());
        assert_eq!(persisted(&kv), vec![c]);
    }

    #[test]
    fn rapid_creations_get_unique_ids_in_order() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);

        let titles: Vec<String> = (0..50).map(|i| format!("complaint {i}")).collect();
        for t in &titles {
            store.add_complaint(input(t, "s1", "h1")).unwrap();
        }

        let all = store.get_all_complaints();
        assert_eq!(all.len(), 50);
        assert!(all.iter().all(|c| c.status == ComplaintStatus::Pending));

        let ids: HashSet<&str> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 50);

        let got: Vec<&str> = all.iter().map(|c| c.title.as_str()).collect();
        let want: Vec<&str> = titles.iter().map(String::as_str).collect();
        assert_eq!(got, want);
        assert_eq!(persisted(&kv), all);
    }

    #[test]
    fn queries_filter_in_insertion_order() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);
        store.add_complaint(input("a", "s1", "h1")).unwrap();
        store.add_complaint(input("b", "s2", "h1")).unwrap();
        store.add_complaint(input("c", "s1", "h2")).unwrap();

        let titles = |v: Vec<Complaint>| v.into_iter().map(|c| c.title).collect::<Vec<_>>();
        assert_eq!(titles(store.get_student_complaints("s1")), vec!["a", "c"]);
        assert_eq!(titles(store.get_student_complaints("s2")), vec!["b"]);
        assert!(store.get_student_complaints("s3").is_empty());
        assert_eq!(titles(store.get_hostel_complaints("h1")), vec!["a", "b"]);
        assert_eq!(titles(store.get_hostel_complaints("h2")), vec!["c"]);
        assert!(store.get_hostel_complaints("h9").is_empty());
        assert_eq!(titles(store.get_all_complaints()), vec!["a", "b", "c"]);
    }

    #[test]
    fn repeated_queries_are_equal() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);
        store.add_complaint(input("a", "s1", "h1")).unwrap();
        store.add_complaint(input("b", "s1", "h1")).unwrap();

        assert_eq!(
            store.get_student_complaints("s1"),
            store.get_student_complaints("s1")
        );
    }

    #[test]
    fn update_changes_status_and_keeps_identity_fields() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);
        let original = store.add_complaint(input("a", "s1", "h1")).unwrap();

        let updated = store
            .update_complaint_status(&original.id, ComplaintStatus::Rejected, Some("Duplicate"))
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, ComplaintStatus::Rejected);
        assert_eq!(updated.comments.as_deref(), Some("Duplicate"));
        assert!(updated.updated_at.unwrap() >= original.created_at);
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.student_id, original.student_id);
        assert_eq!(persisted(&kv), vec![updated]);
    }

    #[test]
    fn update_without_comments_keeps_previous_comments() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);
        let c = store.add_complaint(input("a", "s1", "h1")).unwrap();

        store
            .update_complaint_status(&c.id, ComplaintStatus::Rejected, Some("Wrong room"))
            .unwrap();
        let after_none = store
            .update_complaint_status(&c.id, ComplaintStatus::Resolved, None)
            .unwrap()
            .unwrap();
        assert_eq!(after_none.status, ComplaintStatus::Resolved);
        assert_eq!(after_none.comments.as_deref(), Some("Wrong room"));

        let after_empty = store
            .update_complaint_status(&c.id, ComplaintStatus::Resolved, Some(""))
            .unwrap()
            .unwrap();
        assert_eq!(after_empty.comments.as_deref(), Some("Wrong room"));
    }

    #[test]
    fn update_of_unknown_id_is_a_silent_noop() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);
        store.add_complaint(input("a", "s1", "h1")).unwrap();
        store.add_complaint(input("b", "s2", "h1")).unwrap();
        let before = store.complaints();
        let stored_before = kv.get(COMPLAINTS_KEY).unwrap();

        let result = store
            .update_complaint_status("complaint-missing", ComplaintStatus::Resolved, Some("x"))
            .unwrap();

        assert!(result.is_none());
        assert!(Arc::ptr_eq(&before, &store.complaints()));
        assert_eq!(kv.get(COMPLAINTS_KEY).unwrap(), stored_before);
    }

    #[test]
    fn update_back_to_pending_is_ignored() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);
        let c = store.add_complaint(input("a", "s1", "h1")).unwrap();
        store
            .update_complaint_status(&c.id, ComplaintStatus::Resolved, None)
            .unwrap();

        let result = store
            .update_complaint_status(&c.id, ComplaintStatus::Pending, None)
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.get_all_complaints()[0].status, ComplaintStatus::Resolved);
    }

    #[test]
    fn earlier_snapshots_are_never_modified() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);
        let c = store.add_complaint(input("a", "s1", "h1")).unwrap();
        let snapshot = store.complaints();

        store
            .update_complaint_status(&c.id, ComplaintStatus::Resolved, Some("Done"))
            .unwrap();

        assert_eq!(snapshot[0].status, ComplaintStatus::Pending);
        assert!(snapshot[0].updated_at.is_none());
        assert!(!Arc::ptr_eq(&snapshot, &store.complaints()));
    }

    #[test]
    fn collection_survives_reopen() {
        let kv = Arc::new(MemoryKV::new());
        let before = {
            let store = open(&kv);
            let a = store.add_complaint(input("a", "s1", "h1")).unwrap();
            store.add_complaint(input("b", "s2", "h2")).unwrap();
            store
                .update_complaint_status(&a.id, ComplaintStatus::Resolved, Some("Fixed"))
                .unwrap();
            store.get_all_complaints()
        };

        let store = open(&kv);
        assert_eq!(store.get_all_complaints(), before);
    }

    #[test]
    fn status_views() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);
        let a = store.add_complaint(input("a", "s1", "h1")).unwrap();
        let b = store.add_complaint(input("b", "s1", "h1")).unwrap();
        store.add_complaint(input("c", "s1", "h1")).unwrap();
        store
            .update_complaint_status(&a.id, ComplaintStatus::Resolved, None)
            .unwrap();
        store
            .update_complaint_status(&b.id, ComplaintStatus::Rejected, None)
            .unwrap();

        assert_eq!(
            store.status_counts(),
            StatusCounts {
                pending: 1,
                resolved: 1,
                rejected: 1
            }
        );
        let pending = store.get_complaints_by_status(ComplaintStatus::Pending);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "c");
    }

    #[tokio::test]
    async fn submit_fills_owner_from_identity() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);
        let form = ComplaintForm {
            title: "Leaky faucet".into(),
            description: "Drips".into(),
            category: "plumbing".into(),
            room_number: "204".into(),
        };

        let c = store.submit(Some(&student()), form).await.unwrap().unwrap();
        assert_eq!(c.student_id, "s1");
        assert_eq!(c.student_name, "Aditya Student");
        assert_eq!(c.hostel_id, "h1");
        assert!(!store.is_submitting());
    }

    #[tokio::test]
    async fn submit_without_identity_does_nothing() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);

        let result = store.submit(None, ComplaintForm::default()).await.unwrap();
        assert!(result.is_none());
        assert!(store.get_all_complaints().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submitting_flag_is_raised_during_the_delay() {
        let kv = Arc::new(MemoryKV::new());
        let state = Arc::new(StateStore::new());
        let config = HostelConfig {
            submit_delay_ms: 500,
            ..HostelConfig::headless()
        };
        let store = Arc::new(ComplaintStore::new(kv.clone(), state.clone(), &config).unwrap());

        let store_c = store.clone();
        let handle = tokio::spawn(async move {
            store_c
                .submit(Some(&student()), ComplaintForm::default())
                .await
        });
        tokio::task::yield_now().await;

        assert!(store.is_submitting());
        assert_eq!(state.get_as::<bool>(COMPLAINTS_SUBMITTING), Some(true));
        assert!(store.get_all_complaints().is_empty());

        handle.await.unwrap().unwrap().unwrap();
        assert!(!store.is_submitting());
        assert_eq!(state.get_as::<bool>(COMPLAINTS_SUBMITTING), Some(false));
        assert_eq!(store.get_all_complaints().len(), 1);
    }

    #[tokio::test]
    async fn review_applies_status_update() {
        let kv = Arc::new(MemoryKV::new());
        let store = open(&kv);
        let c = store.add_complaint(input("a", "s1", "h1")).unwrap();

        let reviewed = store
            .review(&c.id, ComplaintStatus::Resolved, Some("Fixed by plumber"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reviewed.status, ComplaintStatus::Resolved);
        assert!(!store.is_updating());

        let missing = store
            .review("nope", ComplaintStatus::Rejected, None)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn publishes_each_new_snapshot() {
        let kv = Arc::new(MemoryKV::new());
        let state = Arc::new(StateStore::new());
        let store =
            ComplaintStore::new(kv.clone(), state.clone(), &HostelConfig::headless()).unwrap();

        let published = |state: &StateStore| {
            state
                .get_as::<Arc<Vec<Complaint>>>(COMPLAINTS_ITEMS)
                .unwrap()
        };
        assert!(published(&state).is_empty());

        store.add_complaint(input("a", "s1", "h1")).unwrap();
        assert!(Arc::ptr_eq(&published(&state), &store.complaints()));
        assert_eq!(published(&state).len(), 1);
    }

    #[test]
    fn concurrent_mutations_publish_the_current_snapshot() {
        let kv = Arc::new(MemoryKV::new());
        let state = Arc::new(StateStore::new());
        let store =
            ComplaintStore::new(kv.clone(), state.clone(), &HostelConfig::headless()).unwrap();

        std::thread::scope(|s| {
            for t in 0..8 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..10 {
                        let c = store
                            .add_complaint(input(&format!("t{t}-{i}"), "s1", "h1"))
                            .unwrap();
                        if i % 3 == 0 {
                            store
                                .update_complaint_status(&c.id, ComplaintStatus::Resolved, None)
                                .unwrap();
                        }
                    }
                });
            }
        });

        let current = store.complaints();
        let published = state
            .get_as::<Arc<Vec<Complaint>>>(COMPLAINTS_ITEMS)
            .unwrap();
        assert!(Arc::ptr_eq(&published, &current));
        assert_eq!(current.len(), 80);

        let persisted: Vec<Complaint> = kv.get_json(COMPLAINTS_KEY).unwrap().unwrap();
        assert_eq!(persisted, *current);
    }
}
