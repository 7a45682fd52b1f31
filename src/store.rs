//! In-memory store for the server side state of open forms.
//!
//! Every page load that shows an editable row list creates a form session.
//! Sessions live in a bounded store, the oldest session is evicted once the
//! store is full.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The default number of form sessions kept per page type.
pub const DEFAULT_SESSION_CAPACITY: usize = 256;

/// A form store shared between request handlers.
pub type SharedFormStore<T> = Arc<Mutex<FormStore<T>>>;

/// Lock `store`, logging a poisoned lock.
pub fn lock_forms<T>(store: &Mutex<FormStore<T>>) -> Result<MutexGuard<'_, FormStore<T>>, Error> {
    store.lock().map_err(|error| {
        tracing::error!("could not acquire form store lock: {error}");
        Error::FormStoreLockError
    })
}

/// Run `f` on the form of session `id` while holding the store lock.
///
/// `f` must not block, the lock is shared by every open form of the page.
pub fn with_form<T, R>(
    store: &Mutex<FormStore<T>>,
    id: FormId,
    f: impl FnOnce(&mut T) -> Result<R, Error>,
) -> Result<R, Error> {
    let mut forms = lock_forms(store)?;
    let form = forms.get_mut(id).ok_or(Error::UnknownForm(id))?;

    f(form)
}

/// Identifies one form session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(u64);

impl FormId {
    /// Wrap a raw ID, e.g. one parsed from a URL.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct FormSession<T> {
    form: T,
    in_flight: Arc<AtomicBool>,
}

/// Holds the open forms of one page type.
#[derive(Debug)]
pub struct FormStore<T> {
    sessions: HashMap<FormId, FormSession<T>>,
    order: VecDeque<FormId>,
    next_id: u64,
    capacity: usize,
}

impl<T> FormStore<T> {
    /// Create an empty store that keeps at most `capacity` sessions.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            order: VecDeque::new(),
            next_id: 1,
            capacity: capacity.max(1),
        }
    }

    /// Open a new session for `form` and return its ID.
    pub fn insert(&mut self, form: T) -> FormId {
        while self.sessions.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };

            if self.sessions.remove(&oldest).is_some() {
                tracing::debug!("evicted form session {oldest}");
            }
        }

        let id = FormId(self.next_id);
        self.next_id += 1;

        self.sessions.insert(
            id,
            FormSession {
                form,
                in_flight: Arc::new(AtomicBool::new(false)),
            },
        );
        self.order.push_back(id);

        id
    }

    /// Get the form of session `id`.
    pub fn get(&self, id: FormId) -> Option<&T> {
        self.sessions.get(&id).map(|session| &session.form)
    }

    /// Get the form of session `id` for editing.
    pub fn get_mut(&mut self, id: FormId) -> Option<&mut T> {
        self.sessions.get_mut(&id).map(|session| &mut session.form)
    }

    /// Close session `id`, returning its form.
    pub fn remove(&mut self, id: FormId) -> Option<T> {
        self.order.retain(|other| *other != id);
        self.sessions.remove(&id).map(|session| session.form)
    }

    /// The number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no open sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Mark session `id` as submitting.
    ///
    /// The mark is cleared when the returned guard is dropped, so the guard
    /// must be kept alive until the backend has answered. The store itself
    /// does not need to be locked at that point.
    ///
    /// # Errors
    /// Returns [Error::UnknownForm] if the session does not exist and
    /// [Error::SubmissionInProgress] if the form is already being submitted.
    pub fn begin_submission(&self, id: FormId) -> Result<SubmissionGuard, Error> {
        let session = self.sessions.get(&id).ok_or(Error::UnknownForm(id))?;

        if session
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::SubmissionInProgress);
        }

        Ok(SubmissionGuard {
            in_flight: session.in_flight.clone(),
        })
    }
}

/// Marks a form as being submitted until dropped.
#[derive(Debug)]
pub struct SubmissionGuard {
    in_flight: Arc<AtomicBool>,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::Error;

    use super::{FormId, FormStore, with_form};

    #[test]
    fn with_form_edits_in_place() {
        let store = Mutex::new(FormStore::new(4));
        let id = store.lock().unwrap().insert(vec![1]);

        let len = with_form(&store, id, |form: &mut Vec<i32>| {
            form.push(2);
            Ok(form.len())
        })
        .unwrap();

        assert_eq!(len, 2);
        assert_eq!(
            with_form(&store, FormId(99), |_: &mut Vec<i32>| Ok(())).unwrap_err(),
            Error::UnknownForm(FormId(99))
        );
    }

    #[test]
    fn evicts_oldest_session_when_full() {
        let mut store = FormStore::new(2);
        let first = store.insert("first");
        let second = store.insert("second");
        let third = store.insert("third");

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(first), None);
        assert_eq!(store.get(second), Some(&"second"));
        assert_eq!(store.get(third), Some(&"third"));
    }

    #[test]
    fn removed_sessions_do_not_count_towards_capacity() {
        let mut store = FormStore::new(2);
        let first = store.insert(1);
        let second = store.insert(2);
        store.remove(first);
        let third = store.insert(3);

        assert_eq!(store.get(second), Some(&2));
        assert_eq!(store.get(third), Some(&3));
    }

    #[test]
    fn second_submission_is_rejected_while_first_is_pending() {
        let mut store = FormStore::new(4);
        let id = store.insert(());

        let guard = store.begin_submission(id).unwrap();
        assert_eq!(
            store.begin_submission(id).unwrap_err(),
            Error::SubmissionInProgress
        );

        drop(guard);
        assert!(store.begin_submission(id).is_ok());
    }

    #[test]
    fn submission_of_unknown_form_fails() {
        let store: FormStore<()> = FormStore::new(4);
        let id = FormId(42);

        assert_eq!(
            store.begin_submission(id).unwrap_err(),
            Error::UnknownForm(id)
        );
    }
}
