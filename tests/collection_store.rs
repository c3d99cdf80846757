//! End-to-end tests for collection stores over a fake remote
//!
//! These tests drive the full load/mutate cycle of the stores against the
//! in-memory backend plus a couple of scripted fakes, and assert on both
//! the returned values and the mirror left behind.

use async_trait::async_trait;
use serde_json::{Value, json};
use staysync::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// Scripted Remotes
// =============================================================================

/// Remote that fails every call with a fixed error
struct BrokenRemote {
    error: RemoteError,
    ping_ok: bool,
}

impl BrokenRemote {
    fn new(error: RemoteError) -> Self {
        Self {
            error,
            ping_ok: true,
        }
    }

    fn unreachable() -> Self {
        Self {
            error: RemoteError::message("failed to connect to host"),
            ping_ok: false,
        }
    }
}

#[async_trait]
impl RemoteStore for BrokenRemote {
    async fn list_all(&self, _table: &str, _shape: Option<&str>) -> Result<Vec<Value>, RemoteError> {
        Err(self.error.clone())
    }

    async fn insert(
        &self,
        _table: &str,
        _record: Value,
        _shape: Option<&str>,
    ) -> Result<Value, RemoteError> {
        Err(self.error.clone())
    }

    async fn update(
        &self,
        _table: &str,
        _id: Uuid,
        _patch: Value,
        _shape: Option<&str>,
    ) -> Result<Value, RemoteError> {
        Err(self.error.clone())
    }

    async fn delete(&self, _table: &str, _id: Uuid) -> Result<(), RemoteError> {
        Err(self.error.clone())
    }

    async fn call_procedure(&self, _name: &str, _args: Value) -> Result<Value, RemoteError> {
        Err(self.error.clone())
    }

    async fn ping(&self, _table: &str) -> Result<(), RemoteError> {
        if self.ping_ok {
            Ok(())
        } else {
            Err(self.error.clone())
        }
    }
}

/// Wrapper counting list and insert calls on an inner remote
struct CountingRemote {
    inner: InMemoryRemote,
    lists: AtomicUsize,
    inserts: AtomicUsize,
}

impl CountingRemote {
    fn new(inner: InMemoryRemote) -> Self {
        Self {
            inner,
            lists: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RemoteStore for CountingRemote {
    async fn list_all(&self, table: &str, shape: Option<&str>) -> Result<Vec<Value>, RemoteError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_all(table, shape).await
    }

    async fn insert(
        &self,
        table: &str,
        record: Value,
        shape: Option<&str>,
    ) -> Result<Value, RemoteError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(table, record, shape).await
    }

    async fn update(
        &self,
        table: &str,
        id: Uuid,
        patch: Value,
        shape: Option<&str>,
    ) -> Result<Value, RemoteError> {
        self.inner.update(table, id, patch, shape).await
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<(), RemoteError> {
        self.inner.delete(table, id).await
    }

    async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, RemoteError> {
        self.inner.call_procedure(name, args).await
    }

    async fn ping(&self, table: &str) -> Result<(), RemoteError> {
        self.inner.ping(table).await
    }
}

/// Remote that answers the booking procedures and nothing else
struct ProcedureRemote;

#[async_trait]
impl RemoteStore for ProcedureRemote {
    async fn list_all(&self, _table: &str, _shape: Option<&str>) -> Result<Vec<Value>, RemoteError> {
        Ok(vec![])
    }

    async fn insert(
        &self,
        _table: &str,
        _record: Value,
        _shape: Option<&str>,
    ) -> Result<Value, RemoteError> {
        Err(RemoteError::with_status("not supported", 400))
    }

    async fn update(
        &self,
        _table: &str,
        _id: Uuid,
        _patch: Value,
        _shape: Option<&str>,
    ) -> Result<Value, RemoteError> {
        Err(RemoteError::with_status("not supported", 400))
    }

    async fn delete(&self, _table: &str, _id: Uuid) -> Result<(), RemoteError> {
        Err(RemoteError::with_status("not supported", 400))
    }

    async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, RemoteError> {
        match name {
            "check_room_availability" => {
                // Booked solid in september, free otherwise
                let free = args["check_in_date"]
                    .as_str()
                    .map(|d| !d.starts_with("2026-09"))
                    .unwrap_or(false);
                Ok(json!(free))
            }
            "calculate_booking_total" => Ok(json!(540.0)),
            other => Err(RemoteError::with_status(
                format!("unknown procedure '{}'", other),
                404,
            )),
        }
    }

    async fn ping(&self, _table: &str) -> Result<(), RemoteError> {
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn room_row(id: Uuid, number: &str) -> Value {
    json!({
        "id": id.to_string(),
        "number": number,
        "type": "standard",
        "status": "available",
        "rate": 120.0,
    })
}

fn new_room(number: &str) -> NewRoom {
    NewRoom {
        number: number.to_string(),
        room_type: "standard".to_string(),
        status: "available".to_string(),
        rate: dec!(120.0),
        extra: Default::default(),
    }
}

async fn ready_room_store(remote: Arc<dyn RemoteStore>) -> CollectionStore<Room> {
    CollectionStore::activate(remote, EventBus::new(64)).await
}

// =============================================================================
// Load Lifecycle
// =============================================================================

#[tokio::test]
async fn test_load_mirrors_rows_in_returned_order() {
    let remote = InMemoryRemote::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    remote.seed("rooms", vec![room_row(a, "101"), room_row(b, "102")]);

    let store = ready_room_store(Arc::new(remote)).await;

    let data = store.snapshot().data.unwrap();
    assert_eq!(data.iter().map(Room::id).collect::<Vec<_>>(), vec![a, b]);
}

#[tokio::test]
async fn test_load_runs_once_even_when_called_again() {
    let remote = Arc::new(CountingRemote::new(InMemoryRemote::new()));
    let store = CollectionStore::<Room>::new(remote.clone(), EventBus::new(64));

    store.load().await;
    store.load().await;

    assert_eq!(remote.lists.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_load_surfaces_error_and_no_data() {
    let remote = Arc::new(BrokenRemote::new(RemoteError::with_status("boom", 500)));
    let store = CollectionStore::<Room>::new(remote, EventBus::new(64));

    let snap = store.load().await;

    assert!(snap.is_error);
    assert!(!snap.is_loading);
    assert!(snap.data.is_none());
    assert_eq!(snap.error.unwrap().kind(), ErrorKind::Server);
}

#[tokio::test]
async fn test_failed_load_is_terminal() {
    let remote = Arc::new(BrokenRemote::new(RemoteError::with_status("boom", 500)));
    let store = CollectionStore::<Room>::new(remote, EventBus::new(64));

    store.load().await;
    let snap = store.load().await;

    // No retry: the second call reports the same failed state
    assert!(snap.is_error);
}

// =============================================================================
// Mutations and the Mirror
// =============================================================================

#[tokio::test]
async fn test_add_prepends_newest_first() {
    let remote = InMemoryRemote::new();
    let existing = Uuid::new_v4();
    remote.seed("rooms", vec![room_row(existing, "101")]);
    let store = ready_room_store(Arc::new(remote)).await;

    let created = store.add(new_room("102")).await.unwrap();

    let data = store.snapshot().data.unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0].id, created.id);
    assert_eq!(data[1].id, existing);
}

#[tokio::test]
async fn test_update_replaces_in_place() {
    let remote = InMemoryRemote::new();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    remote.seed(
        "rooms",
        vec![room_row(a, "101"), room_row(b, "102"), room_row(c, "103")],
    );
    let store = ready_room_store(Arc::new(remote)).await;

    let updated = store
        .update(
            b,
            RoomPatch {
                status: Some("maintenance".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "maintenance");

    let data = store.snapshot().data.unwrap();
    assert_eq!(data.iter().map(Room::id).collect::<Vec<_>>(), vec![a, b, c]);
    assert_eq!(data[1].status, "maintenance");
    assert_eq!(data[0].status, "available");
}

#[tokio::test]
async fn test_remove_drops_only_the_matching_row() {
    let remote = InMemoryRemote::new();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    remote.seed(
        "rooms",
        vec![room_row(a, "101"), room_row(b, "102"), room_row(c, "103")],
    );
    let store = ready_room_store(Arc::new(remote)).await;

    store.remove(b).await.unwrap();

    let data = store.snapshot().data.unwrap();
    assert_eq!(data.iter().map(Room::id).collect::<Vec<_>>(), vec![a, c]);
}

#[tokio::test]
async fn test_failed_mutation_leaves_mirror_untouched() {
    let remote = InMemoryRemote::new();
    let existing = Uuid::new_v4();
    remote.seed("rooms", vec![room_row(existing, "101")]);
    let store = ready_room_store(Arc::new(remote.clone())).await;

    // Updating an id the backend does not know rejects with 404
    let err = store
        .update(Uuid::new_v4(), RoomPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Remote(_)));

    let data = store.snapshot().data.unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].id, existing);
}

#[tokio::test]
async fn test_every_failed_mutation_kind_leaves_mirror_untouched() {
    // Reads work, writes are rejected: the mirror must survive a failed
    // add, update and remove without any change
    struct WriteBrokenRemote(InMemoryRemote);

    #[async_trait]
    impl RemoteStore for WriteBrokenRemote {
        async fn list_all(
            &self,
            table: &str,
            shape: Option<&str>,
        ) -> Result<Vec<Value>, RemoteError> {
            self.0.list_all(table, shape).await
        }
        async fn insert(
            &self,
            _table: &str,
            _record: Value,
            _shape: Option<&str>,
        ) -> Result<Value, RemoteError> {
            Err(RemoteError::with_status("read only", 503))
        }
        async fn update(
            &self,
            _table: &str,
            _id: Uuid,
            _patch: Value,
            _shape: Option<&str>,
        ) -> Result<Value, RemoteError> {
            Err(RemoteError::with_status("read only", 503))
        }
        async fn delete(&self, _table: &str, _id: Uuid) -> Result<(), RemoteError> {
            Err(RemoteError::with_status("read only", 503))
        }
        async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, RemoteError> {
            self.0.call_procedure(name, args).await
        }
        async fn ping(&self, table: &str) -> Result<(), RemoteError> {
            self.0.ping(table).await
        }
    }

    let inner = InMemoryRemote::new();
    let existing = Uuid::new_v4();
    inner.seed("rooms", vec![room_row(existing, "101")]);
    let store = ready_room_store(Arc::new(WriteBrokenRemote(inner))).await;
    let before = store.snapshot().data.unwrap();

    store.add(new_room("102")).await.unwrap_err();
    store
        .update(existing, RoomPatch::default())
        .await
        .unwrap_err();
    store.remove(existing).await.unwrap_err();

    assert_eq!(store.snapshot().data.unwrap(), before);
}

#[tokio::test]
async fn test_add_after_failed_load_starts_a_fresh_mirror() {
    // List is broken, writes work: the failed initial read must not block
    // later inserts from establishing a mirror
    struct ListBrokenRemote(InMemoryRemote);

    #[async_trait]
    impl RemoteStore for ListBrokenRemote {
        async fn list_all(
            &self,
            _table: &str,
            _shape: Option<&str>,
        ) -> Result<Vec<Value>, RemoteError> {
            Err(RemoteError::with_status("read replica down", 503))
        }
        async fn insert(
            &self,
            table: &str,
            record: Value,
            shape: Option<&str>,
        ) -> Result<Value, RemoteError> {
            self.0.insert(table, record, shape).await
        }
        async fn update(
            &self,
            table: &str,
            id: Uuid,
            patch: Value,
            shape: Option<&str>,
        ) -> Result<Value, RemoteError> {
            self.0.update(table, id, patch, shape).await
        }
        async fn delete(&self, table: &str, id: Uuid) -> Result<(), RemoteError> {
            self.0.delete(table, id).await
        }
        async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, RemoteError> {
            self.0.call_procedure(name, args).await
        }
        async fn ping(&self, table: &str) -> Result<(), RemoteError> {
            self.0.ping(table).await
        }
    }

    let store = CollectionStore::<Room>::new(
        Arc::new(ListBrokenRemote(InMemoryRemote::new())),
        EventBus::new(64),
    );
    store.load().await;
    assert!(store.snapshot().is_error);

    let created = store.add(new_room("201")).await.unwrap();

    let snap = store.snapshot();
    assert!(!snap.is_error);
    assert_eq!(snap.data.unwrap(), vec![created]);
}

// =============================================================================
// Validation and Pre-flight
// =============================================================================

#[tokio::test]
async fn test_invalid_guest_never_reaches_the_remote() {
    let remote = Arc::new(CountingRemote::new(InMemoryRemote::new()));
    let store = CollectionStore::<Guest>::new(remote.clone(), EventBus::new(64));
    store.load().await;

    let err = store.add(NewGuest::new("Ana", "")).await.unwrap_err();

    assert!(matches!(err, DataError::Validation(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert_eq!(remote.inserts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_backend_classifies_guest_add_as_connectivity() {
    let store = CollectionStore::<Guest>::new(Arc::new(BrokenRemote::unreachable()), EventBus::new(64));

    let err = store
        .add(NewGuest::new("Ana", "ana@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::Connectivity(_)));
    assert_eq!(err.kind(), ErrorKind::Connectivity);
}

#[tokio::test]
async fn test_room_add_skips_the_preflight_probe() {
    // Rooms do not probe, so a remote whose ping fails but whose insert
    // works still accepts the add
    struct PingLessRemote(InMemoryRemote);

    #[async_trait]
    impl RemoteStore for PingLessRemote {
        async fn list_all(
            &self,
            table: &str,
            shape: Option<&str>,
        ) -> Result<Vec<Value>, RemoteError> {
            self.0.list_all(table, shape).await
        }
        async fn insert(
            &self,
            table: &str,
            record: Value,
            shape: Option<&str>,
        ) -> Result<Value, RemoteError> {
            self.0.insert(table, record, shape).await
        }
        async fn update(
            &self,
            table: &str,
            id: Uuid,
            patch: Value,
            shape: Option<&str>,
        ) -> Result<Value, RemoteError> {
            self.0.update(table, id, patch, shape).await
        }
        async fn delete(&self, table: &str, id: Uuid) -> Result<(), RemoteError> {
            self.0.delete(table, id).await
        }
        async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, RemoteError> {
            self.0.call_procedure(name, args).await
        }
        async fn ping(&self, _table: &str) -> Result<(), RemoteError> {
            Err(RemoteError::message("failed to connect to host"))
        }
    }

    let store = CollectionStore::<Room>::new(
        Arc::new(PingLessRemote(InMemoryRemote::new())),
        EventBus::new(64),
    );
    store.load().await;

    assert!(store.add(new_room("101")).await.is_ok());
}

// =============================================================================
// Remote Procedures
// =============================================================================

#[tokio::test]
async fn test_check_availability_decodes_boolean() {
    let store = CollectionStore::<Booking>::new(Arc::new(ProcedureRemote), EventBus::new(64));

    let busy = store
        .check_availability(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
        )
        .await
        .unwrap();
    let free = store
        .check_availability(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 4).unwrap(),
        )
        .await
        .unwrap();

    assert!(!busy);
    assert!(free);
}

#[tokio::test]
async fn test_calculate_total_decodes_decimal() {
    let store = CollectionStore::<Booking>::new(Arc::new(ProcedureRemote), EventBus::new(64));

    let total = store
        .calculate_total(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(total, dec!(540.0));
}

#[tokio::test]
async fn test_procedure_failure_does_not_touch_the_mirror() {
    let remote = InMemoryRemote::new();
    let booking_id = Uuid::new_v4();
    remote.seed(
        "bookings",
        vec![json!({
            "id": booking_id.to_string(),
            "guest_id": Uuid::new_v4().to_string(),
            "room_id": Uuid::new_v4().to_string(),
            "check_in": "2026-09-01",
            "check_out": "2026-09-04",
        })],
    );
    let store = CollectionStore::<Booking>::activate(Arc::new(remote), EventBus::new(64)).await;

    let err = store
        .check_availability(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Remote(_)));

    let data = store.snapshot().data.unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].id, booking_id);
}

// =============================================================================
// Cross-entity Scenario
// =============================================================================

#[tokio::test]
async fn test_booking_flow_over_shared_remote() {
    let remote = InMemoryRemote::new();
    let shared: Arc<dyn RemoteStore> = Arc::new(remote.clone());
    let events = EventBus::new(64);

    let rooms = CollectionStore::<Room>::activate(shared.clone(), events.clone()).await;
    let guests = CollectionStore::<Guest>::activate(shared.clone(), events.clone()).await;
    let bookings = CollectionStore::<Booking>::activate(shared.clone(), events.clone()).await;

    let room = rooms.add(new_room("301")).await.unwrap();
    let guest = guests
        .add(NewGuest::new("Ana", "ana@example.com"))
        .await
        .unwrap();
    let booking = bookings
        .add(NewBooking {
            guest_id: guest.id,
            room_id: room.id,
            check_in: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            total_amount: Some(dec!(360.0)),
            status: Some("confirmed".to_string()),
            extra: Default::default(),
        })
        .await
        .unwrap();

    assert_eq!(booking.guest_id, guest.id);
    assert_eq!(remote.len("bookings"), 1);

    bookings.remove(booking.id).await.unwrap();
    assert!(bookings.snapshot().data.unwrap().is_empty());
    assert!(remote.is_empty("bookings"));
}
