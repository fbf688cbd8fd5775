//! Record store for the hospital engine.
//!
//! [`RecordStore`] covers patients, doctors, nurses, aides, rooms, SIP
//! numbers and medications. Two backends implement it:
//! [`InMemoryRecordStore`] for local runs and tests, and [`PgRecordStore`]
//! on PostgreSQL. [`RecordCredentialStore`] exposes the three identity
//! stores to the auth gate.

pub mod connection;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use connection::{connect, is_healthy};
pub use credentials::RecordCredentialStore;
pub use error::{DatabaseError, DatabaseResult};
pub use memory::InMemoryRecordStore;
pub use models::{Aide, Condition, Medication, Patient, Room, Sip, StaffKind, StaffMember};
pub use postgres::PgRecordStore;
pub use repository::RecordStore;
