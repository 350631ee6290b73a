//! Domain core of the campus administration service.
//!
//! - [`hostel`]: room allocation rules over room and student snapshots.
//! - [`attendance`]: per class and date attendance sheets and their summaries.
//! - [`admission`]: admission applications and their one-time review.
//! - [`fee`] and [`exam`]: fee payments and exam results, recorded as entered.
//! - [`analytics`]: campus-wide totals over all of the above.
//! - [`store`]: the persistence surface the ledgers need, with [`memory::InMemoryStore`] as
//!   the in-process implementation.
//! - [`ledger`]: the services that apply the rules against a store.

pub mod admission;
pub mod analytics;
pub mod attendance;
pub mod error;
pub mod exam;
pub mod fee;
pub mod hostel;
pub mod ids;
pub mod ledger;
pub mod memory;
pub mod store;

pub use error::{
    AdmissionError, AllocationError, AttendanceError, ExamError, FeeError, StoreError,
};
pub use ids::{AdmissionId, ClassId, ExamResultId, FeeId, RoomId, StudentId};
pub use ledger::{
    AdmissionLedger, AnalyticsLedger, AttendanceLedger, AttendanceOverview, ExamLedger,
    FeeLedger, HostelLedger,
};
pub use memory::{Fixtures, InMemoryStore};
pub use store::{AdmissionStore, AttendanceStore, CampusStore, ExamStore, FeeStore, HostelStore};
