pub mod controller;
pub mod illustration_pass;
pub mod state;
pub mod store;

pub use controller::WorkbookController;
pub use illustration_pass::{IllustrationJob, PassSummary};
pub use state::{AppState, SessionId, WorkflowStage};
pub use store::AppStore;
