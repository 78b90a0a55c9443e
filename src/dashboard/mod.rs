mod client;
pub mod layout;
pub mod payload;
mod runner;
pub mod state;

pub use client::InsightClient;
pub use layout::{DashboardLayout, Dispatch, InsightPanel, InsightTab};
pub use runner::{run_dashboard, DashboardReport, DashboardTotals, RunOptions};
pub use state::{CompletionLatch, DashboardState, ErrorTable, PanelState};
