//! Headless view-models for the sidebar and the main chat panel.

pub mod breach;
pub mod chat_panel;
pub mod sidebar;

pub use chat_panel::{ChatPanel, PanelView, SendOutcome};
pub use sidebar::{Sidebar, SidebarItem};
