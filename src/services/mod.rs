pub mod poller;
pub mod render;
pub mod state;
pub mod terminal;

pub use poller::{CommitPolicy, PollerHandle, SupplyPoller};
pub use state::ViewState;
pub use terminal::TerminalView;
