pub mod history;
pub mod logic;
pub mod session;

pub use history::HistoryStore;
pub use session::{LoadTicket, PreprocessSession, Recording};
