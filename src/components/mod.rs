pub mod history;
pub mod toolbar;
