pub mod container;
pub mod error;
pub mod event_scheduler;
pub mod process;
pub mod types;

#[cfg(test)]
mod tests;
