pub mod branch;
pub(crate) mod command_adapter;
pub mod command_runner;
pub mod config;
pub mod git;
pub mod names;
#[cfg(test)]
pub(crate) mod test_support;
