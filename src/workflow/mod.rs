pub mod branches;
pub mod commits;
pub mod history;
pub mod keep;
pub mod links;
pub mod move_links;
pub mod reconcile;
pub mod release;
pub mod report;
pub mod status;

#[cfg(test)]
pub mod testing;
