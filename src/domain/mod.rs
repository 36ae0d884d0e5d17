pub mod branch;
pub mod commit;
pub mod ticket;
