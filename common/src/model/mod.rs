pub mod activity;
pub mod area;
pub mod customer;
pub mod document;
pub mod import;
pub mod interruption;
pub mod notice;
pub mod personnel;
