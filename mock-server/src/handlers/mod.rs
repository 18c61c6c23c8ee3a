pub mod account;
pub mod attachment;
pub mod auth;
pub mod contact;
pub mod mail;
