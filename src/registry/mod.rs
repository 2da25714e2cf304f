pub mod contact;
pub mod credential;
pub mod member;
pub mod roster;
pub mod service_token;
