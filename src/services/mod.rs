pub mod identity;
pub mod mailer;
pub mod store;
