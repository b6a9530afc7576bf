pub mod activity;
pub mod faqs;
pub mod flags;
pub mod reviews;
pub mod tickets;
