pub mod faq;
pub mod flagged_content;
pub mod support_activity;
pub mod ticket;
pub mod ticket_response;
pub mod user_feedback;
