pub mod auth_handler;
pub mod admin_handler;
pub mod clinical_handler;
pub mod appointment_handler;
