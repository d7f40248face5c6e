pub mod auth_service;
pub mod admin_service;
pub mod clinical_service;
pub mod appointment_service;
