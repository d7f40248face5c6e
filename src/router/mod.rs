pub mod auth_router;
pub mod admin_router;
pub mod clinical_router;
pub mod appointment_router;
