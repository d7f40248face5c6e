pub mod user_dto;
pub mod auth_dto;
pub mod admin_dto;
pub mod clinical_dto;
pub mod appointment_dto;
