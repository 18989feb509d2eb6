// Application layer - Use cases over the repository
pub mod dashboard_service;
pub mod error;
pub mod fountain_service;
pub mod observation_repository;
pub mod observation_service;
