// Domain layer - Pure models and the projection engine
pub mod chart;
pub mod dashboard;
pub mod fountain;
pub mod observation;
pub mod projection;
pub mod scan;
