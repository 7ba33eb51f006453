pub mod acquisition_service;
pub mod batch_service;
pub mod insights_service;
pub mod job_sources;
pub mod job_store_service;
pub mod match_service;
pub mod normalizer;
pub mod profile_service;
