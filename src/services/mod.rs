//! Bulk upload pipeline services

pub mod credentials;
pub mod csv_decoder;
pub mod profile_schema;
pub mod reconciler;
pub mod row_transformer;
pub mod section_rules;
pub mod upload_client;
pub mod upload_history;
