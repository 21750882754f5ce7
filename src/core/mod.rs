pub mod credentials;
pub mod documents;
pub mod email;
pub mod errors;
pub mod matcher;
pub mod models;
pub mod services;
pub mod traits;
