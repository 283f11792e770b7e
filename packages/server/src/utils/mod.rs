pub mod data_uri;
pub mod hash;
pub mod jwt;
