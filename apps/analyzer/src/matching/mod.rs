pub mod engine;
pub mod requirements;
pub mod response;
pub mod scoring;
