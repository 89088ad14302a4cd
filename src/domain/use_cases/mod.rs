pub mod admin;
pub mod assistant;
pub mod auth;
pub mod directory;
pub mod extractors;
pub mod profile;
pub mod prompts;
pub mod resume;

#[cfg(test)]
pub mod test_support;
