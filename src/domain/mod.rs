pub mod directory;
pub mod entities;
pub mod password;
pub mod use_cases;
