pub mod audit;
pub mod init;
pub mod knowledge;
pub mod levels;
pub mod recipe;
pub mod resolve;
pub mod validate;
