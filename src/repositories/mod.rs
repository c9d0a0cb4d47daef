pub mod credential_store;
pub mod memory_store;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use credential_store::CredentialStore;
pub use memory_store::MemoryUserStore;
pub use user_repository::UserRepository;
