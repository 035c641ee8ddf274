pub mod stores;

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod hierarchy_repo;
pub use hierarchy_repo::HierarchyRepository;
pub mod assignment_repo;
pub use assignment_repo::AssignmentRepository;
pub mod asset_repo;
pub use asset_repo::AssetRepository;
pub mod transfer_repo;
pub use transfer_repo::TransferRepository;

// Stores em memória para os testes dos serviços
#[cfg(test)]
pub mod memory;
