//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod feacn_repo;
pub mod key_word_repo;
pub mod parcel_repo;
pub mod register_repo;
pub mod stop_word_repo;

pub use feacn_repo::FeacnRepo;
pub use key_word_repo::KeyWordRepo;
pub use parcel_repo::ParcelRepo;
pub use register_repo::RegisterRepo;
pub use stop_word_repo::StopWordRepo;
