mod model;
mod repository;

pub use model::AssetDB;
pub use repository::AssetRepository;
