mod models;
mod store;

pub use store::MongoThreadStore;
