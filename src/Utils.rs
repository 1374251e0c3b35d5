/// reading the ammonia column of a CSV dataset
pub mod load_from_file;
/// simplelog setup
pub mod logger;
