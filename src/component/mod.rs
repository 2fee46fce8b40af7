pub mod media_library;
pub mod thumbnail_generator;
