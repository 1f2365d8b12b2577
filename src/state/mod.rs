pub mod draw_cache;

pub use draw_cache::DrawCache;
