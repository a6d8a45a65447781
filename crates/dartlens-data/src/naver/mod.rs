//! Naver search API access.

pub mod news;

pub use news::{NaverConfig, NaverNewsClient, NewsCollection, NewsItem};
