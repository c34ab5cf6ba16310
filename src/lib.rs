//! foodbuddy: 영수증 OCR과 AI 리뷰 작성 클라이언트

pub mod api;
pub mod cache;
pub mod capture;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod imaging;
pub mod interactive;
pub mod logging;
pub mod maps;
pub mod share;
pub mod store;

pub use error::{FoodBuddyError, Result};
