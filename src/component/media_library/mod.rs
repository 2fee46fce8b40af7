//! 媒體清單元件
//!
//! 啟動時依命令列檔案建立，之後唯讀，以位置索引供 HTTP 層查詢

mod main;

pub use main::{MediaEntry, MediaLibrary};
