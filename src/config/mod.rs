// ==========================================
// Tiffin 配送订单后台 - 配置层
// ==========================================
// 职责: 运营配置（默认单价等）的读写
// ==========================================

pub mod config_manager;

pub use config_manager::ConfigManager;
