pub mod bots;
pub mod operations;
pub mod signal_group_signals;
pub mod signal_groups;
pub mod signals;
pub mod trading_settings;
