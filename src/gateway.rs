pub mod events;
pub mod factory;
pub mod google;
pub mod logs;
pub mod metadata;
