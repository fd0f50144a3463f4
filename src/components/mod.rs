pub mod app;
pub mod image;
pub mod nav;
pub mod player;
pub mod toast;
