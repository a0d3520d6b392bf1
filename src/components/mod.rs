pub mod dialog;
pub mod help;
pub mod status_bar;
pub mod title_bar;
pub mod tree;
