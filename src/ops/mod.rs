pub mod menu;
pub mod reconcile;
