pub mod change_scorer;
pub mod frame;
pub mod motion_classifier;
pub mod motion_tracker;
pub mod sensitivity;
