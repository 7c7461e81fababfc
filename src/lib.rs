pub mod broker;
pub mod error;
pub mod model;
pub mod premium;
pub mod render;
pub mod run;
pub mod strikes;
