//! The concrete two-variable systems under study.

pub mod bee;
pub mod housing;
pub mod linear;

pub use bee::BeeScent;
pub use housing::{HousingMarket, RentPolicy, POPULATION_FLOOR};
pub use linear::LinearPlanar;
