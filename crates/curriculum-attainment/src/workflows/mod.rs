pub mod attainment;
pub mod matrix;
