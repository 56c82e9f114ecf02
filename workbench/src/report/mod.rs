pub mod model;
pub mod publish;
