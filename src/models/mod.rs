pub mod assessment;
pub mod symptom;

pub use assessment::*;
pub use symptom::*;
