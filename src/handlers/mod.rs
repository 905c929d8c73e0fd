pub mod health;
pub mod diagnostics;
pub mod saveas;

pub use health::*;
pub use diagnostics::*;
pub use saveas::*;
