pub mod catalog;
pub mod frequency;
pub mod macros;
pub mod observation;
pub mod time;

pub use catalog::*;
pub use frequency::*;
pub use observation::*;
pub use time::*;
