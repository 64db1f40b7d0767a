mod run;
mod source;

pub use run::run;

use source::*;
