pub mod cli;
pub mod io;
pub mod model;
pub mod normalize;
pub mod ops;
pub mod util;
