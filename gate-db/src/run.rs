mod setup;

pub use setup::run as setup;
