pub mod health;
pub mod serve;
pub mod simulate;
pub mod start;
pub mod status;
pub mod stop;
