pub mod domain;
pub mod modules;
pub mod numerics;
pub mod parser;
