pub mod envi;

pub use envi::{
    EnviHeader, EnviHeaderError, parse_envi_bands, parse_envi_header, read_envi_bands,
};
