//! I/O for exchanging grids with other tools

mod ascii;

pub use ascii::{
    encode_ascii_grid, parse_ascii_grid, read_ascii_grid, write_ascii_grid, NoDataPolicy,
    ASCII_NODATA,
};
