pub mod common;
mod relay_end_to_end;
