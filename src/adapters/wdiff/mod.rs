pub mod wdiff_backend;
